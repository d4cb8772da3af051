/// Share SNS - share pages, links and tabs to social networks
/// Built with Rust + WASM

pub mod background;
pub mod browser;
pub mod content;
pub mod context;
pub mod dispatch;
pub mod error;
pub mod extractor;
pub mod host;
pub mod menu;
pub mod messages;
pub mod options;
pub mod popup;
pub mod prefs;
pub mod share_url;
pub mod sns;
pub mod state;

#[cfg(test)]
mod testing;

use wasm_bindgen::prelude::*;

// Set up panic hook for better error messages in the browser console
#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    let level = if cfg!(debug_assertions) { log::Level::Debug } else { log::Level::Info };
    wasm_logger::init(wasm_logger::Config::new(level));
}

#[wasm_bindgen]
pub fn start_background() {
    browser::run_background();
}

#[wasm_bindgen]
pub fn start_content() -> Result<(), JsValue> {
    content::run()
}

#[wasm_bindgen]
pub fn start_popup() -> Result<(), JsValue> {
    popup::run()
}

#[wasm_bindgen]
pub fn start_options() -> Result<(), JsValue> {
    options::run()
}

// Exposed for the options page's inline validation
#[wasm_bindgen]
pub fn is_valid_instance_url(value: &str) -> bool {
    sns::SubItemDescriptor {
        url_template: String::new(),
        instance_value: Some(value.to_string()),
    }
    .is_configured()
}
