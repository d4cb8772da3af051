/// Error type shared by the background, popup and options code

use wasm_bindgen::JsValue;

#[derive(Debug, thiserror::Error)]
pub enum ShareError {
    /// A value of the wrong shape reached a handler
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// An extension API call was rejected by the browser
    #[error("{api} failed: {message}")]
    Host { api: &'static str, message: String },

    #[error("serialization failed: {0}")]
    Serialization(String),

    #[error("invalid url: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl ShareError {
    pub fn host(api: &'static str, err: JsValue) -> Self {
        let message = err
            .as_string()
            .or_else(|| {
                js_sys::Reflect::get(&err, &JsValue::from_str("message"))
                    .ok()
                    .and_then(|m| m.as_string())
            })
            .unwrap_or_else(|| format!("{:?}", err));
        ShareError::Host { api, message }
    }
}

impl From<serde_wasm_bindgen::Error> for ShareError {
    fn from(e: serde_wasm_bindgen::Error) -> Self {
        ShareError::Serialization(e.to_string())
    }
}

impl From<serde_json::Error> for ShareError {
    fn from(e: serde_json::Error) -> Self {
        ShareError::Serialization(e.to_string())
    }
}
