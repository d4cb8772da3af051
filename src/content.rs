/// Content script: reports the page context to the background
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::{Event, KeyboardEvent, MouseEvent};

use crate::browser;
use crate::extractor::extract_from_window;
use crate::messages::RuntimeMessage;

const MOUSE_BUTTON_RIGHT: i16 = 2;

/// UI events that open the context menu
#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent<'a> {
    MouseDown { button: i16 },
    KeyDown { key: &'a str, shift: bool },
    Other,
}

pub fn opens_context_menu(evt: &UiEvent) -> bool {
    match evt {
        UiEvent::MouseDown { button } => *button == MOUSE_BUTTON_RIGHT,
        UiEvent::KeyDown { key, shift } => *key == "ContextMenu" || (*shift && *key == "F10"),
        UiEvent::Other => false,
    }
}

/// Answer to a message from the background, if it expects one
pub fn reply_to(msg: &RuntimeMessage) -> Option<RuntimeMessage> {
    match msg {
        RuntimeMessage::GetContextInfo(true) => extract_from_window().map(RuntimeMessage::context_info),
        _ => None,
    }
}

fn send_context_info() {
    let Some(info) = extract_from_window() else {
        return;
    };
    spawn_local(async move {
        if let Err(e) = browser::send_runtime_message(&RuntimeMessage::context_info(info)).await {
            log::error!("Failed to send context info: {}", e);
        }
    });
}

fn handle_ui_event(evt: Event) {
    let key;
    let ui = if let Some(mouse) = evt.dyn_ref::<MouseEvent>() {
        UiEvent::MouseDown { button: mouse.button() }
    } else if let Some(kbd) = evt.dyn_ref::<KeyboardEvent>() {
        key = kbd.key();
        UiEvent::KeyDown { key: &key, shift: kbd.shift_key() }
    } else {
        UiEvent::Other
    };
    if opens_context_menu(&ui) {
        send_context_info();
    }
}

pub fn run() -> Result<(), JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;

    let on_ui = Closure::<dyn Fn(Event)>::new(handle_ui_event);
    window.add_event_listener_with_callback_and_bool("mousedown", on_ui.as_ref().unchecked_ref(), true)?;
    window.add_event_listener_with_callback_and_bool("keydown", on_ui.as_ref().unchecked_ref(), true)?;
    on_ui.forget();

    let on_msg = Closure::<dyn Fn(JsValue, JsValue) -> JsValue>::new(|msg: JsValue, _sender: JsValue| {
        let Ok(msg) = serde_wasm_bindgen::from_value::<RuntimeMessage>(msg) else {
            return JsValue::UNDEFINED;
        };
        reply_to(&msg)
            .and_then(|reply| browser::to_js(&reply).ok())
            .unwrap_or(JsValue::UNDEFINED)
    });
    browser::add_runtime_message_listener(on_msg.as_ref().unchecked_ref());
    on_msg.forget();

    log::debug!("Content script ready");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_right_click_opens_menu() {
        assert!(opens_context_menu(&UiEvent::MouseDown { button: 2 }));
        assert!(!opens_context_menu(&UiEvent::MouseDown { button: 0 }));
    }

    #[test]
    fn test_keys_open_menu() {
        assert!(opens_context_menu(&UiEvent::KeyDown { key: "ContextMenu", shift: false }));
        assert!(opens_context_menu(&UiEvent::KeyDown { key: "F10", shift: true }));
        assert!(!opens_context_menu(&UiEvent::KeyDown { key: "F10", shift: false }));
        assert!(!opens_context_menu(&UiEvent::Other));
    }

    #[test]
    fn test_other_messages_get_no_reply() {
        assert_eq!(reply_to(&RuntimeMessage::GetContextInfo(false)), None);
    }
}
