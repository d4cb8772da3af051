/// Popup: share buttons for the active tab
use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::{Document, Element, Event};

use crate::browser;
use crate::context::{ContextDescriptor, ShareKind};
use crate::host::Tab;
use crate::menu::{OPTIONS_OPEN, menu_item_id};
use crate::messages::{ClickInfo, RuntimeMessage};
use crate::prefs::StoredPrefs;
use crate::state::AppState;

/// Element shown when no network is enabled
pub const SNS_NOT_SELECTED: &str = "snsNotSelected";

#[derive(Debug, Clone, PartialEq)]
pub struct PopupItem {
    pub network: &'static str,
    pub visible: bool,
    pub page_disabled: bool,
    pub link_disabled: bool,
}

/// Button states for every network, given the prefs and the page context
pub fn popup_items(state: &AppState, context: &ContextDescriptor) -> Vec<PopupItem> {
    state
        .networks()
        .iter()
        .map(|network| {
            let usable = network.is_usable();
            PopupItem {
                network: network.id(),
                visible: network.enabled,
                page_disabled: !usable,
                link_disabled: !usable || !context.is_link,
            }
        })
        .collect()
}

/// The `shareSNS` request for a clicked popup button
pub fn share_request(menu_item_id: &str, context: &ContextDescriptor, tab: &Tab) -> RuntimeMessage {
    let mut info = ClickInfo {
        menu_item_id: menu_item_id.to_string(),
        selection_text: Some(context.selection_text.clone()),
        canonical_url: context.canonical_url.clone(),
        ..Default::default()
    };
    if context.is_link {
        info.link_text = context.link_text.clone();
        info.link_url = context.link_url.clone();
    }
    RuntimeMessage::ShareSns {
        info,
        tab: tab.clone(),
    }
}

#[derive(Default)]
struct PopupState {
    prefs: AppState,
    context: ContextDescriptor,
    tab: Option<Tab>,
}

/// Add or remove a boolean attribute, logging failures
fn set_flag(elm: &Element, name: &str, on: bool) {
    if let Err(e) = elm.toggle_attribute_with_force(name, on) {
        log::warn!("Failed to update {} on {}: {:?}", name, elm.id(), e);
    }
}

fn render(document: &Document, state: &PopupState) {
    let items = popup_items(&state.prefs, &state.context);
    for item in &items {
        if let Some(elm) = document.get_element_by_id(item.network) {
            set_flag(&elm, "hidden", !item.visible);
        }
        if let Some(elm) = document.get_element_by_id(&menu_item_id(ShareKind::Page, item.network)) {
            set_flag(&elm, "disabled", item.page_disabled);
        }
        if let Some(elm) = document.get_element_by_id(&menu_item_id(ShareKind::Link, item.network)) {
            set_flag(&elm, "disabled", item.link_disabled);
        }
    }
    if let Some(elm) = document.get_element_by_id(SNS_NOT_SELECTED) {
        set_flag(&elm, "hidden", items.iter().any(|i| i.visible));
    }
}

fn on_button_click(state: &Rc<RefCell<PopupState>>, evt: Event) {
    let Some(target) = evt.target().and_then(|t| t.dyn_into::<Element>().ok()) else {
        return;
    };
    let id = target.id();
    if id == OPTIONS_OPEN {
        spawn_local(async move {
            if let Err(e) = browser::open_options_page().await {
                log::error!("Failed to open options: {}", e);
            }
        });
        return;
    }

    let msg = {
        let state = state.borrow();
        let Some(tab) = state.tab.as_ref() else {
            return;
        };
        share_request(&id, &state.context, tab)
    };
    spawn_local(async move {
        if let Err(e) = browser::send_runtime_message(&msg).await {
            log::error!("Share request failed: {}", e);
        }
    });
}

async fn load(document: Document, state: Rc<RefCell<PopupState>>) -> Result<(), crate::error::ShareError> {
    let stored: StoredPrefs = browser::get_all_storage().await?;
    let tab = browser::get_active_tab().await?;
    {
        let mut state = state.borrow_mut();
        for (key, pref) in &stored {
            state.prefs.apply_pref(key, pref);
        }
        state.tab = tab.clone();
        state.context = ContextDescriptor::default();
    }
    render(&document, &state.borrow());

    if tab.and_then(|t| t.valid_id()).is_some() {
        browser::send_runtime_message(&RuntimeMessage::GetContextInfo(true)).await?;
    }
    Ok(())
}

pub fn run() -> Result<(), JsValue> {
    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| JsValue::from_str("no document"))?;
    let state = Rc::new(RefCell::new(PopupState::default()));

    {
        let document = document.clone();
        let state = state.clone();
        let on_msg = Closure::<dyn Fn(JsValue, JsValue) -> JsValue>::new(move |msg: JsValue, _sender: JsValue| {
            if let Ok(RuntimeMessage::ContextInfo { context_info }) = serde_wasm_bindgen::from_value(msg) {
                state.borrow_mut().context = context_info;
                render(&document, &state.borrow());
            }
            JsValue::UNDEFINED
        });
        browser::add_runtime_message_listener(on_msg.as_ref().unchecked_ref());
        on_msg.forget();
    }

    let buttons = document.query_selector_all("button")?;
    for i in 0..buttons.length() {
        let Some(node) = buttons.item(i) else {
            continue;
        };
        let state = state.clone();
        let on_click = Closure::<dyn Fn(Event)>::new(move |evt: Event| on_button_click(&state, evt));
        node.add_event_listener_with_callback("click", on_click.as_ref().unchecked_ref())?;
        on_click.forget();
    }

    spawn_local(async move {
        if let Err(e) = load(document, state).await {
            log::error!("Popup failed to load: {}", e);
        }
    });
    Ok(())
}
