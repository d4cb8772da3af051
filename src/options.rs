/// Options page: input elements <-> stored preference records
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::{Document, Event, HtmlInputElement};

use crate::browser;
use crate::prefs::{StoredPref, StoredPrefs};

/// The values of one `<input>` that matter for storage
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InputSnapshot {
    pub id: String,
    pub name: String,
    pub input_type: String,
    pub checked: bool,
    pub value: String,
    pub sub_item_of: Option<String>,
}

impl InputSnapshot {
    fn to_pref(&self) -> Option<(String, StoredPref)> {
        if self.id.is_empty() {
            return None;
        }
        let pref = StoredPref {
            id: self.id.clone(),
            checked: self.checked,
            value: self.value.clone(),
            sub_item_of: self.sub_item_of.clone(),
        };
        Some((self.id.clone(), pref))
    }
}

/// Records to store after `changed` fired; a radio button rewrites its group
pub fn prefs_for_change(changed: &InputSnapshot, inputs: &[InputSnapshot]) -> StoredPrefs {
    if changed.input_type == "radio" {
        inputs
            .iter()
            .filter(|input| input.input_type == "radio" && input.name == changed.name)
            .filter_map(InputSnapshot::to_pref)
            .collect()
    } else {
        changed.to_pref().into_iter().collect()
    }
}

/// How a stored record restores an input
#[derive(Debug, Clone, PartialEq)]
pub enum InputRestore {
    Checked(bool),
    Value(String),
    Skip,
}

pub fn restore_for(input_type: &str, pref: &StoredPref) -> InputRestore {
    match input_type {
        "checkbox" | "radio" => InputRestore::Checked(pref.checked),
        "text" | "url" => InputRestore::Value(pref.value.clone()),
        _ => InputRestore::Skip,
    }
}

fn snapshot(input: &HtmlInputElement) -> InputSnapshot {
    InputSnapshot {
        id: input.id(),
        name: input.name(),
        input_type: input.type_(),
        checked: input.checked(),
        value: input.value(),
        sub_item_of: input.get_attribute("data-sub-item-of"),
    }
}

fn all_inputs(document: &Document) -> Vec<HtmlInputElement> {
    let Ok(nodes) = document.query_selector_all("input") else {
        return Vec::new();
    };
    (0..nodes.length())
        .filter_map(|i| nodes.item(i))
        .filter_map(|node| node.dyn_into::<HtmlInputElement>().ok())
        .collect()
}

fn on_input_change(document: &Document, evt: Event) {
    let Some(target) = evt.target().and_then(|t| t.dyn_into::<HtmlInputElement>().ok()) else {
        return;
    };
    let inputs: Vec<InputSnapshot> = all_inputs(document).iter().map(snapshot).collect();
    let prefs = prefs_for_change(&snapshot(&target), &inputs);
    spawn_local(async move {
        if let Err(e) = browser::set_storage(&prefs).await {
            log::error!("Failed to store preferences: {}", e);
        }
    });
}

async fn restore_inputs(document: Document) -> Result<(), crate::error::ShareError> {
    let stored = browser::get_all_storage().await?;
    for pref in stored.values() {
        let Some(input) = document
            .get_element_by_id(&pref.id)
            .and_then(|e| e.dyn_into::<HtmlInputElement>().ok())
        else {
            continue;
        };
        match restore_for(&input.type_(), pref) {
            InputRestore::Checked(checked) => input.set_checked(checked),
            InputRestore::Value(value) => input.set_value(&value),
            InputRestore::Skip => {}
        }
    }
    Ok(())
}

pub fn run() -> Result<(), JsValue> {
    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| JsValue::from_str("no document"))?;

    for input in all_inputs(&document) {
        let doc = document.clone();
        let on_change = Closure::<dyn Fn(Event)>::new(move |evt: Event| on_input_change(&doc, evt));
        input.add_event_listener_with_callback("change", on_change.as_ref().unchecked_ref())?;
        on_change.forget();
    }

    spawn_local(async move {
        if let Err(e) = restore_inputs(document).await {
            log::error!("Failed to restore options: {}", e);
        }
    });
    Ok(())
}
