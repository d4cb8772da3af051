/// WebExtension bindings: the JS bridge and the wasm `Host`
use std::rc::Rc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;

use crate::background::BackgroundService;
use crate::error::ShareError;
use crate::host::{
    CreateTabProperties, MenusApi, RuntimeApi, StorageApi, Tab, TabQuery, TabsApi, UpdateTabProperties,
};
use crate::menu::MenuItem;
use crate::messages::{ClickInfo, ExternalMessage, RuntimeMessage};
use crate::prefs::{StoredPrefs, parse_changes, parse_stored};

// Import JS bridge functions
#[wasm_bindgen(module = "/js/bridge.js")]
extern "C" {
    #[wasm_bindgen(catch)]
    async fn menusRemoveAll() -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn menusCreate(item: JsValue) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn tabsQuery(query: JsValue) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn tabsCreate(props: JsValue) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn tabsUpdate(tab_id: i32, props: JsValue) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn getActiveTab() -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn tabsSendMessage(tab_id: i32, msg: JsValue) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn storageGetAll() -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn storageSet(items: JsValue) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn runtimeSendMessage(msg: JsValue) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn runtimeSendExternal(ext_id: &str, msg: JsValue) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn openOptionsPage() -> Result<JsValue, JsValue>;

    fn addMenuClickedListener(callback: &js_sys::Function);
    fn addRuntimeMessageListener(callback: &js_sys::Function);
    fn addExternalMessageListener(callback: &js_sys::Function);
    fn addStorageChangedListener(callback: &js_sys::Function);
    fn addStartupListener(callback: &js_sys::Function);
}

/// Plain JSON-shaped JS value (objects, not `Map`s; `null` for `None`)
pub fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, ShareError> {
    Ok(value.serialize(&serde_wasm_bindgen::Serializer::json_compatible())?)
}

fn from_js<T: DeserializeOwned>(value: JsValue) -> Result<T, ShareError> {
    Ok(serde_wasm_bindgen::from_value(value)?)
}

fn is_absent(value: &JsValue) -> bool {
    value.is_undefined() || value.is_null()
}

pub async fn get_all_storage() -> Result<StoredPrefs, ShareError> {
    let items = storageGetAll()
        .await
        .map_err(|e| ShareError::host("storage.local.get", e))?;
    if is_absent(&items) {
        return Ok(StoredPrefs::new());
    }
    Ok(parse_stored(from_js::<serde_json::Value>(items)?))
}

pub async fn set_storage(prefs: &StoredPrefs) -> Result<(), ShareError> {
    storageSet(to_js(prefs)?)
        .await
        .map(|_| ())
        .map_err(|e| ShareError::host("storage.local.set", e))
}

pub async fn get_active_tab() -> Result<Option<Tab>, ShareError> {
    let tab = getActiveTab()
        .await
        .map_err(|e| ShareError::host("tabs.query", e))?;
    if is_absent(&tab) { Ok(None) } else { from_js(tab).map(Some) }
}

pub async fn send_runtime_message(msg: &RuntimeMessage) -> Result<(), ShareError> {
    runtimeSendMessage(to_js(msg)?)
        .await
        .map(|_| ())
        .map_err(|e| ShareError::host("runtime.sendMessage", e))
}

pub async fn open_options_page() -> Result<(), ShareError> {
    openOptionsPage()
        .await
        .map(|_| ())
        .map_err(|e| ShareError::host("runtime.openOptionsPage", e))
}

pub fn add_runtime_message_listener(callback: &js_sys::Function) {
    addRuntimeMessageListener(callback);
}

/// The browser's extension APIs
#[derive(Debug, Clone, Copy, Default)]
pub struct WebExtHost;

impl MenusApi for WebExtHost {
    async fn remove_all_menus(&self) -> Result<(), ShareError> {
        menusRemoveAll()
            .await
            .map(|_| ())
            .map_err(|e| ShareError::host("menus.removeAll", e))
    }

    async fn create_menu(&self, item: &MenuItem) -> Result<(), ShareError> {
        menusCreate(to_js(item)?)
            .await
            .map(|_| ())
            .map_err(|e| ShareError::host("menus.create", e))
    }
}

impl TabsApi for WebExtHost {
    async fn query_tabs(&self, query: &TabQuery) -> Result<Vec<Tab>, ShareError> {
        let tabs = tabsQuery(to_js(query)?)
            .await
            .map_err(|e| ShareError::host("tabs.query", e))?;
        from_js(tabs)
    }

    async fn create_tab(&self, props: &CreateTabProperties) -> Result<Tab, ShareError> {
        let tab = tabsCreate(to_js(props)?)
            .await
            .map_err(|e| ShareError::host("tabs.create", e))?;
        from_js(tab)
    }

    async fn update_tab(&self, tab_id: i32, props: &UpdateTabProperties) -> Result<Tab, ShareError> {
        let tab = tabsUpdate(tab_id, to_js(props)?)
            .await
            .map_err(|e| ShareError::host("tabs.update", e))?;
        from_js(tab)
    }

    async fn active_tab(&self) -> Result<Option<Tab>, ShareError> {
        get_active_tab().await
    }

    async fn send_tab_message(&self, tab_id: i32, msg: &RuntimeMessage) -> Result<Option<RuntimeMessage>, ShareError> {
        let reply = tabsSendMessage(tab_id, to_js(msg)?)
            .await
            .map_err(|e| ShareError::host("tabs.sendMessage", e))?;
        if is_absent(&reply) { Ok(None) } else { from_js(reply).map(Some) }
    }
}

impl StorageApi for WebExtHost {
    async fn get_all_storage(&self) -> Result<StoredPrefs, ShareError> {
        get_all_storage().await
    }
}

impl RuntimeApi for WebExtHost {
    async fn send_runtime_message(&self, msg: &RuntimeMessage) -> Result<(), ShareError> {
        send_runtime_message(msg).await
    }

    async fn send_external_message(&self, ext_id: &str, msg: &ExternalMessage) -> Result<(), ShareError> {
        runtimeSendExternal(ext_id, to_js(msg)?)
            .await
            .map(|_| ())
            .map_err(|e| ShareError::host("runtime.sendMessage", e))
    }

    async fn open_options_page(&self) -> Result<(), ShareError> {
        open_options_page().await
    }
}

type Service = Rc<BackgroundService<WebExtHost>>;

/// Run a handler future, logging instead of propagating its error
fn spawn_logged<F>(what: &'static str, fut: F)
where
    F: std::future::Future<Output = Result<(), ShareError>> + 'static,
{
    spawn_local(async move {
        if let Err(e) = fut.await {
            log::error!("{}: {}", what, e);
        }
    });
}

fn sender_id(sender: &JsValue) -> Option<String> {
    js_sys::Reflect::get(sender, &JsValue::from_str("id"))
        .ok()
        .and_then(|id| id.as_string())
}

/// Wire the background service to the browser's events
pub fn run_background() {
    let service: Service = Rc::new(BackgroundService::new(WebExtHost));

    let svc = service.clone();
    let on_clicked = Closure::<dyn Fn(JsValue, JsValue)>::new(move |info: JsValue, tab: JsValue| {
        let svc = svc.clone();
        spawn_logged("Menu click failed", async move {
            let info: ClickInfo = from_js(info)?;
            let tab: Tab = from_js(tab)?;
            svc.handle_menu_click(&info, &tab).await.map(|_| ())
        });
    });
    addMenuClickedListener(on_clicked.as_ref().unchecked_ref());
    on_clicked.forget();

    let svc = service.clone();
    let on_message = Closure::<dyn Fn(JsValue, JsValue) -> JsValue>::new(move |msg: JsValue, _sender: JsValue| {
        match from_js::<RuntimeMessage>(msg) {
            Ok(msg) => {
                let svc = svc.clone();
                spawn_logged("Message handling failed", async move {
                    svc.handle_message(msg).await.map(|_| ())
                });
            }
            Err(e) => log::debug!("Ignoring message: {}", e),
        }
        JsValue::UNDEFINED
    });
    addRuntimeMessageListener(on_message.as_ref().unchecked_ref());
    on_message.forget();

    let svc = service.clone();
    let on_external = Closure::<dyn Fn(JsValue, JsValue) -> JsValue>::new(move |msg: JsValue, sender: JsValue| {
        let Some(sender) = sender_id(&sender) else {
            return JsValue::UNDEFINED;
        };
        match from_js::<ExternalMessage>(msg) {
            Ok(msg) => {
                let svc = svc.clone();
                spawn_logged("External message failed", async move {
                    svc.handle_external_message(&sender, msg).await.map(|_| ())
                });
            }
            Err(e) => log::debug!("Ignoring external message from {}: {}", sender, e),
        }
        JsValue::UNDEFINED
    });
    addExternalMessageListener(on_external.as_ref().unchecked_ref());
    on_external.forget();

    let svc = service.clone();
    let on_storage = Closure::<dyn Fn(JsValue, String)>::new(move |changes: JsValue, area: String| {
        let svc = svc.clone();
        spawn_logged("Storage change failed", async move {
            let changes = parse_changes(from_js::<serde_json::Value>(changes)?);
            svc.handle_storage_change(&changes, &area).await.map(|_| ())
        });
    });
    addStorageChangedListener(on_storage.as_ref().unchecked_ref());
    on_storage.forget();

    let svc = service;
    let on_startup = Closure::<dyn Fn()>::new(move || {
        let svc = svc.clone();
        spawn_logged("Startup failed", async move { svc.startup().await.map(|_| ()) });
    });
    addStartupListener(on_startup.as_ref().unchecked_ref());
    on_startup.forget();

    log::debug!("Background listeners registered");
}
