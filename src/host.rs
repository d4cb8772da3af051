/// Seams over the WebExtension APIs the background script talks to
use serde::{Deserialize, Serialize};

use crate::error::ShareError;
use crate::menu::MenuItem;
use crate::messages::{ExternalMessage, RuntimeMessage};
use crate::prefs::StoredPrefs;

/// `tabs.TAB_ID_NONE`
pub const TAB_ID_NONE: i32 = -1;

/// The parts of `tabs.Tab` we read
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Tab {
    pub id: Option<i32>,
    pub index: Option<i32>,
    pub window_id: Option<i32>,
    pub url: Option<String>,
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cookie_store_id: Option<String>,
    pub active: bool,
}

impl Tab {
    /// Id of a real tab, i.e. not missing and not `TAB_ID_NONE`
    pub fn valid_id(&self) -> Option<i32> {
        self.id.filter(|id| *id != TAB_ID_NONE)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TabQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cookie_store_id: Option<String>,
    pub current_window: bool,
    pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTabProperties {
    pub url: String,
    pub active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub window_id: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cookie_store_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opener_tab_id: Option<i32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UpdateTabProperties {
    pub url: String,
    pub active: bool,
}

#[allow(async_fn_in_trait)]
pub trait MenusApi {
    async fn remove_all_menus(&self) -> Result<(), ShareError>;
    async fn create_menu(&self, item: &MenuItem) -> Result<(), ShareError>;
}

#[allow(async_fn_in_trait)]
pub trait TabsApi {
    async fn query_tabs(&self, query: &TabQuery) -> Result<Vec<Tab>, ShareError>;
    async fn create_tab(&self, props: &CreateTabProperties) -> Result<Tab, ShareError>;
    async fn update_tab(&self, tab_id: i32, props: &UpdateTabProperties) -> Result<Tab, ShareError>;
    async fn active_tab(&self) -> Result<Option<Tab>, ShareError>;
    /// Request/response round trip with the content script of a tab
    async fn send_tab_message(&self, tab_id: i32, msg: &RuntimeMessage) -> Result<Option<RuntimeMessage>, ShareError>;
}

#[allow(async_fn_in_trait)]
pub trait StorageApi {
    async fn get_all_storage(&self) -> Result<StoredPrefs, ShareError>;
}

#[allow(async_fn_in_trait)]
pub trait RuntimeApi {
    async fn send_runtime_message(&self, msg: &RuntimeMessage) -> Result<(), ShareError>;
    async fn send_external_message(&self, ext_id: &str, msg: &ExternalMessage) -> Result<(), ShareError>;
    async fn open_options_page(&self) -> Result<(), ShareError>;
}

/// Everything the background service needs from the browser
pub trait Host: MenusApi + TabsApi + StorageApi + RuntimeApi {}

impl<T: MenusApi + TabsApi + StorageApi + RuntimeApi> Host for T {}
