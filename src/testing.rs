/// Recording host used by the unit tests
use std::cell::{Cell, RefCell};
use std::collections::HashSet;

use regex::Regex;

use crate::error::ShareError;
use crate::host::{
    CreateTabProperties, MenusApi, RuntimeApi, StorageApi, Tab, TabQuery, TabsApi, UpdateTabProperties,
};
use crate::menu::MenuItem;
use crate::messages::{ExternalMessage, RuntimeMessage};
use crate::prefs::{StoredPref, StoredPrefs};

#[derive(Debug, Clone, PartialEq)]
pub enum HostCall {
    RemoveAllMenus,
    CreateMenu(MenuItem),
    QueryTabs(TabQuery),
    CreateTab(CreateTabProperties),
    UpdateTab(i32, UpdateTabProperties),
    ActiveTab,
    SendTabMessage(i32, RuntimeMessage),
    GetAllStorage,
    SendRuntimeMessage(RuntimeMessage),
    SendExternalMessage(String, ExternalMessage),
    OpenOptionsPage,
}

pub struct MockHost {
    calls: RefCell<Vec<HostCall>>,
    storage: RefCell<StoredPrefs>,
    tabs: RefCell<Vec<Tab>>,
    active: RefCell<Option<Tab>>,
    tab_reply: RefCell<Option<RuntimeMessage>>,
    failing: RefCell<HashSet<&'static str>>,
    failing_menus: RefCell<HashSet<String>>,
    next_tab_id: Cell<i32>,
}

impl MockHost {
    pub fn new() -> Self {
        MockHost {
            calls: RefCell::new(Vec::new()),
            storage: RefCell::new(StoredPrefs::new()),
            tabs: RefCell::new(Vec::new()),
            active: RefCell::new(None),
            tab_reply: RefCell::new(None),
            failing: RefCell::new(HashSet::new()),
            failing_menus: RefCell::new(HashSet::new()),
            next_tab_id: Cell::new(100),
        }
    }

    pub fn store(&self, key: &str, pref: StoredPref) {
        self.storage.borrow_mut().insert(key.to_string(), pref);
    }

    pub fn add_tab(&self, tab: Tab) {
        self.tabs.borrow_mut().push(tab);
    }

    pub fn set_active_tab(&self, tab: Tab) {
        *self.active.borrow_mut() = Some(tab);
    }

    /// What the content script answers to any tab message
    pub fn reply_from_tab(&self, msg: RuntimeMessage) {
        *self.tab_reply.borrow_mut() = Some(msg);
    }

    pub fn fail_api(&self, api: &'static str) {
        self.failing.borrow_mut().insert(api);
    }

    pub fn fail_menu(&self, id: &str) {
        self.failing_menus.borrow_mut().insert(id.to_string());
    }

    pub fn calls(&self) -> Vec<HostCall> {
        self.calls.borrow().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.borrow_mut().clear();
    }

    pub fn count(&self, pred: impl Fn(&HostCall) -> bool) -> usize {
        self.calls.borrow().iter().filter(|c| pred(c)).count()
    }

    pub fn created_menu_ids(&self) -> Vec<String> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|c| match c {
                HostCall::CreateMenu(item) => Some(item.id.clone()),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: HostCall) {
        self.calls.borrow_mut().push(call);
    }

    fn check(&self, api: &'static str) -> Result<(), ShareError> {
        if self.failing.borrow().contains(api) {
            Err(ShareError::Host {
                api,
                message: "mock failure".to_string(),
            })
        } else {
            Ok(())
        }
    }
}

/// Match a WebExtension match pattern the lazy way: `*` matches anything
fn pattern_matches(pattern: &str, url: &str) -> bool {
    let re = format!("^{}$", regex::escape(pattern).replace(r"\*", ".*"));
    Regex::new(&re).map(|re| re.is_match(url)).unwrap_or(false)
}

impl MenusApi for MockHost {
    async fn remove_all_menus(&self) -> Result<(), ShareError> {
        self.record(HostCall::RemoveAllMenus);
        self.check("menus.removeAll")
    }

    async fn create_menu(&self, item: &MenuItem) -> Result<(), ShareError> {
        self.record(HostCall::CreateMenu(item.clone()));
        self.check("menus.create")?;
        if self.failing_menus.borrow().contains(&item.id) {
            return Err(ShareError::Host {
                api: "menus.create",
                message: format!("cannot create {}", item.id),
            });
        }
        Ok(())
    }
}

impl TabsApi for MockHost {
    async fn query_tabs(&self, query: &TabQuery) -> Result<Vec<Tab>, ShareError> {
        self.record(HostCall::QueryTabs(query.clone()));
        self.check("tabs.query")?;
        let tabs = self
            .tabs
            .borrow()
            .iter()
            .filter(|tab| {
                let same_store = match (&query.cookie_store_id, &tab.cookie_store_id) {
                    (Some(a), Some(b)) => a == b,
                    _ => true,
                };
                same_store
                    && tab
                        .url
                        .as_deref()
                        .map_or(false, |url| pattern_matches(&query.url, url))
            })
            .cloned()
            .collect();
        Ok(tabs)
    }

    async fn create_tab(&self, props: &CreateTabProperties) -> Result<Tab, ShareError> {
        self.record(HostCall::CreateTab(props.clone()));
        self.check("tabs.create")?;
        let id = self.next_tab_id.get();
        self.next_tab_id.set(id + 1);
        Ok(Tab {
            id: Some(id),
            index: props.index,
            window_id: props.window_id,
            url: Some(props.url.clone()),
            title: None,
            cookie_store_id: props.cookie_store_id.clone(),
            active: props.active,
        })
    }

    async fn update_tab(&self, tab_id: i32, props: &UpdateTabProperties) -> Result<Tab, ShareError> {
        self.record(HostCall::UpdateTab(tab_id, props.clone()));
        self.check("tabs.update")?;
        let mut tabs = self.tabs.borrow_mut();
        let tab = tabs
            .iter_mut()
            .find(|t| t.id == Some(tab_id))
            .ok_or_else(|| ShareError::Host {
                api: "tabs.update",
                message: format!("no tab {}", tab_id),
            })?;
        tab.url = Some(props.url.clone());
        tab.active = props.active;
        Ok(tab.clone())
    }

    async fn active_tab(&self) -> Result<Option<Tab>, ShareError> {
        self.record(HostCall::ActiveTab);
        self.check("tabs.query")?;
        Ok(self.active.borrow().clone())
    }

    async fn send_tab_message(&self, tab_id: i32, msg: &RuntimeMessage) -> Result<Option<RuntimeMessage>, ShareError> {
        self.record(HostCall::SendTabMessage(tab_id, msg.clone()));
        self.check("tabs.sendMessage")?;
        Ok(self.tab_reply.borrow().clone())
    }
}

impl StorageApi for MockHost {
    async fn get_all_storage(&self) -> Result<StoredPrefs, ShareError> {
        self.record(HostCall::GetAllStorage);
        self.check("storage.local.get")?;
        Ok(self.storage.borrow().clone())
    }
}

impl RuntimeApi for MockHost {
    async fn send_runtime_message(&self, msg: &RuntimeMessage) -> Result<(), ShareError> {
        self.record(HostCall::SendRuntimeMessage(msg.clone()));
        self.check("runtime.sendMessage")
    }

    async fn send_external_message(&self, ext_id: &str, msg: &ExternalMessage) -> Result<(), ShareError> {
        self.record(HostCall::SendExternalMessage(ext_id.to_string(), msg.clone()));
        self.check("runtime.sendMessage")
    }

    async fn open_options_page(&self) -> Result<(), ShareError> {
        self.record(HostCall::OpenOptionsPage);
        self.check("runtime.openOptionsPage")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pattern_matches() {
        assert!(pattern_matches("*://twitter.com/*", "https://twitter.com/home"));
        assert!(!pattern_matches("*://twitter.com/*", "https://example.com/twitter.com/"));
        assert!(pattern_matches("https://example.com/*", "https://example.com/"));
    }
}
