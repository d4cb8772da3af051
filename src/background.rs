/// Background service: menu synchronization, share handling and messaging
use std::cell::RefCell;

use futures::future::join_all;
use url::Url;

use crate::context::{ContextDescriptor, ShareKind, may_use_canonical, share_text};
use crate::dispatch::dispatch;
use crate::error::ShareError;
use crate::host::{Host, Tab};
use crate::menu::{BatchOutcome, MenuAction, MenuItem, build_menu_items};
use crate::messages::{ClickInfo, ExternalMessage, RuntimeMessage, TST_ID};
use crate::prefs::{AREA_LOCAL, StorageChanges, as_changes};
use crate::share_url::{build_sub_item_url, build_url};
use crate::state::{AppState, NetworkState, PrefUpdate};

pub const EXTENSION_NAME: &str = "Share SNS";

/// What a share resolved to before a tab is opened
#[derive(Debug, Clone, PartialEq)]
pub struct SharePlan {
    pub url: String,
    pub match_pattern: Option<&'static str>,
}

pub struct BackgroundService<H: Host> {
    host: H,
    state: RefCell<AppState>,
}

impl<H: Host> BackgroundService<H> {
    pub fn new(host: H) -> Self {
        BackgroundService {
            host,
            state: RefCell::new(AppState::new()),
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    /// Read-only view of the state, for inspection
    pub fn with_state<R>(&self, f: impl FnOnce(&AppState) -> R) -> R {
        f(&self.state.borrow())
    }

    /// Seed the state from storage, announce ourselves to Tree Style Tab and
    /// build the menus, mirrored there if it answered
    pub async fn startup(&self) -> Result<BatchOutcome, ShareError> {
        self.seed().await?;
        if let Err(e) = self.register_external(TST_ID).await {
            log::debug!("{} did not answer: {}", TST_ID, e);
        }
        self.rebuild_menus().await
    }

    /// Apply a full storage read
    async fn seed(&self) -> Result<(), ShareError> {
        let stored = self.host.get_all_storage().await?;
        self.apply_changes(&as_changes(stored));
        self.state.borrow_mut().mark_seeded();
        Ok(())
    }

    /// Seed unless it already happened in this background page's lifetime
    async fn ensure_seeded(&self) -> Result<(), ShareError> {
        if self.state.borrow().is_seeded() {
            return Ok(());
        }
        log::debug!("State not seeded, reading storage");
        self.seed().await
    }

    fn apply_changes(&self, changes: &StorageChanges) {
        let mut state = self.state.borrow_mut();
        for (key, change) in changes {
            match state.apply_pref(key, &change.effective()) {
                PrefUpdate::Ignored => log::debug!("Ignoring preference {}", key),
                update => log::debug!("Preference {} -> {:?}", key, update),
            }
        }
    }

    /// storage.onChanged: apply every changed key, then rebuild once
    pub async fn handle_storage_change(
        &self,
        changes: &StorageChanges,
        area: &str,
    ) -> Result<Option<BatchOutcome>, ShareError> {
        if area != AREA_LOCAL || changes.is_empty() {
            return Ok(None);
        }
        self.ensure_seeded().await?;
        self.apply_changes(changes);
        self.rebuild_menus().await.map(Some)
    }

    /// Tear down every menu entry and recreate the ones the state calls for
    pub async fn rebuild_menus(&self) -> Result<BatchOutcome, ShareError> {
        let (items, externals) = {
            let state = self.state.borrow();
            let externals: Vec<String> = state.external_exts().map(str::to_string).collect();
            (build_menu_items(&state), externals)
        };

        self.host.remove_all_menus().await?;

        let creates = items.iter().map(|item| async move {
            (item.id.clone(), self.host.create_menu(item).await)
        });
        let mut outcome = BatchOutcome::default();
        for (id, result) in join_all(creates).await {
            outcome.push(id, result);
        }

        for ext_id in &externals {
            outcome.extend(self.mirror_menus(ext_id, &items).await);
        }

        for (id, e) in outcome.failures() {
            log::error!("Menu item {} failed: {}", id, e);
        }
        Ok(outcome)
    }

    /// Replay the tab entries into an external extension's fake context menu
    async fn mirror_menus(&self, ext_id: &str, items: &[MenuItem]) -> BatchOutcome {
        let mut outcome = BatchOutcome::default();
        let result = self
            .host
            .send_external_message(ext_id, &ExternalMessage::FakeContextMenuRemoveAll)
            .await;
        outcome.push(format!("{}:removeAll", ext_id), result);

        let tab_items = items.iter().filter(|item| {
            matches!(
                MenuAction::parse(&item.id),
                Some(MenuAction::Share { kind: ShareKind::Tab, .. })
            )
        });
        let creates = tab_items.map(|item| async move {
            let msg = ExternalMessage::FakeContextMenuCreate { params: item.clone() };
            (
                format!("{}:{}", ext_id, item.id),
                self.host.send_external_message(ext_id, &msg).await,
            )
        });
        for (id, result) in join_all(creates).await {
            outcome.push(id, result);
        }
        outcome
    }

    pub async fn register_external(&self, ext_id: &str) -> Result<(), ShareError> {
        self.host
            .send_external_message(ext_id, &ExternalMessage::register_self(EXTENSION_NAME))
            .await?;
        if self.state.borrow_mut().register_external(ext_id) {
            log::info!("Registered with {}", ext_id);
        }
        Ok(())
    }

    /// menus.onClicked: share the clicked target, or open the options page
    pub async fn handle_menu_click(&self, info: &ClickInfo, tab: &Tab) -> Result<Option<Tab>, ShareError> {
        let Some(action) = MenuAction::parse(&info.menu_item_id) else {
            log::debug!("Unknown menu item {}", info.menu_item_id);
            return Ok(None);
        };
        let (kind, network_id) = match action {
            MenuAction::OpenOptions => {
                self.host.open_options_page().await?;
                return Ok(None);
            }
            MenuAction::Share { kind, network } => (kind, network),
        };
        let Some(tab_id) = tab.valid_id() else {
            return Ok(None);
        };
        if tab.index.is_none() {
            return Ok(None);
        }
        self.ensure_seeded().await?;

        let network = self.state.borrow().network(&network_id).cloned();
        let Some(network) = network else {
            log::debug!("Unknown network {}", network_id);
            return Ok(None);
        };

        let (url, text) = self.share_target(kind, info, tab, tab_id).await?;
        let Some(plan) = plan_share(&network, &url, &text) else {
            return Ok(None);
        };
        dispatch(&self.host, &plan.url, plan.match_pattern, tab).await.map(Some)
    }

    /// The URL and text a share carries, per context precedence
    async fn share_target(
        &self,
        kind: ShareKind,
        info: &ClickInfo,
        tab: &Tab,
        tab_id: i32,
    ) -> Result<(String, String), ShareError> {
        let cached = self.state.borrow_mut().take_context();
        let link_text = info
            .link_text
            .clone()
            .or_else(|| cached.as_ref().and_then(|c| c.link_text.clone()));
        let text = share_text(
            kind,
            info.selection_text.as_deref(),
            link_text.as_deref(),
            tab.title.as_deref(),
        );

        if kind == ShareKind::Link {
            let url = info
                .link_url
                .clone()
                .or_else(|| cached.and_then(|c| c.link_url))
                .ok_or_else(|| ShareError::InvalidArgument("link share without a link URL".to_string()))?;
            return Ok((url, text));
        }

        let tab_url = tab
            .url
            .clone()
            .ok_or_else(|| ShareError::InvalidArgument("tab without a URL".to_string()))?;
        let prefer_canonical = self.state.borrow().options.prefer_canonical;
        if !may_use_canonical(prefer_canonical, &Url::parse(&tab_url)?) {
            return Ok((tab_url, text));
        }

        let known = info
            .canonical_url
            .clone()
            .or_else(|| cached.and_then(|c| c.canonical_url));
        let canonical = match known {
            Some(url) => Some(url),
            None => self.request_context(tab_id).await.and_then(|c| c.canonical_url),
        };
        Ok((canonical.unwrap_or(tab_url), text))
    }

    /// Ask a tab's content script for its context; failures read as "unknown"
    async fn request_context(&self, tab_id: i32) -> Option<ContextDescriptor> {
        match self
            .host
            .send_tab_message(tab_id, &RuntimeMessage::GetContextInfo(true))
            .await
        {
            Ok(Some(RuntimeMessage::ContextInfo { context_info })) => Some(context_info),
            Ok(_) => None,
            Err(e) => {
                log::warn!("No context from tab {}: {}", tab_id, e);
                None
            }
        }
    }

    /// runtime.onMessage
    pub async fn handle_message(&self, msg: RuntimeMessage) -> Result<Option<Tab>, ShareError> {
        match msg {
            RuntimeMessage::GetContextInfo(false) => Ok(None),
            RuntimeMessage::GetContextInfo(true) => {
                self.send_context_info().await?;
                Ok(None)
            }
            RuntimeMessage::ContextInfo { context_info } => {
                self.state.borrow_mut().set_context(context_info);
                Ok(None)
            }
            RuntimeMessage::ShareSns { info, tab } => self.handle_menu_click(&info, &tab).await,
        }
    }

    /// Forward the active tab's context to whoever listens (the popup)
    async fn send_context_info(&self) -> Result<(), ShareError> {
        let Some(tab_id) = self.host.active_tab().await?.and_then(|t| t.valid_id()) else {
            return Ok(());
        };
        if let Some(context) = self.request_context(tab_id).await {
            self.host
                .send_runtime_message(&RuntimeMessage::context_info(context))
                .await?;
        }
        Ok(())
    }

    /// runtime.onMessageExternal
    pub async fn handle_external_message(
        &self,
        sender_id: &str,
        msg: ExternalMessage,
    ) -> Result<Option<Tab>, ShareError> {
        if sender_id != TST_ID {
            log::debug!("Ignoring message from {}", sender_id);
            return Ok(None);
        }
        match msg {
            ExternalMessage::Ready => {
                self.register_external(sender_id).await?;
                self.rebuild_menus().await?;
                Ok(None)
            }
            ExternalMessage::FakeContextMenuClick { info, tab } => self.handle_menu_click(&info, &tab).await,
            other => {
                log::debug!("Unexpected message from {}: {:?}", sender_id, other);
                Ok(None)
            }
        }
    }
}

/// Build the share URL for a network; `None` if it has nothing to build from
pub fn plan_share(network: &NetworkState, url: &str, text: &str) -> Option<SharePlan> {
    let descriptor = network.descriptor;
    let share_url = if descriptor.is_gated() {
        build_sub_item_url(network.active_sub_item()?, url, text)
    } else {
        build_url(descriptor.url_template?, url, text)
    };
    Some(SharePlan {
        url: share_url,
        match_pattern: descriptor.match_pattern,
    })
}
