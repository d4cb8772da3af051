/// Context menu entries and their ids
use serde::{Deserialize, Serialize};

use crate::context::ShareKind;
use crate::error::ShareError;
use crate::state::AppState;

pub const SHARE_PAGE: &str = "sharePage";
pub const SHARE_TAB: &str = "shareTab";
pub const SHARE_LINK: &str = "shareLink";
pub const OPTIONS_OPEN: &str = "openOptions";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MenuContext {
    Page,
    Selection,
    Tab,
    Link,
    BrowserAction,
}

/// Properties passed to `menus.create`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuItem {
    pub id: String,
    pub title: String,
    pub contexts: Vec<MenuContext>,
    pub enabled: bool,
}

impl ShareKind {
    pub fn prefix(self) -> &'static str {
        match self {
            ShareKind::Page => SHARE_PAGE,
            ShareKind::Tab => SHARE_TAB,
            ShareKind::Link => SHARE_LINK,
        }
    }

    fn contexts(self) -> Vec<MenuContext> {
        match self {
            ShareKind::Page => vec![MenuContext::Page, MenuContext::Selection],
            ShareKind::Tab => vec![MenuContext::Tab],
            ShareKind::Link => vec![MenuContext::Link],
        }
    }

    fn title(self, label: &str) -> String {
        match self {
            ShareKind::Page => format!("Share page with {}", label),
            ShareKind::Tab => format!("Share tab with {}", label),
            ShareKind::Link => format!("Share link with {}", label),
        }
    }
}

/// Parsed form of a clicked menu item id
#[derive(Debug, Clone, PartialEq)]
pub enum MenuAction {
    OpenOptions,
    Share { kind: ShareKind, network: String },
}

impl MenuAction {
    pub fn parse(id: &str) -> Option<MenuAction> {
        if id == OPTIONS_OPEN {
            return Some(MenuAction::OpenOptions);
        }
        [ShareKind::Link, ShareKind::Tab, ShareKind::Page]
            .into_iter()
            .find_map(|kind| {
                id.strip_prefix(kind.prefix())
                    .filter(|network| !network.is_empty())
                    .map(|network| MenuAction::Share {
                        kind,
                        network: network.to_string(),
                    })
            })
    }
}

pub fn menu_item_id(kind: ShareKind, network: &str) -> String {
    format!("{}{}", kind.prefix(), network)
}

/// The complete menu tree for the current state, in creation order
pub fn build_menu_items(state: &AppState) -> Vec<MenuItem> {
    let mut items = vec![MenuItem {
        id: OPTIONS_OPEN.to_string(),
        title: "Open options (&T)".to_string(),
        contexts: vec![MenuContext::BrowserAction],
        enabled: true,
    }];

    for network in state.networks().iter().filter(|n| n.enabled) {
        let enabled = network.menu_enabled();
        let label = network.descriptor.menu_label;
        for kind in [ShareKind::Page, ShareKind::Tab, ShareKind::Link] {
            items.push(MenuItem {
                id: menu_item_id(kind, network.id()),
                title: kind.title(label),
                contexts: kind.contexts(),
                enabled,
            });
        }
    }
    items
}

/// Per-item results of a fan-out of extension API calls
#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub results: Vec<(String, Result<(), ShareError>)>,
}

impl BatchOutcome {
    pub fn push(&mut self, id: impl Into<String>, result: Result<(), ShareError>) {
        self.results.push((id.into(), result));
    }

    pub fn extend(&mut self, other: BatchOutcome) {
        self.results.extend(other.results);
    }

    pub fn succeeded(&self) -> impl Iterator<Item = &str> {
        self.results
            .iter()
            .filter(|(_, r)| r.is_ok())
            .map(|(id, _)| id.as_str())
    }

    pub fn failures(&self) -> impl Iterator<Item = (&str, &ShareError)> {
        self.results
            .iter()
            .filter_map(|(id, r)| r.as_ref().err().map(|e| (id.as_str(), e)))
    }

    pub fn is_success(&self) -> bool {
        self.failures().next().is_none()
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}
