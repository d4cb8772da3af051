/// In-memory cache of the preferences, rebuilt from storage at any time
use std::collections::{BTreeMap, BTreeSet};

use crate::context::ContextDescriptor;
use crate::prefs::{PREFER_CANONICAL, StoredPref, UserOptions};
use crate::sns::{self, NetworkDescriptor, SubItemDescriptor};

/// Runtime record of one network
#[derive(Debug, Clone, PartialEq)]
pub struct NetworkState {
    pub descriptor: &'static NetworkDescriptor,
    pub enabled: bool,
    pub sub_items: BTreeMap<String, SubItemDescriptor>,
}

impl NetworkState {
    pub fn new(descriptor: &'static NetworkDescriptor) -> Self {
        NetworkState {
            descriptor,
            enabled: false,
            sub_items: descriptor.sub_item_map(),
        }
    }

    pub fn id(&self) -> &'static str {
        self.descriptor.id
    }

    /// Sub-item used to build share URLs: the first configured one, by key
    pub fn active_sub_item(&self) -> Option<&SubItemDescriptor> {
        self.sub_items
            .values()
            .find(|item| item.is_configured())
            .or_else(|| self.sub_items.values().next())
    }

    /// Whether the network can share right now; gated networks need an instance
    pub fn is_usable(&self) -> bool {
        if self.descriptor.is_gated() {
            self.sub_items.values().any(SubItemDescriptor::is_configured)
        } else {
            true
        }
    }

    /// Effective menu enablement
    pub fn menu_enabled(&self) -> bool {
        self.enabled && self.is_usable()
    }
}

/// What a stored record changed
#[derive(Debug, Clone, PartialEq)]
pub enum PrefUpdate {
    UserOption,
    Enabled { network: &'static str, enabled: bool },
    Instance { network: &'static str, key: String },
    Ignored,
}

#[derive(Debug, Clone)]
pub struct AppState {
    networks: Vec<NetworkState>,
    pub options: UserOptions,
    context: Option<ContextDescriptor>,
    external_exts: BTreeSet<String>,
    seeded: bool,
}

impl AppState {
    pub fn new() -> Self {
        AppState {
            networks: sns::registry().iter().map(NetworkState::new).collect(),
            options: UserOptions::default(),
            context: None,
            external_exts: BTreeSet::new(),
            seeded: false,
        }
    }

    pub fn networks(&self) -> &[NetworkState] {
        &self.networks
    }

    pub fn network(&self, id: &str) -> Option<&NetworkState> {
        self.networks.iter().find(|n| n.id() == id)
    }

    fn network_mut(&mut self, id: &str) -> Option<&mut NetworkState> {
        self.networks.iter_mut().find(|n| n.id() == id)
    }

    /// Apply one stored record under `key`
    pub fn apply_pref(&mut self, key: &str, pref: &StoredPref) -> PrefUpdate {
        if key == PREFER_CANONICAL {
            self.options.prefer_canonical = pref.checked;
            return PrefUpdate::UserOption;
        }

        let owner = pref
            .sub_item_of
            .clone()
            .or_else(|| {
                self.networks
                    .iter()
                    .find(|n| n.sub_items.contains_key(key))
                    .map(|n| n.id().to_string())
            });

        if let Some(owner) = owner {
            let Some(network) = self.network_mut(&owner) else {
                return PrefUpdate::Ignored;
            };
            let Some(item) = network.sub_items.get_mut(key) else {
                return PrefUpdate::Ignored;
            };
            let value = pref.value.trim();
            item.instance_value = if value.is_empty() { None } else { Some(value.to_string()) };
            return PrefUpdate::Instance {
                network: network.id(),
                key: key.to_string(),
            };
        }

        match self.network_mut(key) {
            Some(network) => {
                network.enabled = pref.checked;
                PrefUpdate::Enabled {
                    network: network.id(),
                    enabled: pref.checked,
                }
            }
            None => PrefUpdate::Ignored,
        }
    }

    /// Whether a full storage read has been applied
    pub fn is_seeded(&self) -> bool {
        self.seeded
    }

    pub fn mark_seeded(&mut self) {
        self.seeded = true;
    }

    pub fn set_context(&mut self, context: ContextDescriptor) {
        self.context = Some(context);
    }

    /// Hand the cached context to one consumer
    pub fn take_context(&mut self) -> Option<ContextDescriptor> {
        self.context.take()
    }

    pub fn register_external(&mut self, ext_id: &str) -> bool {
        self.external_exts.insert(ext_id.to_string())
    }

    pub fn is_registered(&self, ext_id: &str) -> bool {
        self.external_exts.contains(ext_id)
    }

    pub fn external_exts(&self) -> impl Iterator<Item = &str> {
        self.external_exts.iter().map(String::as_str)
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
