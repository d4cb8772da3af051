/// Storage records for user preferences (storage.local)
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub const PREFER_CANONICAL: &str = "preferCanonicalUrl";
pub const AREA_LOCAL: &str = "local";

/// One preference record as written by the options page
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StoredPref {
    pub id: String,
    pub checked: bool,
    pub value: String,
    pub sub_item_of: Option<String>,
}

impl StoredPref {
    pub fn checkbox(id: &str, checked: bool) -> Self {
        StoredPref {
            id: id.to_string(),
            checked,
            ..Default::default()
        }
    }

    pub fn sub_item(id: &str, owner: &str, value: &str) -> Self {
        StoredPref {
            id: id.to_string(),
            value: value.to_string(),
            sub_item_of: Some(owner.to_string()),
            ..Default::default()
        }
    }
}

/// One entry of a storage.onChanged event
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StorageChange {
    pub old_value: Option<StoredPref>,
    pub new_value: Option<StoredPref>,
}

impl StorageChange {
    pub fn set(value: StoredPref) -> Self {
        StorageChange {
            old_value: None,
            new_value: Some(value),
        }
    }

    /// A removed key reads as an all-default record
    pub fn effective(&self) -> StoredPref {
        self.new_value.clone().unwrap_or_default()
    }
}

pub type StoredPrefs = BTreeMap<String, StoredPref>;
pub type StorageChanges = BTreeMap<String, StorageChange>;

/// Parse the result of storage.local.get(), skipping records of other shapes
pub fn parse_stored(value: serde_json::Value) -> StoredPrefs {
    let serde_json::Value::Object(map) = value else {
        return StoredPrefs::new();
    };
    map.into_iter()
        .filter_map(|(key, item)| match serde_json::from_value::<StoredPref>(item) {
            Ok(pref) => Some((key, pref)),
            Err(e) => {
                log::debug!("Skipping stored item {}: {}", key, e);
                None
            }
        })
        .collect()
}

/// Parse a storage.onChanged payload, skipping entries of other shapes
pub fn parse_changes(value: serde_json::Value) -> StorageChanges {
    let serde_json::Value::Object(map) = value else {
        return StorageChanges::new();
    };
    map.into_iter()
        .filter_map(|(key, item)| match serde_json::from_value::<StorageChange>(item) {
            Ok(change) => Some((key, change)),
            Err(e) => {
                log::debug!("Skipping changed item {}: {}", key, e);
                None
            }
        })
        .collect()
}

/// Treat a full storage read as a batch of changes
pub fn as_changes(prefs: StoredPrefs) -> StorageChanges {
    prefs
        .into_iter()
        .map(|(key, pref)| (key, StorageChange::set(pref)))
        .collect()
}

/// Options that are not tied to a network
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserOptions {
    pub prefer_canonical: bool,
}
