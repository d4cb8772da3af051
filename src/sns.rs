/// Registry of the networks a page can be shared with
use std::collections::BTreeMap;

use url::Url;

pub const TWITTER: &str = "Twitter";
pub const FACEBOOK: &str = "Facebook";
pub const LINE: &str = "LINE";
pub const HATENA: &str = "Hatena";
pub const MASTODON: &str = "Mastodon";
pub const PLEROMA: &str = "Pleroma";

pub const MASTODON_INSTANCE_URL: &str = "mastodonInstanceUrl";
pub const PLEROMA_INSTANCE_URL: &str = "pleromaInstanceUrl";

/// Static description of a share destination
#[derive(Debug, Clone, PartialEq)]
pub struct NetworkDescriptor {
    pub id: &'static str,
    pub menu_label: &'static str,
    pub url_template: Option<&'static str>,
    /// Tab URL pattern of a compose page that should be reused instead of
    /// opening a new tab
    pub match_pattern: Option<&'static str>,
    pub sub_items: &'static [(&'static str, &'static str)],
}

/// Per-instance template of a federated network
#[derive(Debug, Clone, PartialEq)]
pub struct SubItemDescriptor {
    pub url_template: String,
    pub instance_value: Option<String>,
}

impl SubItemDescriptor {
    pub fn new(url_template: &str) -> Self {
        SubItemDescriptor {
            url_template: url_template.to_string(),
            instance_value: None,
        }
    }

    /// The configured instance, if it parses as an http(s) URL
    pub fn instance_url(&self) -> Option<Url> {
        let value = self.instance_value.as_deref()?.trim();
        if value.is_empty() {
            return None;
        }
        Url::parse(value)
            .ok()
            .filter(|url| matches!(url.scheme(), "http" | "https"))
    }

    pub fn is_configured(&self) -> bool {
        self.instance_url().is_some()
    }
}

static REGISTRY: [NetworkDescriptor; 6] = [
    NetworkDescriptor {
        id: TWITTER,
        menu_label: "&Twitter",
        url_template: Some("https://twitter.com/share?text=%text%&url=%url%"),
        match_pattern: Some("*://twitter.com/*"),
        sub_items: &[],
    },
    NetworkDescriptor {
        id: FACEBOOK,
        menu_label: "&Facebook",
        url_template: Some("https://www.facebook.com/sharer/sharer.php?u=%url%"),
        match_pattern: None,
        sub_items: &[],
    },
    NetworkDescriptor {
        id: LINE,
        menu_label: "&LINE",
        url_template: Some("https://line.me/R/msg/text/?%text%%20%url%"),
        match_pattern: None,
        sub_items: &[],
    },
    NetworkDescriptor {
        id: HATENA,
        menu_label: "&Hatena",
        url_template: Some("https://b.hatena.ne.jp/add?mode=confirm&url=%url%&title=%text%"),
        match_pattern: None,
        sub_items: &[],
    },
    NetworkDescriptor {
        id: MASTODON,
        menu_label: "&Mastodon",
        url_template: None,
        match_pattern: None,
        sub_items: &[(MASTODON_INSTANCE_URL, "%origin%/share?text=%text%&url=%url%")],
    },
    NetworkDescriptor {
        id: PLEROMA,
        menu_label: "&Pleroma",
        url_template: None,
        match_pattern: None,
        sub_items: &[(PLEROMA_INSTANCE_URL, "%origin%/share?message=%text%%20%url%")],
    },
];

/// All known networks, in menu order
pub fn registry() -> &'static [NetworkDescriptor] {
    &REGISTRY
}

pub fn find(id: &str) -> Option<&'static NetworkDescriptor> {
    REGISTRY.iter().find(|sns| sns.id == id)
}

impl NetworkDescriptor {
    /// Fresh sub-item records with no instance configured
    pub fn sub_item_map(&self) -> BTreeMap<String, SubItemDescriptor> {
        self.sub_items
            .iter()
            .map(|(key, tmpl)| (key.to_string(), SubItemDescriptor::new(tmpl)))
            .collect()
    }

    pub fn is_gated(&self) -> bool {
        !self.sub_items.is_empty()
    }
}
