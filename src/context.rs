/// What the user right-clicked, and what text/url a share should carry
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Collapse runs of whitespace into single spaces
pub fn collapse_whitespace(s: &str) -> String {
    WHITESPACE.replace_all(s, " ").into_owned()
}

/// Snapshot of the page context at the moment of a right-click or popup open
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContextDescriptor {
    pub is_link: bool,
    pub link_url: Option<String>,
    pub link_text: Option<String>,
    pub page_url: String,
    pub page_title: String,
    pub selection_text: String,
    pub canonical_url: Option<String>,
}

/// Which menu context triggered a share
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShareKind {
    Page,
    Tab,
    Link,
}

/// Text chosen for a share: selection first, then the link text or page title
pub fn share_text(kind: ShareKind, selection: Option<&str>, link_text: Option<&str>, title: Option<&str>) -> String {
    let selection = selection.map(collapse_whitespace).unwrap_or_default();
    if !selection.is_empty() {
        return selection;
    }
    let fallback = match kind {
        ShareKind::Link => link_text,
        ShareKind::Page | ShareKind::Tab => title,
    };
    fallback.unwrap_or_default().to_string()
}

/// Whether a page/tab share may use the canonical URL instead of the tab URL
pub fn may_use_canonical(prefer_canonical: bool, tab_url: &url::Url) -> bool {
    prefer_canonical && tab_url.fragment().map_or(true, |f| f.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("Hello \n\t World"), "Hello World");
        assert_eq!(collapse_whitespace("  a  "), " a ");
        assert_eq!(collapse_whitespace(""), "");
    }

    #[test]
    fn test_share_text_prefers_selection() {
        let text = share_text(ShareKind::Page, Some("Hello\n World"), None, Some("Title"));
        assert_eq!(text, "Hello World");
    }

    #[test]
    fn test_share_text_falls_back() {
        assert_eq!(share_text(ShareKind::Page, Some(""), Some("link"), Some("Title")), "Title");
        assert_eq!(share_text(ShareKind::Tab, None, Some("link"), Some("Title")), "Title");
        assert_eq!(share_text(ShareKind::Link, None, Some("link"), Some("Title")), "link");
        assert_eq!(share_text(ShareKind::Link, None, None, Some("Title")), "");
    }

    #[test]
    fn test_may_use_canonical() {
        let plain = url::Url::parse("https://example.com/page").unwrap();
        let with_hash = url::Url::parse("https://example.com/page#frag").unwrap();

        assert!(may_use_canonical(true, &plain));
        assert!(!may_use_canonical(false, &plain));
        assert!(!may_use_canonical(true, &with_hash));
    }

    #[test]
    fn test_descriptor_wire_format() {
        let info = ContextDescriptor {
            is_link: true,
            link_url: Some("https://example.com/".to_string()),
            link_text: Some("Example".to_string()),
            page_url: "https://a.com/".to_string(),
            page_title: "A".to_string(),
            selection_text: String::new(),
            canonical_url: None,
        };
        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json["isLink"], true);
        assert_eq!(json["linkUrl"], "https://example.com/");
        assert!(json["canonicalUrl"].is_null());

        let partial: ContextDescriptor = serde_json::from_str(r#"{"isLink":false}"#).unwrap();
        assert_eq!(partial, ContextDescriptor::default());
    }
}
