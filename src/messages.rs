/// Messages exchanged between the background, content scripts, the popup
/// and other extensions
use serde::{Deserialize, Serialize};

use crate::context::ContextDescriptor;
use crate::host::Tab;
use crate::menu::MenuItem;

/// Tree Style Tab, which can host our tab menu entries in its sidebar
pub const TST_ID: &str = "treestyletab@piro.sakura.ne.jp";

/// The parts of `menus.OnClickData` a share needs
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClickInfo {
    pub menu_item_id: String,
    pub link_text: Option<String>,
    pub link_url: Option<String>,
    pub selection_text: Option<String>,
    pub canonical_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RuntimeMessage {
    #[serde(rename = "contextInfo")]
    ContextInfo {
        #[serde(rename = "contextInfo")]
        context_info: ContextDescriptor,
    },
    #[serde(rename = "getContextInfo")]
    GetContextInfo(bool),
    #[serde(rename = "shareSNS")]
    ShareSns { info: ClickInfo, tab: Tab },
}

impl RuntimeMessage {
    pub fn context_info(context_info: ContextDescriptor) -> Self {
        RuntimeMessage::ContextInfo { context_info }
    }
}

/// Tree Style Tab's cross-extension API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ExternalMessage {
    #[serde(rename = "register-self")]
    RegisterSelf {
        name: String,
        #[serde(rename = "listeningTypes")]
        listening_types: Vec<String>,
    },
    #[serde(rename = "fake-contextMenu-create")]
    FakeContextMenuCreate { params: MenuItem },
    #[serde(rename = "fake-contextMenu-removeAll")]
    FakeContextMenuRemoveAll,
    #[serde(rename = "fake-contextMenu-click")]
    FakeContextMenuClick { info: ClickInfo, tab: Tab },
    #[serde(rename = "ready")]
    Ready,
}

impl ExternalMessage {
    pub fn register_self(name: &str) -> Self {
        ExternalMessage::RegisterSelf {
            name: name.to_string(),
            listening_types: vec!["ready".to_string(), "fake-contextMenu-click".to_string()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::menu::MenuContext;
    use serde_json::json;

    #[test]
    fn test_get_context_info_shape() {
        let msg: RuntimeMessage = serde_json::from_value(json!({"getContextInfo": true})).unwrap();
        assert_eq!(msg, RuntimeMessage::GetContextInfo(true));
    }

    #[test]
    fn test_context_info_shape() {
        let msg = RuntimeMessage::context_info(ContextDescriptor {
            selection_text: "hi".to_string(),
            ..Default::default()
        });
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["contextInfo"]["contextInfo"]["selectionText"], "hi");
    }

    #[test]
    fn test_share_sns_shape() {
        let msg: RuntimeMessage = serde_json::from_value(json!({
            "shareSNS": {
                "info": {"menuItemId": "sharePageTwitter", "selectionText": "hi"},
                "tab": {"id": 1, "index": 0, "windowId": 1, "url": "https://a.com/", "title": "A"}
            }
        }))
        .unwrap();

        match msg {
            RuntimeMessage::ShareSns { info, tab } => {
                assert_eq!(info.menu_item_id, "sharePageTwitter");
                assert_eq!(info.selection_text.as_deref(), Some("hi"));
                assert_eq!(tab.id, Some(1));
            }
            other => panic!("unexpected message {:?}", other),
        }
    }

    #[test]
    fn test_unknown_message_is_rejected() {
        assert!(serde_json::from_value::<RuntimeMessage>(json!({"foo": 1})).is_err());
    }

    #[test]
    fn test_external_messages() {
        let json = serde_json::to_value(ExternalMessage::register_self("Share SNS")).unwrap();
        assert_eq!(
            json,
            json!({"type": "register-self", "name": "Share SNS", "listeningTypes": ["ready", "fake-contextMenu-click"]})
        );

        let json = serde_json::to_value(ExternalMessage::FakeContextMenuRemoveAll).unwrap();
        assert_eq!(json, json!({"type": "fake-contextMenu-removeAll"}));

        let json = serde_json::to_value(ExternalMessage::FakeContextMenuCreate {
            params: MenuItem {
                id: "shareTabTwitter".to_string(),
                title: "Share tab with &Twitter".to_string(),
                contexts: vec![MenuContext::Tab],
                enabled: true,
            },
        })
        .unwrap();
        assert_eq!(json["type"], "fake-contextMenu-create");
        assert_eq!(json["params"]["id"], "shareTabTwitter");

        let ready: ExternalMessage = serde_json::from_value(json!({"type": "ready"})).unwrap();
        assert_eq!(ready, ExternalMessage::Ready);
    }
}
