/// Opening the share URL in a tab
use crate::error::ShareError;
use crate::host::{CreateTabProperties, Tab, TabQuery, TabsApi, UpdateTabProperties};

/// Open `url` next to `source`, or reuse a tab matching `match_pattern`
pub async fn dispatch<T: TabsApi + ?Sized>(
    tabs: &T,
    url: &str,
    match_pattern: Option<&str>,
    source: &Tab,
) -> Result<Tab, ShareError> {
    if let Some(pattern) = match_pattern {
        let query = TabQuery {
            cookie_store_id: source.cookie_store_id.clone(),
            current_window: true,
            url: pattern.to_string(),
        };
        let found = tabs.query_tabs(&query).await?;
        if let Some(target_id) = found.first().and_then(Tab::valid_id) {
            log::debug!("Reusing tab {} for {}", target_id, url);
            let props = UpdateTabProperties {
                url: url.to_string(),
                active: true,
            };
            return tabs.update_tab(target_id, &props).await;
        }
    }

    let props = CreateTabProperties {
        url: url.to_string(),
        active: true,
        index: source.index.map(|i| i + 1),
        window_id: source.window_id,
        cookie_store_id: source.cookie_store_id.clone(),
        opener_tab_id: source.valid_id(),
    };
    tabs.create_tab(&props).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{HostCall, MockHost};
    use futures::executor::block_on;

    fn source_tab() -> Tab {
        Tab {
            id: Some(5),
            index: Some(2),
            window_id: Some(1),
            url: Some("https://example.com/".to_string()),
            title: Some("Example".to_string()),
            cookie_store_id: Some("firefox-default".to_string()),
            active: true,
        }
    }

    #[test]
    fn test_creates_adjacent_tab() {
        let host = MockHost::new();
        let tab = block_on(dispatch(&host, "https://share.example/", None, &source_tab())).unwrap();

        assert_eq!(tab.url.as_deref(), Some("https://share.example/"));
        assert_eq!(
            host.calls(),
            vec![HostCall::CreateTab(CreateTabProperties {
                url: "https://share.example/".to_string(),
                active: true,
                index: Some(3),
                window_id: Some(1),
                cookie_store_id: Some("firefox-default".to_string()),
                opener_tab_id: Some(5),
            })]
        );
    }

    #[test]
    fn test_reuses_matching_tab() {
        let host = MockHost::new();
        host.add_tab(Tab {
            id: Some(9),
            url: Some("https://twitter.com/home".to_string()),
            ..Default::default()
        });

        let tab = block_on(dispatch(
            &host,
            "https://twitter.com/share?text=a",
            Some("*://twitter.com/*"),
            &source_tab(),
        ))
        .unwrap();

        assert_eq!(tab.id, Some(9));
        let calls = host.calls();
        assert!(matches!(calls[0], HostCall::QueryTabs(_)));
        assert_eq!(
            calls[1],
            HostCall::UpdateTab(
                9,
                UpdateTabProperties {
                    url: "https://twitter.com/share?text=a".to_string(),
                    active: true,
                }
            )
        );
        assert_eq!(host.count(|c| matches!(c, HostCall::CreateTab(_))), 0);
    }

    #[test]
    fn test_pattern_without_match_creates_one_tab() {
        let host = MockHost::new();
        host.add_tab(Tab {
            id: Some(9),
            url: Some("https://example.org/".to_string()),
            ..Default::default()
        });

        block_on(dispatch(&host, "https://twitter.com/share", Some("*://twitter.com/*"), &source_tab())).unwrap();

        assert_eq!(host.count(|c| matches!(c, HostCall::CreateTab(_))), 1);
        assert_eq!(host.count(|c| matches!(c, HostCall::UpdateTab(..))), 0);
    }

    #[test]
    fn test_create_failure_propagates() {
        let host = MockHost::new();
        host.fail_api("tabs.create");
        let err = block_on(dispatch(&host, "https://a.com", None, &source_tab())).unwrap_err();
        assert!(matches!(err, ShareError::Host { api: "tabs.create", .. }));
    }
}
