// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for the provider capability helpers

#[cfg(test)]
mod tests {
    use crate::errors::{ProviderError, ProviderOperation};
    use crate::provider::memory::InMemoryProvider;
    use crate::provider::*;
    use serde_json::json;
    use std::time::Duration;
    use tokio_util::sync::CancellationToken;

    const ZONE: &str = "Z123";

    fn record(name: &str) -> RecordSet {
        RecordSet {
            name: name.to_string(),
            record_type: "A".to_string(),
            ttl: Some(60),
            records: vec!["192.0.2.1".to_string()],
            ..RecordSet::default()
        }
    }

    #[tokio::test]
    async fn test_list_all_follows_cursor_across_pages() {
        let names: Vec<String> = (0..7).map(|i| format!("host{i}.example.com.")).collect();
        let provider = InMemoryProvider::new()
            .with_page_size(3)
            .with_zone(ZONE, names.iter().map(|n| record(n)).collect());

        let all = list_all_record_sets(&provider, ZONE, &CancellationToken::new())
            .await
            .expect("listing");

        assert_eq!(all.len(), 7);
        assert_eq!(provider.list_calls(), 3);
        let listed: Vec<&str> = all.iter().map(|rs| rs.name.as_str()).collect();
        assert_eq!(listed, names.iter().map(String::as_str).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn test_list_all_propagates_provider_error() {
        let provider = InMemoryProvider::new().with_zone(ZONE, vec![record("a.example.com.")]);
        provider.fail_list("throttled").await;

        let err = list_all_record_sets(&provider, ZONE, &CancellationToken::new())
            .await
            .expect_err("listing must fail");
        assert!(matches!(
            err,
            ProviderError::ProviderCall {
                operation: ProviderOperation::ListRecordSets,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_with_cancel_aborts_pending_call() {
        let provider = InMemoryProvider::new()
            .with_latency(Duration::from_secs(30))
            .with_zone(ZONE, vec![]);
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = list_all_record_sets(&provider, ZONE, &cancel)
            .await
            .expect_err("cancelled");
        assert_eq!(
            err,
            ProviderError::Canceled {
                zone_id: ZONE.to_string(),
                operation: ProviderOperation::ListRecordSets,
            }
        );
    }

    #[tokio::test]
    async fn test_with_cancel_passes_result_through() {
        let cancel = CancellationToken::new();
        let value = with_cancel(&cancel, ZONE, ProviderOperation::ChangeRecordSets, async {
            Ok::<_, ProviderError>(42)
        })
        .await
        .expect("not cancelled");
        assert_eq!(value, 42);
    }

    #[test]
    fn test_change_wire_format() {
        let change = Change {
            action: ChangeAction::Upsert,
            record_set: RecordSet {
                set_identifier: Some("blue".to_string()),
                weight: Some(10),
                ..record("www.example.com.")
            },
        };

        assert_eq!(
            serde_json::to_value(&change).expect("serialize"),
            json!({
                "action": "UPSERT",
                "recordSet": {
                    "name": "www.example.com.",
                    "type": "A",
                    "ttl": 60,
                    "records": ["192.0.2.1"],
                    "setIdentifier": "blue",
                    "weight": 10
                }
            })
        );
        assert_eq!(ChangeAction::Create.as_str(), "CREATE");
    }

    #[test]
    fn test_alias_record_set_omits_value_fields() {
        let alias = RecordSet {
            name: "www.example.com.".to_string(),
            record_type: "A".to_string(),
            alias_target: Some(AliasTarget {
                dns_name: "lb.example.net.".to_string(),
                hosted_zone_id: "ZLB".to_string(),
                evaluate_target_health: false,
            }),
            ..RecordSet::default()
        };

        let value = serde_json::to_value(&alias).expect("serialize");
        assert!(value.get("ttl").is_none());
        assert!(value.get("records").is_none());
        assert_eq!(value["aliasTarget"]["hostedZoneId"], "ZLB");
    }
}
