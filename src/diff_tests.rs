// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `diff.rs`

#[cfg(test)]
mod tests {
    use crate::crd::{AliasTargetSpec, RecordClass, ResourceRecordSpec};
    use crate::diff::*;
    use crate::endpoint::Endpoint;
    use crate::provider::{AliasTarget, ChangeAction, RecordSet};
    use crate::resolve::resolve_from_snapshot;
    use std::collections::HashMap;

    const ZONE_NAME: &str = "example.com";

    fn owners(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| (*n).to_string()).collect()
    }

    fn a_spec(rdata: &str, ttl: i32) -> ResourceRecordSpec {
        ResourceRecordSpec {
            class: RecordClass::A,
            ttl,
            rdata: rdata.to_string(),
            owner_ref: "web".to_string(),
            provider_ref: "example-com".to_string(),
            ..ResourceRecordSpec::default()
        }
    }

    fn actual_from(spec: &ResourceRecordSpec, owner: &str) -> Endpoint {
        Endpoint::desired(spec).for_owner(owner, ZONE_NAME)
    }

    #[test]
    fn test_absent_owner_creates() {
        let desired = Endpoint::desired(&a_spec("192.0.2.1", 300));

        let changes = diff(&owners(&["www"]), ZONE_NAME, &desired, &HashMap::new());

        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].action, ChangeAction::Create);
        assert_eq!(
            changes[0].record_set,
            RecordSet {
                name: "www.example.com.".to_string(),
                record_type: "A".to_string(),
                ttl: Some(300),
                records: vec!["192.0.2.1".to_string()],
                ..RecordSet::default()
            }
        );
    }

    #[test]
    fn test_equal_actual_produces_nothing() {
        let spec = a_spec("192.0.2.1", 300);
        let desired = Endpoint::desired(&spec);
        let actual = HashMap::from([("www".to_string(), actual_from(&spec, "www"))]);

        assert!(diff(&owners(&["www"]), ZONE_NAME, &desired, &actual).is_empty());
    }

    #[test]
    fn test_different_value_upserts() {
        let desired = Endpoint::desired(&a_spec("192.0.2.9", 300));
        let actual = HashMap::from([(
            "www".to_string(),
            actual_from(&a_spec("192.0.2.1", 300), "www"),
        )]);

        let changes = diff(&owners(&["www"]), ZONE_NAME, &desired, &actual);

        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].action, ChangeAction::Upsert);
        assert_eq!(changes[0].record_set.records, vec!["192.0.2.9"]);
    }

    #[test]
    fn test_different_class_upserts() {
        let desired = Endpoint::desired(&ResourceRecordSpec {
            class: RecordClass::TXT,
            ..a_spec("\"hello\"", 300)
        });
        let actual = HashMap::from([("www".to_string(), actual_from(&a_spec("\"hello\"", 300), "www"))]);

        let changes = diff(&owners(&["www"]), ZONE_NAME, &desired, &actual);
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].action, ChangeAction::Upsert);
        assert_eq!(changes[0].record_set.record_type, "TXT");
    }

    #[test]
    fn test_mixed_owners_preserve_order() {
        let spec = a_spec("192.0.2.1", 300);
        let desired = Endpoint::desired(&spec);
        let actual = HashMap::from([
            ("api".to_string(), actual_from(&spec, "api")),
            ("mail".to_string(), actual_from(&a_spec("192.0.2.7", 60), "mail")),
        ]);

        let changes = diff(
            &owners(&["www", "api", "mail", "ftp"]),
            ZONE_NAME,
            &desired,
            &actual,
        );

        let summary: Vec<(ChangeAction, &str)> = changes
            .iter()
            .map(|c| (c.action, c.record_set.name.as_str()))
            .collect();
        assert_eq!(
            summary,
            vec![
                (ChangeAction::Create, "www.example.com."),
                (ChangeAction::Upsert, "mail.example.com."),
                (ChangeAction::Create, "ftp.example.com."),
            ]
        );
    }

    #[test]
    fn test_diff_is_deterministic() {
        let desired = Endpoint::desired(&a_spec("192.0.2.1", 300));
        let actual = HashMap::from([(
            "api".to_string(),
            actual_from(&a_spec("192.0.2.2", 300), "api"),
        )]);
        let names = owners(&["www", "api"]);

        assert_eq!(
            diff(&names, ZONE_NAME, &desired, &actual),
            diff(&names, ZONE_NAME, &desired, &actual)
        );
    }

    #[test]
    fn test_empty_owner_group_produces_nothing() {
        let desired = Endpoint::desired(&a_spec("192.0.2.1", 300));
        assert!(diff(&[], ZONE_NAME, &desired, &HashMap::new()).is_empty());
    }

    #[test]
    fn test_alias_change_carries_alias_target_only() {
        let desired = Endpoint::desired(&ResourceRecordSpec {
            is_alias: true,
            alias_target: Some(AliasTargetSpec {
                record: "lb.example.net.".to_string(),
                evaluate_target_health: false,
                hosted_zone_id: "ZLB".to_string(),
            }),
            ..a_spec("", 300)
        });

        let changes = diff(&owners(&["www"]), ZONE_NAME, &desired, &HashMap::new());

        let rs = &changes[0].record_set;
        assert_eq!(rs.ttl, None);
        assert!(rs.records.is_empty());
        assert_eq!(
            rs.alias_target,
            Some(AliasTarget {
                dns_name: "lb.example.net.".to_string(),
                hosted_zone_id: "ZLB".to_string(),
                evaluate_target_health: false,
            })
        );
    }

    #[test]
    fn test_weighted_change_carries_identifier_and_weight() {
        let desired = Endpoint::desired(&ResourceRecordSpec {
            weight: Some(40),
            id: Some("blue".to_string()),
            ..a_spec("192.0.2.1", 60)
        });

        let changes = diff(&owners(&["www"]), ZONE_NAME, &desired, &HashMap::new());

        let rs = &changes[0].record_set;
        assert_eq!(rs.set_identifier.as_deref(), Some("blue"));
        assert_eq!(rs.weight, Some(40));
        assert_eq!(rs.ttl, Some(60));
    }

    #[test]
    fn test_undotted_alias_target_matches_listed_target() {
        let desired = Endpoint::desired(&ResourceRecordSpec {
            is_alias: true,
            alias_target: Some(AliasTargetSpec {
                record: "lb.example.net".to_string(),
                evaluate_target_health: false,
                hosted_zone_id: "ZLB".to_string(),
            }),
            ..a_spec("", 0)
        });
        let names = owners(&["www"]);
        let zone = vec![RecordSet {
            name: "www.example.com.".to_string(),
            record_type: "A".to_string(),
            alias_target: Some(AliasTarget {
                dns_name: "lb.example.net.".to_string(),
                hosted_zone_id: "ZLB".to_string(),
                evaluate_target_health: false,
            }),
            ..RecordSet::default()
        }];

        let actual = resolve_from_snapshot(&names, ZONE_NAME, RecordClass::A, None, &zone);

        assert!(diff(&names, ZONE_NAME, &desired, &actual).is_empty());
    }

    #[test]
    fn test_alias_without_hosted_zone_id_accepts_listed_zone() {
        let desired = Endpoint::desired(&ResourceRecordSpec {
            is_alias: true,
            alias_target: Some(AliasTargetSpec {
                record: "lb.example.net.".to_string(),
                evaluate_target_health: true,
                hosted_zone_id: String::new(),
            }),
            ..a_spec("", 0)
        });
        let names = owners(&["www", "api"]);
        let zone = vec![RecordSet {
            name: "www.example.com.".to_string(),
            record_type: "A".to_string(),
            alias_target: Some(AliasTarget {
                dns_name: "lb.example.net.".to_string(),
                hosted_zone_id: "ZLB".to_string(),
                evaluate_target_health: false,
            }),
            ..RecordSet::default()
        }];
        let actual = resolve_from_snapshot(&names, ZONE_NAME, RecordClass::A, None, &zone);

        let changes = diff(&names, ZONE_NAME, &desired, &actual);

        assert_eq!(changes.len(), 2);
        assert_eq!(changes[0].action, ChangeAction::Upsert);
        let target = changes[0].record_set.alias_target.as_ref().expect("alias");
        assert_eq!(target.hosted_zone_id, "ZLB");
        assert!(target.evaluate_target_health);
        assert_eq!(changes[1].action, ChangeAction::Create);
    }

    #[test]
    fn test_created_record_set_resolves_back_to_no_changes() {
        let desired = Endpoint::desired(&ResourceRecordSpec {
            weight: Some(10),
            id: Some("blue".to_string()),
            ..a_spec("192.0.2.1", 60)
        });
        let names = owners(&["www", "api"]);

        let zone: Vec<RecordSet> = diff(&names, ZONE_NAME, &desired, &HashMap::new())
            .into_iter()
            .map(|c| c.record_set)
            .collect();
        let actual = resolve_from_snapshot(&names, ZONE_NAME, RecordClass::A, Some("blue"), &zone);

        assert!(diff(&names, ZONE_NAME, &desired, &actual).is_empty());
    }

    #[test]
    fn test_created_alias_resolves_back_to_no_changes() {
        let desired = Endpoint::desired(&ResourceRecordSpec {
            is_alias: true,
            alias_target: Some(AliasTargetSpec {
                record: "lb.example.net.".to_string(),
                evaluate_target_health: true,
                hosted_zone_id: "ZLB".to_string(),
            }),
            ..a_spec("", 300)
        });
        let names = owners(&["www"]);

        let zone: Vec<RecordSet> = diff(&names, ZONE_NAME, &desired, &HashMap::new())
            .into_iter()
            .map(|c| c.record_set)
            .collect();
        let actual = resolve_from_snapshot(&names, ZONE_NAME, RecordClass::A, None, &zone);

        assert!(diff(&names, ZONE_NAME, &desired, &actual).is_empty());
    }
}
