// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `endpoint.rs`

#[cfg(test)]
mod tests {
    use crate::crd::{AliasTargetSpec, RecordClass, ResourceRecordSpec};
    use crate::endpoint::*;

    #[test]
    fn test_build_fqdn_appends_trailing_dot() {
        assert_eq!(build_fqdn("www", "example.com"), "www.example.com.");
    }

    #[test]
    fn test_build_fqdn_keeps_single_trailing_dot() {
        let fqdn = build_fqdn("www", "example.com.");
        assert_eq!(fqdn, "www.example.com.");
        assert!(!fqdn.ends_with(".."));
    }

    #[test]
    fn test_build_fqdn_nested_owner() {
        assert_eq!(build_fqdn("a.b", "example.com"), "a.b.example.com.");
    }

    #[test]
    fn test_desired_value_endpoint() {
        let spec = ResourceRecordSpec {
            class: RecordClass::TXT,
            ttl: 300,
            rdata: "\"v=spf1 -all\"".to_string(),
            ..ResourceRecordSpec::default()
        };

        let endpoint = Endpoint::desired(&spec);
        assert_eq!(endpoint.class, RecordClass::TXT);
        assert_eq!(endpoint.ttl, 300);
        assert_eq!(endpoint.rdata, "\"v=spf1 -all\"");
        assert!(!endpoint.is_alias);
        assert_eq!(endpoint.alias_target, AliasOpts::default());
        assert!(endpoint.dns_name.is_empty());
    }

    #[test]
    fn test_desired_alias_endpoint_drops_value_fields() {
        let spec = ResourceRecordSpec {
            class: RecordClass::A,
            ttl: 300,
            rdata: "192.0.2.1".to_string(),
            is_alias: true,
            alias_target: Some(AliasTargetSpec {
                record: "lb.example.net.".to_string(),
                evaluate_target_health: true,
                hosted_zone_id: "ZLB".to_string(),
            }),
            ..ResourceRecordSpec::default()
        };

        let endpoint = Endpoint::desired(&spec);
        assert!(endpoint.is_alias);
        assert_eq!(endpoint.ttl, 0);
        assert!(endpoint.rdata.is_empty());
        assert_eq!(endpoint.alias_target.dns_name, "lb.example.net.");
        assert_eq!(endpoint.alias_target.hosted_zone_id, "ZLB");
        assert!(endpoint.alias_target.evaluate_target_health);
    }

    #[test]
    fn test_desired_alias_target_gets_trailing_dot() {
        let spec = ResourceRecordSpec {
            is_alias: true,
            alias_target: Some(AliasTargetSpec {
                record: "lb.example.net".to_string(),
                evaluate_target_health: false,
                hosted_zone_id: "ZLB".to_string(),
            }),
            ..ResourceRecordSpec::default()
        };

        let endpoint = Endpoint::desired(&spec);
        assert_eq!(endpoint.alias_target.dns_name, "lb.example.net.");
    }

    #[test]
    fn test_desired_keeps_weight_and_id() {
        let spec = ResourceRecordSpec {
            weight: Some(20),
            id: Some("green".to_string()),
            ..ResourceRecordSpec::default()
        };

        let endpoint = Endpoint::desired(&spec);
        assert_eq!(endpoint.weight, Some(20));
        assert_eq!(endpoint.id.as_deref(), Some("green"));
    }

    #[test]
    fn test_for_owner_stamps_name_and_owner() {
        let template = Endpoint {
            class: RecordClass::A,
            rdata: "192.0.2.1".to_string(),
            ttl: 60,
            ..Endpoint::default()
        };

        let endpoint = template.for_owner("api", "example.com");
        assert_eq!(endpoint.dns_name, "api.example.com.");
        assert_eq!(endpoint.resource_owner, "api");
        assert_eq!(endpoint.rdata, template.rdata);
        assert!(template.dns_name.is_empty());
    }

    #[test]
    fn test_equality_covers_every_field() {
        let base = Endpoint {
            dns_name: "www.example.com.".to_string(),
            class: RecordClass::A,
            rdata: "192.0.2.1".to_string(),
            ttl: 60,
            resource_owner: "www".to_string(),
            ..Endpoint::default()
        };

        assert_eq!(base, base.clone());
        assert_ne!(
            base,
            Endpoint {
                ttl: 61,
                ..base.clone()
            }
        );
        assert_ne!(
            base,
            Endpoint {
                weight: Some(1),
                ..base.clone()
            }
        );
    }
}
