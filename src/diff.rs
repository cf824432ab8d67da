// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Diff of a desired endpoint against the actual endpoints of an owner group.
//!
//! For every owner, in input order:
//!
//! - no actual endpoint: `CREATE`
//! - actual endpoint differs from the desired one: `UPSERT`
//! - otherwise nothing
//!
//! Deletions are never produced. The function is pure: same inputs, same output.

use crate::endpoint::Endpoint;
use crate::provider::{AliasTarget, Change, ChangeAction, RecordSet};
use std::collections::HashMap;

/// Provider record set that represents `endpoint`.
///
/// Alias endpoints carry only the alias target; value endpoints carry the TTL
/// and a single value. Weighted endpoints additionally carry the set identifier
/// and weight.
#[must_use]
pub fn record_set_for(endpoint: &Endpoint) -> RecordSet {
    let mut record_set = RecordSet {
        name: endpoint.dns_name.clone(),
        record_type: endpoint.class.as_str().to_string(),
        ..RecordSet::default()
    };

    if endpoint.is_alias {
        record_set.alias_target = Some(AliasTarget {
            dns_name: endpoint.alias_target.dns_name.clone(),
            hosted_zone_id: endpoint.alias_target.hosted_zone_id.clone(),
            evaluate_target_health: endpoint.alias_target.evaluate_target_health,
        });
    } else {
        record_set.ttl = Some(endpoint.ttl);
        record_set.records = vec![endpoint.rdata.clone()];
    }

    if let Some(weight) = endpoint.weight {
        record_set.set_identifier = Some(endpoint.id.clone().unwrap_or_default());
        record_set.weight = Some(weight);
    }

    record_set
}

/// Changes needed so every owner in `owners` carries `desired`.
#[must_use]
pub fn diff(
    owners: &[String],
    zone_name: &str,
    desired: &Endpoint,
    actual: &HashMap<String, Endpoint>,
) -> Vec<Change> {
    owners
        .iter()
        .filter_map(|owner| {
            let mut wanted = desired.for_owner(owner, zone_name);
            let current = actual.get(owner);
            // An alias without a hosted zone id accepts the listed one.
            if let Some(current) = current.filter(|c| c.is_alias && wanted.is_alias) {
                if wanted.alias_target.hosted_zone_id.is_empty() {
                    wanted
                        .alias_target
                        .hosted_zone_id
                        .clone_from(&current.alias_target.hosted_zone_id);
                }
            }
            let action = match current {
                None => ChangeAction::Create,
                Some(current) if *current != wanted => ChangeAction::Upsert,
                Some(_) => return None,
            };
            Some(Change {
                action,
                record_set: record_set_for(&wanted),
            })
        })
        .collect()
}

#[cfg(test)]
#[path = "diff_tests.rs"]
mod diff_tests;
