// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Resolution of the actual endpoint per owner name.
//!
//! Record sets are matched on exact FQDN and record type. Provider listings
//! keep all record sets of one name together, so scanning stops at the first
//! entry past the FQDN group. With a set identifier, only the record set
//! carrying that identifier is selected; otherwise the first match wins. Only
//! the first value of a record set is read.

use crate::crd::RecordClass;
use crate::endpoint::{absolute_name, build_fqdn, AliasOpts, Endpoint};
use crate::errors::ProviderOperation;
use crate::errors::ProviderError;
use crate::provider::{with_cancel, DnsProvider, ListCursor, RecordSet};
use std::collections::HashMap;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Builds the endpoint an actual record set represents.
#[must_use]
pub fn endpoint_from_record_set(owner: &str, class: RecordClass, record_set: &RecordSet) -> Endpoint {
    let mut endpoint = Endpoint {
        dns_name: record_set.name.clone(),
        class,
        id: record_set.set_identifier.clone().filter(|id| !id.is_empty()),
        resource_owner: owner.to_string(),
        weight: record_set.weight,
        ..Endpoint::default()
    };

    if let Some(target) = &record_set.alias_target {
        endpoint.is_alias = true;
        endpoint.alias_target = AliasOpts {
            dns_name: absolute_name(&target.dns_name),
            hosted_zone_id: target.hosted_zone_id.clone(),
            evaluate_target_health: target.evaluate_target_health,
        };
    } else {
        endpoint.rdata = record_set.records.first().cloned().unwrap_or_default();
        endpoint.ttl = record_set.ttl.unwrap_or_default();
    }

    endpoint
}

/// First record set of the `fqdn` group matching `class` and, when given, `id`.
fn select<'a, I>(record_sets: I, fqdn: &str, class: RecordClass, id: Option<&str>) -> Option<&'a RecordSet>
where
    I: IntoIterator<Item = &'a RecordSet>,
{
    record_sets
        .into_iter()
        .skip_while(|rs| rs.name != fqdn)
        .take_while(|rs| rs.name == fqdn)
        .filter(|rs| rs.record_type == class.as_str())
        .find(|rs| id.is_none_or(|id| rs.set_identifier.as_deref() == Some(id)))
}

/// Resolves actual endpoints from a full zone snapshot.
///
/// Owners without a matching record set are absent from the result.
#[must_use]
pub fn resolve_from_snapshot(
    owners: &[String],
    zone_name: &str,
    class: RecordClass,
    id: Option<&str>,
    record_sets: &[RecordSet],
) -> HashMap<String, Endpoint> {
    owners
        .iter()
        .filter_map(|owner| {
            let fqdn = build_fqdn(owner, zone_name);
            select(record_sets, &fqdn, class, id)
                .map(|rs| (owner.clone(), endpoint_from_record_set(owner, class, rs)))
        })
        .collect()
}

/// Resolves actual endpoints with one scoped listing per owner, starting at the owner's FQDN.
///
/// Further pages are only requested while the listing is still inside the FQDN group.
///
/// # Errors
///
/// Returns the first provider error.
pub async fn resolve_from_provider(
    provider: &dyn DnsProvider,
    zone_id: &str,
    owners: &[String],
    zone_name: &str,
    class: RecordClass,
    id: Option<&str>,
    cancel: &CancellationToken,
) -> Result<HashMap<String, Endpoint>, ProviderError> {
    let mut actual = HashMap::new();

    for owner in owners {
        let fqdn = build_fqdn(owner, zone_name);
        let group = list_name_group(provider, zone_id, &fqdn, cancel).await?;

        debug!(
            zone_id,
            fqdn = %fqdn,
            record_sets = group.len(),
            "Fetched scoped record set listing"
        );

        if let Some(rs) = select(&group, &fqdn, class, id) {
            actual.insert(owner.clone(), endpoint_from_record_set(owner, class, rs));
        }
    }

    Ok(actual)
}

/// Record sets named `fqdn`, listed from the provider starting at that name.
async fn list_name_group(
    provider: &dyn DnsProvider,
    zone_id: &str,
    fqdn: &str,
    cancel: &CancellationToken,
) -> Result<Vec<RecordSet>, ProviderError> {
    let mut group = Vec::new();
    let mut cursor = ListCursor::at_name(fqdn);

    loop {
        let page = with_cancel(
            cancel,
            zone_id,
            ProviderOperation::ListRecordSets,
            provider.list_record_sets(zone_id, Some(&cursor)),
        )
        .await?;

        let page_len = page.record_sets.len();
        let before = group.len();
        group.extend(
            page.record_sets
                .into_iter()
                .skip_while(|rs| rs.name != fqdn)
                .take_while(|rs| rs.name == fqdn),
        );

        // Every entry of the page belonged to the group, so it may continue on the next page.
        let group_continues = page_len > 0 && group.len() - before == page_len;
        match page.next {
            Some(next) if page.truncated && group_continues => cursor = next,
            _ => break,
        }
    }

    Ok(group)
}

#[cfg(test)]
#[path = "resolve_tests.rs"]
mod resolve_tests;
