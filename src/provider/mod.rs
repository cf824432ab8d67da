// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! DNS provider capability.
//!
//! The convergence engine only needs two things from a DNS service: a paginated
//! listing of the record sets of a zone, and an atomic change batch. Every
//! backend implements [`DnsProvider`]:
//!
//! - [`route53::Route53Provider`] - AWS Route 53
//! - [`http_api::HttpApiProvider`] - a JSON REST DNS API
//! - [`memory::InMemoryProvider`] - an in-process fake used by tests and dry environments

pub mod http_api;
pub mod memory;
pub mod route53;

use crate::errors::{ProviderError, ProviderOperation};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::future::Future;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Alias target of a provider record set.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AliasTarget {
    pub dns_name: String,
    pub hosted_zone_id: String,
    #[serde(default)]
    pub evaluate_target_health: bool,
}

/// A record set as stored by a provider.
///
/// `record_type` is kept as a string because listings also return types this
/// crate does not manage (SOA, PTR, ...).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordSet {
    pub name: String,
    #[serde(rename = "type")]
    pub record_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ttl: Option<i64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub records: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub set_identifier: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias_target: Option<AliasTarget>,
}

/// Mutation kind. Record deletion is not supported.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChangeAction {
    Create,
    Upsert,
}

impl ChangeAction {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "CREATE",
            Self::Upsert => "UPSERT",
        }
    }
}

/// One entry of a change batch.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Change {
    pub action: ChangeAction,
    pub record_set: RecordSet,
}

/// Position to resume a listing from.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ListCursor {
    pub name: String,
    pub record_type: Option<String>,
    pub identifier: Option<String>,
}

impl ListCursor {
    /// Cursor starting at the first record set named `name`.
    #[must_use]
    pub fn at_name(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// One page of a record set listing.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RecordSetPage {
    pub record_sets: Vec<RecordSet>,
    /// Cursor of the next page, present when `truncated` is true.
    pub next: Option<ListCursor>,
    pub truncated: bool,
}

/// Capability every DNS backend provides to the convergence engine.
#[async_trait]
pub trait DnsProvider: Send + Sync + Debug {
    /// Short backend name used in logs and metrics.
    fn name(&self) -> &str;

    /// List one page of record sets in provider order, starting at `start`.
    async fn list_record_sets(
        &self,
        zone_id: &str,
        start: Option<&ListCursor>,
    ) -> Result<RecordSetPage, ProviderError>;

    /// Apply all changes atomically: either every change succeeds or none does.
    async fn apply_change_batch(&self, zone_id: &str, changes: &[Change])
        -> Result<(), ProviderError>;
}

/// Runs a provider call, aborting it when `cancel` fires.
///
/// # Errors
///
/// Returns [`ProviderError::Canceled`] if the token is cancelled before `call` completes,
/// otherwise whatever `call` returns.
pub async fn with_cancel<T, F>(
    cancel: &CancellationToken,
    zone_id: &str,
    operation: ProviderOperation,
    call: F,
) -> Result<T, ProviderError>
where
    F: Future<Output = Result<T, ProviderError>>,
{
    tokio::select! {
        biased;
        () = cancel.cancelled() => Err(ProviderError::Canceled {
            zone_id: zone_id.to_string(),
            operation,
        }),
        result = call => result,
    }
}

/// List every record set of a zone, following the cursor while the listing is truncated.
///
/// # Errors
///
/// Returns the first provider error, or [`ProviderError::ProviderCall`] if a truncated
/// page carries no cursor.
pub async fn list_all_record_sets(
    provider: &dyn DnsProvider,
    zone_id: &str,
    cancel: &CancellationToken,
) -> Result<Vec<RecordSet>, ProviderError> {
    let mut all_record_sets = Vec::new();
    let mut cursor: Option<ListCursor> = None;
    let mut page_count = 0;

    loop {
        page_count += 1;
        let page = with_cancel(
            cancel,
            zone_id,
            ProviderOperation::ListRecordSets,
            provider.list_record_sets(zone_id, cursor.as_ref()),
        )
        .await?;

        let item_count = page.record_sets.len();
        all_record_sets.extend(page.record_sets);

        debug!(
            provider = provider.name(),
            zone_id,
            page = page_count,
            items_in_page = item_count,
            total_items = all_record_sets.len(),
            "Fetched record set page"
        );

        if !page.truncated {
            break;
        }
        match page.next {
            Some(next) => cursor = Some(next),
            None => {
                return Err(ProviderError::ProviderCall {
                    zone_id: zone_id.to_string(),
                    operation: ProviderOperation::ListRecordSets,
                    reason: "truncated listing without a next record cursor".to_string(),
                })
            }
        }
    }

    debug!(
        provider = provider.name(),
        zone_id,
        total_pages = page_count,
        total_items = all_record_sets.len(),
        "Completed record set listing"
    );

    Ok(all_record_sets)
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod mod_tests;
