// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Convergence driver.
//!
//! One convergence run takes a record intent and an owner group and makes the
//! zone match it:
//!
//! 1. build the desired endpoint from the intent
//! 2. resolve the actual endpoint of every owner, from the zone cache when a
//!    snapshot of the zone exists, otherwise with scoped provider listings
//! 3. diff
//! 4. submit all changes as a single batch, unless the intent is a dry run or
//!    there is nothing to change, and fold the batch into the cached snapshot
//!
//! The driver does not retry; the caller requeues.

use crate::crd::ResourceRecordSpec;
use crate::diff::diff;
use crate::endpoint::Endpoint;
use crate::errors::{ProviderError, ProviderOperation};
use crate::metrics;
use crate::provider::{with_cancel, Change, DnsProvider};
use crate::resolve::{resolve_from_provider, resolve_from_snapshot};
use crate::zone_cache::{CacheKey, ZoneCache};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Where the actual state of a run was read from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActualSource {
    Cache,
    ProviderListing,
}

/// Result of one convergence run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConvergeOutcome {
    /// Changes computed by the diff, in owner order.
    pub changes: Vec<Change>,
    /// Whether a change batch was submitted.
    pub applied: bool,
    pub dry_run: bool,
    pub source: ActualSource,
}

impl ConvergeOutcome {
    /// True when the zone already matched the intent.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.changes.is_empty()
    }

    /// Label of the `outcome` metric.
    #[must_use]
    pub fn metric_label(&self) -> &'static str {
        if self.changes.is_empty() {
            "noop"
        } else if self.dry_run {
            "dry_run"
        } else {
            "applied"
        }
    }
}

/// Converges record intents into the zone of one provider instance.
#[derive(Clone, Debug)]
pub struct Converger {
    provider: Arc<dyn DnsProvider>,
    cache: Arc<ZoneCache>,
    cache_key: CacheKey,
}

impl Converger {
    #[must_use]
    pub fn new(provider: Arc<dyn DnsProvider>, cache: Arc<ZoneCache>, cache_key: CacheKey) -> Self {
        Self {
            provider,
            cache,
            cache_key,
        }
    }

    /// Makes every owner in `owners` carry the record described by `spec`.
    ///
    /// # Errors
    ///
    /// Returns the provider error of the failed listing or change batch, which
    /// names `zone_id`, or [`ProviderError::Canceled`] if `cancel` fires.
    pub async fn converge(
        &self,
        zone_id: &str,
        zone_name: &str,
        owners: &[String],
        spec: &ResourceRecordSpec,
        cancel: &CancellationToken,
    ) -> Result<ConvergeOutcome, ProviderError> {
        let desired = Endpoint::desired(spec);
        let id = spec.id.as_deref();

        let snapshot = self
            .cache
            .snapshot(&self.cache_key)
            .await
            .filter(|snapshot| snapshot.zone_id == zone_id);

        let (actual, source) = match snapshot {
            Some(snapshot) => (
                resolve_from_snapshot(owners, zone_name, desired.class, id, &snapshot.record_sets),
                ActualSource::Cache,
            ),
            None => {
                debug!(
                    key = %self.cache_key,
                    zone_id,
                    "No zone snapshot yet, listing record sets from provider"
                );
                let actual = resolve_from_provider(
                    self.provider.as_ref(),
                    zone_id,
                    owners,
                    zone_name,
                    desired.class,
                    id,
                    cancel,
                )
                .await?;
                (actual, ActualSource::ProviderListing)
            }
        };

        let changes = diff(owners, zone_name, &desired, &actual);
        let mut outcome = ConvergeOutcome {
            changes,
            applied: false,
            dry_run: spec.dry_run,
            source,
        };

        if outcome.changes.is_empty() {
            debug!(zone_id, owners = owners.len(), "Zone already converged");
            return Ok(outcome);
        }

        if spec.dry_run {
            for change in &outcome.changes {
                info!(
                    zone_id,
                    action = change.action.as_str(),
                    name = %change.record_set.name,
                    record_type = %change.record_set.record_type,
                    "Dry run, change not submitted"
                );
            }
            return Ok(outcome);
        }

        with_cancel(
            cancel,
            zone_id,
            ProviderOperation::ChangeRecordSets,
            self.provider.apply_change_batch(zone_id, &outcome.changes),
        )
        .await?;

        for change in &outcome.changes {
            metrics::record_change_submitted(change.action.as_str());
        }
        self.cache
            .apply_changes(&self.cache_key, zone_id, &outcome.changes)
            .await;
        info!(
            zone_id,
            provider = self.provider.name(),
            changes = outcome.changes.len(),
            "Submitted change batch"
        );

        outcome.applied = true;
        Ok(outcome)
    }
}

#[cfg(test)]
#[path = "converge_tests.rs"]
mod converge_tests;
