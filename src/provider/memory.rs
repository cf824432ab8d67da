// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! In-memory DNS provider.
//!
//! Zones are kept sorted by `(name, type, set identifier)`, listings are paginated
//! with the same cursor triple the cloud providers use, and change batches are
//! atomic. Failures and latency can be injected, and every call is counted so
//! tests can assert exactly what the engine asked for.

use super::{Change, ChangeAction, DnsProvider, ListCursor, RecordSet, RecordSetPage};
use crate::constants::DEFAULT_MEMORY_PAGE_SIZE;
use crate::errors::{ProviderError, ProviderOperation};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::debug;

#[derive(Debug, Default)]
struct State {
    zones: HashMap<String, Vec<RecordSet>>,
    applied: Vec<Vec<Change>>,
    list_failure: Option<String>,
    apply_failure: Option<String>,
}

/// DNS provider backed by process memory.
#[derive(Debug)]
pub struct InMemoryProvider {
    state: RwLock<State>,
    page_size: usize,
    latency: Option<Duration>,
    list_calls: AtomicUsize,
    apply_calls: AtomicUsize,
}

impl Default for InMemoryProvider {
    fn default() -> Self {
        Self::new()
    }
}

fn sort_key(record_set: &RecordSet) -> (&str, &str, &str) {
    (
        record_set.name.as_str(),
        record_set.record_type.as_str(),
        record_set.set_identifier.as_deref().unwrap_or_default(),
    )
}

fn cursor_key(cursor: &ListCursor) -> (&str, &str, &str) {
    (
        cursor.name.as_str(),
        cursor.record_type.as_deref().unwrap_or_default(),
        cursor.identifier.as_deref().unwrap_or_default(),
    )
}

fn call_error(zone_id: &str, operation: ProviderOperation, reason: impl Into<String>) -> ProviderError {
    ProviderError::ProviderCall {
        zone_id: zone_id.to_string(),
        operation,
        reason: reason.into(),
    }
}

impl InMemoryProvider {
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: RwLock::new(State::default()),
            page_size: DEFAULT_MEMORY_PAGE_SIZE,
            latency: None,
            list_calls: AtomicUsize::new(0),
            apply_calls: AtomicUsize::new(0),
        }
    }

    /// Number of record sets returned per listing page (at least 1).
    #[must_use]
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Delay applied before every call completes.
    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Registers a zone holding `record_sets`.
    #[must_use]
    pub fn with_zone(mut self, zone_id: &str, mut record_sets: Vec<RecordSet>) -> Self {
        record_sets.sort_by(|a, b| sort_key(a).cmp(&sort_key(b)));
        self.state
            .get_mut()
            .zones
            .insert(zone_id.to_string(), record_sets);
        self
    }

    /// Makes every subsequent listing fail with `reason`.
    pub async fn fail_list(&self, reason: &str) {
        self.state.write().await.list_failure = Some(reason.to_string());
    }

    /// Makes every subsequent change batch fail with `reason`.
    pub async fn fail_apply(&self, reason: &str) {
        self.state.write().await.apply_failure = Some(reason.to_string());
    }

    /// Removes injected failures.
    pub async fn clear_failures(&self) {
        let mut state = self.state.write().await;
        state.list_failure = None;
        state.apply_failure = None;
    }

    /// Current content of a zone, in listing order.
    pub async fn record_sets(&self, zone_id: &str) -> Vec<RecordSet> {
        self.state
            .read()
            .await
            .zones
            .get(zone_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Every batch that was applied successfully, oldest first.
    pub async fn applied_batches(&self) -> Vec<Vec<Change>> {
        self.state.read().await.applied.clone()
    }

    #[must_use]
    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    /// Number of change batch calls, including failed ones.
    #[must_use]
    pub fn apply_calls(&self) -> usize {
        self.apply_calls.load(Ordering::SeqCst)
    }

    async fn simulate_latency(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }
}

fn apply_changes(
    zone_id: &str,
    record_sets: &[RecordSet],
    changes: &[Change],
) -> Result<Vec<RecordSet>, ProviderError> {
    let mut updated = record_sets.to_vec();

    for change in changes {
        let key = sort_key(&change.record_set);
        let existing = updated.iter().position(|rs| sort_key(rs) == key);

        match (change.action, existing) {
            (ChangeAction::Create, Some(_)) => {
                return Err(call_error(
                    zone_id,
                    ProviderOperation::ChangeRecordSets,
                    format!(
                        "record set {} {} already exists",
                        change.record_set.name, change.record_set.record_type
                    ),
                ));
            }
            (ChangeAction::Create | ChangeAction::Upsert, None) => {
                updated.push(change.record_set.clone());
            }
            (ChangeAction::Upsert, Some(index)) => {
                updated[index] = change.record_set.clone();
            }
        }
    }

    updated.sort_by(|a, b| sort_key(a).cmp(&sort_key(b)));
    Ok(updated)
}

#[async_trait]
impl DnsProvider for InMemoryProvider {
    fn name(&self) -> &str {
        "memory"
    }

    async fn list_record_sets(
        &self,
        zone_id: &str,
        start: Option<&ListCursor>,
    ) -> Result<RecordSetPage, ProviderError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        self.simulate_latency().await;

        let state = self.state.read().await;
        if let Some(reason) = &state.list_failure {
            return Err(call_error(
                zone_id,
                ProviderOperation::ListRecordSets,
                reason.clone(),
            ));
        }
        let record_sets = state.zones.get(zone_id).ok_or_else(|| {
            call_error(zone_id, ProviderOperation::ListRecordSets, "no such hosted zone")
        })?;

        let offset = start.map_or(0, |cursor| {
            let from = cursor_key(cursor);
            record_sets.partition_point(|rs| sort_key(rs) < from)
        });
        let end = (offset + self.page_size).min(record_sets.len());
        let next = record_sets.get(end).map(|rs| ListCursor {
            name: rs.name.clone(),
            record_type: Some(rs.record_type.clone()),
            identifier: rs.set_identifier.clone(),
        });

        Ok(RecordSetPage {
            record_sets: record_sets[offset..end].to_vec(),
            truncated: next.is_some(),
            next,
        })
    }

    async fn apply_change_batch(
        &self,
        zone_id: &str,
        changes: &[Change],
    ) -> Result<(), ProviderError> {
        self.apply_calls.fetch_add(1, Ordering::SeqCst);
        self.simulate_latency().await;

        let mut state = self.state.write().await;
        if let Some(reason) = &state.apply_failure {
            return Err(call_error(
                zone_id,
                ProviderOperation::ChangeRecordSets,
                reason.clone(),
            ));
        }
        let current = state.zones.get(zone_id).ok_or_else(|| {
            call_error(zone_id, ProviderOperation::ChangeRecordSets, "no such hosted zone")
        })?;

        let updated = apply_changes(zone_id, current, changes)?;
        state.zones.insert(zone_id.to_string(), updated);
        state.applied.push(changes.to_vec());

        debug!(zone_id, changes = changes.len(), "Applied in-memory change batch");
        Ok(())
    }
}

#[cfg(test)]
#[path = "memory_tests.rs"]
mod memory_tests;
