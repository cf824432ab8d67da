// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! In-memory snapshots of provider zones.
//!
//! The cache maps a provider instance (`namespace/name`) to the complete list of
//! record sets last fetched from its zone. Entries are replaced wholesale by the
//! refresh task and read by any number of concurrent convergence runs. Readers
//! clone the snapshot `Arc` and release the lock before doing any work, and the
//! writer only takes the lock to swap one entry.
//!
//! A convergence run that submitted a change batch folds it into the snapshot,
//! so the next run for the same zone sees its own writes before the next refresh.

use crate::provider::{Change, RecordSet};
use chrono::{DateTime, Utc};
use kube::ResourceExt;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Cache key of one provider instance: `"<namespace>/<name>"`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey(String);

impl CacheKey {
    #[must_use]
    pub fn new(namespace: &str, name: &str) -> Self {
        Self(format!("{namespace}/{name}"))
    }

    /// Key of a namespaced Kubernetes object.
    #[must_use]
    pub fn for_resource<K: ResourceExt>(resource: &K) -> Self {
        Self::new(&resource.namespace().unwrap_or_default(), &resource.name_any())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// All record sets of one zone at one point in time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ZoneSnapshot {
    pub zone_id: String,
    /// Record sets in provider listing order.
    pub record_sets: Vec<RecordSet>,
    pub fetched_at: DateTime<Utc>,
}

impl ZoneSnapshot {
    #[must_use]
    pub fn new(zone_id: impl Into<String>, record_sets: Vec<RecordSet>) -> Self {
        Self {
            zone_id: zone_id.into(),
            record_sets,
            fetched_at: Utc::now(),
        }
    }

    /// Copy of this snapshot with `changes` applied.
    ///
    /// A change replaces the record set with the same name, type and set
    /// identifier. A new record set is placed after the last one sharing its
    /// name, keeping name groups contiguous.
    #[must_use]
    pub fn with_changes(&self, changes: &[Change]) -> Self {
        let mut record_sets = self.record_sets.clone();
        for change in changes {
            let rs = &change.record_set;
            let same_set = record_sets.iter().position(|existing| {
                existing.name == rs.name
                    && existing.record_type == rs.record_type
                    && existing.set_identifier == rs.set_identifier
            });
            match same_set {
                Some(index) => record_sets[index] = rs.clone(),
                None => {
                    let at = record_sets
                        .iter()
                        .rposition(|existing| existing.name == rs.name)
                        .map_or(record_sets.len(), |last| last + 1);
                    record_sets.insert(at, rs.clone());
                }
            }
        }
        Self {
            zone_id: self.zone_id.clone(),
            record_sets,
            fetched_at: self.fetched_at,
        }
    }
}

/// Shared, read-mostly zone state keyed by provider instance.
#[derive(Debug, Default)]
pub struct ZoneCache {
    entries: RwLock<HashMap<CacheKey, Arc<ZoneSnapshot>>>,
}

impl ZoneCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Latest snapshot for `key`, if a refresh has completed for it.
    pub async fn snapshot(&self, key: &CacheKey) -> Option<Arc<ZoneSnapshot>> {
        self.entries.read().await.get(key).cloned()
    }

    /// Replaces the snapshot for `key`.
    pub async fn replace(&self, key: CacheKey, snapshot: ZoneSnapshot) {
        self.entries.write().await.insert(key, Arc::new(snapshot));
    }

    /// Folds a submitted change batch into the snapshot for `key`.
    ///
    /// Nothing happens unless a snapshot of `zone_id` is cached. Returns
    /// whether the snapshot was updated.
    pub async fn apply_changes(&self, key: &CacheKey, zone_id: &str, changes: &[Change]) -> bool {
        let mut entries = self.entries.write().await;
        let Some(current) = entries.get(key).filter(|s| s.zone_id == zone_id) else {
            return false;
        };
        let updated = Arc::new(current.with_changes(changes));
        entries.insert(key.clone(), updated);
        true
    }

    /// Drops the snapshot for `key`, returning whether one existed.
    pub async fn remove(&self, key: &CacheKey) -> bool {
        self.entries.write().await.remove(key).is_some()
    }

    /// Keys with a snapshot, sorted.
    pub async fn keys(&self) -> Vec<CacheKey> {
        let mut keys: Vec<CacheKey> = self.entries.read().await.keys().cloned().collect();
        keys.sort();
        keys
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[cfg(test)]
#[path = "zone_cache_tests.rs"]
mod zone_cache_tests;
