// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Background refresh of the [`ZoneCache`].
//!
//! A [`ZoneCacheRefresher`] owns its schedule and cancellation token. Each
//! [`tick`](ZoneCacheRefresher::tick) asks a [`RefreshSource`] which provider
//! instances exist, pages through every zone and swaps the result into the
//! cache. Tests drive `tick()` directly; the operator calls
//! [`start`](ZoneCacheRefresher::start), which ticks once eagerly and then on a
//! fixed interval until [`RefreshHandle::stop`] is called.
//!
//! Refresh is fail-open: a zone that cannot be listed keeps its previous snapshot.

use crate::errors::{CacheRefreshError, ProviderError};
use crate::metrics;
use crate::provider::{list_all_record_sets, DnsProvider};
use crate::zone_cache::{CacheKey, ZoneCache, ZoneSnapshot};
use anyhow::Result;
use async_trait::async_trait;
use futures::future::join_all;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// One provider instance whose zone should be cached.
#[derive(Clone, Debug)]
pub struct RefreshTarget {
    pub key: CacheKey,
    pub zone_id: String,
    pub provider: Arc<dyn DnsProvider>,
}

/// Provider instances known at the start of a tick.
#[derive(Debug, Default)]
pub struct RefreshPlan {
    pub targets: Vec<RefreshTarget>,
    /// Instances that exist but could not be turned into a client.
    /// Their cache entries are kept.
    pub unavailable: Vec<(CacheKey, ProviderError)>,
}

/// Enumerates the provider instances to refresh.
#[async_trait]
pub trait RefreshSource: Send + Sync {
    /// # Errors
    ///
    /// Returns an error if the instances cannot be enumerated at all. The
    /// cache is left untouched for that tick.
    async fn plan(&self) -> Result<RefreshPlan>;
}

/// Fixed set of targets.
#[derive(Debug, Default)]
pub struct StaticRefreshSource {
    targets: Vec<RefreshTarget>,
}

impl StaticRefreshSource {
    #[must_use]
    pub fn new(targets: Vec<RefreshTarget>) -> Self {
        Self { targets }
    }
}

#[async_trait]
impl RefreshSource for StaticRefreshSource {
    async fn plan(&self) -> Result<RefreshPlan> {
        Ok(RefreshPlan {
            targets: self.targets.clone(),
            unavailable: Vec::new(),
        })
    }
}

/// Outcome of one refresh tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RefreshReport {
    pub refreshed: usize,
    pub failed: usize,
    pub pruned: usize,
}

/// Periodic task that keeps a [`ZoneCache`] populated.
pub struct ZoneCacheRefresher {
    cache: Arc<ZoneCache>,
    source: Arc<dyn RefreshSource>,
    interval: Duration,
    cancel: CancellationToken,
}

impl fmt::Debug for ZoneCacheRefresher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ZoneCacheRefresher")
            .field("interval", &self.interval)
            .field("cancelled", &self.cancel.is_cancelled())
            .finish_non_exhaustive()
    }
}

impl ZoneCacheRefresher {
    #[must_use]
    pub fn new(cache: Arc<ZoneCache>, source: Arc<dyn RefreshSource>, interval: Duration) -> Self {
        Self {
            cache,
            source,
            interval,
            cancel: CancellationToken::new(),
        }
    }

    /// Uses `cancel` instead of a private token, e.g. a child of the process shutdown token.
    #[must_use]
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    #[must_use]
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Refreshes every known zone once.
    pub async fn tick(&self) -> RefreshReport {
        let plan = match self.source.plan().await {
            Ok(plan) => plan,
            Err(e) => {
                error!(error = %e, "Failed to enumerate providers for zone cache refresh");
                metrics::record_cache_refresh("enumeration_error");
                return RefreshReport::default();
            }
        };

        let mut report = RefreshReport::default();
        let mut known: HashSet<CacheKey> = HashSet::new();

        for (key, source) in plan.unavailable {
            let err = CacheRefreshError {
                key: key.to_string(),
                source,
            };
            warn!(error = %err, "Keeping previous zone snapshot");
            metrics::record_cache_refresh("error");
            report.failed += 1;
            known.insert(key);
        }

        let fetches = plan.targets.iter().map(|target| async move {
            let result =
                list_all_record_sets(target.provider.as_ref(), &target.zone_id, &self.cancel)
                    .await;
            (target, result)
        });

        for (target, result) in join_all(fetches).await {
            known.insert(target.key.clone());
            match result {
                Ok(record_sets) => {
                    debug!(
                        key = %target.key,
                        zone_id = %target.zone_id,
                        record_sets = record_sets.len(),
                        "Refreshed zone snapshot"
                    );
                    metrics::record_cache_refresh("success");
                    metrics::set_cached_record_sets(target.key.as_str(), record_sets.len());
                    self.cache
                        .replace(
                            target.key.clone(),
                            ZoneSnapshot::new(target.zone_id.clone(), record_sets),
                        )
                        .await;
                    report.refreshed += 1;
                }
                Err(source) => {
                    let err = CacheRefreshError {
                        key: target.key.to_string(),
                        source,
                    };
                    error!(error = %err, "Keeping previous zone snapshot");
                    metrics::record_cache_refresh("error");
                    report.failed += 1;
                }
            }
        }

        for key in self.cache.keys().await {
            if !known.contains(&key) && self.cache.remove(&key).await {
                info!(key = %key, "Dropped zone snapshot of removed provider");
                metrics::remove_cached_record_sets(key.as_str());
                report.pruned += 1;
            }
        }

        report
    }

    /// Runs until the cancellation token fires: one eager tick, then one per interval.
    pub async fn run(self) {
        if self.cancel.is_cancelled() {
            return;
        }

        info!(
            interval_secs = self.interval.as_secs(),
            "Starting zone cache refresh loop"
        );
        let report = self.tick().await;
        info!(
            refreshed = report.refreshed,
            failed = report.failed,
            "Initial zone cache refresh completed"
        );

        let mut ticker = interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                () = self.cancel.cancelled() => break,
                _ = ticker.tick() => {
                    let report = self.tick().await;
                    debug!(
                        refreshed = report.refreshed,
                        failed = report.failed,
                        pruned = report.pruned,
                        "Zone cache refresh tick completed"
                    );
                }
            }
        }

        info!("Zone cache refresh loop stopped");
    }

    /// Spawns [`run`](Self::run) on the current runtime.
    #[must_use]
    pub fn start(self) -> RefreshHandle {
        let cancel = self.cancel.clone();
        let join = tokio::spawn(self.run());
        RefreshHandle { cancel, join }
    }
}

/// Handle of a running refresh loop.
#[derive(Debug)]
pub struct RefreshHandle {
    cancel: CancellationToken,
    join: JoinHandle<()>,
}

impl RefreshHandle {
    /// Cancels the loop, aborting in-flight listings, and waits for it to exit.
    pub async fn stop(self) {
        self.cancel.cancel();
        if let Err(e) = self.join.await {
            warn!(error = %e, "Zone cache refresh task ended abnormally");
        }
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }
}

#[cfg(test)]
#[path = "refresh_tests.rs"]
mod refresh_tests;
