// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `refresh.rs`

#[cfg(test)]
mod tests {
    use crate::errors::ProviderError;
    use crate::provider::memory::InMemoryProvider;
    use crate::provider::RecordSet;
    use crate::refresh::*;
    use crate::zone_cache::{CacheKey, ZoneCache, ZoneSnapshot};
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

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

    fn target(key: &CacheKey, provider: Arc<InMemoryProvider>) -> RefreshTarget {
        RefreshTarget {
            key: key.clone(),
            zone_id: ZONE.to_string(),
            provider,
        }
    }

    /// Source whose plan can be swapped between ticks.
    #[derive(Default)]
    struct ScriptedSource {
        targets: Mutex<Vec<RefreshTarget>>,
        unavailable: Mutex<Vec<(CacheKey, ProviderError)>>,
        fail: Mutex<bool>,
    }

    #[async_trait]
    impl RefreshSource for ScriptedSource {
        async fn plan(&self) -> anyhow::Result<RefreshPlan> {
            if *self.fail.lock().unwrap() {
                anyhow::bail!("provider list unavailable");
            }
            Ok(RefreshPlan {
                targets: self.targets.lock().unwrap().clone(),
                unavailable: self.unavailable.lock().unwrap().clone(),
            })
        }
    }

    #[tokio::test]
    async fn test_tick_populates_cache_across_pages() {
        let provider = Arc::new(InMemoryProvider::new().with_page_size(2).with_zone(
            ZONE,
            vec![
                record("a.example.com."),
                record("b.example.com."),
                record("c.example.com."),
            ],
        ));
        let key = CacheKey::new("dns", "example-com");
        let cache = Arc::new(ZoneCache::new());
        let refresher = ZoneCacheRefresher::new(
            cache.clone(),
            Arc::new(StaticRefreshSource::new(vec![target(&key, provider.clone())])),
            Duration::from_secs(300),
        );

        let report = refresher.tick().await;

        assert_eq!(
            report,
            RefreshReport {
                refreshed: 1,
                failed: 0,
                pruned: 0
            }
        );
        let snapshot = cache.snapshot(&key).await.expect("snapshot");
        assert_eq!(snapshot.zone_id, ZONE);
        assert_eq!(snapshot.record_sets.len(), 3);
        assert_eq!(provider.list_calls(), 2);
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_previous_snapshot() {
        let provider = Arc::new(
            InMemoryProvider::new().with_zone(ZONE, vec![record("a.example.com.")]),
        );
        let key = CacheKey::new("dns", "example-com");
        let cache = Arc::new(ZoneCache::new());
        let refresher = ZoneCacheRefresher::new(
            cache.clone(),
            Arc::new(StaticRefreshSource::new(vec![target(&key, provider.clone())])),
            Duration::from_secs(300),
        );

        refresher.tick().await;
        let before = cache.snapshot(&key).await.expect("snapshot");

        provider.fail_list("throttled").await;
        let report = refresher.tick().await;

        assert_eq!(report.failed, 1);
        assert_eq!(report.refreshed, 0);
        let after = cache.snapshot(&key).await.expect("snapshot retained");
        assert_eq!(after, before);
    }

    #[tokio::test]
    async fn test_removed_provider_is_pruned_but_unavailable_is_kept() {
        let provider = Arc::new(InMemoryProvider::new().with_zone(ZONE, vec![]));
        let kept = CacheKey::new("dns", "kept");
        let broken = CacheKey::new("dns", "broken");
        let removed = CacheKey::new("dns", "removed");

        let cache = Arc::new(ZoneCache::new());
        cache
            .replace(broken.clone(), ZoneSnapshot::new(ZONE, vec![record("x.example.com.")]))
            .await;
        cache.replace(removed.clone(), ZoneSnapshot::new(ZONE, vec![])).await;

        let source = Arc::new(ScriptedSource::default());
        source
            .targets
            .lock()
            .unwrap()
            .push(target(&kept, provider));
        source.unavailable.lock().unwrap().push((
            broken.clone(),
            ProviderError::CredentialResolution {
                reason: "missing access key id".to_string(),
            },
        ));

        let refresher = ZoneCacheRefresher::new(cache.clone(), source, Duration::from_secs(300));
        let report = refresher.tick().await;

        assert_eq!(
            report,
            RefreshReport {
                refreshed: 1,
                failed: 1,
                pruned: 1
            }
        );
        assert_eq!(cache.keys().await, vec![broken, kept]);
    }

    #[tokio::test]
    async fn test_enumeration_failure_leaves_cache_untouched() {
        let key = CacheKey::new("dns", "example-com");
        let cache = Arc::new(ZoneCache::new());
        cache.replace(key.clone(), ZoneSnapshot::new(ZONE, vec![])).await;

        let source = Arc::new(ScriptedSource::default());
        *source.fail.lock().unwrap() = true;

        let refresher = ZoneCacheRefresher::new(cache.clone(), source, Duration::from_secs(300));
        assert_eq!(refresher.tick().await, RefreshReport::default());
        assert!(cache.snapshot(&key).await.is_some());
    }

    #[tokio::test]
    async fn test_start_refreshes_eagerly_and_stops() {
        let provider = Arc::new(
            InMemoryProvider::new().with_zone(ZONE, vec![record("a.example.com.")]),
        );
        let key = CacheKey::new("dns", "example-com");
        let cache = Arc::new(ZoneCache::new());
        let handle = ZoneCacheRefresher::new(
            cache.clone(),
            Arc::new(StaticRefreshSource::new(vec![target(&key, provider)])),
            Duration::from_secs(3600),
        )
        .start();

        let populated = tokio::time::timeout(Duration::from_secs(5), async {
            while cache.snapshot(&key).await.is_none() {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await;
        assert!(populated.is_ok(), "eager refresh should populate the cache");

        tokio::time::timeout(Duration::from_secs(5), handle.stop())
            .await
            .expect("refresh loop should stop promptly");
    }

    #[tokio::test]
    async fn test_stop_aborts_slow_listing() {
        let provider = Arc::new(
            InMemoryProvider::new()
                .with_latency(Duration::from_secs(60))
                .with_zone(ZONE, vec![]),
        );
        let key = CacheKey::new("dns", "slow");
        let cache = Arc::new(ZoneCache::new());
        let handle = ZoneCacheRefresher::new(
            cache.clone(),
            Arc::new(StaticRefreshSource::new(vec![target(&key, provider)])),
            Duration::from_secs(3600),
        )
        .start();

        tokio::time::sleep(Duration::from_millis(50)).await;
        tokio::time::timeout(Duration::from_secs(5), handle.stop())
            .await
            .expect("cancellation should abort the in-flight listing");

        assert!(cache.snapshot(&key).await.is_none());
    }

    #[tokio::test]
    async fn test_cancelled_refresher_does_not_run() {
        let cache = Arc::new(ZoneCache::new());
        let refresher = ZoneCacheRefresher::new(
            cache,
            Arc::new(StaticRefreshSource::default()),
            Duration::from_secs(300),
        );
        refresher.cancellation_token().cancel();

        let handle = refresher.start();
        tokio::time::timeout(Duration::from_secs(5), handle.stop())
            .await
            .expect("already cancelled loop exits immediately");
    }
}
