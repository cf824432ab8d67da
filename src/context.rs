// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Shared context passed to all controllers.

use crate::config::Config;
use crate::zone_cache::ZoneCache;
use kube::Client;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Shared context passed to all controllers.
///
/// Everything a reconciler needs is injected here; there is no process-global state.
#[derive(Clone)]
pub struct Context {
    /// Kubernetes client for API operations
    pub client: Client,

    /// Zone snapshots, written by the refresh task and read by convergence runs
    pub zone_cache: Arc<ZoneCache>,

    pub config: Config,

    /// Fires on process shutdown and aborts in-flight provider calls
    pub shutdown: CancellationToken,
}

impl Context {
    #[must_use]
    pub fn new(
        client: Client,
        zone_cache: Arc<ZoneCache>,
        config: Config,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            client,
            zone_cache,
            config,
            shutdown,
        }
    }
}
