// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Operator configuration from command line flags and environment variables.

use crate::constants::{
    DEFAULT_CACHE_REFRESH_INTERVAL_SECS, DEFAULT_METRICS_PORT, DEFAULT_WORKER_THREADS,
    ERROR_REQUEUE_DURATION_SECS, RESOURCE_RECORD_REQUEUE_SECS,
};
use clap::Parser;
use std::time::Duration;

/// dns-rr operator: converges `ResourceRecord` intents into hosted DNS zones.
#[derive(Parser, Clone, Debug, PartialEq, Eq)]
#[command(name = "dns-rr", version, about)]
pub struct Config {
    /// Seconds between two zone cache refreshes
    #[arg(
        long,
        env = "DNS_RR_CACHE_REFRESH_INTERVAL_SECS",
        default_value_t = DEFAULT_CACHE_REFRESH_INTERVAL_SECS,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub cache_refresh_interval_secs: u64,

    /// Seconds before a converged `ResourceRecord` is reconciled again
    #[arg(
        long,
        env = "DNS_RR_REQUEUE_INTERVAL_SECS",
        default_value_t = RESOURCE_RECORD_REQUEUE_SECS,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub requeue_interval_secs: u64,

    /// Seconds before a failed reconciliation is retried
    #[arg(
        long,
        env = "DNS_RR_ERROR_REQUEUE_SECS",
        default_value_t = ERROR_REQUEUE_DURATION_SECS,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub error_requeue_secs: u64,

    /// Port of the Prometheus `/metrics` endpoint
    #[arg(long, env = "DNS_RR_METRICS_PORT", default_value_t = DEFAULT_METRICS_PORT)]
    pub metrics_port: u16,

    /// Tokio worker threads
    #[arg(long, env = "DNS_RR_WORKER_THREADS", default_value_t = DEFAULT_WORKER_THREADS)]
    pub worker_threads: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cache_refresh_interval_secs: DEFAULT_CACHE_REFRESH_INTERVAL_SECS,
            requeue_interval_secs: RESOURCE_RECORD_REQUEUE_SECS,
            error_requeue_secs: ERROR_REQUEUE_DURATION_SECS,
            metrics_port: DEFAULT_METRICS_PORT,
            worker_threads: DEFAULT_WORKER_THREADS,
        }
    }
}

impl Config {
    #[must_use]
    pub fn cache_refresh_interval(&self) -> Duration {
        Duration::from_secs(self.cache_refresh_interval_secs)
    }

    #[must_use]
    pub fn requeue_interval(&self) -> Duration {
        Duration::from_secs(self.requeue_interval_secs)
    }

    #[must_use]
    pub fn error_requeue(&self) -> Duration {
        Duration::from_secs(self.error_requeue_secs)
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod config_tests;
