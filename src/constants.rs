// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Global constants for the dns-rr operator.
//!
//! Constants are organized by category for easy maintenance.

// ============================================================================
// API Constants
// ============================================================================

/// API group for all dns-rr CRDs
pub const API_GROUP: &str = "dns.ch1aki.github.io";

/// API version for all dns-rr CRDs
pub const API_VERSION: &str = "v1alpha1";

/// Fully qualified API version (group/version)
pub const API_GROUP_VERSION: &str = "dns.ch1aki.github.io/v1alpha1";

/// Kind name for `ResourceRecord` resource
pub const KIND_RESOURCE_RECORD: &str = "ResourceRecord";

/// Kind name for `Owner` resource
pub const KIND_OWNER: &str = "Owner";

/// Kind name for `Provider` resource
pub const KIND_PROVIDER: &str = "Provider";

// ============================================================================
// DNS Constants
// ============================================================================

/// Largest TTL accepted for a record (2^31 - 1 seconds)
pub const MAX_TTL: i64 = 2_147_483_647;

/// Largest routing weight accepted for a weighted record
pub const MAX_WEIGHT: i64 = 255;

// ============================================================================
// Zone Cache Constants
// ============================================================================

/// Default interval between zone cache refreshes (5 minutes)
pub const DEFAULT_CACHE_REFRESH_INTERVAL_SECS: u64 = 300;

/// Page size requested from the in-memory provider when none is configured
pub const DEFAULT_MEMORY_PAGE_SIZE: usize = 100;

// ============================================================================
// Controller Constants
// ============================================================================

/// Requeue interval after a successful `ResourceRecord` reconciliation (10 minutes)
pub const RESOURCE_RECORD_REQUEUE_SECS: u64 = 600;

/// Requeue interval after a successful `Provider` reconciliation (5 minutes)
pub const PROVIDER_REQUEUE_SECS: u64 = 300;

/// Requeue interval after a failed reconciliation (30 seconds)
pub const ERROR_REQUEUE_DURATION_SECS: u64 = 30;

/// Page size for Kubernetes list operations
pub const KUBE_LIST_PAGE_SIZE: u32 = 100;

/// Number of tokio worker threads used by the controller runtime
pub const DEFAULT_WORKER_THREADS: usize = 4;

// ============================================================================
// Provider Constants
// ============================================================================

/// Name reported to the AWS SDK as the source of static credentials
pub const AWS_CREDENTIALS_PROVIDER_NAME: &str = "dns-rr";

/// Timeout for a single HTTP DNS API request
pub const HTTP_API_TIMEOUT_SECS: u64 = 30;

// ============================================================================
// Metrics Constants
// ============================================================================

/// Default port for the Prometheus `/metrics` endpoint
pub const DEFAULT_METRICS_PORT: u16 = 8080;

/// Path served by the metrics endpoint
pub const METRICS_PATH: &str = "/metrics";
