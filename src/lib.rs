// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! # dns-rr - DNS record convergence operator for Kubernetes
//!
//! dns-rr makes hosted DNS zones match `ResourceRecord` intents declared in
//! Kubernetes. A record is replicated under every name of an `Owner` group and
//! converged into the zone of a `Provider` (AWS Route 53 or a JSON HTTP DNS API).
//!
//! ## Engine
//!
//! - [`endpoint`] - Provider-neutral record model and FQDN construction
//! - [`zone_cache`] - Per-provider zone snapshots shared by all convergence runs
//! - [`refresh`] - Background task that keeps the zone cache populated
//! - [`resolve`] - Actual endpoint per owner name, from a snapshot or scoped listings
//! - [`diff`] - Pure diff producing `CREATE`/`UPSERT` changes, never deletions
//! - [`converge`] - One convergence run: resolve, diff, submit one batch
//! - [`provider`] - The DNS provider capability and its implementations
//!
//! ## Operator
//!
//! - [`crd`] - Custom Resource Definitions
//! - [`reconcilers`] - Reconciliation logic for each resource type
//! - [`credentials`] - Secret-backed provider credentials
//! - [`context`] - Shared controller context
//! - [`config`] - Command line and environment configuration
//! - [`metrics`] - Prometheus metrics
//!
//! ## Example
//!
//! ```rust,no_run
//! use dns_rr::converge::Converger;
//! use dns_rr::crd::{RecordClass, ResourceRecordSpec};
//! use dns_rr::provider::memory::InMemoryProvider;
//! use dns_rr::zone_cache::{CacheKey, ZoneCache};
//! use std::sync::Arc;
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() -> Result<(), dns_rr::errors::ProviderError> {
//! let provider = Arc::new(InMemoryProvider::new().with_zone("Z123", vec![]));
//! let converger = Converger::new(
//!     provider,
//!     Arc::new(ZoneCache::new()),
//!     CacheKey::new("dns", "example-com"),
//! );
//!
//! let spec = ResourceRecordSpec {
//!     class: RecordClass::A,
//!     ttl: 300,
//!     rdata: "192.0.2.10".to_string(),
//!     owner_ref: "web".to_string(),
//!     provider_ref: "example-com".to_string(),
//!     ..ResourceRecordSpec::default()
//! };
//! let owners = vec!["www".to_string(), "api".to_string()];
//!
//! let outcome = converger
//!     .converge("Z123", "example.com", &owners, &spec, &CancellationToken::new())
//!     .await?;
//! assert_eq!(outcome.changes.len(), 2);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod constants;
pub mod context;
pub mod converge;
pub mod crd;
pub mod credentials;
pub mod diff;
pub mod endpoint;
pub mod errors;
pub mod metrics;
pub mod provider;
pub mod reconcilers;
pub mod refresh;
pub mod resolve;
pub mod status_reasons;
pub mod zone_cache;

#[cfg(test)]
mod status_reasons_tests;
