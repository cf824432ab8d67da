// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Reconciliation logic for dns-rr resources.
//!
//! - [`resourcerecord`] converges a `ResourceRecord` into the zone of its `Provider`
//! - [`provider`] validates a `Provider`, builds provider clients and enumerates
//!   providers for the zone cache refresh task
//! - [`status`] collects status conditions and patches them in one call
//! - [`pagination`] lists large resource sets page by page

pub mod pagination;
pub mod provider;
pub mod resourcerecord;
pub mod status;

#[cfg(test)]
mod status_tests;

pub use provider::{build_provider, reconcile_provider, KubeRefreshSource};
pub use resourcerecord::reconcile_resource_record;
