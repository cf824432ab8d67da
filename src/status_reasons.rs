// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Standard Kubernetes status condition reasons for dns-rr resources.
//!
//! Reasons are programmatic identifiers in CamelCase that explain why a condition has
//! a particular status. Every resource carries a single `type: Ready` condition.
//!
//! # Example Status
//!
//! ```yaml
//! status:
//!   conditions:
//!     - type: Ready
//!       status: "True"
//!       reason: Converged
//!       message: "Submitted 2 change(s) to zone Z123"
//! ```

// ============================================================================
// Condition Types
// ============================================================================

/// Encompassing readiness condition type.
pub const CONDITION_TYPE_READY: &str = "Ready";

/// Condition status values.
pub const CONDITION_STATUS_TRUE: &str = "True";
pub const CONDITION_STATUS_FALSE: &str = "False";

// ============================================================================
// ResourceRecord Reasons
// ============================================================================

/// The zone matches the record for every owner name, possibly after submitting changes.
pub const REASON_CONVERGED: &str = "Converged";

/// Changes were computed but not submitted because `dryRun` is set.
pub const REASON_DRY_RUN: &str = "DryRun";

/// The referenced `Owner` does not exist.
pub const REASON_OWNER_NOT_FOUND: &str = "OwnerNotFound";

/// The referenced `Provider` does not exist.
pub const REASON_PROVIDER_NOT_FOUND: &str = "ProviderNotFound";

/// The record spec cannot be converged (e.g. alias without target).
pub const REASON_INVALID_RECORD: &str = "InvalidRecord";

/// The convergence run was aborted during shutdown.
pub const REASON_CONVERGENCE_CANCELED: &str = "ConvergenceCanceled";

// ============================================================================
// Provider Reasons
// ============================================================================

/// The provider spec is valid and a client could be built.
pub const REASON_PROVIDER_READY: &str = "ProviderReady";

/// The provider spec is incomplete or invalid.
pub const REASON_PROVIDER_CONFIGURATION_ERROR: &str = "ProviderConfigurationError";

/// Credentials referenced by the provider could not be loaded.
pub const REASON_CREDENTIAL_RESOLUTION_FAILED: &str = "CredentialResolutionFailed";

/// A call to the provider API failed.
pub const REASON_PROVIDER_CALL_FAILED: &str = "ProviderCallFailed";
