// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Provider and zone cache error types.
//!
//! These errors provide structured error handling for provider operations,
//! enabling better error reporting in status conditions and metrics.

use std::fmt;
use thiserror::Error;

/// Provider API operation that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderOperation {
    /// Listing record sets of a zone
    ListRecordSets,
    /// Submitting a change batch
    ChangeRecordSets,
}

impl fmt::Display for ProviderOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ListRecordSets => f.write_str("list record sets"),
            Self::ChangeRecordSets => f.write_str("change record sets"),
        }
    }
}

/// Errors that can occur while building or calling a DNS provider.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    /// Provider configuration is incomplete or invalid
    ///
    /// Returned before any network call, e.g. when a Route 53 provider has no region.
    #[error("Invalid provider configuration: {reason}")]
    Configuration {
        /// Explanation of what is invalid
        reason: String,
    },

    /// Credentials could not be loaded
    ///
    /// Returned when a referenced secret cannot be read or lacks the expected key.
    #[error("Failed to resolve provider credentials: {reason}")]
    CredentialResolution {
        /// Specific reason for the failure
        reason: String,
    },

    /// The provider rejected or failed a call
    #[error("Provider call '{operation}' failed for zone {zone_id}: {reason}")]
    ProviderCall {
        /// Zone the call targeted
        zone_id: String,
        /// Operation that failed
        operation: ProviderOperation,
        /// Error reported by the provider or transport
        reason: String,
    },

    /// The call was aborted by the cancellation token
    #[error("Provider call '{operation}' for zone {zone_id} was canceled")]
    Canceled {
        /// Zone the call targeted
        zone_id: String,
        /// Operation that was aborted
        operation: ProviderOperation,
    },
}

impl ProviderError {
    /// Returns true if this error is transient and the operation should be retried.
    ///
    /// Provider call failures are retried on the next requeue. Configuration and
    /// credential errors need a spec or secret change first.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::ProviderCall { .. } | Self::Canceled { .. } => true,
            Self::Configuration { .. } | Self::CredentialResolution { .. } => false,
        }
    }

    /// Returns the Kubernetes status reason code for this error.
    #[must_use]
    pub fn status_reason(&self) -> &'static str {
        match self {
            Self::Configuration { .. } => crate::status_reasons::REASON_PROVIDER_CONFIGURATION_ERROR,
            Self::CredentialResolution { .. } => {
                crate::status_reasons::REASON_CREDENTIAL_RESOLUTION_FAILED
            }
            Self::ProviderCall { .. } => crate::status_reasons::REASON_PROVIDER_CALL_FAILED,
            Self::Canceled { .. } => crate::status_reasons::REASON_CONVERGENCE_CANCELED,
        }
    }

    /// Short label used for the `error_type` metric label.
    #[must_use]
    pub fn metric_label(&self) -> &'static str {
        match self {
            Self::Configuration { .. } => "configuration_error",
            Self::CredentialResolution { .. } => "credential_error",
            Self::ProviderCall { .. } => "provider_error",
            Self::Canceled { .. } => "canceled",
        }
    }
}

/// A zone cache refresh attempt failed for one provider instance.
///
/// Logged by the refresh task; the previous snapshot stays in place.
#[derive(Error, Debug, Clone)]
#[error("Failed to refresh zone cache entry '{key}': {source}")]
pub struct CacheRefreshError {
    /// Cache key of the provider instance
    pub key: String,
    /// Underlying provider error
    #[source]
    pub source: ProviderError,
}

#[cfg(test)]
#[path = "errors_tests.rs"]
mod errors_tests;
