// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `status_reasons.rs`

#[cfg(test)]
mod tests {
    use crate::status_reasons::*;

    #[test]
    fn test_reasons_are_camel_case() {
        for reason in [
            REASON_CONVERGED,
            REASON_DRY_RUN,
            REASON_OWNER_NOT_FOUND,
            REASON_PROVIDER_NOT_FOUND,
            REASON_INVALID_RECORD,
            REASON_CONVERGENCE_CANCELED,
            REASON_PROVIDER_READY,
            REASON_PROVIDER_CONFIGURATION_ERROR,
            REASON_CREDENTIAL_RESOLUTION_FAILED,
            REASON_PROVIDER_CALL_FAILED,
        ] {
            assert!(!reason.is_empty());
            assert!(
                reason.chars().next().is_some_and(char::is_uppercase),
                "{reason} should start with an uppercase letter"
            );
            assert!(
                reason.chars().all(char::is_alphanumeric),
                "{reason} should not contain separators"
            );
        }
    }

    #[test]
    fn test_condition_constants() {
        assert_eq!(CONDITION_TYPE_READY, "Ready");
        assert_eq!(CONDITION_STATUS_TRUE, "True");
        assert_eq!(CONDITION_STATUS_FALSE, "False");
    }
}
