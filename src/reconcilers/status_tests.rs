// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `status.rs`

#[cfg(test)]
mod tests {
    use crate::crd::{Condition, RecordStatus, ResourceRecord, ResourceRecordSpec};
    use crate::reconcilers::status::{
        conditions_equal, create_condition, find_condition, update_condition_in_memory,
        StatusUpdater,
    };
    use crate::status_reasons::{
        CONDITION_STATUS_FALSE, CONDITION_STATUS_TRUE, CONDITION_TYPE_READY, REASON_CONVERGED,
        REASON_PROVIDER_CALL_FAILED,
    };

    fn record_with_status(status: Option<RecordStatus>) -> ResourceRecord {
        let mut record = ResourceRecord::new("web-a", ResourceRecordSpec::default());
        record.metadata.namespace = Some("dns".to_string());
        record.status = status;
        record
    }

    #[test]
    fn test_create_condition_basic() {
        let condition = create_condition(
            CONDITION_TYPE_READY,
            CONDITION_STATUS_TRUE,
            REASON_CONVERGED,
            "Zone matches",
        );

        assert_eq!(condition.r#type, CONDITION_TYPE_READY);
        assert_eq!(condition.status, CONDITION_STATUS_TRUE);
        assert_eq!(condition.reason.as_deref(), Some(REASON_CONVERGED));
        assert_eq!(condition.message.as_deref(), Some("Zone matches"));
        assert!(condition.last_transition_time.is_some());
    }

    #[test]
    fn test_find_condition() {
        let conditions = vec![
            create_condition("Ready", "True", "Converged", ""),
            create_condition("Degraded", "False", "Healthy", ""),
        ];

        assert_eq!(
            find_condition(&conditions, "Degraded").map(|c| c.status.as_str()),
            Some("False")
        );
        assert!(find_condition(&conditions, "Progressing").is_none());
    }

    #[test]
    fn test_update_condition_preserves_transition_time_when_status_unchanged() {
        let mut conditions = vec![Condition {
            last_transition_time: Some("2025-01-01T00:00:00+00:00".to_string()),
            ..create_condition("Ready", "True", "Converged", "old")
        }];

        update_condition_in_memory(&mut conditions, "Ready", "True", "Converged", "new");

        assert_eq!(conditions.len(), 1);
        assert_eq!(conditions[0].message.as_deref(), Some("new"));
        assert_eq!(
            conditions[0].last_transition_time.as_deref(),
            Some("2025-01-01T00:00:00+00:00")
        );
    }

    #[test]
    fn test_update_condition_resets_transition_time_on_status_change() {
        let mut conditions = vec![Condition {
            last_transition_time: Some("2025-01-01T00:00:00+00:00".to_string()),
            ..create_condition("Ready", "True", "Converged", "")
        }];

        update_condition_in_memory(
            &mut conditions,
            "Ready",
            "False",
            REASON_PROVIDER_CALL_FAILED,
            "throttled",
        );

        assert_eq!(conditions[0].status, "False");
        assert_ne!(
            conditions[0].last_transition_time.as_deref(),
            Some("2025-01-01T00:00:00+00:00")
        );
    }

    #[test]
    fn test_update_condition_appends_new_type() {
        let mut conditions = vec![create_condition("Ready", "True", "Converged", "")];
        update_condition_in_memory(&mut conditions, "Degraded", "False", "Healthy", "");
        assert_eq!(conditions.len(), 2);
    }

    #[test]
    fn test_conditions_equal_ignores_transition_time() {
        let a = vec![Condition {
            last_transition_time: Some("a".to_string()),
            ..create_condition("Ready", "True", "Converged", "ok")
        }];
        let b = vec![Condition {
            last_transition_time: Some("b".to_string()),
            ..create_condition("Ready", "True", "Converged", "ok")
        }];
        let c = vec![create_condition("Ready", "False", "Converged", "ok")];

        assert!(conditions_equal(&a, &b));
        assert!(!conditions_equal(&a, &c));
        assert!(!conditions_equal(&a, &[]));
    }

    #[test]
    fn test_status_updater_first_status_has_changes() {
        let record = record_with_status(None);
        let updater = StatusUpdater::new(&record);
        assert!(updater.has_changes());
    }

    #[test]
    fn test_status_updater_same_condition_has_no_changes() {
        let record = record_with_status(Some(RecordStatus {
            conditions: vec![create_condition(
                CONDITION_TYPE_READY,
                CONDITION_STATUS_TRUE,
                REASON_CONVERGED,
                "Zone matches",
            )],
            observed_generation: Some(3),
        }));

        let mut updater = StatusUpdater::new(&record);
        updater.set_condition(
            CONDITION_TYPE_READY,
            CONDITION_STATUS_TRUE,
            REASON_CONVERGED,
            "Zone matches",
        );
        updater.set_observed_generation(Some(3));

        assert!(!updater.has_changes());
    }

    #[test]
    fn test_status_updater_detects_condition_and_generation_change() {
        let record = record_with_status(Some(RecordStatus {
            conditions: vec![create_condition(
                CONDITION_TYPE_READY,
                CONDITION_STATUS_TRUE,
                REASON_CONVERGED,
                "",
            )],
            observed_generation: Some(1),
        }));

        let mut flipped = StatusUpdater::new(&record);
        flipped.set_condition(
            CONDITION_TYPE_READY,
            CONDITION_STATUS_FALSE,
            REASON_PROVIDER_CALL_FAILED,
            "throttled",
        );
        flipped.set_observed_generation(Some(1));
        assert!(flipped.has_changes());

        let mut bumped = StatusUpdater::new(&record);
        bumped.set_observed_generation(Some(2));
        assert!(bumped.has_changes());
        assert_eq!(bumped.status().observed_generation, Some(2));
    }
}
