// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Status condition helpers for dns-rr resources.
//!
//! Kubernetes conditions follow a standard format:
//! - `type`: The aspect of the resource being reported (e.g., "Ready")
//! - `status`: "True", "False", or "Unknown"
//! - `reason`: A programmatic identifier (CamelCase)
//! - `message`: A human-readable explanation
//! - `lastTransitionTime`: RFC3339 timestamp when the condition changed
//!
//! # Example
//!
//! ```rust,no_run
//! use dns_rr::reconcilers::status::create_condition;
//!
//! let condition = create_condition("Ready", "True", "Converged", "2 change(s) submitted");
//! ```

use crate::crd::{Condition, Owner, Provider, RecordStatus, ResourceRecord};
use anyhow::Result;
use chrono::Utc;
use kube::api::Patch;
use kube::core::NamespaceResourceScope;
use kube::{api::PatchParams, Api, Client, Resource, ResourceExt};
use serde::de::DeserializeOwned;
use serde_json::json;
use std::fmt::Debug;
use tracing::debug;

/// Create a new Kubernetes condition with the current timestamp.
///
/// # Example
///
/// ```rust,no_run
/// # use dns_rr::reconcilers::status::create_condition;
/// let condition = create_condition("Ready", "True", "Converged", "Zone matches");
/// assert_eq!(condition.r#type, "Ready");
/// assert_eq!(condition.status, "True");
/// ```
#[must_use]
pub fn create_condition(
    condition_type: &str,
    status: &str,
    reason: &str,
    message: &str,
) -> Condition {
    Condition {
        r#type: condition_type.to_string(),
        status: status.to_string(),
        reason: Some(reason.to_string()),
        message: Some(message.to_string()),
        last_transition_time: Some(Utc::now().to_rfc3339()),
    }
}

/// Find a condition by type in a list of conditions.
#[must_use]
pub fn find_condition<'a>(
    conditions: &'a [Condition],
    condition_type: &str,
) -> Option<&'a Condition> {
    conditions.iter().find(|c| c.r#type == condition_type)
}

/// Update or add a condition in a mutable conditions list (in-memory, no API call).
///
/// The `lastTransitionTime` is preserved when the status value does not change.
pub fn update_condition_in_memory(
    conditions: &mut Vec<Condition>,
    condition_type: &str,
    status: &str,
    reason: &str,
    message: &str,
) {
    if let Some(existing) = conditions.iter_mut().find(|c| c.r#type == condition_type) {
        let last_transition_time = if existing.status == status {
            existing
                .last_transition_time
                .clone()
                .unwrap_or_else(|| Utc::now().to_rfc3339())
        } else {
            Utc::now().to_rfc3339()
        };

        existing.status = status.to_string();
        existing.reason = Some(reason.to_string());
        existing.message = Some(message.to_string());
        existing.last_transition_time = Some(last_transition_time);
    } else {
        conditions.push(create_condition(condition_type, status, reason, message));
    }
}

/// Compare two condition lists, ignoring `lastTransitionTime`.
#[must_use]
pub fn conditions_equal(current: &[Condition], new: &[Condition]) -> bool {
    if current.len() != new.len() {
        return false;
    }

    new.iter().all(|new_cond| {
        current.iter().any(|curr| {
            curr.r#type == new_cond.r#type
                && curr.status == new_cond.status
                && curr.reason == new_cond.reason
                && curr.message == new_cond.message
        })
    })
}

/// Resources carrying a [`RecordStatus`] subresource.
pub trait HasRecordStatus:
    Resource<DynamicType = (), Scope = NamespaceResourceScope> + Clone + DeserializeOwned + Debug
{
    fn record_status(&self) -> Option<&RecordStatus>;
}

impl HasRecordStatus for ResourceRecord {
    fn record_status(&self) -> Option<&RecordStatus> {
        self.status.as_ref()
    }
}

impl HasRecordStatus for Owner {
    fn record_status(&self) -> Option<&RecordStatus> {
        self.status.as_ref()
    }
}

impl HasRecordStatus for Provider {
    fn record_status(&self) -> Option<&RecordStatus> {
        self.status.as_ref()
    }
}

/// Collects status changes during a reconciliation and applies them in one API call.
///
/// Nothing is written when the resulting status is semantically unchanged, so a
/// status patch does not retrigger the controller in a tight loop.
#[derive(Debug)]
pub struct StatusUpdater {
    kind: String,
    namespace: String,
    name: String,
    current_status: Option<RecordStatus>,
    new_status: RecordStatus,
}

impl StatusUpdater {
    #[must_use]
    pub fn new<K: HasRecordStatus>(resource: &K) -> Self {
        let current_status = resource.record_status().cloned();
        let new_status = current_status.clone().unwrap_or_default();

        Self {
            kind: K::kind(&()).to_string(),
            namespace: resource.namespace().unwrap_or_default(),
            name: resource.name_any(),
            current_status,
            new_status,
        }
    }

    /// Update or add a condition (in-memory only, no API call).
    pub fn set_condition(
        &mut self,
        condition_type: &str,
        status: &str,
        reason: &str,
        message: &str,
    ) {
        update_condition_in_memory(
            &mut self.new_status.conditions,
            condition_type,
            status,
            reason,
            message,
        );
    }

    pub fn set_observed_generation(&mut self, generation: Option<i64>) {
        self.new_status.observed_generation = generation;
    }

    /// Whether applying would change the stored status.
    #[must_use]
    pub fn has_changes(&self) -> bool {
        match &self.current_status {
            None => true,
            Some(current) => {
                current.observed_generation != self.new_status.observed_generation
                    || !conditions_equal(&current.conditions, &self.new_status.conditions)
            }
        }
    }

    #[must_use]
    pub fn status(&self) -> &RecordStatus {
        &self.new_status
    }

    /// Apply the collected status to Kubernetes.
    ///
    /// # Errors
    ///
    /// Returns an error if the Kubernetes API call fails.
    pub async fn apply<K: HasRecordStatus>(&self, client: &Client) -> Result<()> {
        if !self.has_changes() {
            debug!(
                "{} {}/{} status unchanged, skipping update",
                self.kind, self.namespace, self.name
            );
            return Ok(());
        }

        let api: Api<K> = Api::namespaced(client.clone(), &self.namespace);
        let patch = json!({
            "status": self.new_status
        });

        api.patch_status(&self.name, &PatchParams::default(), &Patch::Merge(&patch))
            .await?;

        debug!(
            "Updated {} {}/{} status: {} condition(s)",
            self.kind,
            self.namespace,
            self.name,
            self.new_status.conditions.len()
        );

        Ok(())
    }
}

