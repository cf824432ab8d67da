// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! `ResourceRecord` reconciliation.
//!
//! Each reconciliation looks up the referenced `Owner` and `Provider` in the
//! record's namespace, builds the provider client and runs one convergence for
//! the owner's names. Records are never deleted from the zone, so there is no
//! finalizer: deleting a `ResourceRecord` leaves its DNS records in place.

use crate::constants::{KIND_RESOURCE_RECORD, MAX_TTL, MAX_WEIGHT};
use crate::context::Context;
use crate::converge::{ConvergeOutcome, Converger};
use crate::crd::{Owner, Provider, ResourceRecord, ResourceRecordSpec};
use crate::errors::ProviderError;
use crate::metrics;
use crate::reconcilers::provider::build_provider;
use crate::reconcilers::status::StatusUpdater;
use crate::status_reasons::{
    CONDITION_STATUS_FALSE, CONDITION_STATUS_TRUE, CONDITION_TYPE_READY, REASON_CONVERGED,
    REASON_DRY_RUN, REASON_INVALID_RECORD, REASON_OWNER_NOT_FOUND, REASON_PROVIDER_NOT_FOUND,
};
use crate::zone_cache::CacheKey;
use anyhow::{Context as _, Result};
use kube::runtime::reflector::ObjectRef;
use kube::{Api, ResourceExt};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Checks the parts of a record spec the CRD schema cannot express.
///
/// # Errors
///
/// Returns a human-readable reason when the record cannot be converged.
pub fn validate_record_spec(spec: &ResourceRecordSpec) -> Result<(), String> {
    if spec.owner_ref.is_empty() {
        return Err("ownerRef must not be empty".to_string());
    }
    if spec.provider_ref.is_empty() {
        return Err("providerRef must not be empty".to_string());
    }
    if spec.is_alias {
        if spec.alias_target.is_none() {
            return Err("isAlias requires aliasTarget".to_string());
        }
    } else {
        if spec.rdata.is_empty() {
            return Err("rdata must not be empty".to_string());
        }
        if !(0..=MAX_TTL).contains(&i64::from(spec.ttl)) {
            return Err(format!("ttl must be between 0 and {MAX_TTL}"));
        }
    }
    if let Some(weight) = spec.weight {
        if !(0..=MAX_WEIGHT).contains(&weight) {
            return Err(format!("weight must be between 0 and {MAX_WEIGHT}"));
        }
        if spec.id.as_deref().is_none_or(str::is_empty) {
            return Err("weight requires a non-empty id".to_string());
        }
    }
    Ok(())
}

/// Ready condition message describing a convergence outcome.
#[must_use]
pub fn outcome_message(outcome: &ConvergeOutcome, zone_id: &str) -> String {
    let n = outcome.changes.len();
    if outcome.is_noop() {
        format!("Zone {zone_id} already matches the record")
    } else if outcome.dry_run {
        format!("Dry run: {n} change(s) computed for zone {zone_id}, none submitted")
    } else {
        format!("Submitted {n} change(s) to zone {zone_id}")
    }
}

/// `ResourceRecord`s in the owner's namespace that reference it.
#[must_use]
pub fn records_for_owner(records: &[Arc<ResourceRecord>], owner: &Owner) -> Vec<ObjectRef<ResourceRecord>> {
    let namespace = owner.namespace();
    let name = owner.name_any();
    records
        .iter()
        .filter(|rr| rr.namespace() == namespace && rr.spec.owner_ref == name)
        .map(|rr| ObjectRef::from_obj(rr.as_ref()))
        .collect()
}

/// `ResourceRecord`s in the provider's namespace that reference it.
#[must_use]
pub fn records_for_provider(
    records: &[Arc<ResourceRecord>],
    provider: &Provider,
) -> Vec<ObjectRef<ResourceRecord>> {
    let namespace = provider.namespace();
    let name = provider.name_any();
    records
        .iter()
        .filter(|rr| rr.namespace() == namespace && rr.spec.provider_ref == name)
        .map(|rr| ObjectRef::from_obj(rr.as_ref()))
        .collect()
}

/// Reconciles a `ResourceRecord` into the zone of its `Provider`.
///
/// A missing `Owner` or `Provider` is reported in the status and not retried;
/// creating the referenced resource triggers a new reconciliation.
///
/// # Errors
///
/// Returns an error if a lookup, a provider call or the status update fails.
pub async fn reconcile_resource_record(ctx: Arc<Context>, record: Arc<ResourceRecord>) -> Result<()> {
    let name = record.name_any();
    let namespace = record
        .namespace()
        .context("ResourceRecord must be namespaced")?;

    if record.metadata.deletion_timestamp.is_some() {
        debug!(record = %name, namespace = %namespace, "ResourceRecord is being deleted, records stay in the zone");
        return Ok(());
    }

    let mut status = StatusUpdater::new(record.as_ref());
    status.set_observed_generation(record.metadata.generation);

    if let Err(reason) = validate_record_spec(&record.spec) {
        warn!(record = %name, namespace = %namespace, reason = %reason, "Invalid ResourceRecord");
        status.set_condition(
            CONDITION_TYPE_READY,
            CONDITION_STATUS_FALSE,
            REASON_INVALID_RECORD,
            &reason,
        );
        return apply_status(&ctx, &status, &namespace, &name).await;
    }

    let owners: Api<Owner> = Api::namespaced(ctx.client.clone(), &namespace);
    let Some(owner) = owners
        .get_opt(&record.spec.owner_ref)
        .await
        .with_context(|| format!("Failed to get Owner {namespace}/{}", record.spec.owner_ref))?
    else {
        info!(record = %name, owner = %record.spec.owner_ref, "Owner not found");
        status.set_condition(
            CONDITION_TYPE_READY,
            CONDITION_STATUS_FALSE,
            REASON_OWNER_NOT_FOUND,
            &format!("Owner {namespace}/{} not found", record.spec.owner_ref),
        );
        return apply_status(&ctx, &status, &namespace, &name).await;
    };

    let providers: Api<Provider> = Api::namespaced(ctx.client.clone(), &namespace);
    let Some(provider) = providers
        .get_opt(&record.spec.provider_ref)
        .await
        .with_context(|| {
            format!(
                "Failed to get Provider {namespace}/{}",
                record.spec.provider_ref
            )
        })?
    else {
        info!(record = %name, provider = %record.spec.provider_ref, "Provider not found");
        status.set_condition(
            CONDITION_TYPE_READY,
            CONDITION_STATUS_FALSE,
            REASON_PROVIDER_NOT_FOUND,
            &format!("Provider {namespace}/{} not found", record.spec.provider_ref),
        );
        return apply_status(&ctx, &status, &namespace, &name).await;
    };

    let result = converge(&ctx, &record, &owner, &provider).await;

    match &result {
        Ok((outcome, zone_id)) => {
            metrics::record_convergence(outcome.metric_label());
            let reason = if outcome.dry_run && !outcome.is_noop() {
                REASON_DRY_RUN
            } else {
                REASON_CONVERGED
            };
            status.set_condition(
                CONDITION_TYPE_READY,
                CONDITION_STATUS_TRUE,
                reason,
                &outcome_message(outcome, zone_id),
            );
        }
        Err(e) => {
            metrics::record_convergence("error");
            metrics::record_error(KIND_RESOURCE_RECORD, e.metric_label());
            status.set_condition(
                CONDITION_TYPE_READY,
                CONDITION_STATUS_FALSE,
                e.status_reason(),
                &e.to_string(),
            );
        }
    }

    apply_status(&ctx, &status, &namespace, &name).await?;

    match result {
        Ok((outcome, zone_id)) => {
            debug!(
                record = %name,
                namespace = %namespace,
                zone_id = %zone_id,
                changes = outcome.changes.len(),
                source = ?outcome.source,
                "Convergence finished"
            );
            Ok(())
        }
        Err(e) => Err(anyhow::Error::new(e)
            .context(format!("Failed to converge ResourceRecord {namespace}/{name}"))),
    }
}

async fn converge(
    ctx: &Context,
    record: &ResourceRecord,
    owner: &Owner,
    provider: &Provider,
) -> Result<(ConvergeOutcome, String), ProviderError> {
    let (zone_id, zone_name) = provider.spec.zone()?;
    let dns_provider = build_provider(&ctx.client, provider).await?;

    let converger = Converger::new(
        dns_provider,
        ctx.zone_cache.clone(),
        CacheKey::for_resource(provider),
    );
    let cancel = ctx.shutdown.child_token();

    let outcome = converger
        .converge(zone_id, zone_name, &owner.spec.names, &record.spec, &cancel)
        .await?;
    Ok((outcome, zone_id.to_string()))
}

async fn apply_status(
    ctx: &Context,
    status: &StatusUpdater,
    namespace: &str,
    name: &str,
) -> Result<()> {
    status
        .apply::<ResourceRecord>(&ctx.client)
        .await
        .with_context(|| format!("Failed to update status of ResourceRecord {namespace}/{name}"))
}

#[cfg(test)]
#[path = "resourcerecord_tests.rs"]
mod resourcerecord_tests;
