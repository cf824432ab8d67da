// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! `Provider` reconciliation and provider client construction.
//!
//! A `Provider` resource names exactly one backend. [`build_provider`] resolves
//! its secrets and returns the matching [`DnsProvider`]. The same function feeds
//! the zone cache refresh task through [`KubeRefreshSource`], so the cache and
//! the convergence runs always talk to a zone the same way.

use crate::constants::PROVIDER_REQUEUE_SECS;
use crate::context::Context;
use crate::credentials::{require_region, resolve_http_api_token, resolve_route53_credentials};
use crate::crd::{HttpApiProviderSpec, Provider, ProviderSpec, Route53ProviderSpec};
use crate::errors::{ProviderError, ProviderOperation};
use crate::provider::http_api::HttpApiProvider;
use crate::provider::route53::Route53Provider;
use crate::provider::{with_cancel, DnsProvider};
use crate::reconcilers::pagination::list_all_paginated;
use crate::reconcilers::status::StatusUpdater;
use crate::refresh::{RefreshPlan, RefreshSource, RefreshTarget};
use crate::status_reasons::{
    CONDITION_STATUS_FALSE, CONDITION_STATUS_TRUE, CONDITION_TYPE_READY, REASON_PROVIDER_READY,
};
use crate::zone_cache::CacheKey;
use anyhow::{Context as _, Result};
use async_trait::async_trait;
use kube::api::ListParams;
use kube::runtime::controller::Action;
use kube::{Api, Client, ResourceExt};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Backend selected by a [`ProviderSpec`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Backend<'a> {
    Route53(&'a Route53ProviderSpec),
    HttpApi(&'a HttpApiProviderSpec),
}

impl Backend<'_> {
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Route53(_) => "route53",
            Self::HttpApi(_) => "http-api",
        }
    }
}

/// Validates `spec` and returns its backend.
///
/// # Errors
///
/// Returns [`ProviderError::Configuration`] unless exactly one backend is set and
/// its zone id, zone name, region or endpoint are present.
pub fn select_backend(spec: &ProviderSpec) -> Result<Backend<'_>, ProviderError> {
    let (zone_id, zone_name) = spec.zone()?;
    if zone_id.is_empty() {
        return Err(ProviderError::Configuration {
            reason: "zone id must not be empty".to_string(),
        });
    }
    if zone_name.trim_end_matches('.').is_empty() {
        return Err(ProviderError::Configuration {
            reason: "zone name must not be empty".to_string(),
        });
    }

    if let Some(r53) = &spec.route53 {
        require_region(r53)?;
        return Ok(Backend::Route53(r53));
    }

    match &spec.http_api {
        Some(api) if api.endpoint.is_empty() => Err(ProviderError::Configuration {
            reason: "http api provider requires an endpoint".to_string(),
        }),
        Some(api) => Ok(Backend::HttpApi(api)),
        None => Err(ProviderError::Configuration {
            reason: "no provider backend configured".to_string(),
        }),
    }
}

/// Builds the DNS provider client of a `Provider` resource.
///
/// # Errors
///
/// Returns [`ProviderError::Configuration`] for an invalid spec and
/// [`ProviderError::CredentialResolution`] if referenced secrets cannot be read.
pub async fn build_provider(
    client: &Client,
    provider: &Provider,
) -> Result<Arc<dyn DnsProvider>, ProviderError> {
    let namespace = provider.namespace().unwrap_or_default();

    match select_backend(&provider.spec)? {
        Backend::Route53(spec) => {
            let region = require_region(spec)?;
            let credentials = resolve_route53_credentials(client, spec, &namespace).await?;
            debug!(
                provider = %provider.name_any(),
                region,
                static_credentials = credentials.is_some(),
                "Building Route 53 client"
            );
            Ok(Arc::new(Route53Provider::connect(region, credentials).await))
        }
        Backend::HttpApi(spec) => {
            let token = resolve_http_api_token(client, spec, &namespace).await?;
            Ok(Arc::new(HttpApiProvider::new(&spec.endpoint, token)?))
        }
    }
}

/// Enumerates `Provider` resources for the zone cache refresh task.
#[derive(Clone)]
pub struct KubeRefreshSource {
    client: Client,
}

impl KubeRefreshSource {
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl RefreshSource for KubeRefreshSource {
    async fn plan(&self) -> Result<RefreshPlan> {
        let api: Api<Provider> = Api::all(self.client.clone());
        let providers = list_all_paginated(&api, ListParams::default())
            .await
            .context("Failed to list Provider resources")?;

        let mut plan = RefreshPlan::default();
        for provider in providers {
            if provider.metadata.deletion_timestamp.is_some() {
                continue;
            }

            let key = CacheKey::for_resource(&provider);
            let zone_id = match provider.spec.zone() {
                Ok((zone_id, _)) => zone_id.to_string(),
                Err(e) => {
                    plan.unavailable.push((key, e));
                    continue;
                }
            };

            match build_provider(&self.client, &provider).await {
                Ok(dns_provider) => plan.targets.push(RefreshTarget {
                    key,
                    zone_id,
                    provider: dns_provider,
                }),
                Err(e) => plan.unavailable.push((key, e)),
            }
        }

        Ok(plan)
    }
}

/// Reconciles a `Provider`: validates it, resolves its credentials and checks
/// that its zone can be listed. The outcome is reported in the `Ready` condition.
///
/// Transient failures are returned so the controller retries; configuration and
/// credential failures are only reported and rechecked on the next requeue.
///
/// # Errors
///
/// Returns an error if a provider call fails or the status cannot be patched.
pub async fn reconcile_provider(ctx: Arc<Context>, provider: Arc<Provider>) -> Result<Action> {
    let name = provider.name_any();
    let namespace = provider.namespace().unwrap_or_default();

    if provider.metadata.deletion_timestamp.is_some() {
        if ctx
            .zone_cache
            .remove(&CacheKey::for_resource(provider.as_ref()))
            .await
        {
            info!(provider = %name, namespace = %namespace, "Dropped zone snapshot of deleted provider");
        }
        return Ok(Action::await_change());
    }

    let mut status = StatusUpdater::new(provider.as_ref());
    status.set_observed_generation(provider.metadata.generation);

    let result = check_provider(&ctx, &provider).await;
    match &result {
        Ok(message) => {
            status.set_condition(
                CONDITION_TYPE_READY,
                CONDITION_STATUS_TRUE,
                REASON_PROVIDER_READY,
                message,
            );
        }
        Err(e) => {
            warn!(provider = %name, namespace = %namespace, error = %e, "Provider is not ready");
            status.set_condition(
                CONDITION_TYPE_READY,
                CONDITION_STATUS_FALSE,
                e.status_reason(),
                &e.to_string(),
            );
        }
    }

    status
        .apply::<Provider>(&ctx.client)
        .await
        .with_context(|| format!("Failed to update status of Provider {namespace}/{name}"))?;

    match result {
        Err(e) if e.is_transient() => Err(e.into()),
        _ => Ok(Action::requeue(Duration::from_secs(PROVIDER_REQUEUE_SECS))),
    }
}

async fn check_provider(ctx: &Context, provider: &Provider) -> Result<String, ProviderError> {
    let backend = select_backend(&provider.spec)?;
    let (zone_id, zone_name) = provider.spec.zone()?;
    let dns_provider = build_provider(&ctx.client, provider).await?;

    let cancel = ctx.shutdown.child_token();
    with_cancel(
        &cancel,
        zone_id,
        ProviderOperation::ListRecordSets,
        dns_provider.list_record_sets(zone_id, None),
    )
    .await?;

    Ok(format!(
        "Zone {zone_name} ({zone_id}) is reachable via {}",
        backend.name()
    ))
}

#[cfg(test)]
#[path = "provider_tests.rs"]
mod provider_tests;
