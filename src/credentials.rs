// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Provider configuration and credential resolution.
//!
//! Credentials live in Kubernetes secrets referenced from a [`Provider`](crate::crd::Provider).
//! A selector without a namespace resolves in the namespace of the `Provider`.
//! Resolution failures abort client construction: nothing is sent to a provider
//! with partial credentials.

use crate::crd::{HttpApiProviderSpec, Route53ProviderSpec, SecretKeySelector};
use crate::errors::ProviderError;
use k8s_openapi::api::core::v1::Secret;
use kube::{Api, Client};
use std::fmt;
use tracing::debug;

/// Static AWS access key pair.
#[derive(Clone, PartialEq, Eq)]
pub struct StaticCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
}

impl fmt::Debug for StaticCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticCredentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .finish()
    }
}

/// Region of a Route 53 provider.
///
/// # Errors
///
/// Returns [`ProviderError::Configuration`] if no region is set.
pub fn require_region(spec: &Route53ProviderSpec) -> Result<&str, ProviderError> {
    let region = spec.region.trim();
    if region.is_empty() {
        return Err(ProviderError::Configuration {
            reason: "route53 provider require region".to_string(),
        });
    }
    Ok(region)
}

/// Value stored under `key` in a secret, decoded as UTF-8 and trimmed.
///
/// Empty values are treated as missing.
#[must_use]
pub fn secret_value(secret: &Secret, key: &str) -> Option<String> {
    let from_data = secret
        .data
        .as_ref()
        .and_then(|data| data.get(key))
        .and_then(|bytes| String::from_utf8(bytes.0.clone()).ok());
    let from_string_data = || {
        secret
            .string_data
            .as_ref()
            .and_then(|data| data.get(key))
            .cloned()
    };

    from_data
        .or_else(from_string_data)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Combines the two halves of an access key pair.
///
/// # Errors
///
/// Returns [`ProviderError::CredentialResolution`] naming the missing half.
pub fn assemble_credentials(
    access_key_id: Option<String>,
    secret_access_key: Option<String>,
) -> Result<StaticCredentials, ProviderError> {
    let access_key_id = access_key_id.ok_or_else(|| ProviderError::CredentialResolution {
        reason: "missing access key id".to_string(),
    })?;
    let secret_access_key = secret_access_key.ok_or_else(|| ProviderError::CredentialResolution {
        reason: "missing secret access key".to_string(),
    })?;

    Ok(StaticCredentials {
        access_key_id,
        secret_access_key,
    })
}

/// Namespace a selector resolves in.
#[must_use]
pub fn selector_namespace<'a>(selector: &'a SecretKeySelector, default_namespace: &'a str) -> &'a str {
    selector
        .namespace
        .as_deref()
        .filter(|ns| !ns.is_empty())
        .unwrap_or(default_namespace)
}

/// Reads the value a selector points at.
///
/// # Errors
///
/// Returns [`ProviderError::CredentialResolution`] if the secret cannot be read.
/// A missing key yields `Ok(None)`.
pub async fn read_secret_key(
    client: &Client,
    selector: &SecretKeySelector,
    default_namespace: &str,
) -> Result<Option<String>, ProviderError> {
    let namespace = selector_namespace(selector, default_namespace);
    let secret_api: Api<Secret> = Api::namespaced(client.clone(), namespace);

    let secret = secret_api
        .get(&selector.name)
        .await
        .map_err(|e| ProviderError::CredentialResolution {
            reason: format!(
                "failed to get secret {} in namespace {namespace}: {e}",
                selector.name
            ),
        })?;

    debug!(
        secret = %selector.name,
        namespace,
        key = %selector.key,
        "Loaded provider secret"
    );
    Ok(secret_value(&secret, &selector.key))
}

/// Static credentials of a Route 53 provider, or `None` to use the default AWS chain.
///
/// # Errors
///
/// Returns [`ProviderError::CredentialResolution`] if a referenced secret is unreadable
/// or a key is missing.
pub async fn resolve_route53_credentials(
    client: &Client,
    spec: &Route53ProviderSpec,
    namespace: &str,
) -> Result<Option<StaticCredentials>, ProviderError> {
    let Some(secret_ref) = spec.auth.as_ref().and_then(|auth| auth.secret_ref.as_ref()) else {
        return Ok(None);
    };

    let access_key_id = read_secret_key(client, &secret_ref.access_key_id, namespace).await?;
    let secret_access_key =
        read_secret_key(client, &secret_ref.secret_access_key, namespace).await?;

    assemble_credentials(access_key_id, secret_access_key).map(Some)
}

/// Bearer token of an HTTP API provider, if one is configured.
///
/// # Errors
///
/// Returns [`ProviderError::CredentialResolution`] if the secret is unreadable or
/// the key is missing.
pub async fn resolve_http_api_token(
    client: &Client,
    spec: &HttpApiProviderSpec,
    namespace: &str,
) -> Result<Option<String>, ProviderError> {
    let Some(selector) = &spec.token_secret_ref else {
        return Ok(None);
    };

    read_secret_key(client, selector, namespace)
        .await?
        .map(Some)
        .ok_or_else(|| ProviderError::CredentialResolution {
            reason: format!("missing API token under key '{}'", selector.key),
        })
}

#[cfg(test)]
#[path = "credentials_tests.rs"]
mod credentials_tests;
