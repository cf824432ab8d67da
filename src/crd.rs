// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Custom Resource Definitions (CRDs) for DNS record convergence.
//!
//! # Resource Types
//!
//! - [`ResourceRecord`] - One desired DNS record, replicated across the names of an [`Owner`]
//! - [`Owner`] - A named group of record owner names (e.g. `www`, `api`)
//! - [`Provider`] - A DNS zone hosted by an external provider plus its credentials
//!
//! # Example: Declaring a record
//!
//! ```rust,no_run
//! use dns_rr::crd::{RecordClass, ResourceRecordSpec};
//!
//! let spec = ResourceRecordSpec {
//!     class: RecordClass::A,
//!     ttl: 300,
//!     owner_ref: "web".to_string(),
//!     provider_ref: "example-com".to_string(),
//!     rdata: "192.0.2.10".to_string(),
//!     ..ResourceRecordSpec::default()
//! };
//! ```

use crate::errors::ProviderError;
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// DNS record type managed by a [`ResourceRecord`].
#[allow(clippy::upper_case_acronyms)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum RecordClass {
    #[default]
    A,
    NS,
    AAAA,
    MX,
    CNAME,
    SRV,
    TXT,
}

impl RecordClass {
    /// Record type as it appears on the wire and in provider APIs.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::A => "A",
            Self::NS => "NS",
            Self::AAAA => "AAAA",
            Self::MX => "MX",
            Self::CNAME => "CNAME",
            Self::SRV => "SRV",
            Self::TXT => "TXT",
        }
    }
}

impl fmt::Display for RecordClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordClass {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "A" => Ok(Self::A),
            "NS" => Ok(Self::NS),
            "AAAA" => Ok(Self::AAAA),
            "MX" => Ok(Self::MX),
            "CNAME" => Ok(Self::CNAME),
            "SRV" => Ok(Self::SRV),
            "TXT" => Ok(Self::TXT),
            other => Err(format!("unsupported record class '{other}'")),
        }
    }
}

/// Alias target of an alias-shaped record.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AliasTargetSpec {
    /// DNS name the alias points at (e.g. a load balancer hostname).
    pub record: String,

    /// Whether the provider should evaluate the health of the alias target.
    #[serde(default)]
    pub evaluate_target_health: bool,

    /// Hosted zone that contains the alias target.
    #[serde(
        rename = "hostedZoneID",
        default,
        skip_serializing_if = "String::is_empty"
    )]
    pub hosted_zone_id: String,
}

/// `ResourceRecord` declares one DNS record that should exist under every name of an `Owner`.
#[derive(CustomResource, Clone, Debug, Default, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "dns.ch1aki.github.io",
    version = "v1alpha1",
    kind = "ResourceRecord",
    namespaced,
    shortname = "rr",
    printcolumn = r#"{"name":"Class","type":"string","jsonPath":".spec.class"}"#,
    printcolumn = r#"{"name":"Owner","type":"string","jsonPath":".spec.ownerRef"}"#,
    printcolumn = r#"{"name":"Provider","type":"string","jsonPath":".spec.providerRef"}"#,
    printcolumn = r#"{"name":"Ready","type":"string","jsonPath":".status.conditions[?(@.type=='Ready')].status"}"#,
    doc = "ResourceRecord declares a DNS record that is converged into the zone of a Provider for every name listed by an Owner. Records are created or updated, never deleted."
)]
#[kube(status = "RecordStatus")]
#[serde(rename_all = "camelCase")]
pub struct ResourceRecordSpec {
    /// Record type.
    pub class: RecordClass,

    /// Time to live in seconds. Ignored for alias records.
    #[serde(default)]
    #[schemars(range(min = 0, max = 2_147_483_647))]
    pub ttl: i32,

    /// Routing weight. Presence turns the record into a weighted record and requires `id`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(range(min = 0, max = 255))]
    pub weight: Option<i64>,

    /// Name of the `Owner` in the same namespace whose names receive this record.
    pub owner_ref: String,

    /// Name of the `Provider` in the same namespace that hosts the zone.
    pub provider_ref: String,

    /// Record value. Only the first value of a record set is managed.
    #[serde(default)]
    pub rdata: String,

    /// Whether the record is an alias to another DNS name.
    #[serde(default)]
    pub is_alias: bool,

    /// Alias target, used when `isAlias` is true.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias_target: Option<AliasTargetSpec>,

    /// Set identifier distinguishing records that share a name and type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Compute the changes but do not submit them to the provider.
    #[serde(default)]
    pub dry_run: bool,
}

/// `Owner` lists the record owner names (relative to the zone) a `ResourceRecord` applies to.
#[derive(CustomResource, Clone, Debug, Default, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "dns.ch1aki.github.io",
    version = "v1alpha1",
    kind = "Owner",
    namespaced,
    doc = "Owner is a named group of owner names. Every ResourceRecord referencing it is converged for each name, in order."
)]
#[kube(status = "RecordStatus")]
#[serde(rename_all = "camelCase")]
pub struct OwnerSpec {
    /// Owner names relative to the zone, e.g. `www` for `www.example.com.`.
    #[serde(default)]
    pub names: Vec<String>,
}

/// Reference to one key of a Kubernetes `Secret`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SecretKeySelector {
    /// Secret name.
    pub name: String,

    /// Secret namespace. Defaults to the namespace of the referencing `Provider`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,

    /// Key within the secret data.
    pub key: String,
}

/// Static access key credentials stored in secrets.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AwsAuthSecretRef {
    #[serde(rename = "accessKeyIDSecretRef")]
    pub access_key_id: SecretKeySelector,

    #[serde(rename = "secretAccessKeySecretRef")]
    pub secret_access_key: SecretKeySelector,
}

/// Authentication for the Route 53 provider.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AwsAuth {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_ref: Option<AwsAuthSecretRef>,
}

/// Zone hosted in AWS Route 53.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Route53ProviderSpec {
    #[serde(rename = "hostedZoneID")]
    pub hosted_zone_id: String,

    /// Zone apex, e.g. `example.com` or `example.com.`.
    pub hosted_zone_name: String,

    /// AWS region used to sign requests. Required.
    #[serde(default)]
    pub region: String,

    /// Static credentials. When omitted the default AWS credential chain is used.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth: Option<AwsAuth>,
}

/// Zone hosted behind a JSON HTTP DNS API.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct HttpApiProviderSpec {
    /// Base URL of the API, e.g. `https://dns.example.net/api/v1/`.
    pub endpoint: String,

    #[serde(rename = "zoneID")]
    pub zone_id: String,

    pub zone_name: String,

    /// Bearer token used to authenticate requests.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_secret_ref: Option<SecretKeySelector>,
}

/// `Provider` describes the DNS zone records are converged into and how to reach it.
#[derive(CustomResource, Clone, Debug, Default, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "dns.ch1aki.github.io",
    version = "v1alpha1",
    kind = "Provider",
    namespaced,
    printcolumn = r#"{"name":"Ready","type":"string","jsonPath":".status.conditions[?(@.type=='Ready')].status"}"#,
    doc = "Provider describes a DNS zone hosted by an external DNS service and the credentials used to manage it. Exactly one backend must be configured."
)]
#[kube(status = "RecordStatus")]
#[serde(rename_all = "camelCase")]
pub struct ProviderSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub route53: Option<Route53ProviderSpec>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http_api: Option<HttpApiProviderSpec>,
}

impl ProviderSpec {
    /// Zone id and zone name of the configured backend.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::Configuration`] unless exactly one backend is configured.
    pub fn zone(&self) -> Result<(&str, &str), ProviderError> {
        match (&self.route53, &self.http_api) {
            (Some(r53), None) => Ok((&r53.hosted_zone_id, &r53.hosted_zone_name)),
            (None, Some(api)) => Ok((&api.zone_id, &api.zone_name)),
            (None, None) => Err(ProviderError::Configuration {
                reason: "no provider backend configured".to_string(),
            }),
            (Some(_), Some(_)) => Err(ProviderError::Configuration {
                reason: "only one provider backend may be configured".to_string(),
            }),
        }
    }
}

/// Standard Kubernetes condition.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    /// Type of condition, e.g. Ready.
    pub r#type: String,

    /// Status of the condition: True, False, or Unknown.
    pub status: String,

    /// Brief CamelCase reason for the condition's last transition.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,

    /// Human-readable message indicating details about the transition.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Last time the condition transitioned from one status to another (RFC3339 format).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_transition_time: Option<String>,
}

/// Status shared by all dns-rr resources
#[derive(Clone, Debug, Serialize, Deserialize, Default, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecordStatus {
    #[serde(default)]
    pub conditions: Vec<Condition>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observed_generation: Option<i64>,
}

#[cfg(test)]
#[path = "crd_tests.rs"]
mod crd_tests;
