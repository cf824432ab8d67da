// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Canonical representation of one DNS record.
//!
//! An [`Endpoint`] is used both for the desired state built from a
//! [`ResourceRecordSpec`] and for the actual state resolved from a provider
//! listing. Two endpoints are compared with `==`, so construction normalizes
//! the half of the record that does not apply to its shape:
//!
//! - alias endpoints carry an empty `rdata` and a TTL of 0
//! - value endpoints carry a default [`AliasOpts`]
//!
//! Alias target names are compared in their trailing-dot form.

use crate::crd::{RecordClass, ResourceRecordSpec};

/// Alias target of an alias-shaped endpoint.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AliasOpts {
    pub dns_name: String,
    pub hosted_zone_id: String,
    pub evaluate_target_health: bool,
}

/// One DNS record, desired or observed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Endpoint {
    /// Fully qualified, trailing-dot-terminated name.
    pub dns_name: String,
    pub class: RecordClass,
    /// First value of the record set. Empty for alias endpoints.
    pub rdata: String,
    pub ttl: i64,
    /// Set identifier for routing policies.
    pub id: Option<String>,
    /// Owner name this endpoint was built for.
    pub resource_owner: String,
    pub weight: Option<i64>,
    pub is_alias: bool,
    pub alias_target: AliasOpts,
}

/// Joins an owner name and a zone into a trailing-dot-terminated FQDN.
///
/// ```
/// use dns_rr::endpoint::build_fqdn;
///
/// assert_eq!(build_fqdn("www", "example.com"), "www.example.com.");
/// assert_eq!(build_fqdn("www", "example.com."), "www.example.com.");
/// ```
#[must_use]
pub fn build_fqdn(owner: &str, zone: &str) -> String {
    let mut fqdn = format!("{owner}.{zone}");
    if !fqdn.ends_with('.') {
        fqdn.push('.');
    }
    fqdn
}

/// Appends the root label to a non-empty name that lacks it.
///
/// ```
/// use dns_rr::endpoint::absolute_name;
///
/// assert_eq!(absolute_name("lb.example.net"), "lb.example.net.");
/// assert_eq!(absolute_name("lb.example.net."), "lb.example.net.");
/// assert_eq!(absolute_name(""), "");
/// ```
#[must_use]
pub fn absolute_name(name: &str) -> String {
    if name.is_empty() || name.ends_with('.') {
        name.to_string()
    } else {
        format!("{name}.")
    }
}

impl Endpoint {
    /// Desired endpoint template for a record intent.
    ///
    /// The template has no name or owner yet; use [`Endpoint::for_owner`] to
    /// stamp them per owner name.
    #[must_use]
    pub fn desired(spec: &ResourceRecordSpec) -> Self {
        let mut endpoint = Self {
            class: spec.class,
            id: spec.id.clone(),
            weight: spec.weight,
            ..Self::default()
        };

        if spec.is_alias {
            let target = spec.alias_target.clone().unwrap_or_default();
            endpoint.is_alias = true;
            endpoint.alias_target = AliasOpts {
                dns_name: absolute_name(&target.record),
                hosted_zone_id: target.hosted_zone_id,
                evaluate_target_health: target.evaluate_target_health,
            };
        } else {
            endpoint.rdata.clone_from(&spec.rdata);
            endpoint.ttl = i64::from(spec.ttl);
        }

        endpoint
    }

    /// Copy of this endpoint placed at `owner` within `zone`.
    #[must_use]
    pub fn for_owner(&self, owner: &str, zone: &str) -> Self {
        Self {
            dns_name: build_fqdn(owner, zone),
            resource_owner: owner.to_string(),
            ..self.clone()
        }
    }
}

#[cfg(test)]
#[path = "endpoint_tests.rs"]
mod endpoint_tests;
