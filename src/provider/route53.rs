// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! AWS Route 53 provider.

use super::{AliasTarget, Change, ChangeAction, DnsProvider, ListCursor, RecordSet, RecordSetPage};
use crate::constants::AWS_CREDENTIALS_PROVIDER_NAME;
use crate::credentials::StaticCredentials;
use crate::errors::{ProviderError, ProviderOperation};
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_credential_types::Credentials;
use aws_sdk_route53::error::{BuildError, DisplayErrorContext};
use aws_sdk_route53::types;
use aws_sdk_route53::Client;
use aws_types::region::Region;
use tracing::debug;

/// Route 53 client for one region.
#[derive(Debug, Clone)]
pub struct Route53Provider {
    client: Client,
}

impl Route53Provider {
    /// Builds a client for `region`.
    ///
    /// Static credentials take precedence; without them the default AWS
    /// credential chain (environment, profile, IRSA, instance metadata) is used.
    pub async fn connect(region: &str, credentials: Option<StaticCredentials>) -> Self {
        let mut loader =
            aws_config::defaults(BehaviorVersion::latest()).region(Region::new(region.to_string()));

        if let Some(creds) = credentials {
            loader = loader.credentials_provider(Credentials::new(
                creds.access_key_id,
                creds.secret_access_key,
                None,
                None,
                AWS_CREDENTIALS_PROVIDER_NAME,
            ));
        }

        let sdk_config = loader.load().await;
        debug!(region, "Created Route 53 client");

        Self {
            client: Client::new(&sdk_config),
        }
    }

    #[must_use]
    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

/// Converts an SDK record set into the provider-neutral shape.
pub(crate) fn from_sdk_record_set(rrs: &types::ResourceRecordSet) -> RecordSet {
    RecordSet {
        name: rrs.name().to_string(),
        record_type: rrs.r#type().as_str().to_string(),
        ttl: rrs.ttl(),
        records: rrs
            .resource_records()
            .iter()
            .map(|rr| rr.value().to_string())
            .collect(),
        set_identifier: rrs.set_identifier().map(str::to_string),
        weight: rrs.weight(),
        alias_target: rrs.alias_target().map(|target| AliasTarget {
            dns_name: target.dns_name().to_string(),
            hosted_zone_id: target.hosted_zone_id().to_string(),
            evaluate_target_health: target.evaluate_target_health(),
        }),
    }
}

/// Converts a provider-neutral change into an SDK change.
pub(crate) fn to_sdk_change(change: &Change) -> Result<types::Change, BuildError> {
    let rs = &change.record_set;

    let alias_target = rs
        .alias_target
        .as_ref()
        .map(|target| {
            types::AliasTarget::builder()
                .dns_name(&target.dns_name)
                .hosted_zone_id(&target.hosted_zone_id)
                .evaluate_target_health(target.evaluate_target_health)
                .build()
        })
        .transpose()?;

    let resource_records = if rs.records.is_empty() {
        None
    } else {
        Some(
            rs.records
                .iter()
                .map(|value| types::ResourceRecord::builder().value(value).build())
                .collect::<Result<Vec<_>, _>>()?,
        )
    };

    let record_set = types::ResourceRecordSet::builder()
        .name(&rs.name)
        .r#type(types::RrType::from(rs.record_type.as_str()))
        .set_ttl(rs.ttl)
        .set_resource_records(resource_records)
        .set_set_identifier(rs.set_identifier.clone())
        .set_weight(rs.weight)
        .set_alias_target(alias_target)
        .build()?;

    let action = match change.action {
        ChangeAction::Create => types::ChangeAction::Create,
        ChangeAction::Upsert => types::ChangeAction::Upsert,
    };

    types::Change::builder()
        .action(action)
        .resource_record_set(record_set)
        .build()
}

fn call_error(zone_id: &str, operation: ProviderOperation, reason: String) -> ProviderError {
    ProviderError::ProviderCall {
        zone_id: zone_id.to_string(),
        operation,
        reason,
    }
}

#[async_trait]
impl DnsProvider for Route53Provider {
    fn name(&self) -> &str {
        "route53"
    }

    async fn list_record_sets(
        &self,
        zone_id: &str,
        start: Option<&ListCursor>,
    ) -> Result<RecordSetPage, ProviderError> {
        let output = self
            .client
            .list_resource_record_sets()
            .hosted_zone_id(zone_id)
            .set_start_record_name(start.map(|c| c.name.clone()))
            .set_start_record_type(
                start
                    .and_then(|c| c.record_type.as_deref())
                    .map(types::RrType::from),
            )
            .set_start_record_identifier(start.and_then(|c| c.identifier.clone()))
            .send()
            .await
            .map_err(|e| {
                call_error(
                    zone_id,
                    ProviderOperation::ListRecordSets,
                    DisplayErrorContext(&e).to_string(),
                )
            })?;

        let next = output.next_record_name().map(|name| ListCursor {
            name: name.to_string(),
            record_type: output.next_record_type().map(|t| t.as_str().to_string()),
            identifier: output.next_record_identifier().map(str::to_string),
        });

        Ok(RecordSetPage {
            record_sets: output
                .resource_record_sets()
                .iter()
                .map(from_sdk_record_set)
                .collect(),
            next,
            truncated: output.is_truncated(),
        })
    }

    async fn apply_change_batch(
        &self,
        zone_id: &str,
        changes: &[Change],
    ) -> Result<(), ProviderError> {
        let build_error =
            |e: BuildError| call_error(zone_id, ProviderOperation::ChangeRecordSets, e.to_string());

        let sdk_changes = changes
            .iter()
            .map(to_sdk_change)
            .collect::<Result<Vec<_>, _>>()
            .map_err(build_error)?;
        let batch = types::ChangeBatch::builder()
            .set_changes(Some(sdk_changes))
            .build()
            .map_err(build_error)?;

        self.client
            .change_resource_record_sets()
            .hosted_zone_id(zone_id)
            .change_batch(batch)
            .send()
            .await
            .map_err(|e| {
                call_error(
                    zone_id,
                    ProviderOperation::ChangeRecordSets,
                    DisplayErrorContext(&e).to_string(),
                )
            })?;

        debug!(
            zone_id,
            changes = changes.len(),
            "Submitted Route 53 change batch"
        );
        Ok(())
    }
}

#[cfg(test)]
#[path = "route53_tests.rs"]
mod route53_tests;
