// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! JSON HTTP DNS API provider.
//!
//! # Wire format
//!
//! ```text
//! GET  {endpoint}/zones/{zone}/rrsets?startName=..&startType=..&startIdentifier=..
//!      -> {"recordSets": [...], "isTruncated": bool,
//!          "nextRecordName": .., "nextRecordType": .., "nextRecordIdentifier": ..}
//! POST {endpoint}/zones/{zone}/changes
//!      <- {"changes": [{"action": "CREATE" | "UPSERT", "recordSet": {...}}]}
//! ```
//!
//! Requests carry `Authorization: Bearer <token>` when a token is configured.

use super::{Change, DnsProvider, ListCursor, RecordSet, RecordSetPage};
use crate::constants::HTTP_API_TIMEOUT_SECS;
use crate::errors::{ProviderError, ProviderOperation};
use async_trait::async_trait;
use reqwest::{RequestBuilder, Response};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;
use url::Url;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListResponse {
    #[serde(default)]
    record_sets: Vec<RecordSet>,
    #[serde(default)]
    is_truncated: bool,
    next_record_name: Option<String>,
    next_record_type: Option<String>,
    next_record_identifier: Option<String>,
}

#[derive(Debug, Serialize)]
struct ChangeRequest<'a> {
    changes: &'a [Change],
}

/// Client for one HTTP DNS API endpoint.
#[derive(Debug, Clone)]
pub struct HttpApiProvider {
    client: reqwest::Client,
    base: Url,
    token: Option<String>,
}

fn call_error(zone_id: &str, operation: ProviderOperation, reason: impl Into<String>) -> ProviderError {
    ProviderError::ProviderCall {
        zone_id: zone_id.to_string(),
        operation,
        reason: reason.into(),
    }
}

impl HttpApiProvider {
    /// Creates a client for the API rooted at `endpoint`.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::Configuration`] if the endpoint is not an absolute
    /// URL or the HTTP client cannot be built.
    pub fn new(endpoint: &str, token: Option<String>) -> Result<Self, ProviderError> {
        let mut base = Url::parse(endpoint).map_err(|e| ProviderError::Configuration {
            reason: format!("invalid HTTP API endpoint '{endpoint}': {e}"),
        })?;
        if base.cannot_be_a_base() {
            return Err(ProviderError::Configuration {
                reason: format!("HTTP API endpoint '{endpoint}' cannot be used as a base URL"),
            });
        }
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(HTTP_API_TIMEOUT_SECS))
            .build()
            .map_err(|e| ProviderError::Configuration {
                reason: format!("failed to build HTTP client: {e}"),
            })?;

        Ok(Self {
            client,
            base,
            token,
        })
    }

    fn zone_url(&self, zone_id: &str, resource: &str) -> Result<Url, url::ParseError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
            .pop_if_empty()
            .extend(["zones", zone_id, resource]);
        Ok(url)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

async fn check_status(
    response: Response,
    zone_id: &str,
    operation: ProviderOperation,
) -> Result<Response, ProviderError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(call_error(zone_id, operation, format!("HTTP {status}: {body}")))
}

#[async_trait]
impl DnsProvider for HttpApiProvider {
    fn name(&self) -> &str {
        "http-api"
    }

    async fn list_record_sets(
        &self,
        zone_id: &str,
        start: Option<&ListCursor>,
    ) -> Result<RecordSetPage, ProviderError> {
        let operation = ProviderOperation::ListRecordSets;
        let mut url = self
            .zone_url(zone_id, "rrsets")
            .map_err(|e| call_error(zone_id, operation, e.to_string()))?;
        if let Some(cursor) = start {
            let mut query = url.query_pairs_mut();
            query.append_pair("startName", &cursor.name);
            if let Some(record_type) = &cursor.record_type {
                query.append_pair("startType", record_type);
            }
            if let Some(identifier) = &cursor.identifier {
                query.append_pair("startIdentifier", identifier);
            }
        }

        debug!(url = %url, "Listing record sets over HTTP API");
        let response = self
            .authorize(self.client.get(url))
            .send()
            .await
            .map_err(|e| call_error(zone_id, operation, e.to_string()))?;
        let body: ListResponse = check_status(response, zone_id, operation)
            .await?
            .json()
            .await
            .map_err(|e| call_error(zone_id, operation, format!("invalid response body: {e}")))?;

        let next = body.next_record_name.map(|name| ListCursor {
            name,
            record_type: body.next_record_type,
            identifier: body.next_record_identifier,
        });

        Ok(RecordSetPage {
            record_sets: body.record_sets,
            next,
            truncated: body.is_truncated,
        })
    }

    async fn apply_change_batch(
        &self,
        zone_id: &str,
        changes: &[Change],
    ) -> Result<(), ProviderError> {
        let operation = ProviderOperation::ChangeRecordSets;
        let url = self
            .zone_url(zone_id, "changes")
            .map_err(|e| call_error(zone_id, operation, e.to_string()))?;

        let response = self
            .authorize(self.client.post(url))
            .json(&ChangeRequest { changes })
            .send()
            .await
            .map_err(|e| call_error(zone_id, operation, e.to_string()))?;
        check_status(response, zone_id, operation).await?;

        debug!(zone_id, changes = changes.len(), "Submitted HTTP API change batch");
        Ok(())
    }
}

#[cfg(test)]
#[path = "http_api_tests.rs"]
mod http_api_tests;
