// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Paged listing of cluster resources.
//!
//! The zone cache refresh task enumerates every `Provider` in the cluster on
//! each tick. Listing in pages of [`KUBE_LIST_PAGE_SIZE`] keeps that request
//! bounded regardless of how many providers exist.

use crate::constants::KUBE_LIST_PAGE_SIZE;
use anyhow::{Context as _, Result};
use kube::{api::ListParams, Api, Resource};
use serde::de::DeserializeOwned;
use std::fmt::Debug;
use tracing::debug;

/// Parameters of the page following one that returned `continue_token`.
///
/// Returns `None` when the listing is complete. An empty token counts as
/// the end of the listing.
#[must_use]
pub fn next_page(params: &ListParams, continue_token: Option<String>) -> Option<ListParams> {
    let token = continue_token.filter(|token| !token.is_empty())?;
    Some(ListParams {
        continue_token: Some(token),
        ..params.clone()
    })
}

/// Lists every `K` matching `list_params`, following continue tokens.
///
/// # Errors
///
/// Returns an error naming the failed page if a list call fails.
pub async fn list_all_paginated<K>(api: &Api<K>, list_params: ListParams) -> Result<Vec<K>>
where
    K: Resource<DynamicType = ()> + Clone + DeserializeOwned + Debug,
{
    let mut params = ListParams {
        limit: Some(KUBE_LIST_PAGE_SIZE),
        ..list_params
    };
    let mut items = Vec::new();
    let mut pages = 0_usize;

    loop {
        pages += 1;
        let page = api
            .list(&params)
            .await
            .with_context(|| format!("Failed to list {} (page {pages})", K::kind(&())))?;
        items.extend(page.items);

        match next_page(&params, page.metadata.continue_) {
            Some(next) => params = next,
            None => break,
        }
    }

    debug!(kind = %K::kind(&()), pages, items = items.len(), "Listed resources");
    Ok(items)
}

#[cfg(test)]
#[path = "pagination_tests.rs"]
mod pagination_tests;
