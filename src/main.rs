// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

use anyhow::{Context as _, Result};
use axum::{http::StatusCode, response::IntoResponse, routing::get, Router};
use clap::Parser;
use dns_rr::{
    config::Config,
    constants::{KIND_PROVIDER, KIND_RESOURCE_RECORD, METRICS_PATH},
    context::Context,
    crd::{Owner, Provider, ResourceRecord},
    metrics,
    reconcilers::{
        reconcile_provider, reconcile_resource_record,
        resourcerecord::{records_for_owner, records_for_provider},
        KubeRefreshSource,
    },
    refresh::ZoneCacheRefresher,
    zone_cache::ZoneCache,
};
use futures::StreamExt;
use kube::{
    runtime::{
        controller::Action, predicates, reflector, watcher, watcher::Config as WatcherConfig,
        Controller, WatchStreamExt,
    },
    Api, Client, ResourceExt,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

#[derive(Debug, thiserror::Error)]
#[error(transparent)]
struct ReconcileError(#[from] anyhow::Error);

fn main() -> Result<()> {
    let config = Config::parse();

    // Build Tokio runtime with custom thread names
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(config.worker_threads.max(1))
        .thread_name("dns-rr-controller")
        .enable_all()
        .build()?;

    runtime.block_on(async_main(config))
}

/// Initialize logging.
///
/// Respects `RUST_LOG` (default `info`) and `RUST_LOG_FORMAT` (`text` or `json`).
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let log_format = std::env::var("RUST_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    match log_format.to_lowercase().as_str() {
        "json" => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_file(true)
                .with_line_number(true)
                .with_thread_names(true)
                .with_target(false)
                .json()
                .init();
        }
        _ => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_file(true)
                .with_line_number(true)
                .with_thread_names(true)
                .with_target(false)
                .with_ansi(true)
                .compact()
                .init();
        }
    }
}

async fn async_main(config: Config) -> Result<()> {
    init_tracing();

    info!(
        cache_refresh_interval_secs = config.cache_refresh_interval_secs,
        requeue_interval_secs = config.requeue_interval_secs,
        metrics_port = config.metrics_port,
        "Starting dns-rr controller"
    );

    debug!("Initializing Kubernetes client");
    let client = Client::try_default()
        .await
        .context("Failed to initialize Kubernetes client")?;

    let shutdown = CancellationToken::new();
    let zone_cache = Arc::new(ZoneCache::new());

    let refresher = ZoneCacheRefresher::new(
        zone_cache.clone(),
        Arc::new(KubeRefreshSource::new(client.clone())),
        config.cache_refresh_interval(),
    )
    .with_cancellation(shutdown.child_token())
    .start();

    let metrics_port = config.metrics_port;
    let ctx = Arc::new(Context::new(client, zone_cache, config, shutdown.clone()));

    info!("Starting all controllers");

    // Controllers should never exit; if one does, shut down the process.
    let result = tokio::select! {
        result = run_resource_record_controller(ctx.clone()) => {
            error!("CRITICAL: ResourceRecord controller exited unexpectedly: {:?}", result);
            result.and_then(|()| Err(anyhow::anyhow!("ResourceRecord controller exited unexpectedly without error")))
        }
        result = run_provider_controller(ctx.clone()) => {
            error!("CRITICAL: Provider controller exited unexpectedly: {:?}", result);
            result.and_then(|()| Err(anyhow::anyhow!("Provider controller exited unexpectedly without error")))
        }
        result = run_metrics_server(metrics_port) => {
            error!("CRITICAL: metrics server exited unexpectedly: {:?}", result);
            result.and_then(|()| Err(anyhow::anyhow!("Metrics server exited unexpectedly without error")))
        }
        result = shutdown_signal() => {
            info!("Shutdown signal received, stopping controllers");
            result
        }
    };

    shutdown.cancel();
    refresher.stop().await;
    info!("Graceful shutdown completed");

    result
}

/// Resolves on SIGINT or, on Unix, SIGTERM.
async fn shutdown_signal() -> Result<()> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut sigterm = signal(SignalKind::terminate())?;
        tokio::select! {
            result = tokio::signal::ctrl_c() => result?,
            _ = sigterm.recv() => info!("Received SIGTERM"),
        }
    }
    #[cfg(not(unix))]
    tokio::signal::ctrl_c().await?;

    Ok(())
}

/// Run the `ResourceRecord` controller.
///
/// Only spec changes (a new `metadata.generation`) trigger a reconcile, so the
/// controller's own status patches do not. Changes to an `Owner` or `Provider`
/// requeue every record referencing it.
async fn run_resource_record_controller(ctx: Arc<Context>) -> Result<()> {
    info!("Starting ResourceRecord controller");

    let records = Api::<ResourceRecord>::all(ctx.client.clone());
    let owners = Api::<Owner>::all(ctx.client.clone());
    let providers = Api::<Provider>::all(ctx.client.clone());

    let (reader, writer) = reflector::store();
    let record_stream = watcher(records, WatcherConfig::default())
        .default_backoff()
        .reflect(writer)
        .applied_objects()
        .predicate_filter(predicates::generation, Default::default());

    let controller = Controller::for_stream(record_stream, reader);
    let owner_store = controller.store();
    let provider_store = owner_store.clone();

    controller
        .watches(owners, WatcherConfig::default(), move |owner: Owner| {
            records_for_owner(&owner_store.state(), &owner)
        })
        .watches(providers, WatcherConfig::default(), move |provider: Provider| {
            records_for_provider(&provider_store.state(), &provider)
        })
        .run(reconcile_resource_record_wrapper, error_policy, ctx)
        .for_each(|_| futures::future::ready(()))
        .await;

    Ok(())
}

/// Run the `Provider` controller
async fn run_provider_controller(ctx: Arc<Context>) -> Result<()> {
    info!("Starting Provider controller");

    let api = Api::<Provider>::all(ctx.client.clone());

    Controller::new(api, WatcherConfig::default())
        .run(reconcile_provider_wrapper, error_policy, ctx)
        .for_each(|_| futures::future::ready(()))
        .await;

    Ok(())
}

/// Reconcile wrapper for `ResourceRecord`
async fn reconcile_resource_record_wrapper(
    record: Arc<ResourceRecord>,
    ctx: Arc<Context>,
) -> Result<Action, ReconcileError> {
    let start = Instant::now();

    match reconcile_resource_record(ctx.clone(), record.clone()).await {
        Ok(()) => {
            metrics::record_reconciliation_success(KIND_RESOURCE_RECORD, start.elapsed());
            debug!(
                "Successfully reconciled ResourceRecord: {}",
                record.name_any()
            );
            Ok(Action::requeue(ctx.config.requeue_interval()))
        }
        Err(e) => {
            metrics::record_reconciliation_error(KIND_RESOURCE_RECORD, start.elapsed());
            error!(
                "Failed to reconcile ResourceRecord {}: {:#}",
                record.name_any(),
                e
            );
            Err(e.into())
        }
    }
}

/// Reconcile wrapper for `Provider`
async fn reconcile_provider_wrapper(
    provider: Arc<Provider>,
    ctx: Arc<Context>,
) -> Result<Action, ReconcileError> {
    let start = Instant::now();

    match reconcile_provider(ctx, provider.clone()).await {
        Ok(action) => {
            metrics::record_reconciliation_success(KIND_PROVIDER, start.elapsed());
            debug!("Successfully reconciled Provider: {}", provider.name_any());
            Ok(action)
        }
        Err(e) => {
            metrics::record_reconciliation_error(KIND_PROVIDER, start.elapsed());
            error!("Failed to reconcile Provider {}: {:#}", provider.name_any(), e);
            Err(e.into())
        }
    }
}

/// Error policy shared by all controllers
fn error_policy<K: kube::Resource<DynamicType = ()>>(
    _resource: Arc<K>,
    _err: &ReconcileError,
    ctx: Arc<Context>,
) -> Action {
    metrics::record_reconciliation_requeue(&K::kind(&()), "error");
    Action::requeue(ctx.config.error_requeue())
}

/// Serve Prometheus metrics until the listener fails.
async fn run_metrics_server(port: u16) -> Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind metrics server to {addr}"))?;

    info!("Serving metrics on http://{addr}{METRICS_PATH}");
    axum::serve(listener, metrics_router())
        .await
        .context("Metrics server failed")
}

fn metrics_router() -> Router {
    Router::new().route(METRICS_PATH, get(metrics_handler))
}

async fn metrics_handler() -> impl IntoResponse {
    match metrics::gather_metrics() {
        Ok(body) => (StatusCode::OK, body),
        Err(e) => {
            error!("Failed to encode metrics: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}
