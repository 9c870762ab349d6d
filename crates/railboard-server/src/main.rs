//! # railboard-server
//!
//! Read-only REST API over the railboard arrival, departure and service
//! stores.
//!
//! This binary:
//! - loads configuration (`RAILBOARD_CONFIG`, `RAILBOARD_*` overrides)
//! - restores store snapshots and saves them again on shutdown
//! - serves the REST API, plus Prometheus metrics on a separate address
//!
//! ## Running
//!
//! ```bash
//! # Development
//! cargo run --package railboard-server
//!
//! # Production
//! RAILBOARD_LOGGING__PRODUCTION=true ./railboard-server
//! ```

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use railboard_core::{Config, Storage, Stores};
use railboard_server::metrics::exposition_router;
use railboard_server::{handshake, logging, serve_api, ApiMetrics, AppState, ServeError};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::{JoinError, JoinHandle};
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            eprintln!("railboard-server: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> anyhow::Result<()> {
    let config = Config::load().context("Failed to load configuration")?;
    logging::init(&config.logging).context("Failed to initialize logging")?;

    info!(version = env!("CARGO_PKG_VERSION"), "Starting railboard-server");

    let storage = match &config.storage.data_dir {
        Some(dir) => Storage::new(dir.clone()),
        None => Storage::default_location()?,
    };
    let stores = Stores::new();
    storage
        .load_into(&stores)
        .await
        .context("Failed to restore snapshots")?;

    let metrics = ApiMetrics::shared().context("Failed to create metrics registry")?;
    let exposition = match &config.metrics.address {
        Some(address) => Some(start_exposition(address, metrics.clone()).await?),
        None => None,
    };

    let (shutdown, server_handshake) = handshake();
    let mut api = tokio::spawn({
        let api_config = config.api.clone();
        let state = AppState::new(stores.clone());
        async move { serve_api(&api_config, state, metrics, server_handshake).await }
    });

    let served = tokio::select! {
        result = tokio::signal::ctrl_c() => {
            result.context("Failed to listen for Ctrl-C")?;
            info!("Received Ctrl-C, initiating shutdown");
            if shutdown.stop().await.is_err() {
                warn!("REST API did not acknowledge shutdown");
            }
            flatten((&mut api).await)
        }
        result = &mut api => flatten(result),
    };

    if let Some((stop, task)) = exposition {
        let _ = stop.send(());
        if let Err(e) = task.await {
            warn!(error = %e, "Metrics listener task failed");
        }
    }

    storage
        .save(&stores)
        .await
        .context("Failed to save snapshots")?;

    served.context("REST API failed")?;
    info!("railboard-server shut down");
    Ok(())
}

fn flatten(result: Result<Result<(), ServeError>, JoinError>) -> Result<(), ServeError> {
    result.map_err(ServeError::from).and_then(|served| served)
}

/// Serve the metrics registry on its own address until told to stop.
async fn start_exposition(
    address: &str,
    metrics: Arc<ApiMetrics>,
) -> anyhow::Result<(oneshot::Sender<()>, JoinHandle<()>)> {
    let listener = TcpListener::bind(address)
        .await
        .with_context(|| format!("Failed to bind metrics listener to {address}"))?;
    info!(address = %listener.local_addr()?, "Metrics listener started");

    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    let task = tokio::spawn(async move {
        let served = axum::serve(listener, exposition_router(metrics))
            .with_graceful_shutdown(async move {
                let _ = stop_rx.await;
            })
            .await;
        if let Err(e) = served {
            error!(error = %e, "Metrics listener failed");
        }
    });

    Ok((stop_tx, task))
}
