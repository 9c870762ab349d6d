//! REST API server lifecycle.
//!
//! The server moves through `Idle → Starting → Serving → Stopping → Stopped`.
//! Its owner controls it through a two-signal handshake: a stop request sent
//! by the [`ShutdownHandle`] and a stopped acknowledgment sent back by the
//! server once the listener is closed and the accept loop has ended. The
//! acknowledgment is never sent before the stop request has been received.
//!
//! Listen failures are reported as [`ServeError`]; deciding whether they end
//! the process is left to the caller.

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use railboard_core::ApiConfig;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::{oneshot, watch};
use tokio::task::JoinError;
use tracing::{debug, info, warn};

use crate::api::create_router;
use crate::metrics::ApiMetrics;
use crate::state::AppState;

/// Lifecycle state of an [`ApiServer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    /// Constructed, nothing bound yet.
    Idle,
    /// Listener bound, not yet accepting.
    Starting,
    /// Accepting connections.
    Serving,
    /// Stop requested, listener closing.
    Stopping,
    /// Accept loop ended. Terminal.
    Stopped,
}

/// Listen failures of the REST API server.
///
/// A close caused by a stop request is not an error.
#[derive(Debug, Error)]
pub enum ServeError {
    /// The listening socket could not be bound.
    #[error("failed to bind REST API to {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: io::Error,
    },

    /// The accept loop ended without a stop request.
    #[error("REST API stopped serving unexpectedly: {0}")]
    Serve(#[source] io::Error),

    /// The accept loop task panicked.
    #[error("REST API task failed: {0}")]
    Join(#[from] JoinError),
}

/// The server ended without acknowledging the stop request.
#[derive(Debug, Error)]
#[error("REST API exited without acknowledging shutdown")]
pub struct ShutdownError;

/// Owner side of the handshake.
#[derive(Debug)]
pub struct ShutdownHandle {
    stop: oneshot::Sender<()>,
    stopped: oneshot::Receiver<()>,
}

/// Server side of the handshake, passed to [`ApiServer::run`].
#[derive(Debug)]
pub struct Handshake {
    stop: oneshot::Receiver<()>,
    stopped: oneshot::Sender<()>,
}

/// Create a connected handshake pair.
#[must_use]
pub fn handshake() -> (ShutdownHandle, Handshake) {
    let (stop_tx, stop_rx) = oneshot::channel();
    let (stopped_tx, stopped_rx) = oneshot::channel();

    (
        ShutdownHandle {
            stop: stop_tx,
            stopped: stopped_rx,
        },
        Handshake {
            stop: stop_rx,
            stopped: stopped_tx,
        },
    )
}

impl ShutdownHandle {
    /// Request a stop and wait for the acknowledgment.
    ///
    /// # Errors
    ///
    /// Returns [`ShutdownError`] if the server ended without acknowledging,
    /// which happens when it already failed with a [`ServeError`].
    pub async fn stop(self) -> Result<(), ShutdownError> {
        // The server may already be gone; the acknowledgment tells.
        let _ = self.stop.send(());
        self.stopped.await.map_err(|_| ShutdownError)
    }
}

/// A bound REST API server.
pub struct ApiServer {
    listener: TcpListener,
    router: Router,
    local_addr: SocketAddr,
    state: watch::Sender<LifecycleState>,
}

impl ApiServer {
    /// Bind `address` (`host:port`) for `router`.
    ///
    /// # Errors
    ///
    /// Returns [`ServeError::Bind`] if the address cannot be bound.
    pub async fn bind(address: &str, router: Router) -> Result<Self, ServeError> {
        let (state, _) = watch::channel(LifecycleState::Idle);

        let bind_error = |source| ServeError::Bind {
            address: address.to_string(),
            source,
        };
        let listener = TcpListener::bind(address).await.map_err(bind_error)?;
        let local_addr = listener.local_addr().map_err(bind_error)?;

        transition(&state, LifecycleState::Starting);

        Ok(Self {
            listener,
            router,
            local_addr,
            state,
        })
    }

    /// Address the listener is bound to.
    #[must_use]
    pub const fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Observe lifecycle transitions.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<LifecycleState> {
        self.state.subscribe()
    }

    /// Serve until the handshake's stop request arrives.
    ///
    /// After the stop request the listener is closed and in-flight requests
    /// get `grace` to finish before the accept loop is aborted. The stopped
    /// acknowledgment is sent last. A dropped [`ShutdownHandle`] counts as a
    /// stop request.
    ///
    /// # Errors
    ///
    /// Returns [`ServeError::Serve`] if the accept loop ends before a stop
    /// request, and [`ServeError::Join`] if it panics.
    pub async fn run(self, handshake: Handshake, grace: Duration) -> Result<(), ServeError> {
        let Self {
            listener,
            router,
            local_addr,
            state,
        } = self;
        let Handshake { stop, stopped } = handshake;

        let (close_tx, close_rx) = oneshot::channel::<()>();
        let mut accept_loop = tokio::spawn(async move {
            axum::serve(listener, router)
                .with_graceful_shutdown(async move {
                    let _ = close_rx.await;
                })
                .await
        });

        transition(&state, LifecycleState::Serving);
        info!(address = %local_addr, "REST API started");

        tokio::select! {
            _ = stop => {}
            result = &mut accept_loop => {
                transition(&state, LifecycleState::Stopped);
                return Err(match result {
                    Ok(Ok(())) => ServeError::Serve(io::Error::other("accept loop ended")),
                    Ok(Err(e)) => ServeError::Serve(e),
                    Err(e) => ServeError::Join(e),
                });
            }
        }

        info!("Shutting down REST API");
        transition(&state, LifecycleState::Stopping);
        let _ = close_tx.send(());

        let outcome = match tokio::time::timeout(grace, &mut accept_loop).await {
            Ok(Ok(Ok(()))) => Ok(()),
            Ok(Ok(Err(e))) => {
                // Errors after a stop request are part of the close.
                debug!(error = %e, "Accept loop ended with error during shutdown");
                Ok(())
            }
            Ok(Err(e)) => Err(ServeError::Join(e)),
            Err(_) => {
                warn!(
                    grace_secs = grace.as_secs_f64(),
                    "In-flight requests outlived the grace period, aborting"
                );
                accept_loop.abort();
                let _ = accept_loop.await;
                Ok(())
            }
        };

        transition(&state, LifecycleState::Stopped);
        let _ = stopped.send(());
        info!("REST API shut down");

        outcome
    }
}

fn transition(state: &watch::Sender<LifecycleState>, next: LifecycleState) {
    let previous = state.send_replace(next);
    debug!(?previous, ?next, "REST API lifecycle transition");
}

/// Build the router, bind the configured address and serve until stopped.
///
/// # Errors
///
/// See [`ApiServer::bind`] and [`ApiServer::run`].
pub async fn serve_api(
    config: &ApiConfig,
    state: AppState,
    metrics: Arc<ApiMetrics>,
    handshake: Handshake,
) -> Result<(), ServeError> {
    let router = create_router(state, metrics);
    let server = ApiServer::bind(&config.address, router).await?;
    server.run(handshake, config.shutdown_grace()).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn router() -> Router {
        create_router(AppState::default(), ApiMetrics::shared().unwrap())
    }

    #[tokio::test]
    async fn test_bind_moves_to_starting() {
        let server = ApiServer::bind("127.0.0.1:0", router()).await.unwrap();
        assert_eq!(*server.subscribe().borrow(), LifecycleState::Starting);
        assert_ne!(server.local_addr().port(), 0);
    }

    #[tokio::test]
    async fn test_bind_conflict_is_bind_error() {
        let first = ApiServer::bind("127.0.0.1:0", router()).await.unwrap();
        let address = first.local_addr().to_string();

        let err = ApiServer::bind(&address, router()).await.err().unwrap();
        assert!(matches!(err, ServeError::Bind { .. }));
        assert!(err.to_string().contains(&address));
    }

    #[tokio::test]
    async fn test_stop_walks_through_all_states() {
        let server = ApiServer::bind("127.0.0.1:0", router()).await.unwrap();
        let mut states = server.subscribe();
        let (handle, handshake) = handshake();

        let task = tokio::spawn(server.run(handshake, Duration::from_secs(1)));

        states
            .wait_for(|state| *state == LifecycleState::Serving)
            .await
            .unwrap();

        handle.stop().await.unwrap();
        assert_eq!(*states.borrow(), LifecycleState::Stopped);
        task.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_dropped_handle_counts_as_stop() {
        let server = ApiServer::bind("127.0.0.1:0", router()).await.unwrap();
        let states = server.subscribe();
        let (handle, handshake) = handshake();
        drop(handle);

        tokio::time::timeout(
            Duration::from_secs(2),
            server.run(handshake, Duration::from_secs(1)),
        )
        .await
        .unwrap()
        .unwrap();

        assert_eq!(*states.borrow(), LifecycleState::Stopped);
    }

    #[tokio::test]
    async fn test_stop_without_server_reports_missing_ack() {
        let (handle, handshake) = handshake();
        drop(handshake);
        assert!(handle.stop().await.is_err());
    }

    #[tokio::test]
    async fn test_serve_api_reports_bind_failure() {
        let taken = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let config = ApiConfig {
            address: taken.local_addr().unwrap().to_string(),
            ..ApiConfig::default()
        };
        let (_handle, handshake) = handshake();

        let result = serve_api(
            &config,
            AppState::default(),
            ApiMetrics::shared().unwrap(),
            handshake,
        )
        .await;
        assert!(matches!(result, Err(ServeError::Bind { .. })));
    }
}
