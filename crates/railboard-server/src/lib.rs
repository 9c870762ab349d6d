//! # railboard-server
//!
//! Read-only REST API over the railboard arrival, departure and service
//! stores.
//!
//! This library provides the route table and handlers, per-route request
//! metrics, and the server lifecycle with its stop/stopped handshake.

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]

pub mod api;
pub mod logging;
pub mod metrics;
pub mod server;
pub mod state;

pub use api::create_router;
pub use metrics::ApiMetrics;
pub use server::{handshake, serve_api, ApiServer, LifecycleState, ServeError, ShutdownHandle};
pub use state::AppState;
