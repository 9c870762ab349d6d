//! HTTP API routes and handlers.
//!
//! This module contains all HTTP endpoint implementations organized by domain:
//! - `version` - API protocol version
//! - `status` - Store status
//! - `arrivals`, `departures`, `services` - Store statistics, station boards and details
//! - `error` - API error types
//! - `openapi` - OpenAPI specification generation

use std::sync::Arc;

use axum::middleware;
use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::metrics::{track_metrics, ApiMetrics};
use crate::state::AppState;

pub mod arrivals;
pub mod departures;
pub mod error;
pub mod extract;
pub mod openapi;
pub mod services;
pub mod status;
pub mod version;

// Re-export commonly used types
pub use error::{ApiError, ApiResult, ErrorResponse};

// Re-export OpenAPI utilities for the gen-openapi binary
pub use openapi::get_openapi_json;

/// Creates the API router with all endpoints.
///
/// Every route is a GET (HEAD is answered by the same handler). Each matched
/// route is timed and counted in `metrics` under its template; unmatched
/// paths fall through to a JSON 404 and other methods get a JSON 405, and
/// neither is recorded.
///
/// # Route Structure
///
/// ```text
/// /version, /v1, /v2                  - Protocol version
/// /v2
/// ├── /version                        - Protocol version
/// ├── /status                         - Store status
/// ├── /arrivals
/// │   ├── /stats                      - Arrival store statistics
/// │   ├── /station/{station}          - Arrivals at a station
/// │   └── /arrival/{id}/{station}/{date}
/// ├── /departures
/// │   ├── /stats                      - Departure store statistics
/// │   ├── /station/{station}          - Departures by station code
/// │   ├── /uic/{station}              - Departures by UIC code
/// │   └── /departure/{id}/{station}/{date}
/// └── /services
///     ├── /stats                      - Service store statistics
///     └── /service/{id}/{date}
/// ```
pub fn create_router(state: AppState, metrics: Arc<ApiMetrics>) -> Router {
    Router::new()
        .route("/version", get(version::api_version))
        .route("/v1", get(version::api_version))
        .route("/v2", get(version::api_version))
        .route("/v2/version", get(version::api_version))
        .route("/v2/status", get(status::api_status))
        // Arrivals
        .route("/v2/arrivals/stats", get(arrivals::arrival_counters))
        .route("/v2/arrivals/station/{station}", get(arrivals::arrivals_station))
        .route(
            "/v2/arrivals/arrival/{id}/{station}/{date}",
            get(arrivals::arrival_details),
        )
        // Departures
        .route("/v2/departures/stats", get(departures::departure_counters))
        .route(
            "/v2/departures/station/{station}",
            get(departures::departures_station),
        )
        .route(
            "/v2/departures/uic/{station}",
            get(departures::departures_uic_station),
        )
        .route(
            "/v2/departures/departure/{id}/{station}/{date}",
            get(departures::departure_details),
        )
        // Services
        .route("/v2/services/stats", get(services::service_counters))
        .route(
            "/v2/services/service/{id}/{date}",
            get(services::service_details),
        )
        .route_layer(middleware::from_fn_with_state(metrics, track_metrics))
        .fallback(error::not_found)
        .method_not_allowed_fallback(error::method_not_allowed)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
