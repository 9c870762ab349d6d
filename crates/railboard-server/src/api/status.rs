//! Store status API endpoint.

use axum::extract::State;
use axum::Json;
use railboard_core::StoreStatus;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::state::AppState;

/// Status of the three stores.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "arrivals": "UP",
    "departures": "UP",
    "services": "RECOVERING"
}))]
pub struct StatusResponse {
    /// Arrival store status.
    pub arrivals: StoreStatus,

    /// Departure store status.
    pub departures: StoreStatus,

    /// Service store status.
    pub services: StoreStatus,
}

/// Get the status of all stores.
///
/// Statuses are read from the stores on every request.
#[utoipa::path(
    get,
    path = "/v2/status",
    tag = "meta",
    operation_id = "getStatus",
    summary = "Get store status",
    description = "Returns the current status of the arrival, departure and service stores: \
        UNKNOWN, UP, DOWN or RECOVERING.",
    responses(
        (status = 200, description = "Store status", body = StatusResponse)
    )
)]
pub async fn api_status(State(state): State<AppState>) -> Json<StatusResponse> {
    let (arrivals, departures, services) = tokio::join!(
        state.arrivals().status(),
        state.departures().status(),
        state.services().status(),
    );

    Json(StatusResponse {
        arrivals,
        departures,
        services,
    })
}
