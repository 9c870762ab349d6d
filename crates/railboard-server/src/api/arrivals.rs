//! Arrival API endpoints.

use axum::extract::State;
use axum::Json;
use railboard_core::{parse_service_date, validate_record_id, Arrival, RecordKey, StoreStats};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::api::error::{ApiResult, ErrorResponse};
use crate::api::extract::ApiPath;
use crate::state::AppState;

// ============================================================================
// Response Types
// ============================================================================

/// Arrivals at a station.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ArrivalsResponse {
    /// Visible arrivals ordered by arrival time.
    pub arrivals: Vec<Arrival>,
}

/// A single arrival.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ArrivalResponse {
    /// The requested arrival.
    pub arrival: Arrival,
}

// ============================================================================
// Handlers
// ============================================================================

/// Get arrival store statistics.
#[utoipa::path(
    get,
    path = "/v2/arrivals/stats",
    tag = "arrivals",
    operation_id = "getArrivalStats",
    summary = "Get arrival store statistics",
    responses(
        (status = 200, description = "Store statistics", body = StoreStats)
    )
)]
pub async fn arrival_counters(State(state): State<AppState>) -> Json<StoreStats> {
    Json(state.arrivals().stats().await)
}

/// Get arrivals at a station.
#[utoipa::path(
    get,
    path = "/v2/arrivals/station/{station}",
    tag = "arrivals",
    operation_id = "getStationArrivals",
    summary = "Get arrivals at a station",
    description = "Returns the visible arrivals at the station with the given code, \
        ordered by arrival time. Unknown stations yield an empty list.",
    params(
        ("station" = String, Path, description = "Station code", example = "UT")
    ),
    responses(
        (status = 200, description = "Station arrivals", body = ArrivalsResponse)
    )
)]
pub async fn arrivals_station(
    State(state): State<AppState>,
    ApiPath(station): ApiPath<String>,
) -> Json<ArrivalsResponse> {
    Json(ArrivalsResponse {
        arrivals: state.arrivals().by_station(&station).await,
    })
}

/// Get a single arrival.
#[utoipa::path(
    get,
    path = "/v2/arrivals/arrival/{id}/{station}/{date}",
    tag = "arrivals",
    operation_id = "getArrival",
    summary = "Get arrival details",
    params(
        ("id" = String, Path, description = "Arrival identifier", example = "12345"),
        ("station" = String, Path, description = "Station code", example = "UT"),
        ("date" = String, Path, description = "Service date (YYYY-MM-DD)", example = "2025-01-31")
    ),
    responses(
        (status = 200, description = "Arrival found", body = ArrivalResponse),
        (status = 400, description = "Malformed id or date", body = ErrorResponse),
        (status = 404, description = "No such arrival", body = ErrorResponse)
    )
)]
pub async fn arrival_details(
    State(state): State<AppState>,
    ApiPath((id, station, date)): ApiPath<(String, String, String)>,
) -> ApiResult<Json<ArrivalResponse>> {
    validate_record_id(&id)?;
    let date = parse_service_date(&date)?;

    let key = RecordKey::station_event(&id, &station, date);
    let arrival = state.arrivals().find(&key).await?;

    Ok(Json(ArrivalResponse { arrival }))
}
