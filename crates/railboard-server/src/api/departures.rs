//! Departure API endpoints.
//!
//! Station boards can be requested by station code or by UIC code; detail
//! lookups always use the station code.

use axum::extract::State;
use axum::Json;
use railboard_core::{parse_service_date, validate_record_id, Departure, RecordKey, StoreStats};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::api::error::{ApiResult, ErrorResponse};
use crate::api::extract::ApiPath;
use crate::state::AppState;

/// Departures from a station.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DeparturesResponse {
    /// Visible departures ordered by departure time.
    pub departures: Vec<Departure>,
}

/// A single departure.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DepartureResponse {
    /// The requested departure.
    pub departure: Departure,
}

/// Get departure store statistics.
#[utoipa::path(
    get,
    path = "/v2/departures/stats",
    tag = "departures",
    operation_id = "getDepartureStats",
    summary = "Get departure store statistics",
    responses(
        (status = 200, description = "Store statistics", body = StoreStats)
    )
)]
pub async fn departure_counters(State(state): State<AppState>) -> Json<StoreStats> {
    Json(state.departures().stats().await)
}

/// Get departures from a station by station code.
#[utoipa::path(
    get,
    path = "/v2/departures/station/{station}",
    tag = "departures",
    operation_id = "getStationDepartures",
    summary = "Get departures from a station",
    params(
        ("station" = String, Path, description = "Station code", example = "UT")
    ),
    responses(
        (status = 200, description = "Station departures", body = DeparturesResponse)
    )
)]
pub async fn departures_station(
    State(state): State<AppState>,
    ApiPath(station): ApiPath<String>,
) -> Json<DeparturesResponse> {
    Json(DeparturesResponse {
        departures: state.departures().by_station(&station).await,
    })
}

/// Get departures from a station by UIC code.
#[utoipa::path(
    get,
    path = "/v2/departures/uic/{station}",
    tag = "departures",
    operation_id = "getUicStationDepartures",
    summary = "Get departures from a station by UIC code",
    params(
        ("station" = String, Path, description = "UIC station code", example = "8400621")
    ),
    responses(
        (status = 200, description = "Station departures", body = DeparturesResponse)
    )
)]
pub async fn departures_uic_station(
    State(state): State<AppState>,
    ApiPath(station): ApiPath<String>,
) -> Json<DeparturesResponse> {
    Json(DeparturesResponse {
        departures: state.departures().by_station_uic(&station).await,
    })
}

/// Get a single departure.
#[utoipa::path(
    get,
    path = "/v2/departures/departure/{id}/{station}/{date}",
    tag = "departures",
    operation_id = "getDeparture",
    summary = "Get departure details",
    params(
        ("id" = String, Path, description = "Departure identifier", example = "67890"),
        ("station" = String, Path, description = "Station code", example = "UT"),
        ("date" = String, Path, description = "Service date (YYYY-MM-DD)", example = "2025-01-31")
    ),
    responses(
        (status = 200, description = "Departure found", body = DepartureResponse),
        (status = 400, description = "Malformed id or date", body = ErrorResponse),
        (status = 404, description = "No such departure", body = ErrorResponse)
    )
)]
pub async fn departure_details(
    State(state): State<AppState>,
    ApiPath((id, station, date)): ApiPath<(String, String, String)>,
) -> ApiResult<Json<DepartureResponse>> {
    validate_record_id(&id)?;
    let date = parse_service_date(&date)?;

    let departure = state
        .departures()
        .find(&RecordKey::station_event(&id, &station, date))
        .await?;

    Ok(Json(DepartureResponse { departure }))
}
