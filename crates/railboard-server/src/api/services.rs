//! Service API endpoints.

use axum::extract::State;
use axum::Json;
use railboard_core::{parse_service_date, validate_record_id, RecordKey, Service, StoreStats};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::api::error::{ApiResult, ErrorResponse};
use crate::api::extract::ApiPath;
use crate::state::AppState;

/// A single service.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ServiceResponse {
    /// The requested service with all stops.
    pub service: Service,
}

/// Get service store statistics.
#[utoipa::path(
    get,
    path = "/v2/services/stats",
    tag = "services",
    operation_id = "getServiceStats",
    summary = "Get service store statistics",
    responses(
        (status = 200, description = "Store statistics", body = StoreStats)
    )
)]
pub async fn service_counters(State(state): State<AppState>) -> Json<StoreStats> {
    Json(state.services().stats().await)
}

/// Get a single service.
#[utoipa::path(
    get,
    path = "/v2/services/service/{id}/{date}",
    tag = "services",
    operation_id = "getService",
    summary = "Get service details",
    params(
        ("id" = String, Path, description = "Service identifier", example = "3045"),
        ("date" = String, Path, description = "Service date (YYYY-MM-DD)", example = "2025-01-31")
    ),
    responses(
        (status = 200, description = "Service found", body = ServiceResponse),
        (status = 400, description = "Malformed id or date", body = ErrorResponse),
        (status = 404, description = "No such service", body = ErrorResponse)
    )
)]
pub async fn service_details(
    State(state): State<AppState>,
    ApiPath((id, date)): ApiPath<(String, String)>,
) -> ApiResult<Json<ServiceResponse>> {
    validate_record_id(&id)?;
    let date = parse_service_date(&date)?;

    let service = state.services().find(&RecordKey::service(&id, date)).await?;

    Ok(Json(ServiceResponse { service }))
}
