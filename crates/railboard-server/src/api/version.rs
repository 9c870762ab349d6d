//! Version API endpoint.
//!
//! Served on `/version`, `/v1`, `/v2` and `/v2/version`; all of them report
//! the current protocol version so old clients can detect the upgrade.

use axum::Json;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Current API protocol version.
pub const API_VERSION: u32 = 2;

/// Version response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({"version": 2}))]
pub struct VersionResponse {
    /// API protocol version.
    #[schema(example = 2)]
    pub version: u32,
}

/// Report the API protocol version.
#[utoipa::path(
    get,
    path = "/v2/version",
    tag = "meta",
    operation_id = "getVersion",
    summary = "Get API version",
    description = "Returns the API protocol version. The same document is served on \
        `/version`, `/v1` and `/v2`.",
    responses(
        (status = 200, description = "Protocol version", body = VersionResponse)
    )
)]
pub async fn api_version() -> Json<VersionResponse> {
    Json(VersionResponse {
        version: API_VERSION,
    })
}
