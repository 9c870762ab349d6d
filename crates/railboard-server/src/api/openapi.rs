//! OpenAPI specification generation for the railboard API.
//!
//! The document is written to disk by the `gen-openapi` binary; it is not
//! served by the API itself, whose route table is fixed.

use utoipa::OpenApi;

use super::arrivals::{ArrivalResponse, ArrivalsResponse};
use super::departures::{DepartureResponse, DeparturesResponse};
use super::error::ErrorResponse;
use super::services::ServiceResponse;
use super::status::StatusResponse;
use super::version::VersionResponse;
use railboard_core::{
    Arrival, Counters, Departure, Service, ServiceStop, Station, StoreStats, StoreStatus,
};

/// Returns the OpenAPI specification as a pretty-printed JSON string.
///
/// # Errors
///
/// Returns an error if the document cannot be serialized.
pub fn get_openapi_json() -> Result<String, serde_json::Error> {
    ApiDoc::openapi().to_pretty_json()
}

/// Main OpenAPI document structure for railboard.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "railboard API",
        version = "2",
        description = r#"
# railboard API

Read-only access to live train arrivals, departures and services.

## Overview

- **Station boards**: arrivals and departures per station, by station code or UIC code
- **Details**: a single arrival, departure or service by identifier and service date
- **Operational data**: store status and message counters

Dates in paths use the `YYYY-MM-DD` format. Station codes are passed to the
stores as given; unknown stations yield empty boards.
"#,
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers(
        (url = "/", description = "Local railboard server")
    ),
    tags(
        (name = "meta", description = "API version and store status"),
        (name = "arrivals", description = "Arriving trains per station"),
        (name = "departures", description = "Departing trains per station"),
        (name = "services", description = "Complete train services")
    ),
    paths(
        super::version::api_version,
        super::status::api_status,
        super::arrivals::arrival_counters,
        super::arrivals::arrivals_station,
        super::arrivals::arrival_details,
        super::departures::departure_counters,
        super::departures::departures_station,
        super::departures::departures_uic_station,
        super::departures::departure_details,
        super::services::service_counters,
        super::services::service_details,
    ),
    components(
        schemas(
            ErrorResponse,
            VersionResponse,
            StatusResponse,
            StoreStatus,
            StoreStats,
            Counters,
            Station,
            Arrival,
            ArrivalsResponse,
            ArrivalResponse,
            Departure,
            DeparturesResponse,
            DepartureResponse,
            Service,
            ServiceStop,
            ServiceResponse,
        )
    )
)]
pub struct ApiDoc;
