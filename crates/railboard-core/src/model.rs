//! Train records held by the stores.
//!
//! These are the payloads returned by the API. Field names are part of the
//! JSON contract; keep them stable.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A railway station as referenced by arrivals, departures and service stops.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "code": "UT",
    "uic": "8400621",
    "name_short": "Utrecht C",
    "name_medium": "Utrecht C.",
    "name_long": "Utrecht Centraal"
}))]
pub struct Station {
    /// Short station code.
    #[schema(example = "UT")]
    pub code: String,

    /// Numeric UIC code.
    #[schema(example = "8400621")]
    pub uic: String,

    /// Short display name.
    pub name_short: String,

    /// Medium display name.
    pub name_medium: String,

    /// Full display name.
    pub name_long: String,
}

/// A train arriving at a station.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Arrival {
    /// Record identifier assigned by the feed.
    #[schema(example = "12345")]
    pub id: String,

    /// Operating date of the service.
    #[schema(example = "2025-01-31")]
    pub service_date: NaiveDate,

    /// Public train number.
    #[schema(example = "3045")]
    pub service_number: String,

    /// Operating company.
    #[schema(example = "NS")]
    pub company: String,

    /// Train type, e.g. Intercity or Sprinter.
    #[schema(example = "Intercity")]
    pub train_type: String,

    /// Station the train arrives at.
    pub station: Station,

    /// Origin stations of the train.
    pub origin: Vec<Station>,

    /// Planned arrival time.
    pub arrival_time: DateTime<Utc>,

    /// Delay in seconds.
    pub delay_seconds: i32,

    /// Planned platform.
    pub platform_planned: Option<String>,

    /// Actual platform if changed.
    pub platform_actual: Option<String>,

    /// Whether the arrival is cancelled.
    pub cancelled: bool,

    /// Hidden records are kept for detail lookups but left out of station boards.
    pub hidden: bool,
}

/// A train departing from a station.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Departure {
    /// Record identifier assigned by the feed.
    #[schema(example = "67890")]
    pub id: String,

    /// Operating date of the service.
    #[schema(example = "2025-01-31")]
    pub service_date: NaiveDate,

    /// Public train number.
    #[schema(example = "3045")]
    pub service_number: String,

    /// Operating company.
    #[schema(example = "NS")]
    pub company: String,

    /// Train type, e.g. Intercity or Sprinter.
    #[schema(example = "Intercity")]
    pub train_type: String,

    /// Station the train departs from.
    pub station: Station,

    /// Destination stations of the train.
    pub destination: Vec<Station>,

    /// Planned departure time.
    pub departure_time: DateTime<Utc>,

    /// Delay in seconds.
    pub delay_seconds: i32,

    /// Planned platform.
    pub platform_planned: Option<String>,

    /// Actual platform if changed.
    pub platform_actual: Option<String>,

    /// Whether the departure is cancelled.
    pub cancelled: bool,

    /// Hidden records are kept for detail lookups but left out of station boards.
    pub hidden: bool,
}

/// A single call of a service at a station.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ServiceStop {
    /// Station of this stop.
    pub station: Station,

    /// Arrival time, absent at the first stop.
    pub arrival_time: Option<DateTime<Utc>>,

    /// Departure time, absent at the last stop.
    pub departure_time: Option<DateTime<Utc>>,

    /// Platform if known.
    pub platform: Option<String>,

    /// Whether this stop is cancelled.
    pub cancelled: bool,
}

/// A complete train service with all of its stops.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Service {
    /// Record identifier assigned by the feed.
    #[schema(example = "3045")]
    pub id: String,

    /// Operating date of the service.
    #[schema(example = "2025-01-31")]
    pub service_date: NaiveDate,

    /// Public train number.
    #[schema(example = "3045")]
    pub service_number: String,

    /// Operating company.
    #[schema(example = "NS")]
    pub company: String,

    /// Train type, e.g. Intercity or Sprinter.
    #[schema(example = "Intercity")]
    pub train_type: String,

    /// Stops in running order.
    pub stops: Vec<ServiceStop>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_date_serializes_as_iso_date() {
        let service = Service {
            id: "3045".to_string(),
            service_date: NaiveDate::from_ymd_opt(2025, 1, 31).unwrap(),
            service_number: "3045".to_string(),
            company: "NS".to_string(),
            train_type: "Intercity".to_string(),
            stops: Vec::new(),
        };
        let json = serde_json::to_string(&service).unwrap();
        assert!(json.contains("\"service_date\":\"2025-01-31\""));
    }
}
