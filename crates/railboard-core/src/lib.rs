//! # railboard-core
//!
//! Core domain of the railboard transit-data service.
//!
//! This crate provides:
//! - Arrival, departure and service records
//! - In-memory stores with status, counters and station lookups
//! - Validation of lookup parameters
//! - JSON snapshot persistence of the stores
//! - Layered configuration
//!
//! ## Architecture
//!
//! - [`model`] - Record types returned by the API
//! - [`store`] - Generic in-memory store and the [`Stores`] bundle
//! - [`validation`] - Date and identifier checks for path parameters
//! - [`storage`] - Snapshot files for the stores
//! - [`config`] - Configuration loading and validation
//! - [`error`] - Unified error type for the crate

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod model;
pub mod storage;
pub mod store;
pub mod validation;

// Re-export primary types for convenience
pub use config::{
    default_config_path, ApiConfig, Config, LoggingConfig, MetricsConfig, StorageConfig,
};
pub use error::{RailboardError, Result};
pub use model::{Arrival, Departure, Service, ServiceStop, Station};
pub use storage::{default_data_dir, Storage};
pub use store::{
    ArrivalStore, Counters, DepartureStore, Record, RecordKey, RecordKind, ServiceStore, Store,
    StoreStats, StoreStatus, Stores,
};
pub use validation::{parse_service_date, validate_record_id};
