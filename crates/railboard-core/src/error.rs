//! Unified error types for the railboard core library.
//!
//! [`RailboardError`] covers every failure mode of the store layer: rejected
//! lookup parameters, missing records, configuration and snapshot I/O.
//! Store reads themselves never fail.
//!
//! # Example
//!
//! ```rust
//! use railboard_core::error::{RailboardError, Result};
//!
//! fn require_id(id: &str) -> Result<()> {
//!     if id.is_empty() {
//!         return Err(RailboardError::InvalidIdentifier {
//!             field: "id",
//!             value: id.to_string(),
//!         });
//!     }
//!     Ok(())
//! }
//! ```

use std::path::PathBuf;
use thiserror::Error;

use crate::store::RecordKind;

/// The unified error type for all railboard core operations.
#[derive(Debug, Error)]
pub enum RailboardError {
    // =========================================================================
    // LOOKUP ERRORS
    // =========================================================================
    /// A date placeholder could not be parsed.
    #[error("Invalid date: '{0}'. Expected ISO 8601 format 'YYYY-MM-DD' (e.g., '2025-01-31').")]
    InvalidDate(String),

    /// A record or station identifier contains characters outside the allowed set.
    #[error("Invalid {field}: '{value}'")]
    InvalidIdentifier {
        /// Which placeholder was rejected.
        field: &'static str,
        /// The rejected value.
        value: String,
    },

    /// The store holds no record for the requested key.
    #[error("{kind} not found: {key}")]
    RecordNotFound {
        /// Which store was queried.
        kind: RecordKind,
        /// The composite key that was looked up.
        key: String,
    },

    // =========================================================================
    // CONFIGURATION ERRORS
    // =========================================================================
    /// The configuration could not be loaded or failed validation.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    // =========================================================================
    // PERSISTENCE & I/O ERRORS
    // =========================================================================
    /// A store snapshot could not be read or written.
    #[error("Persistence error at {}: {message}", path.display())]
    PersistenceError {
        /// Snapshot file involved.
        path: PathBuf,
        /// What went wrong.
        message: String,
    },

    /// A low-level I/O error occurred.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// A snapshot could not be (de)serialized.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// A specialized [`Result`] type for railboard operations.
pub type Result<T> = std::result::Result<T, RailboardError>;

impl From<config::ConfigError> for RailboardError {
    fn from(err: config::ConfigError) -> Self {
        Self::ConfigError(err.to_string())
    }
}

impl RailboardError {
    /// Returns `true` if the error was caused by a malformed request parameter.
    #[inline]
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidDate(_) | Self::InvalidIdentifier { .. })
    }

    /// Returns `true` if the error is an expected lookup miss rather than a failure.
    #[inline]
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::RecordNotFound { .. })
    }

    /// Returns `true` if this error is related to I/O or persistence.
    #[inline]
    #[must_use]
    pub const fn is_io_error(&self) -> bool {
        matches!(
            self,
            Self::PersistenceError { .. } | Self::IoError(_) | Self::JsonError(_)
        )
    }

    /// Returns an HTTP-appropriate status code for this error.
    #[inline]
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            Self::InvalidDate(_) | Self::InvalidIdentifier { .. } => 400,
            Self::RecordNotFound { .. } => 404,
            Self::ConfigError(_)
            | Self::PersistenceError { .. }
            | Self::IoError(_)
            | Self::JsonError(_) => 500,
        }
    }

    /// Returns a machine-readable error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidDate(_) => "invalid_date",
            Self::InvalidIdentifier { .. } => "invalid_identifier",
            Self::RecordNotFound { kind, .. } => match kind {
                RecordKind::Arrival => "arrival_not_found",
                RecordKind::Departure => "departure_not_found",
                RecordKind::Service => "service_not_found",
            },
            Self::ConfigError(_) => "config_error",
            Self::PersistenceError { .. } => "persistence_error",
            Self::IoError(_) => "io_error",
            Self::JsonError(_) => "json_error",
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
