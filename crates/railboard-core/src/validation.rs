//! Validation of lookup parameters taken from request paths.
//!
//! Station placeholders are opaque and passed to the stores verbatim; only
//! record ids and dates are checked here.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{RailboardError, Result};

static DATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("valid date regex"));

static RECORD_ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_-]{1,32}$").expect("valid record id regex"));

/// Parse a service date in `YYYY-MM-DD` form.
///
/// # Errors
///
/// Returns `InvalidDate` if the token is not in that form or is not a real
/// calendar date.
pub fn parse_service_date(token: &str) -> Result<NaiveDate> {
    if !DATE_RE.is_match(token) {
        return Err(RailboardError::InvalidDate(token.to_string()));
    }
    NaiveDate::parse_from_str(token, "%Y-%m-%d")
        .map_err(|_| RailboardError::InvalidDate(token.to_string()))
}

/// Check a record identifier.
///
/// # Errors
///
/// Returns `InvalidIdentifier` for empty, overlong or non-alphanumeric ids.
pub fn validate_record_id(id: &str) -> Result<()> {
    if RECORD_ID_RE.is_match(id) {
        Ok(())
    } else {
        Err(RailboardError::InvalidIdentifier {
            field: "id",
            value: id.to_string(),
        })
    }
}
