//! Appointment times

use crate::error::{EngineError, EngineResult};
use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// Layouts a date and time picker produces, without an offset
const NAIVE_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];

/// Parse a proposed appointment time
///
/// Accepts RFC 3339, or a local `YYYY-MM-DDTHH:MM[:SS]` which is taken as UTC.
/// Past instants are accepted.
pub fn parse_instant(text: &str) -> EngineResult<DateTime<Utc>> {
    let text = text.trim();
    if let Ok(at) = DateTime::parse_from_rfc3339(text) {
        return Ok(at.with_timezone(&Utc));
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .map(|naive| naive.and_utc())
        .ok_or_else(|| EngineError::InvalidDateTime(text.to_string()))
}

/// Half-open interval an appointment occupies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeRange {
    pub fn starting_at(start: DateTime<Utc>, length: Duration) -> Self {
        Self {
            start,
            end: start.checked_add_signed(length).unwrap_or(start),
        }
    }

    pub fn length(&self) -> Duration {
        self.end - self.start
    }
}
