//! Conversion boundary for deadlines.
//!
//! Users type deadlines in local time; the store keeps UTC instants; the UI
//! shows them in local time again. All three directions go through here.

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use thiserror::Error;

/// Format used to pre-fill edit inputs. [`parse_input`] accepts it back.
pub const INPUT_FORMAT: &str = "%Y-%m-%d %H:%M";

const DISPLAY_FORMAT: &str = "%a %d %b %Y %H:%M";

const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
];

#[derive(Debug, Error, PartialEq)]
pub enum DeadlineError {
    #[error("invalid deadline '{0}'. Use YYYY-MM-DD, YYYY-MM-DD HH:MM or RFC 3339")]
    Unrecognized(String),

    /// The local wall-clock time does not exist (for example inside a DST gap).
    #[error("'{0}' does not exist in the local time zone")]
    NonexistentLocalTime(String),
}

/// Parses user input into the instant that gets stored.
///
/// Blank input means "no deadline". A bare date means the end of that day
/// (23:59 local time). Input with an explicit offset is taken as-is.
pub fn parse_input(input: &str) -> Result<Option<DateTime<Utc>>, DeadlineError> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(None);
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Ok(Some(dt.with_timezone(&Utc)));
    }

    let naive = DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(input, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(input, "%Y-%m-%d")
                .ok()
                .and_then(|d| NaiveTime::from_hms_opt(23, 59, 0).map(|t| d.and_time(t)))
        })
        .ok_or_else(|| DeadlineError::Unrecognized(input.to_string()))?;

    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|dt| Some(dt.with_timezone(&Utc)))
        .ok_or_else(|| DeadlineError::NonexistentLocalTime(input.to_string()))
}

/// Renders a stored deadline in the form [`parse_input`] reads back.
pub fn to_input(deadline: &DateTime<Utc>) -> String {
    deadline.with_timezone(&Local).format(INPUT_FORMAT).to_string()
}

/// Human-readable local rendering for lists and tables.
pub fn display(deadline: &DateTime<Utc>) -> String {
    deadline.with_timezone(&Local).format(DISPLAY_FORMAT).to_string()
}
