//! Canonical start-time keys
//!
//! GPX metadata, FIT record timestamps and the activity export each spell a
//! start time differently. All three are reduced to one display string,
//! e.g. `June 15, 2023 02:30 PM` (UTC, minute resolution), which is both the
//! join key between FIT tracks and export rows and the date shown on the map.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use std::fmt;

/// Canonical display format: full month, zero-padded day, year, 12-hour clock
pub const CANONICAL_FORMAT: &str = "%B %d, %Y %I:%M %p";

/// GPX `<metadata><time>` format
pub const GPX_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Activity export "Activity Date" format, e.g. `Jun 15, 2023, 2:30:00 PM`
pub const EXPORT_DATE_FORMAT: &str = "%b %d, %Y, %I:%M:%S %p";

/// Start time rendered in [`CANONICAL_FORMAT`]
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NormalizedTimeKey(String);

impl NormalizedTimeKey {
    pub fn from_utc(instant: &DateTime<Utc>) -> Self {
        Self(instant.format(CANONICAL_FORMAT).to_string())
    }

    /// Key from a GPX ISO 8601 timestamp. Falls back to RFC 3339 so that
    /// fractional seconds and explicit offsets still resolve.
    pub fn from_gpx_time(raw: &str) -> Option<Self> {
        parse_gpx_time(raw).map(|instant| Self::from_utc(&instant))
    }

    /// Key from an activity export date cell
    pub fn from_export_date(raw: &str) -> Option<Self> {
        NaiveDateTime::parse_from_str(raw.trim(), EXPORT_DATE_FORMAT)
            .ok()
            .map(|naive| Self::from_utc(&Utc.from_utc_datetime(&naive)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NormalizedTimeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Parse a GPX timestamp into UTC
pub fn parse_gpx_time(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, GPX_TIME_FORMAT) {
        return Some(Utc.from_utc_datetime(&naive));
    }
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|instant| instant.with_timezone(&Utc))
}
