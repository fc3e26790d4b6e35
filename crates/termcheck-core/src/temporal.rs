//! # Temporal Types — Canonical UTC Timestamps
//!
//! Defines `Timestamp`, a UTC-only instant, and [`Timestamp::to_canonical`],
//! the single normalization path used by the `timestamp` validator.
//!
//! Input is either RFC 3339 text (any offset, converted to UTC) or an
//! integer count of [`TimeUnit`]s since the Unix epoch. The result is
//! truncated to the requested unit, so two spellings of the same instant
//! always canonicalize to the same value.
//!
//! Rendering is RFC 3339 with a `Z` suffix and exactly the sub-second
//! digits the unit carries: `2026-01-15T12:00:00Z` for seconds,
//! `2026-01-15T12:00:00.250Z` for milliseconds.

use chrono::{DateTime, SecondsFormat, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Precision of a canonical timestamp and unit of numeric input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeUnit {
    /// Whole seconds.
    Second,
    /// Milliseconds.
    Millisecond,
    /// Microseconds.
    Microsecond,
    /// Nanoseconds.
    Nanosecond,
}

impl TimeUnit {
    fn nanos_per_unit(self) -> u32 {
        match self {
            TimeUnit::Second => 1_000_000_000,
            TimeUnit::Millisecond => 1_000_000,
            TimeUnit::Microsecond => 1_000,
            TimeUnit::Nanosecond => 1,
        }
    }

    fn seconds_format(self) -> SecondsFormat {
        match self {
            TimeUnit::Second => SecondsFormat::Secs,
            TimeUnit::Millisecond => SecondsFormat::Millis,
            TimeUnit::Microsecond => SecondsFormat::Micros,
            TimeUnit::Nanosecond => SecondsFormat::Nanos,
        }
    }
}

/// Raw input accepted by [`Timestamp::to_canonical`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeInput<'a> {
    /// RFC 3339 text.
    Text(&'a str),
    /// Count of units since the Unix epoch.
    Number(i64),
}

/// A UTC instant truncated to the precision of its [`TimeUnit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp {
    instant: DateTime<Utc>,
    unit: TimeUnit,
}

impl Timestamp {
    /// Canonicalize text or an epoch count into a UTC timestamp.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Timestamp` when the text is not RFC 3339 or the
    /// number is outside the representable range.
    pub fn to_canonical(input: TimeInput<'_>, unit: TimeUnit) -> Result<Self, CoreError> {
        let instant = match input {
            TimeInput::Text(s) => DateTime::parse_from_rfc3339(s.trim())
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(|e| CoreError::Timestamp {
                    input: s.to_string(),
                    reason: e.to_string(),
                })?,
            TimeInput::Number(n) => from_epoch(n, unit).ok_or_else(|| CoreError::Timestamp {
                input: n.to_string(),
                reason: format!("out of range for unit {unit:?}"),
            })?,
        };
        Ok(Self {
            instant: truncate(instant, unit),
            unit,
        })
    }

    /// Access the inner `DateTime<Utc>`.
    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.instant
    }

    /// The precision this timestamp was canonicalized to.
    pub fn unit(&self) -> TimeUnit {
        self.unit
    }

    /// Count of units since the Unix epoch.
    pub fn epoch(&self) -> i64 {
        match self.unit {
            TimeUnit::Second => self.instant.timestamp(),
            TimeUnit::Millisecond => self.instant.timestamp_millis(),
            TimeUnit::Microsecond => self.instant.timestamp_micros(),
            TimeUnit::Nanosecond => self.instant.timestamp_nanos_opt().unwrap_or(i64::MAX),
        }
    }

    /// Render as RFC 3339 with `Z` suffix at the unit's precision.
    pub fn to_rfc3339(&self) -> String {
        self.instant.to_rfc3339_opts(self.unit.seconds_format(), true)
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_rfc3339())
    }
}

fn from_epoch(n: i64, unit: TimeUnit) -> Option<DateTime<Utc>> {
    match unit {
        TimeUnit::Second => DateTime::from_timestamp(n, 0),
        TimeUnit::Millisecond => DateTime::from_timestamp_millis(n),
        TimeUnit::Microsecond => DateTime::from_timestamp_micros(n),
        TimeUnit::Nanosecond => Some(DateTime::from_timestamp_nanos(n)),
    }
}

/// Discard sub-unit precision.
fn truncate(dt: DateTime<Utc>, unit: TimeUnit) -> DateTime<Utc> {
    let step = unit.nanos_per_unit();
    let nanos = dt.nanosecond() - dt.nanosecond() % step;
    dt.with_nanosecond(nanos).unwrap_or(dt)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_with_z_suffix() {
        let ts = Timestamp::to_canonical(TimeInput::Text("2026-01-15T12:00:00Z"), TimeUnit::Second)
            .unwrap();
        assert_eq!(ts.to_rfc3339(), "2026-01-15T12:00:00Z");
    }

    #[test]
    fn test_text_offset_converted_to_utc() {
        let ts = Timestamp::to_canonical(
            TimeInput::Text("2026-01-15T17:00:00+05:00"),
            TimeUnit::Second,
        )
        .unwrap();
        assert_eq!(ts.to_rfc3339(), "2026-01-15T12:00:00Z");
    }

    #[test]
    fn test_subseconds_truncated_to_unit() {
        let ts = Timestamp::to_canonical(
            TimeInput::Text("2026-01-15T12:00:00.123456Z"),
            TimeUnit::Millisecond,
        )
        .unwrap();
        assert_eq!(ts.to_rfc3339(), "2026-01-15T12:00:00.123Z");

        let ts = Timestamp::to_canonical(
            TimeInput::Text("2026-01-15T12:00:00.123456Z"),
            TimeUnit::Second,
        )
        .unwrap();
        assert_eq!(ts.as_datetime().nanosecond(), 0);
    }

    #[test]
    fn test_numeric_input_per_unit() {
        let secs = Timestamp::to_canonical(TimeInput::Number(1_768_478_400), TimeUnit::Second)
            .unwrap();
        assert_eq!(secs.to_rfc3339(), "2026-01-15T12:00:00Z");

        let millis = Timestamp::to_canonical(
            TimeInput::Number(1_768_478_400_250),
            TimeUnit::Millisecond,
        )
        .unwrap();
        assert_eq!(millis.to_rfc3339(), "2026-01-15T12:00:00.250Z");
        assert_eq!(millis.epoch(), 1_768_478_400_250);
    }

    #[test]
    fn test_text_and_number_agree() {
        let a = Timestamp::to_canonical(TimeInput::Text("2026-01-15T12:00:00Z"), TimeUnit::Second)
            .unwrap();
        let b = Timestamp::to_canonical(TimeInput::Number(a.epoch()), TimeUnit::Second).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_invalid_text_rejected() {
        assert!(Timestamp::to_canonical(TimeInput::Text("not-a-date"), TimeUnit::Second).is_err());
        assert!(Timestamp::to_canonical(TimeInput::Text("2026-01-15"), TimeUnit::Second).is_err());
        assert!(Timestamp::to_canonical(TimeInput::Text(""), TimeUnit::Second).is_err());
    }

    #[test]
    fn test_out_of_range_number_rejected() {
        assert!(Timestamp::to_canonical(TimeInput::Number(i64::MAX), TimeUnit::Second).is_err());
    }

    #[test]
    fn test_ordering() {
        let earlier =
            Timestamp::to_canonical(TimeInput::Text("2026-01-15T12:00:00Z"), TimeUnit::Second)
                .unwrap();
        let later =
            Timestamp::to_canonical(TimeInput::Text("2026-01-15T12:00:01Z"), TimeUnit::Second)
                .unwrap();
        assert!(earlier < later);
    }

    #[test]
    fn test_ordering_same_instant_by_unit() {
        let at = |unit| Timestamp::to_canonical(TimeInput::Number(0), unit).unwrap();
        let mut stamps = vec![at(TimeUnit::Nanosecond), at(TimeUnit::Second), at(TimeUnit::Millisecond)];
        stamps.sort();
        let units: Vec<TimeUnit> = stamps.iter().map(Timestamp::unit).collect();
        assert_eq!(units, [TimeUnit::Second, TimeUnit::Millisecond, TimeUnit::Nanosecond]);
        assert!(TimeUnit::Second < TimeUnit::Nanosecond);
    }

    #[test]
    fn test_serde_roundtrip() {
        let ts = Timestamp::to_canonical(TimeInput::Text("2026-01-15T12:00:00Z"), TimeUnit::Second)
            .unwrap();
        let json = serde_json::to_string(&ts).unwrap();
        let parsed: Timestamp = serde_json::from_str(&json).unwrap();
        assert_eq!(ts, parsed);
    }
}
