//! Time zone and capacity helpers shared by the services.
//!
//! Occurrence times are stored as absolute UTC instants. Date and
//! time-of-day filters are expressed in the service's canonical local time
//! zone, so every comparison goes through [`LocalTimeZone`].

use anyhow::{anyhow, Result};
use chrono::{
    DateTime, Duration, FixedOffset, NaiveDate, NaiveTime, Offset, TimeZone, Timelike, Utc,
};
use chrono_tz::Tz;
use std::str::FromStr;

use crate::domain::errors::{DomainError, DomainResult};

pub const DEFAULT_TIME_ZONE: Tz = chrono_tz::Europe::Helsinki;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalTimeZone(Tz);

impl Default for LocalTimeZone {
    fn default() -> Self {
        Self(DEFAULT_TIME_ZONE)
    }
}

impl FromStr for LocalTimeZone {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        s.parse::<Tz>()
            .map(Self)
            .map_err(|e| anyhow!("Invalid time zone '{}': {}", s, e))
    }
}

impl LocalTimeZone {
    pub fn new(tz: Tz) -> Self {
        Self(tz)
    }

    pub fn tz(&self) -> Tz {
        self.0
    }

    pub fn to_local(&self, dt: DateTime<Utc>) -> DateTime<Tz> {
        dt.with_timezone(&self.0)
    }

    /// Half-open UTC range `[start, end)` covering `date` in local time.
    pub fn local_date_bounds(&self, date: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
        let start = self.start_of_day(date);
        let end = match date.succ_opt() {
            Some(next) => self.start_of_day(next),
            None => start + Duration::days(1),
        };
        (start, end)
    }

    fn start_of_day(&self, date: NaiveDate) -> DateTime<Utc> {
        // Midnight can be skipped by a DST jump in some zones; walk forward
        // to the first hour that exists.
        (0..24)
            .filter_map(|hour| date.and_hms_opt(hour, 0, 0))
            .find_map(|naive| self.0.from_local_datetime(&naive).earliest())
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|| Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN)))
    }

    /// Local time-of-day of an absolute instant, truncated to whole seconds.
    pub fn local_time_of_day(&self, dt: DateTime<Utc>) -> NaiveTime {
        truncate_to_second(self.to_local(dt).time())
    }

    /// Converts a wall-clock time given at `offset` (UTC when absent) into
    /// the local zone's time-of-day, anchored on the date of `now`.
    pub fn time_to_local(
        &self,
        time: NaiveTime,
        offset: Option<FixedOffset>,
        now: DateTime<Utc>,
    ) -> NaiveTime {
        let offset = offset.unwrap_or_else(utc_offset);
        let anchor = now.with_timezone(&offset).date_naive().and_time(time);
        match offset.from_local_datetime(&anchor).single() {
            Some(dt) => self.local_time_of_day(dt.with_timezone(&Utc)),
            None => truncate_to_second(time),
        }
    }
}

fn utc_offset() -> FixedOffset {
    Utc.fix()
}

fn truncate_to_second(time: NaiveTime) -> NaiveTime {
    time.with_nanosecond(0).unwrap_or(time)
}

pub fn is_past(time: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    time < now
}

pub fn remaining_capacity(capacity: i64, enrolled: i64) -> i64 {
    (capacity - enrolled).max(0)
}

pub fn to_millis(dt: DateTime<Utc>) -> i64 {
    dt.timestamp_millis()
}

pub fn from_millis(millis: i64) -> Result<DateTime<Utc>> {
    DateTime::from_timestamp_millis(millis)
        .ok_or_else(|| anyhow!("Timestamp out of range: {}", millis))
}

/// Parses `HH:MM[:SS[.fff]]` with an optional `Z` or `±HH:MM` suffix.
///
/// An unescaped `+` in a query string arrives as a space, so `10:00 02:00`
/// is read as `10:00+02:00`.
pub fn parse_time_of_day(value: &str) -> DomainResult<(NaiveTime, Option<FixedOffset>)> {
    let value = value.trim().replacen(' ', "+", 1);
    let value = value.as_str();
    let invalid = || DomainError::validation(format!("Invalid time: {}", value));

    let (clock, offset) = if let Some(clock) = value.strip_suffix(['Z', 'z']) {
        (clock, Some(utc_offset()))
    } else if let Some(pos) = value.rfind(['+', '-']) {
        let offset = parse_offset(&value[pos..]).ok_or_else(invalid)?;
        (&value[..pos], Some(offset))
    } else {
        (value, None)
    };

    let time = ["%H:%M:%S%.f", "%H:%M"]
        .iter()
        .find_map(|format| NaiveTime::parse_from_str(clock, format).ok())
        .ok_or_else(invalid)?;

    Ok((time, offset))
}

fn parse_offset(value: &str) -> Option<FixedOffset> {
    let sign = match value.chars().next()? {
        '+' => 1,
        '-' => -1,
        _ => return None,
    };
    let digits = value[1..].replace(':', "");
    if digits.len() != 4 || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let hours: i32 = digits[..2].parse().ok()?;
    let minutes: i32 = digits[2..].parse().ok()?;
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

pub fn parse_date(value: &str) -> DomainResult<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| DomainError::validation(format!("Invalid date: {}", value)))
}

/// Parses an RFC 3339 instant, e.g. `2026-03-01T10:00:00+02:00`.
pub fn parse_instant(value: &str) -> DomainResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value.trim())
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| DomainError::validation(format!("Invalid timestamp: {}", value)))
}
