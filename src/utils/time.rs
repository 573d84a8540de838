//! Time utilities: tenant-local parsing/formatting and UTC conversion.
//! All storage is UTC; tenant-local input goes through the fixed tenant
//! offset from the configuration.

use crate::errors::{AppError, AppResult};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Utc};

/// Build the fixed tenant offset from a minutes-east-of-UTC value.
pub fn tenant_offset(utc_offset_minutes: i32) -> AppResult<FixedOffset> {
    FixedOffset::east_opt(utc_offset_minutes * 60)
        .ok_or_else(|| AppError::Config(format!("invalid UTC offset: {} min", utc_offset_minutes)))
}

/// Parse "YYYY-MM-DD HH:MM" (tenant-local wall clock) into UTC.
pub fn parse_local_datetime(s: &str, offset: FixedOffset) -> AppResult<DateTime<Utc>> {
    let naive = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S"))
        .map_err(|_| AppError::InvalidDateTime(s.to_string()))?;
    match offset.from_local_datetime(&naive) {
        chrono::LocalResult::Single(dt) => Ok(dt.with_timezone(&Utc)),
        _ => Err(AppError::InvalidDateTime(s.to_string())),
    }
}

/// Parse either an RFC 3339 timestamp or a tenant-local "YYYY-MM-DD HH:MM".
pub fn parse_datetime_arg(s: &str, offset: FixedOffset) -> AppResult<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    parse_local_datetime(s, offset)
}

/// Tenant-local calendar date of a UTC instant.
pub fn local_day(at: DateTime<Utc>, offset: FixedOffset) -> NaiveDate {
    at.with_timezone(&offset).date_naive()
}

/// Format a UTC instant as tenant-local "YYYY-MM-DD HH:MM".
pub fn format_local(at: DateTime<Utc>, offset: FixedOffset) -> String {
    at.with_timezone(&offset).format("%Y-%m-%d %H:%M").to_string()
}

/// UTC bounds of the tenant-local calendar day containing `at`.
pub fn local_day_bounds(
    at: DateTime<Utc>,
    offset: FixedOffset,
) -> (DateTime<Utc>, DateTime<Utc>) {
    let day = local_day(at, offset);
    let start = offset
        .from_local_datetime(&day.and_hms_opt(0, 0, 0).unwrap())
        .unwrap()
        .with_timezone(&Utc);
    (start, start + chrono::Duration::days(1))
}

/// Signed whole minutes between two instants, rounded to the nearest minute.
pub fn minutes_between(from: DateTime<Utc>, to: DateTime<Utc>) -> i64 {
    let secs = (to - from).num_seconds();
    if secs >= 0 {
        (secs + 30) / 60
    } else {
        -((-secs + 30) / 60)
    }
}
