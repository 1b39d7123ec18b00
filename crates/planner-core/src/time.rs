//! Identifier and timestamp helpers.
//!
//! Timestamps are stored as ISO-8601 strings with millisecond precision and a
//! `Z` suffix, the same shape browsers produce with `Date.prototype.toISOString`.
//! Wall-clock time comes from `web_time` so the same code runs in WASM.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use rand::Rng;

/// Current time in milliseconds since the Unix epoch.
pub fn now_millis() -> i64 {
    web_time::SystemTime::now()
        .duration_since(web_time::UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

/// Current time as an ISO-8601 string, e.g. `2026-10-18T09:30:00.000Z`.
pub fn now_iso() -> String {
    iso_from_millis(now_millis())
}

/// Format epoch milliseconds as an ISO-8601 UTC string.
pub fn iso_from_millis(millis: i64) -> String {
    DateTime::<Utc>::from_timestamp_millis(millis)
        .unwrap_or(DateTime::UNIX_EPOCH)
        .to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parse a stored timestamp into epoch milliseconds.
///
/// Missing or unparseable values map to `0`, which makes them older than any
/// real timestamp. Accepts RFC 3339, a bare `YYYY-MM-DDTHH:MM:SS[.fff]` (read as
/// UTC) and a bare `YYYY-MM-DD`.
pub fn parse_iso_millis(value: Option<&str>) -> i64 {
    let Some(raw) = value.map(str::trim).filter(|s| !s.is_empty()) else {
        return 0;
    };

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.timestamp_millis();
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return naive.and_utc().timestamp_millis();
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date
            .and_hms_opt(0, 0, 0)
            .map(|dt| dt.and_utc().timestamp_millis())
            .unwrap_or(0);
    }
    0
}

/// Generate a unique opaque identifier.
///
/// Random hex followed by the creation time in hex, e.g. `9c1f0a3e2b7d4-19a3f5c2e10`.
/// The time suffix keeps ids unique even if the random part collides.
pub fn uid() -> String {
    let random: u64 = rand::rng().random::<u64>() >> 12;
    format!("{:x}-{:x}", random, now_millis().max(0))
}

/// Today's date in UTC.
pub fn today() -> NaiveDate {
    DateTime::<Utc>::from_timestamp_millis(now_millis())
        .unwrap_or(DateTime::UNIX_EPOCH)
        .date_naive()
}

/// The Monday that starts the week containing `date`.
pub fn monday_of(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

/// Format a date as `YYYY-MM-DD`.
pub fn ymd(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Parse a `YYYY-MM-DD` date.
pub fn parse_ymd(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").ok()
}

/// 1-based week number of `today` within a program that started on `start`.
///
/// Dates before the start clamp to week 1. Returns `None` when `start` is
/// not a valid `YYYY-MM-DD` date.
pub fn week_number_from_start(start: &str, today: NaiveDate) -> Option<u32> {
    let start = parse_ymd(start)?;
    let days = (today - start).num_days();
    let weeks = days.div_euclid(7) + 1;
    Some(weeks.max(1) as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        parse_ymd(s).unwrap()
    }

    #[test]
    fn test_iso_format_matches_browser_shape() {
        assert_eq!(iso_from_millis(0), "1970-01-01T00:00:00.000Z");
        assert_eq!(iso_from_millis(1_700_000_000_123), "2023-11-14T22:13:20.123Z");
    }

    #[test]
    fn test_parse_roundtrip() {
        let iso = iso_from_millis(1_700_000_000_123);
        assert_eq!(parse_iso_millis(Some(&iso)), 1_700_000_000_123);
    }

    #[test]
    fn test_parse_offsets_and_bare_forms() {
        assert_eq!(
            parse_iso_millis(Some("2024-01-01T01:00:00+01:00")),
            parse_iso_millis(Some("2024-01-01T00:00:00Z"))
        );
        assert_eq!(
            parse_iso_millis(Some("2024-01-01T00:00:00")),
            parse_iso_millis(Some("2024-01-01T00:00:00.000Z"))
        );
        assert_eq!(
            parse_iso_millis(Some("2024-01-01")),
            parse_iso_millis(Some("2024-01-01T00:00:00Z"))
        );
    }

    #[test]
    fn test_parse_garbage_is_epoch() {
        assert_eq!(parse_iso_millis(None), 0);
        assert_eq!(parse_iso_millis(Some("")), 0);
        assert_eq!(parse_iso_millis(Some("yesterday-ish")), 0);
    }

    #[test]
    fn test_uid_unique() {
        let ids: std::collections::HashSet<_> = (0..500).map(|_| uid()).collect();
        assert_eq!(ids.len(), 500);
        assert!(ids.iter().all(|id| id.contains('-')));
    }

    #[test]
    fn test_monday_of() {
        // 2024-05-15 is a Wednesday
        assert_eq!(monday_of(date("2024-05-15")), date("2024-05-13"));
        assert_eq!(monday_of(date("2024-05-13")), date("2024-05-13"));
        // Sunday belongs to the week that started six days earlier
        assert_eq!(monday_of(date("2024-05-19")), date("2024-05-13"));
    }

    #[test]
    fn test_ymd() {
        assert_eq!(ymd(date("2024-03-07")), "2024-03-07");
    }

    #[test]
    fn test_week_number_from_start() {
        let start = "2024-01-01";
        assert_eq!(week_number_from_start(start, date("2024-01-01")), Some(1));
        assert_eq!(week_number_from_start(start, date("2024-01-07")), Some(1));
        assert_eq!(week_number_from_start(start, date("2024-01-08")), Some(2));
        assert_eq!(week_number_from_start(start, date("2024-03-25")), Some(13));
        assert_eq!(week_number_from_start(start, date("2023-12-01")), Some(1));
        assert_eq!(week_number_from_start("not a date", date("2024-01-01")), None);
    }
}
