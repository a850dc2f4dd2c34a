//! Date parsing and formatting for front matter and templates.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};

/// Format used by the `htmlDateString` filter (`yyyy-LL-dd`).
pub const HTML_DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a date string in one of the accepted forms, normalized to UTC.
///
/// Accepted:
/// - RFC 3339 (`2021-03-05T10:00:00+02:00`, `2021-03-05T00:00:00Z`)
/// - `YYYY-MM-DDTHH:MM:SS` / `YYYY-MM-DD HH:MM:SS` without offset (read as UTC)
/// - `YYYY-MM-DD` (midnight UTC)
pub fn parse_date(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    for fmt in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Interpret an integer as Unix seconds.
pub fn from_timestamp(secs: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(secs, 0)
}

/// Render as `yyyy-LL-dd` in UTC.
pub fn html_date_string(dt: &DateTime<Utc>) -> String {
    dt.format(HTML_DATE_FORMAT).to_string()
}

/// Render as RFC 3339 with second precision, the form templates receive.
pub fn to_rfc3339(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Secs, true)
}
