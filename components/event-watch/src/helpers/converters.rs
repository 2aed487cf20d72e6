//! Timestamp conversions between the platform's wire formats, the command line and
//! the display schema.
//!
//! The monitor API speaks RFC 3339 while the REST API speaks RFC 2822, so every
//! incoming timestamp goes through [`parse_platform_timestamp`] before it reaches the
//! normalizer. Display dates are always UTC.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer};

/// Parse a timestamp as returned by either platform API.
pub fn parse_platform_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    DateTime::parse_from_rfc2822(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Serde adapter for timestamp fields on raw platform records.
///
/// A missing, null or unparseable timestamp becomes the Unix epoch so that one bad
/// record never fails a whole page.
pub fn deserialize_platform_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;

    Ok(raw
        .as_deref()
        .and_then(parse_platform_timestamp)
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH))
}

/// Serde adapter for nullable string fields, which the platform sends as `null`.
pub fn deserialize_nullable_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Serde adapter for `error_code`, which arrives as a string or a number.
pub fn deserialize_error_code<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Code {
        Text(String),
        Number(i64),
    }

    Ok(match Option::<Code>::deserialize(deserializer)? {
        Some(Code::Text(s)) => s,
        Some(Code::Number(n)) => n.to_string(),
        None => String::new(),
    })
}

/// Render a timestamp for the date column: `2026-10-14 12:00:00`.
///
/// Sub-second precision is kept only when the milliseconds are non-zero, in which case
/// the trailing `Z` stays as well (`2026-10-14 12:00:00.250Z`).
pub fn format_display_date(date: &DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Millis, true)
        .replacen('T', " ", 1)
        .replace(".000Z", "")
}

/// Render a timestamp for a query string parameter.
pub fn to_query_timestamp(date: &DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Parse a `--start-date`/`--end-date` argument.
///
/// Accepts RFC 3339, `YYYY-MM-DD HH:MM:SS` and `YYYY-MM-DD`; the last two are read as
/// UTC.
pub fn parse_cli_date(raw: &str) -> Result<DateTime<Utc>, String> {
    let raw = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }

    for pattern in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, pattern) {
            return Ok(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| {
            format!("invalid date '{raw}', expected YYYY-MM-DD, YYYY-MM-DD HH:MM:SS or RFC 3339")
        })
}
