//! Release-date normalization
//!
//! Dates arrive in whatever shape the source page carries: ISO datetimes in
//! metadata, slash-separated day/month/year in older pages, or the visible
//! "10 January 2024" form. Everything is normalized to the sortable lexical
//! `YYYY-MM-DD`; anything unparseable becomes the empty string, which callers
//! treat as "unknown" and never as a stop signal.

use chrono::NaiveDate;

/// Normalizes a raw date string to `YYYY-MM-DD`, or empty if unparseable
pub fn normalize_date(raw: &str) -> String {
    let raw = raw.trim();
    if raw.is_empty() {
        return String::new();
    }

    // ISO datetime: truncate at the time separator
    let date_part = match raw.split_once('T') {
        Some((date, _)) => date,
        None => raw,
    };

    if let Ok(date) = NaiveDate::parse_from_str(date_part, "%Y-%m-%d") {
        return date.format("%Y-%m-%d").to_string();
    }

    // Slash-separated day/month/year, zero-padded on output
    if let Some(date) = parse_slash_date(date_part) {
        return date.format("%Y-%m-%d").to_string();
    }

    // "10 January 2024" or "10 Jan 2024"
    for format in ["%d %B %Y", "%d %b %Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(date_part, format) {
            return date.format("%Y-%m-%d").to_string();
        }
    }

    String::new()
}

/// Parses `D/M/YYYY` (day first, as the source site writes it)
fn parse_slash_date(raw: &str) -> Option<NaiveDate> {
    let parts: Vec<&str> = raw.split('/').collect();
    if parts.len() != 3 {
        return None;
    }
    let day: u32 = parts[0].trim().parse().ok()?;
    let month: u32 = parts[1].trim().parse().ok()?;
    let year: i32 = parts[2].trim().parse().ok()?;
    // Two-digit years are ambiguous; reject rather than guess a century
    if year < 1000 {
        return None;
    }
    NaiveDate::from_ymd_opt(year, month, day)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_iso_datetime_truncated() {
        assert_eq!(normalize_date("2024-01-10T09:30:00.000Z"), "2024-01-10");
    }

    #[test]
    fn test_plain_iso_date() {
        assert_eq!(normalize_date("2024-01-10"), "2024-01-10");
    }

    #[test]
    fn test_slash_date_zero_padded() {
        assert_eq!(normalize_date("9/1/2024"), "2024-01-09");
        assert_eq!(normalize_date("10/11/2024"), "2024-11-10");
    }

    #[test]
    fn test_long_month_form() {
        assert_eq!(normalize_date("10 January 2024"), "2024-01-10");
    }

    #[test]
    fn test_abbreviated_month_form() {
        assert_eq!(normalize_date("5 Jan 2024"), "2024-01-05");
    }

    #[test]
    fn test_whitespace_trimmed() {
        assert_eq!(normalize_date("  2024-01-10  "), "2024-01-10");
    }

    #[test]
    fn test_unparseable_yields_empty() {
        assert_eq!(normalize_date("next Tuesday"), "");
        assert_eq!(normalize_date("2024"), "");
        assert_eq!(normalize_date(""), "");
    }

    #[test]
    fn test_invalid_calendar_date_yields_empty() {
        assert_eq!(normalize_date("31/2/2024"), "");
        assert_eq!(normalize_date("2024-02-31"), "");
    }

    #[test]
    fn test_two_digit_year_rejected() {
        assert_eq!(normalize_date("10/1/24"), "");
    }
}
