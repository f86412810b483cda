// Shared time helpers

use chrono::{Local, NaiveDateTime};

/// Parse a timestamp as written in transaction CSVs. Accepts the space
/// separated form ("2025-06-01 02:30:00") and the T-separated RFC 3339
/// style form, with or without fractional seconds.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let trimmed = raw.trim();
    const FORMATS: [&str; 3] = [
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M",
    ];
    for format in FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(parsed);
        }
    }
    // Bare dates carry no time component and need their own parser.
    chrono::NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}

pub fn now_naive() -> NaiveDateTime {
    Local::now().naive_local()
}
