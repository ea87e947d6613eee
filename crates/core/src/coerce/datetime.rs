//! Timestamp parsing and rendering

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};

/// Date/time layouts accepted for free-form timestamp text
const DATETIME_FORMATS: [&str; 3] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y/%m/%d %H:%M:%S",
];

/// Date-only layouts, midnight UTC assumed
const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%Y/%m/%d"];

/// Parse free-form timestamp text
///
/// Accepts RFC 3339, the common layouts above and integer Unix epochs.
/// Returns `None` for anything else.
pub(crate) fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
        return Some(parsed.with_timezone(&Utc));
    }
    for format in DATETIME_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(text, format) {
            return Some(parsed.and_utc());
        }
    }
    for format in DATE_FORMATS {
        if let Ok(parsed) = NaiveDate::parse_from_str(text, format) {
            return parsed.and_hms_opt(0, 0, 0).map(|datetime| datetime.and_utc());
        }
    }
    if let Ok(epoch) = text.parse::<i64>() {
        return DateTime::from_timestamp(epoch, 0);
    }
    None
}

/// Render a timestamp as RFC 3339 text
pub(crate) fn to_iso8601(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Secs, false)
}

/// Render a timestamp using a strftime format string
pub(crate) fn format_timestamp(timestamp: &DateTime<Utc>, format: &str) -> String {
    timestamp.format(format).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rfc3339() {
        let parsed = parse_timestamp("2024-03-01T12:30:00+01:00").expect("should parse");
        assert_eq!(to_iso8601(&parsed), "2024-03-01T11:30:00+00:00");
    }

    #[test]
    fn test_parse_common_layouts() {
        assert!(parse_timestamp("2024-03-01 12:30:00").is_some());
        assert!(parse_timestamp("2024-03-01").is_some());
        assert!(parse_timestamp("2024/03/01").is_some());
    }

    #[test]
    fn test_parse_epoch() {
        let parsed = parse_timestamp("0").expect("should parse");
        assert_eq!(parsed, DateTime::<Utc>::UNIX_EPOCH);
    }

    #[test]
    fn test_unparsable_text() {
        assert!(parse_timestamp("not a date").is_none());
        assert!(parse_timestamp("").is_none());
    }

    #[test]
    fn test_format_timestamp() {
        let parsed = parse_timestamp("2024-03-01 12:30:00").expect("should parse");
        assert_eq!(format_timestamp(&parsed, "%Y-%m-%d"), "2024-03-01");
        assert_eq!(format_timestamp(&parsed, "%d/%m/%Y %H:%M"), "01/03/2024 12:30");
    }
}
