//! ISO-8601 parsing for the incremental `start_time`

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use crate::error::{ZendeskError, ZendeskResult};

const OFFSET_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S %z", "%Y-%m-%dT%H:%M:%S%z"];
const NAIVE_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S"];

/// Parse an ISO-8601 timestamp. Timestamps without an offset are taken as UTC.
pub fn parse_iso(value: &str) -> ZendeskResult<DateTime<Utc>> {
    let value = value.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&Utc));
    }

    for fmt in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(value, fmt) {
            return Ok(dt.with_timezone(&Utc));
        }
    }

    for fmt in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, fmt) {
            return Ok(naive.and_utc());
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
            return Ok(midnight.and_utc());
        }
    }

    Err(ZendeskError::Config(format!(
        "start_time: '{}' is not a valid ISO-8601 timestamp",
        value
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn iso_to_epoch_second(value: &str) -> ZendeskResult<i64> {
        parse_iso(value).map(|dt| dt.timestamp())
    }

    #[test]
    fn test_rfc3339_utc() {
        assert_eq!(iso_to_epoch_second("2019-01-01T00:00:00Z").unwrap(), 1546300800);
    }

    #[test]
    fn test_rfc3339_with_millis() {
        assert_eq!(iso_to_epoch_second("2019-01-01T00:00:00.000Z").unwrap(), 1546300800);
    }

    #[test]
    fn test_rfc3339_with_offset() {
        assert_eq!(iso_to_epoch_second("2019-01-01T09:00:00+09:00").unwrap(), 1546300800);
    }

    #[test]
    fn test_space_separated_with_offset() {
        assert_eq!(iso_to_epoch_second("2019-01-01 00:00:00 +0000").unwrap(), 1546300800);
    }

    #[test]
    fn test_naive_is_utc() {
        assert_eq!(iso_to_epoch_second("2019-01-01T00:00:00").unwrap(), 1546300800);
        assert_eq!(iso_to_epoch_second("2019-01-01 00:00:00").unwrap(), 1546300800);
    }

    #[test]
    fn test_date_only() {
        assert_eq!(iso_to_epoch_second("2019-01-01").unwrap(), 1546300800);
    }

    #[test]
    fn test_epoch_zero() {
        assert_eq!(iso_to_epoch_second("1970-01-01T00:00:00Z").unwrap(), 0);
    }

    #[test]
    fn test_invalid() {
        let err = iso_to_epoch_second("yesterday").unwrap_err();
        assert!(err.is_config());
        assert!(err.to_string().contains("yesterday"));
    }
}
