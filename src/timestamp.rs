//! Serde helpers for `DateTime<Utc>` fields.
//!
//! Course exports are inconsistent about how they write times, so
//! deserialization accepts RFC 3339, a naive `YYYY-MM-DDTHH:MM:SS` (read as
//! UTC), or a bare `YYYY-MM-DD` (UTC midnight). Serialization always
//! produces RFC 3339.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serializer};

const NAIVE_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Parse a timestamp in any of the accepted forms.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, String> {
    let raw = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }

    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(naive.and_utc());
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
            return Ok(midnight.and_utc());
        }
    }

    Err(format!(
        "invalid timestamp '{}': expected RFC 3339 or YYYY-MM-DD",
        raw
    ))
}

pub fn serialize<S>(time: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&time.to_rfc3339())
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw).map_err(serde::de::Error::custom)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_date_only() {
        let parsed = parse_timestamp("2024-09-10").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 9, 10, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_parse_rfc3339_with_offset() {
        let parsed = parse_timestamp("2024-09-10T02:00:00+02:00").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 9, 10, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_parse_naive_datetime_as_utc() {
        let parsed = parse_timestamp("2024-09-10T23:59:59").unwrap();
        assert_eq!(
            parsed,
            Utc.with_ymd_and_hms(2024, 9, 10, 23, 59, 59).unwrap()
        );

        let spaced = parse_timestamp("2024-09-10 23:59:59").unwrap();
        assert_eq!(parsed, spaced);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_timestamp("next tuesday").is_err());
        assert!(parse_timestamp("2024-13-40").is_err());
        assert!(parse_timestamp("").is_err());
    }

    #[test]
    fn test_serialize_as_rfc3339() {
        #[derive(serde::Serialize)]
        struct Wrapper {
            #[serde(with = "super")]
            at: DateTime<Utc>,
        }

        let wrapper = Wrapper {
            at: Utc.with_ymd_and_hms(2024, 9, 21, 0, 0, 0).unwrap(),
        };
        let json = serde_json::to_string(&wrapper).unwrap();
        assert_eq!(json, r#"{"at":"2024-09-21T00:00:00+00:00"}"#);
    }
}
