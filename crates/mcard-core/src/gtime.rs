//! g_time stamps: `algorithm|ISO-8601 timestamp|region`.
//!
//! A stamp records which hash algorithm produced a card's hash and when the
//! card was created. The region is always `UTC` for stamps produced here.

use std::sync::OnceLock;

use chrono::{DateTime, FixedOffset, NaiveDateTime, SecondsFormat, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::GTimeError;
use crate::hash::DEFAULT_ALGORITHM;

/// Hash function names accepted in a stamp.
pub const VALID_HASH_ALGORITHMS: &[&str] = &["md5", "sha1", "sha224", "sha256", "sha384", "sha512"];

/// Region code written by [`GTime::stamp_now`].
pub const DEFAULT_REGION: &str = "UTC";

const SEPARATOR: char = '|';

static ISO_PREFIX: OnceLock<Regex> = OnceLock::new();

fn iso_prefix() -> &'static Regex {
    ISO_PREFIX.get_or_init(|| {
        Regex::new(r"^\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}").expect("ISO prefix regex is valid")
    })
}

/// The three components of a parsed stamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GTimeStamp {
    pub algorithm: String,
    /// Raw timestamp segment; see [`GTimeStamp::datetime`].
    pub timestamp: String,
    pub region: String,
}

impl GTimeStamp {
    /// Interpret the timestamp segment, if it is a recognisable date-time.
    pub fn datetime(&self) -> Option<DateTime<FixedOffset>> {
        parse_datetime(&self.timestamp)
    }
}

/// Namespace for stamp construction, parsing and predicates.
pub struct GTime;

impl GTime {
    /// Stamp the current moment for `algorithm` (lower-cased).
    pub fn stamp_now(algorithm: &str) -> String {
        Self::stamp_at(algorithm, Utc::now())
    }

    /// Stamp the current moment for the default algorithm.
    pub fn stamp_now_default() -> String {
        Self::stamp_now(DEFAULT_ALGORITHM)
    }

    /// Stamp an explicit instant.
    pub fn stamp_at(algorithm: &str, at: DateTime<Utc>) -> String {
        format!(
            "{}{SEPARATOR}{}{SEPARATOR}{DEFAULT_REGION}",
            algorithm.to_lowercase(),
            at.to_rfc3339_opts(SecondsFormat::Millis, true)
        )
    }

    /// Split a stamp into its components.
    ///
    /// # Errors
    ///
    /// Returns [`GTimeError::InvalidFormat`] unless the stamp has exactly three
    /// `|`-separated segments.
    pub fn parse(stamp: &str) -> Result<GTimeStamp, GTimeError> {
        let parts: Vec<&str> = stamp.split(SEPARATOR).collect();
        match parts.as_slice() {
            [algorithm, timestamp, region] => Ok(GTimeStamp {
                algorithm: (*algorithm).to_string(),
                timestamp: (*timestamp).to_string(),
                region: (*region).to_string(),
            }),
            _ => Err(GTimeError::InvalidFormat(stamp.to_string())),
        }
    }

    pub fn hash_algorithm(stamp: &str) -> Result<String, GTimeError> {
        Self::parse(stamp).map(|s| s.algorithm)
    }

    pub fn timestamp(stamp: &str) -> Result<String, GTimeError> {
        Self::parse(stamp).map(|s| s.timestamp)
    }

    pub fn region_code(stamp: &str) -> Result<String, GTimeError> {
        Self::parse(stamp).map(|s| s.region)
    }

    /// Whether `name` is one of [`VALID_HASH_ALGORITHMS`] (case-insensitive).
    pub fn is_valid_hash_function(name: &str) -> bool {
        !name.is_empty()
            && VALID_HASH_ALGORITHMS
                .iter()
                .any(|valid| valid.eq_ignore_ascii_case(name))
    }

    /// Region codes must be non-empty and already upper case.
    pub fn is_valid_region_code(code: &str) -> bool {
        !code.is_empty() && code == code.to_uppercase()
    }

    /// `YYYY-MM-DDTHH:MM:SS` prefix that also parses as a date-time.
    pub fn is_iso_format(timestamp: &str) -> bool {
        !timestamp.is_empty() && iso_prefix().is_match(timestamp) && parse_datetime(timestamp).is_some()
    }
}

fn parse_datetime(value: &str) -> Option<DateTime<FixedOffset>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt);
    }
    // Offset-less stamps are read as UTC.
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .map(|naive| naive.and_utc().fixed_offset())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn stamp_has_three_segments() {
        let stamp = GTime::stamp_now("SHA256");
        let parsed = GTime::parse(&stamp).unwrap();
        assert_eq!(parsed.algorithm, "sha256");
        assert_eq!(parsed.region, "UTC");
        assert!(GTime::is_iso_format(&parsed.timestamp));
        assert!(parsed.datetime().is_some());
    }

    #[test]
    fn stamp_at_uses_millisecond_z_format() {
        let at = Utc.with_ymd_and_hms(2024, 12, 4, 12, 0, 0).unwrap();
        assert_eq!(
            GTime::stamp_at("sha1", at),
            "sha1|2024-12-04T12:00:00.000Z|UTC"
        );
    }

    #[test]
    fn default_stamp_uses_sha256() {
        assert!(GTime::stamp_now_default().starts_with("sha256|"));
    }

    #[test]
    fn parse_rejects_wrong_segment_count() {
        for bad in ["", "sha256", "sha256|2024-01-01T00:00:00Z", "a|b|c|d"] {
            assert_eq!(
                GTime::parse(bad),
                Err(GTimeError::InvalidFormat(bad.to_string())),
                "{bad:?}"
            );
        }
    }

    #[test]
    fn parse_keeps_unparseable_timestamp_raw() {
        let parsed = GTime::parse("sha256|not-a-date|UTC").unwrap();
        assert_eq!(parsed.timestamp, "not-a-date");
        assert!(parsed.datetime().is_none());
    }

    #[test]
    fn accessors_extract_segments() {
        let stamp = "sha512|2024-12-04T12:00:00.000Z|UTC";
        assert_eq!(GTime::hash_algorithm(stamp).unwrap(), "sha512");
        assert_eq!(GTime::timestamp(stamp).unwrap(), "2024-12-04T12:00:00.000Z");
        assert_eq!(GTime::region_code(stamp).unwrap(), "UTC");
        assert!(GTime::hash_algorithm("broken").is_err());
    }

    #[test]
    fn hash_function_predicate() {
        assert!(GTime::is_valid_hash_function("sha256"));
        assert!(GTime::is_valid_hash_function("MD5"));
        assert!(GTime::is_valid_hash_function("Sha224"));
        assert!(!GTime::is_valid_hash_function(""));
        assert!(!GTime::is_valid_hash_function("sha-256"));
        assert!(!GTime::is_valid_hash_function("blake3"));
    }

    #[test]
    fn region_code_predicate() {
        assert!(GTime::is_valid_region_code("UTC"));
        assert!(GTime::is_valid_region_code("US-EAST"));
        assert!(!GTime::is_valid_region_code("utc"));
        assert!(!GTime::is_valid_region_code(""));
    }

    #[test]
    fn iso_format_predicate() {
        assert!(GTime::is_iso_format("2024-12-04T12:00:00.000Z"));
        assert!(GTime::is_iso_format("2024-12-04T12:00:00"));
        assert!(GTime::is_iso_format("2024-12-04T12:00:00+02:00"));
        assert!(!GTime::is_iso_format("2024-12-04"));
        assert!(!GTime::is_iso_format("2024-13-04T12:00:00"));
        assert!(!GTime::is_iso_format("yesterday"));
        assert!(!GTime::is_iso_format(""));
    }
}
