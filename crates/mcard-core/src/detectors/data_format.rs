//! Structured data detectors: JSON, YAML, CSV and SQL.

use std::collections::BTreeSet;
use std::sync::OnceLock;

use regex::Regex;
use serde::de::IgnoredAny;

use super::detector::ContentDetector;
use super::sample::ContentSample;
use crate::mime;

/// Whether `text` parses as a JSON document.
pub(crate) fn parses_as_json(text: &str) -> bool {
    serde_json::from_str::<IgnoredAny>(text).is_ok()
}

/// Trimmed text is wrapped in `{}` or `[]`.
pub(crate) fn is_bracketed(text: &str) -> bool {
    let trimmed = text.trim();
    (trimmed.starts_with('{') && trimmed.ends_with('}'))
        || (trimmed.starts_with('[') && trimmed.ends_with(']'))
}

/// Bracketed text that parses as JSON.
pub(crate) fn is_valid_json_document(text: &str) -> bool {
    is_bracketed(text) && parses_as_json(text)
}

// ---------------------------------------------------------------------------
// JSON
// ---------------------------------------------------------------------------

/// Recognises JSON objects and arrays by parsing them.
pub struct JsonDetector;

impl ContentDetector for JsonDetector {
    fn detect(&self, sample: &ContentSample<'_>) -> f64 {
        let text = sample.text();
        if sample.extension_lower().as_deref() == Some(".json") {
            return if parses_as_json(text) { 0.95 } else { 0.6 };
        }

        if !is_bracketed(text) {
            return 0.0;
        }

        // JSON has no comments; JSONC and JS objects do.
        let commented = sample.lines().iter().take(5).any(|line| {
            let line = line.trim();
            line.starts_with("//") || line.starts_with("/*")
        });
        if commented {
            return 0.0;
        }

        if parses_as_json(text) { 0.9 } else { 0.0 }
    }

    fn mime_type(&self, sample: &ContentSample<'_>) -> Option<&'static str> {
        Some(if self.detect(sample) > 0.5 {
            mime::APPLICATION_JSON
        } else {
            mime::TEXT_PLAIN
        })
    }
}

// ---------------------------------------------------------------------------
// YAML
// ---------------------------------------------------------------------------

static YAML_START: OnceLock<Vec<Regex>> = OnceLock::new();
static YAML_START_MULTILINE: OnceLock<Vec<Regex>> = OnceLock::new();
static YAML_KEY_VALUE: OnceLock<Regex> = OnceLock::new();
static YAML_LIST_ITEM: OnceLock<Regex> = OnceLock::new();

fn yaml_start() -> &'static Vec<Regex> {
    YAML_START.get_or_init(|| {
        vec![
            Regex::new(r"^---\s*$").unwrap(),
            Regex::new(r"^%YAML").unwrap(),
        ]
    })
}

fn yaml_start_multiline() -> &'static Vec<Regex> {
    YAML_START_MULTILINE.get_or_init(|| {
        vec![
            Regex::new(r"(?m)^---\s*$").unwrap(),
            Regex::new(r"(?m)^%YAML").unwrap(),
        ]
    })
}

/// `key:` followed by a whitespace run and whatever comes after it.
fn yaml_key_value() -> &'static Regex {
    YAML_KEY_VALUE.get_or_init(|| Regex::new(r"^\s*[A-Za-z0-9_.-]+:(\s+)(.?)").unwrap())
}

fn yaml_list_item() -> &'static Regex {
    YAML_LIST_ITEM.get_or_init(|| Regex::new(r#"^\s*-\s+[A-Za-z0-9_'"]"#).unwrap())
}

/// A `key: value` line whose value does not open a flow mapping, flow
/// sequence or `=` assignment right after a single space.
fn is_yaml_key_value(line: &str) -> bool {
    let Some(caps) = yaml_key_value().captures(line) else {
        return false;
    };
    let gap = caps.get(1).map_or(0, |m| m.as_str().chars().count());
    let next = caps.get(2).map_or("", |m| m.as_str());
    gap >= 2 || !matches!(next, "=" | "{" | "[")
}

/// Recognises YAML documents that open with a `---` marker.
pub struct YamlDetector;

impl ContentDetector for YamlDetector {
    fn detect(&self, sample: &ContentSample<'_>) -> f64 {
        let text = sample.text();
        let mut confidence: f64 = 0.0;

        if matches!(sample.extension_lower().as_deref(), Some(".yaml" | ".yml")) {
            confidence = confidence.max(0.95);
        }
        if yaml_start().iter().any(|p| p.is_match(sample.first_line())) {
            confidence = confidence.max(0.9);
        }

        let mut features = 0usize;
        if yaml_start_multiline().iter().any(|p| p.is_match(text)) {
            features += 2;
        }
        for line in sample.lines().iter().take(20) {
            let line = line.trim();
            if is_yaml_key_value(line) || yaml_list_item().is_match(line) {
                features += 1;
            }
        }

        let first_non_empty = sample
            .lines()
            .iter()
            .find(|l| !l.trim().is_empty())
            .map_or("", |l| l.trim());
        if first_non_empty == "---" {
            if features > 1 {
                confidence = confidence.max(0.5);
            }
            if features > 3 {
                confidence = confidence.max(0.75);
            }
            if features > 5 {
                confidence = confidence.max(0.9);
            }
        }

        confidence.clamp(0.0, 1.0)
    }

    fn mime_type(&self, sample: &ContentSample<'_>) -> Option<&'static str> {
        Some(if self.detect(sample) > 0.5 {
            mime::APPLICATION_YAML
        } else {
            mime::TEXT_PLAIN
        })
    }
}

// ---------------------------------------------------------------------------
// CSV
// ---------------------------------------------------------------------------

/// How consistently a set of lines is comma-delimited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CsvShape {
    NotCsv,
    /// Every line has the same non-zero comma count.
    Uniform,
    /// Data lines agree; the header differs.
    UniformAfterHeader,
    /// Every line has commas, counts vary.
    Ragged,
}

fn csv_shape(lines: &[String]) -> CsvShape {
    let sampled: Vec<&str> = lines
        .iter()
        .take(10)
        .map(String::as_str)
        .filter(|l| !l.trim().is_empty())
        .collect();
    if sampled.is_empty() || !sampled.iter().all(|l| l.contains(',')) {
        return CsvShape::NotCsv;
    }

    let counts: Vec<usize> = sampled.iter().map(|l| l.matches(',').count()).collect();
    if is_single_positive(&counts) {
        return CsvShape::Uniform;
    }
    if counts.len() > 1 && is_single_positive(&counts[1..]) {
        return CsvShape::UniformAfterHeader;
    }
    if counts.iter().all(|&c| c > 0) {
        CsvShape::Ragged
    } else {
        CsvShape::NotCsv
    }
}

fn is_single_positive(counts: &[usize]) -> bool {
    let unique: BTreeSet<usize> = counts.iter().copied().collect();
    unique.len() == 1 && unique.first().is_some_and(|&c| c > 0)
}

/// Recognises comma-separated values by delimiter consistency.
pub struct CsvDetector;

impl ContentDetector for CsvDetector {
    fn detect(&self, sample: &ContentSample<'_>) -> f64 {
        let shape = csv_shape(sample.lines());
        if sample.extension_lower().as_deref() == Some(".csv") {
            return match shape {
                CsvShape::Uniform | CsvShape::UniformAfterHeader => 0.95,
                _ => 0.6,
            };
        }
        match shape {
            CsvShape::Uniform => 0.9,
            CsvShape::UniformAfterHeader => 0.8,
            CsvShape::Ragged => 0.5,
            CsvShape::NotCsv => 0.0,
        }
    }

    fn mime_type(&self, sample: &ContentSample<'_>) -> Option<&'static str> {
        Some(if self.detect(sample) > 0.5 {
            mime::TEXT_CSV
        } else {
            mime::TEXT_PLAIN
        })
    }
}

// ---------------------------------------------------------------------------
// SQL
// ---------------------------------------------------------------------------

const SQL_KEYWORDS: &[&str] = &[
    "SELECT ",
    "INSERT ",
    "UPDATE ",
    "DELETE ",
    "CREATE ",
    "DROP ",
    "ALTER ",
    "FROM ",
    "WHERE ",
    "JOIN ",
    "TABLE ",
    "INTO ",
    "VALUES ",
    "SET ",
    "PRIMARY KEY",
];

/// Recognises SQL by keyword hits in the first ten lines.
pub struct SqlDetector;

impl ContentDetector for SqlDetector {
    fn detect(&self, sample: &ContentSample<'_>) -> f64 {
        let mut confidence: f64 = 0.0;
        if sample.extension_lower().as_deref() == Some(".sql") {
            confidence = 0.95;
        }

        let hits: usize = sample
            .lines()
            .iter()
            .take(10)
            .map(|line| {
                let upper = line.to_uppercase();
                SQL_KEYWORDS.iter().filter(|kw| upper.contains(*kw)).count()
            })
            .sum();

        match hits {
            0 => {}
            1 => confidence = confidence.max(0.6),
            _ => confidence = confidence.max(0.85),
        }
        confidence.min(1.0)
    }

    fn mime_type(&self, sample: &ContentSample<'_>) -> Option<&'static str> {
        Some(if self.detect(sample) > 0.5 {
            mime::TEXT_SQL
        } else {
            mime::TEXT_PLAIN
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample<'a>(text: &'a str, ext: Option<&'a str>) -> ContentSample<'a> {
        ContentSample::new(text, ext)
    }

    // ---- JSON ----

    #[test]
    fn json_object_and_array() {
        assert_eq!(JsonDetector.detect(&sample(r#"{"a": 1, "b": [2,3]}"#, None)), 0.9);
        assert_eq!(JsonDetector.detect(&sample("  [1, 2, 3]\n", None)), 0.9);
        assert_eq!(
            JsonDetector.mime_type(&sample(r#"{"a": 1}"#, None)),
            Some(mime::APPLICATION_JSON)
        );
    }

    #[test]
    fn malformed_json_scores_zero() {
        assert_eq!(JsonDetector.detect(&sample("{a: 1", None)), 0.0);
        assert_eq!(JsonDetector.detect(&sample("{a: 1}", None)), 0.0);
        assert_eq!(
            JsonDetector.mime_type(&sample("{a: 1}", None)),
            Some(mime::TEXT_PLAIN)
        );
    }

    #[test]
    fn commented_json_rejected() {
        let text = "{\n  // settings\n  \"a\": 1\n}";
        assert_eq!(JsonDetector.detect(&sample(text, None)), 0.0);
    }

    #[test]
    fn json_extension_hint() {
        assert_eq!(JsonDetector.detect(&sample(r#"{"a":1}"#, Some(".JSON"))), 0.95);
        assert_eq!(JsonDetector.detect(&sample("not json", Some(".json"))), 0.6);
    }

    #[test]
    fn json_helpers() {
        assert!(is_valid_json_document(" {\"k\": null} "));
        assert!(!is_valid_json_document("\"just a string\""));
        assert!(!is_valid_json_document("[1, 2,]"));
        assert!(parses_as_json("42"));
    }

    // ---- YAML ----

    #[test]
    fn yaml_document_with_marker() {
        let text = "---\nname: demo\nversion: 1\nitems:\n  - one\n  - two\n";
        let s = sample(text, None);
        assert_eq!(YamlDetector.detect(&s), 0.9);
        assert_eq!(YamlDetector.mime_type(&s), Some(mime::APPLICATION_YAML));
    }

    #[test]
    fn yaml_without_marker_needs_extension() {
        let text = "name: demo\nversion: 1\n";
        assert_eq!(YamlDetector.detect(&sample(text, None)), 0.0);
        assert_eq!(YamlDetector.detect(&sample(text, Some(".yml"))), 0.95);
    }

    #[test]
    fn yaml_percent_directive() {
        assert_eq!(YamlDetector.detect(&sample("%YAML 1.2\n---\na: b\n", None)), 0.9);
    }

    #[test]
    fn yaml_key_value_lookahead() {
        assert!(is_yaml_key_value("name: demo"));
        assert!(is_yaml_key_value("key.sub-part: 1"));
        assert!(!is_yaml_key_value("map: {a: 1}"));
        assert!(!is_yaml_key_value("list: [1, 2]"));
        assert!(!is_yaml_key_value("x: =y"));
        // A wider gap lets the value start with anything.
        assert!(is_yaml_key_value("map:  {a: 1}"));
        assert!(!is_yaml_key_value("no_space:value"));
        assert!(!is_yaml_key_value("trailing:"));
    }

    // ---- CSV ----

    #[test]
    fn uniform_csv() {
        let text = "a,b,c\n1,2,3\n4,5,6\n";
        assert_eq!(CsvDetector.detect(&sample(text, None)), 0.9);
        assert_eq!(CsvDetector.mime_type(&sample(text, None)), Some(mime::TEXT_CSV));
    }

    #[test]
    fn csv_with_distinct_header() {
        let text = "title,notes\n1,2,3\n4,5,6\n";
        assert_eq!(CsvDetector.detect(&sample(text, None)), 0.8);
    }

    #[test]
    fn ragged_csv_is_not_confident() {
        let text = "a,b\n1,2,3\n4,5,6,7\n";
        let s = sample(text, None);
        assert_eq!(CsvDetector.detect(&s), 0.5);
        assert_eq!(CsvDetector.mime_type(&s), Some(mime::TEXT_PLAIN));
    }

    #[test]
    fn line_without_comma_is_not_csv() {
        assert_eq!(CsvDetector.detect(&sample("a,b\nplain\n", None)), 0.0);
        assert_eq!(CsvDetector.detect(&sample("", None)), 0.0);
    }

    #[test]
    fn csv_extension_hint() {
        assert_eq!(CsvDetector.detect(&sample("a,b\n1,2\n", Some(".csv"))), 0.95);
        assert_eq!(CsvDetector.detect(&sample("a,b\n1,2,3\n4\n", Some(".csv"))), 0.6);
    }

    // ---- SQL ----

    #[test]
    fn sql_keywords() {
        let text = "SELECT id, name\nFROM users\nWHERE id = 1;";
        let s = sample(text, None);
        assert_eq!(SqlDetector.detect(&s), 0.85);
        assert_eq!(SqlDetector.mime_type(&s), Some(mime::TEXT_SQL));
    }

    #[test]
    fn sql_is_case_insensitive() {
        assert_eq!(SqlDetector.detect(&sample("create table t (id int);", None)), 0.85);
    }

    #[test]
    fn single_sql_hit() {
        assert_eq!(SqlDetector.detect(&sample("please set the table", None)), 0.6);
        assert_eq!(SqlDetector.detect(&sample("we will drop it", None)), 0.6);
        assert_eq!(SqlDetector.detect(&sample("nothing here", None)), 0.0);
    }

    #[test]
    fn sql_extension_hint() {
        assert_eq!(SqlDetector.detect(&sample("", Some(".sql"))), 0.95);
    }
}
