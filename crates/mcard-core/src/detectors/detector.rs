//! Detector capability and the confidence-scoring registry.
//!
//! Every detector scores a [`ContentSample`] independently. The
//! [`DetectorRegistry`] walks them in order and keeps the highest-confidence
//! MIME type, so registration order only matters for ties and early exit.

use std::sync::OnceLock;

use super::binary::BinarySignatureDetector;
use super::data_format::{
    CsvDetector, JsonDetector, SqlDetector, YamlDetector, is_valid_json_document,
};
use super::language::ProgrammingLanguageDetector;
use super::markup::{MarkdownDetector, PlainTextDetector, XmlDetector};
use super::obj::ObjDetector;
use super::sample::ContentSample;
use crate::mime;

/// Confidence at which the registry stops consulting further detectors.
pub const DEFAULT_EARLY_EXIT_CONFIDENCE: f64 = 0.99;

/// A single content-type detection strategy.
///
/// # Object Safety
///
/// This trait is object-safe so that detectors can be stored as
/// `Box<dyn ContentDetector>` in a [`DetectorRegistry`].
pub trait ContentDetector: Send + Sync {
    /// Confidence in `[0.0, 1.0]` that the sample is this detector's type.
    fn detect(&self, sample: &ContentSample<'_>) -> f64;

    /// MIME type for the sample, or `None` to decline.
    fn mime_type(&self, sample: &ContentSample<'_>) -> Option<&'static str>;

    /// Human-readable name for this detector (used in logging).
    ///
    /// Defaults to the short (unqualified) type name.
    fn name(&self) -> &str {
        let full = std::any::type_name::<Self>();
        full.rsplit("::").next().unwrap_or(full)
    }
}

/// Ordered set of [`ContentDetector`]s with max-confidence selection.
///
/// # Examples
///
/// ```
/// use mcard_core::detectors::{ContentDetector, ContentSample, DetectorRegistry};
///
/// struct Toml;
/// impl ContentDetector for Toml {
///     fn detect(&self, sample: &ContentSample<'_>) -> f64 {
///         if sample.first_line().starts_with("[package]") { 0.97 } else { 0.0 }
///     }
///     fn mime_type(&self, _: &ContentSample<'_>) -> Option<&'static str> {
///         Some("application/toml")
///     }
/// }
///
/// let registry = DetectorRegistry::with_builtin().prepend(Toml);
/// let sample = ContentSample::new("[package]\nname = \"demo\"", None);
/// assert_eq!(registry.detect(&sample), "application/toml");
/// ```
pub struct DetectorRegistry {
    detectors: Vec<Box<dyn ContentDetector>>,
    early_exit_confidence: f64,
}

static SHARED: OnceLock<DetectorRegistry> = OnceLock::new();

impl DetectorRegistry {
    /// Create an empty registry. It always answers `text/plain`.
    pub fn new() -> Self {
        Self {
            detectors: Vec::new(),
            early_exit_confidence: DEFAULT_EARLY_EXIT_CONFIDENCE,
        }
    }

    /// Create a registry holding the built-in detectors in their canonical
    /// order: binary signatures, programming languages, XML, JSON, OBJ,
    /// Markdown, SQL, CSV, YAML, then plain text.
    pub fn with_builtin() -> Self {
        Self::new()
            .push(BinarySignatureDetector)
            .push(ProgrammingLanguageDetector)
            .push(XmlDetector)
            .push(JsonDetector)
            .push(ObjDetector)
            .push(MarkdownDetector)
            .push(SqlDetector)
            .push(CsvDetector)
            .push(YamlDetector)
            .push(PlainTextDetector)
    }

    /// Process-wide built-in registry, constructed on first use.
    pub fn shared() -> &'static DetectorRegistry {
        SHARED.get_or_init(Self::with_builtin)
    }

    /// Add a detector to the **front** of the registry.
    pub fn prepend(mut self, detector: impl ContentDetector + 'static) -> Self {
        self.detectors.insert(0, Box::new(detector));
        self
    }

    /// Add a detector to the **end** of the registry.
    pub fn push(mut self, detector: impl ContentDetector + 'static) -> Self {
        self.detectors.push(Box::new(detector));
        self
    }

    /// Override the confidence that ends the scan early.
    pub fn with_early_exit_confidence(mut self, confidence: f64) -> Self {
        self.early_exit_confidence = confidence;
        self
    }

    pub fn early_exit_confidence(&self) -> f64 {
        self.early_exit_confidence
    }

    /// Names of the registered detectors, in order.
    pub fn detector_names(&self) -> Vec<&str> {
        self.detectors.iter().map(|d| d.name()).collect()
    }

    /// Return the most likely MIME type for `sample`.
    ///
    /// Never fails: with no confident detector the answer is `text/plain`.
    pub fn detect(&self, sample: &ContentSample<'_>) -> &'static str {
        if is_ambiguous_short_csv(sample) {
            tracing::trace!("short comma-separated text, treating as plain text");
            return mime::TEXT_PLAIN;
        }

        let mut best_confidence = 0.0;
        let mut best_mime = mime::TEXT_PLAIN;
        let mut winner: Option<&str> = None;

        for detector in &self.detectors {
            let confidence = detector.detect(sample);
            tracing::trace!(detector = detector.name(), confidence, "detector scored");
            if confidence <= best_confidence {
                continue;
            }
            if let Some(mime_type) = detector.mime_type(sample) {
                best_confidence = confidence;
                best_mime = mime_type;
                winner = Some(detector.name());
                if confidence >= self.early_exit_confidence {
                    break;
                }
            }
        }

        tracing::debug!(
            detector = winner.unwrap_or("default"),
            confidence = best_confidence,
            mime_type = best_mime,
            "content type detected"
        );
        best_mime
    }

    /// Return the number of detectors in the registry.
    pub fn len(&self) -> usize {
        self.detectors.len()
    }

    /// Return `true` if the registry contains no detectors.
    pub fn is_empty(&self) -> bool {
        self.detectors.is_empty()
    }
}

impl Default for DetectorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Short prose with a comma or two per line reads as CSV to the CSV and
/// plain-text detectors; settle it before they run. JSON documents are left
/// to the JSON detector.
fn is_ambiguous_short_csv(sample: &ContentSample<'_>) -> bool {
    if !sample.is_text() || !sample.text().contains(',') {
        return false;
    }
    if is_valid_json_document(sample.text()) {
        return false;
    }
    let lines = sample.lines();
    if lines.len() >= 3 {
        return false;
    }
    let comma_lines = lines.iter().filter(|l| l.contains(',')).count();
    if comma_lines == 0 || comma_lines != lines.len() {
        return false;
    }
    let mut counts = lines
        .iter()
        .filter(|l| !l.trim().is_empty())
        .map(|l| l.matches(',').count())
        .peekable();
    counts.peek().is_some() && counts.all(|c| c <= 2)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed {
        confidence: f64,
        mime: Option<&'static str>,
    }

    impl ContentDetector for Fixed {
        fn detect(&self, _: &ContentSample<'_>) -> f64 {
            self.confidence
        }

        fn mime_type(&self, _: &ContentSample<'_>) -> Option<&'static str> {
            self.mime
        }
    }

    struct Panics;

    impl ContentDetector for Panics {
        fn detect(&self, _: &ContentSample<'_>) -> f64 {
            panic!("registry should have stopped before this detector");
        }

        fn mime_type(&self, _: &ContentSample<'_>) -> Option<&'static str> {
            None
        }
    }

    fn detect(registry: &DetectorRegistry, text: &str) -> &'static str {
        registry.detect(&ContentSample::new(text, None))
    }

    #[test]
    fn empty_registry_defaults_to_plain_text() {
        let registry = DetectorRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(detect(&registry, "anything"), mime::TEXT_PLAIN);
    }

    #[test]
    fn builtin_order() {
        let registry = DetectorRegistry::with_builtin();
        assert_eq!(
            registry.detector_names(),
            vec![
                "BinarySignatureDetector",
                "ProgrammingLanguageDetector",
                "XmlDetector",
                "JsonDetector",
                "ObjDetector",
                "MarkdownDetector",
                "SqlDetector",
                "CsvDetector",
                "YamlDetector",
                "PlainTextDetector",
            ]
        );
    }

    #[test]
    fn highest_confidence_wins() {
        let registry = DetectorRegistry::new()
            .push(Fixed { confidence: 0.4, mime: Some("a/low") })
            .push(Fixed { confidence: 0.8, mime: Some("a/high") })
            .push(Fixed { confidence: 0.6, mime: Some("a/mid") });
        assert_eq!(detect(&registry, "x"), "a/high");
    }

    #[test]
    fn ties_keep_the_earlier_detector() {
        let registry = DetectorRegistry::new()
            .push(Fixed { confidence: 0.7, mime: Some("a/first") })
            .push(Fixed { confidence: 0.7, mime: Some("a/second") });
        assert_eq!(detect(&registry, "x"), "a/first");
    }

    #[test]
    fn declining_detector_is_skipped() {
        let registry = DetectorRegistry::new()
            .push(Fixed { confidence: 0.5, mime: Some("a/kept") })
            .push(Fixed { confidence: 0.9, mime: None });
        assert_eq!(detect(&registry, "x"), "a/kept");
    }

    #[test]
    fn early_exit_stops_iteration() {
        let registry = DetectorRegistry::new()
            .push(Fixed { confidence: 0.99, mime: Some("a/certain") })
            .push(Panics);
        assert_eq!(detect(&registry, "x"), "a/certain");
    }

    #[test]
    fn early_exit_threshold_is_configurable() {
        let registry = DetectorRegistry::new()
            .with_early_exit_confidence(0.5)
            .push(Fixed { confidence: 0.6, mime: Some("a/enough") })
            .push(Panics);
        assert_eq!(registry.early_exit_confidence(), 0.5);
        assert_eq!(detect(&registry, "x"), "a/enough");
    }

    #[test]
    fn prepend_takes_priority_on_ties() {
        let registry = DetectorRegistry::new()
            .push(Fixed { confidence: 0.9, mime: Some("a/pushed") })
            .prepend(Fixed { confidence: 0.9, mime: Some("a/prepended") });
        assert_eq!(registry.len(), 2);
        assert_eq!(detect(&registry, "x"), "a/prepended");
    }

    #[test]
    fn short_comma_prose_is_plain_text() {
        let registry = DetectorRegistry::new().push(Fixed {
            confidence: 0.9,
            mime: Some(mime::TEXT_CSV),
        });
        assert_eq!(detect(&registry, "Hello, world\nGoodbye, friend"), mime::TEXT_PLAIN);
        // Three lines is no longer "short".
        assert_eq!(detect(&registry, "a,b\nc,d\ne,f"), mime::TEXT_CSV);
        // More than two commas on a line is no longer ambiguous.
        assert_eq!(detect(&registry, "a,b,c,d\ne,f,g,h"), mime::TEXT_CSV);
    }

    #[test]
    fn short_csv_rule_leaves_json_alone() {
        let sample = ContentSample::new(r#"{"a": 1, "b": [2,3]}"#, None);
        assert!(!is_ambiguous_short_csv(&sample));
    }

    #[test]
    fn short_csv_rule_ignores_non_utf8_bytes() {
        let bytes: &[u8] = &[0xff, b'a', b',', b'b'];
        let sample = ContentSample::new(bytes, None);
        assert!(!is_ambiguous_short_csv(&sample));
    }

    #[test]
    fn shared_registry_is_builtin() {
        let shared = DetectorRegistry::shared();
        assert_eq!(shared.len(), DetectorRegistry::with_builtin().len());
        assert!(std::ptr::eq(shared, DetectorRegistry::shared()));
    }

    #[test]
    fn default_name_is_short_type_name() {
        let fixed = Fixed { confidence: 0.0, mime: None };
        assert_eq!(fixed.name(), "Fixed");
    }
}
