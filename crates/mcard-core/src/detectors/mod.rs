//! Content-type detection over raw bytes or text.
//!
//! This module provides:
//!
//! - [`ContentSample`] -- the per-call view a detector scores
//! - [`ContentDetector`] -- trait for detection strategies
//! - [`DetectorRegistry`] -- max-confidence dispatcher over detectors
//! - the built-in detectors, one per content family
//!
//! ## Extending detection
//!
//! Implement [`ContentDetector`] and register it via
//! [`DetectorRegistry::with_builtin().prepend(your_detector)`](DetectorRegistry::prepend)
//! to recognise additional formats without modifying mcard-core.

mod binary;
mod data_format;
mod detector;
mod language;
mod markup;
mod obj;
mod sample;

pub use binary::BinarySignatureDetector;
pub use data_format::{CsvDetector, JsonDetector, SqlDetector, YamlDetector};
pub use detector::{ContentDetector, DEFAULT_EARLY_EXIT_CONFIDENCE, DetectorRegistry};
pub use language::ProgrammingLanguageDetector;
pub use markup::{MarkdownDetector, PlainTextDetector, XmlDetector};
pub use obj::ObjDetector;
pub use sample::{Content, ContentSample, DEFAULT_SAMPLE_BYTES, DEFAULT_SAMPLE_LINES};

pub(crate) use data_format::is_valid_json_document;
