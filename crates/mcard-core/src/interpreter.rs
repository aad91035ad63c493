//! Public detection entry point: MIME type plus file extension, and the
//! binary/text classification heuristics.

use serde::{Deserialize, Serialize};

use crate::config::DetectionConfig;
use crate::detectors::{Content, ContentSample, DetectorRegistry, is_valid_json_document};
use crate::mime;

/// Extensions whose files legitimately consist of very long lines.
const LONG_LINE_EXTENSIONS: &[&str] = &[".min.js", ".min.css", ".map", ".svg", ".json", ".geojson"];

/// Bytes scanned for NUL by [`ContentTypeInterpreter::quick_detect`].
const QUICK_NULL_SCAN_BYTES: usize = 1024;

/// Outcome of [`ContentTypeInterpreter::detect_content_type`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectionResult {
    pub mime_type: String,
    /// Extension with leading dot, e.g. `.json`.
    pub extension: String,
}

/// Runs the detector registry over caller content.
///
/// The default interpreter borrows the process-wide registry; use
/// [`ContentTypeInterpreter::with_config`] to apply non-default tunables.
pub struct ContentTypeInterpreter<'r> {
    registry: RegistryRef<'r>,
    config: DetectionConfig,
}

enum RegistryRef<'r> {
    Borrowed(&'r DetectorRegistry),
    Owned(DetectorRegistry),
}

impl RegistryRef<'_> {
    fn get(&self) -> &DetectorRegistry {
        match self {
            RegistryRef::Borrowed(registry) => registry,
            RegistryRef::Owned(registry) => registry,
        }
    }
}

impl Default for ContentTypeInterpreter<'static> {
    fn default() -> Self {
        Self {
            registry: RegistryRef::Borrowed(DetectorRegistry::shared()),
            config: DetectionConfig::default(),
        }
    }
}

impl ContentTypeInterpreter<'static> {
    /// Interpreter for `config`; shares the built-in registry when the
    /// config leaves the early-exit threshold at its default.
    pub fn with_config(config: DetectionConfig) -> Self {
        let registry = if config.early_exit_confidence
            == DetectorRegistry::shared().early_exit_confidence()
        {
            RegistryRef::Borrowed(DetectorRegistry::shared())
        } else {
            RegistryRef::Owned(config.registry())
        };
        Self { registry, config }
    }
}

impl<'r> ContentTypeInterpreter<'r> {
    /// Interpreter over a caller-assembled registry.
    pub fn with_registry(registry: &'r DetectorRegistry, config: DetectionConfig) -> Self {
        Self {
            registry: RegistryRef::Borrowed(registry),
            config,
        }
    }

    pub fn config(&self) -> &DetectionConfig {
        &self.config
    }

    /// Build the detection sample for `content` under this config.
    pub fn sample<'a>(
        &self,
        content: impl Into<Content<'a>>,
        extension: Option<&'a str>,
    ) -> ContentSample<'a> {
        ContentSample::with_limits(
            content,
            extension,
            self.config.sample_bytes,
            self.config.sample_lines,
        )
    }

    /// Detect the MIME type of `content` and pick a file extension for it.
    ///
    /// Total: any input, including empty or random bytes, yields a result.
    pub fn detect_content_type<'a>(
        &self,
        content: impl Into<Content<'a>>,
        extension: Option<&'a str>,
    ) -> DetectionResult {
        let sample = self.sample(content, extension);
        let mime_type = self.registry.get().detect(&sample);
        DetectionResult {
            mime_type: mime_type.to_string(),
            extension: mime::reconcile_extension(mime_type, extension),
        }
    }

    /// Whether `content` should be handled as binary.
    ///
    /// A known MIME type decides on its own. Without one, text content is
    /// never binary and byte content is detected first.
    pub fn is_binary_content<'a>(
        &self,
        content: impl Into<Content<'a>>,
        mime_type: Option<&str>,
    ) -> bool {
        if let Some(mime_type) = mime_type {
            return !mime::is_text_mime(mime_type);
        }
        let content = content.into();
        if content.is_text() {
            return false;
        }
        let detected = self.detect_content_type(content, None);
        !mime::is_text_mime(&detected.mime_type)
    }

    /// Null/control-byte ratio check for content without a signature.
    pub fn is_unstructured_binary(&self, sample: &[u8]) -> bool {
        let cfg = &self.config;
        if sample.len() < cfg.binary_min_sample {
            return false;
        }
        let scanned = &sample[..sample.len().min(cfg.binary_scan_bytes)];
        let (nulls, controls) = scanned.iter().fold((0usize, 0usize), |(n, c), &b| {
            let is_control = b < 32 && !matches!(b, b'\t' | b'\n' | b'\r');
            (n + usize::from(b == 0), c + usize::from(is_control))
        });
        let len = scanned.len() as f64;
        nulls as f64 / len > cfg.null_ratio_threshold
            || controls as f64 / len > cfg.control_ratio_threshold
    }

    /// A long sample with no line break in its head, unless the type is
    /// known to be single-line (minified JS, source maps and the like).
    pub fn has_pathological_lines(&self, sample: &[u8], is_known_type: bool) -> bool {
        let limit = self.config.pathological_scan_bytes;
        if is_known_type || sample.len() < limit {
            return false;
        }
        !sample[..limit].iter().any(|&b| b == b'\n' || b == b'\r')
    }

    /// Fast classification used when building cards: binary, JSON or text.
    pub fn quick_detect(content: &[u8]) -> &'static str {
        let head = &content[..content.len().min(QUICK_NULL_SCAN_BYTES)];
        if head.contains(&0) {
            return mime::OCTET_STREAM;
        }
        match std::str::from_utf8(content) {
            Ok(text) if is_valid_json_document(text) => mime::APPLICATION_JSON,
            Ok(_) => mime::TEXT_PLAIN,
            Err(_) => mime::OCTET_STREAM,
        }
    }

    /// Known MIME to extension table lookup.
    pub fn extension_for(mime_type: &str) -> Option<&'static str> {
        mime::extension_for(mime_type)
    }

    /// Whether `extension` names a format made of very long lines.
    pub fn is_known_long_line_extension(extension: &str) -> bool {
        if extension.is_empty() {
            return false;
        }
        let ext = extension.to_lowercase();
        LONG_LINE_EXTENSIONS.iter().any(|known| ext.ends_with(known))
    }
}

/// Detect with the shared registry and default config.
pub fn detect_content_type<'a>(
    content: impl Into<Content<'a>>,
    extension: Option<&'a str>,
) -> DetectionResult {
    ContentTypeInterpreter::default().detect_content_type(content, extension)
}

/// [`ContentTypeInterpreter::is_binary_content`] with the default config.
pub fn is_binary_content<'a>(content: impl Into<Content<'a>>, mime_type: Option<&str>) -> bool {
    ContentTypeInterpreter::default().is_binary_content(content, mime_type)
}
