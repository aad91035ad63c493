//! Markup detectors: XML (with SVG and HTML refinement), Markdown, and the
//! plain-text fallback.

use std::collections::HashMap;
use std::sync::OnceLock;

use regex::Regex;

use super::data_format::is_valid_json_document;
use super::detector::ContentDetector;
use super::sample::ContentSample;
use crate::mime;

// ---------------------------------------------------------------------------
// XML
// ---------------------------------------------------------------------------

static XML_DECLARATION: OnceLock<Regex> = OnceLock::new();

fn xml_declaration() -> &'static Regex {
    XML_DECLARATION.get_or_init(|| Regex::new(r"(?i)^\s*<\?xml").unwrap())
}

fn is_tag_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn tag_name_at(text: &str, start: usize) -> &str {
    let rest = &text[start..];
    let end = rest.find(|c: char| !is_tag_char(c)).unwrap_or(rest.len());
    &rest[..end]
}

/// Whether `text` holds an element that is opened and later closed, such as
/// `<item id="1">...</item>`.
///
/// The closing name may be any non-empty prefix of the opening name, which
/// keeps `<items>...</item>` a match. Attributes never contain `>`.
fn has_basic_tag_pair(text: &str) -> bool {
    // Last offset at which each `</name>` closing tag starts.
    let mut closings: HashMap<&str, usize> = HashMap::new();
    for (idx, _) in text.match_indices("</") {
        let name = tag_name_at(text, idx + 2);
        if !name.is_empty() && text[idx + 2 + name.len()..].starts_with('>') {
            closings.insert(name, idx);
        }
    }
    if closings.is_empty() {
        return false;
    }

    for (idx, _) in text.match_indices('<') {
        let name = tag_name_at(text, idx + 1);
        if name.is_empty() {
            continue;
        }
        let Some(gt) = text[idx + 1..].find('>').map(|off| idx + 1 + off) else {
            continue;
        };
        let closed = (1..=name.len()).any(|len| {
            closings
                .get(&name[..len])
                .is_some_and(|&close_at| close_at > gt)
        });
        if closed {
            return true;
        }
    }
    false
}

/// Recognises XML documents, refining to SVG or HTML where markers appear.
pub struct XmlDetector;

impl ContentDetector for XmlDetector {
    fn detect(&self, sample: &ContentSample<'_>) -> f64 {
        let text = sample.text();
        let mut confidence: f64 = 0.0;

        if sample.extension_lower().as_deref() == Some(".xml") {
            confidence = confidence.max(0.95);
        }
        if xml_declaration().is_match(sample.first_line()) || text.trim().starts_with("<?xml") {
            confidence = confidence.max(0.95);
        }
        if text.contains('<') && text.contains('>') && text.contains("</") {
            confidence = confidence.max(0.5);
            if has_basic_tag_pair(text) {
                confidence = confidence.max(0.7);
            }
        }
        if text.to_lowercase().contains("<!doctype html") && confidence > 0.3 {
            confidence -= 0.4;
        }

        confidence.clamp(0.0, 1.0)
    }

    fn mime_type(&self, sample: &ContentSample<'_>) -> Option<&'static str> {
        if sample.extension() == Some(".xml") {
            return Some(mime::APPLICATION_XML);
        }
        let lower = sample.text().to_lowercase();
        if lower.contains("<svg") {
            return Some(mime::IMAGE_SVG);
        }
        if lower.contains("<html") || lower.contains("<!doctype html") {
            return Some(mime::TEXT_HTML);
        }
        Some(if self.detect(sample) > 0.5 {
            mime::APPLICATION_XML
        } else {
            mime::TEXT_PLAIN
        })
    }
}

// ---------------------------------------------------------------------------
// Markdown
// ---------------------------------------------------------------------------

static MARKDOWN_LINE_PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
static SETEXT_HEADER: OnceLock<Regex> = OnceLock::new();

fn markdown_line_patterns() -> &'static Vec<Regex> {
    MARKDOWN_LINE_PATTERNS.get_or_init(|| {
        vec![
            // ATX headers
            Regex::new(r"^#{1,6}\s+\S+").unwrap(),
            // List items
            Regex::new(r"^\s*[\*\+\-]\s+\S+").unwrap(),
            Regex::new(r"^\s*\d+\.\s+\S+").unwrap(),
            // Inline code
            Regex::new(r"`{1,3}[^`]+`{1,3}").unwrap(),
            // Links and images
            Regex::new(r"\[[^\]]+\]\([^\)]+\)").unwrap(),
            Regex::new(r"!\[[^\]]+\]\([^\)]+\)").unwrap(),
            // Blockquotes
            Regex::new(r"^\s*>.*").unwrap(),
        ]
    })
}

fn setext_header() -> &'static Regex {
    SETEXT_HEADER.get_or_init(|| Regex::new(r"(?m)^.*\n(?:={3,}|-{3,})\s*$").unwrap())
}

/// Recognises Markdown by counting headers, lists, links and code fences.
pub struct MarkdownDetector;

impl ContentDetector for MarkdownDetector {
    fn detect(&self, sample: &ContentSample<'_>) -> f64 {
        let text = sample.text();
        let mut confidence: f64 = 0.0;

        if matches!(
            sample.extension_lower().as_deref(),
            Some(".md" | ".markdown")
        ) {
            confidence = confidence.max(0.95);
        }

        let mut features = 0usize;
        if setext_header().is_match(text) {
            features += 2;
        }
        let patterns = markdown_line_patterns();
        features += sample
            .lines()
            .iter()
            .take(20)
            .filter(|line| patterns.iter().any(|p| p.is_match(line)))
            .count();

        let has_code_fence = text.contains("```");
        if has_code_fence {
            features += 1;
        }

        if features > 1 && has_code_fence {
            confidence = confidence.max(0.85);
        }
        if features > 3 && has_code_fence {
            confidence = confidence.max(0.95);
        } else if features > 1 {
            confidence = confidence.max(0.6);
        }

        // JSON documents and XML with a declaration carry list-like lines.
        if is_valid_json_document(text) && confidence > 0.3 {
            confidence -= 0.4;
        }
        if text.trim().starts_with('<') && text.contains("<?xml") && confidence > 0.3 {
            confidence -= 0.4;
        }

        confidence.clamp(0.0, 1.0)
    }

    fn mime_type(&self, sample: &ContentSample<'_>) -> Option<&'static str> {
        Some(if self.detect(sample) > 0.5 {
            mime::TEXT_MARKDOWN
        } else {
            mime::TEXT_PLAIN
        })
    }
}

// ---------------------------------------------------------------------------
// Plain text
// ---------------------------------------------------------------------------

const NON_TEXT_EXTENSIONS: &[&str] = &[
    ".png", ".jpg", ".jpeg", ".gif", ".bmp", ".svg", ".webp", ".pdf",
];

/// Fallback detector: always answers `text/plain` with low confidence.
pub struct PlainTextDetector;

impl ContentDetector for PlainTextDetector {
    fn detect(&self, sample: &ContentSample<'_>) -> f64 {
        if sample.is_empty() {
            return 0.1;
        }
        if let Some(ext) = sample.extension_lower()
            && NON_TEXT_EXTENSIONS.contains(&ext.as_str())
        {
            return 0.0;
        }

        let lines = sample.lines();
        if sample.text().contains(',')
            && lines.len() < 5
            && lines.iter().all(|l| l.contains(','))
        {
            return 0.8;
        }
        0.15
    }

    fn mime_type(&self, _sample: &ContentSample<'_>) -> Option<&'static str> {
        Some(mime::TEXT_PLAIN)
    }
}
