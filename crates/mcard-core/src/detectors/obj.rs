//! Wavefront OBJ mesh detection.

use super::detector::ContentDetector;
use super::sample::ContentSample;
use crate::mime;

const OBJ_COMMANDS: &[&str] = &[
    "v ", "vt ", "vn ", "f ", "g ", "o ", "s ", "mtllib ", "usemtl ",
];

/// Source keywords that rule out a mesh file.
const CODE_KEYWORDS: &[&str] = &[
    "def ", "class ", "import ", "function ", "var ", "let ", "const ",
];

/// Recognises Wavefront OBJ geometry by its line commands.
pub struct ObjDetector;

fn command_count(sample: &ContentSample<'_>) -> usize {
    sample
        .lines()
        .iter()
        .map(|line| line.trim())
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .take(20)
        .filter(|line| OBJ_COMMANDS.iter().any(|cmd| line.starts_with(cmd)))
        .count()
}

impl ContentDetector for ObjDetector {
    fn detect(&self, sample: &ContentSample<'_>) -> f64 {
        let text = sample.text();
        if CODE_KEYWORDS.iter().any(|kw| text.contains(kw)) {
            return 0.0;
        }

        let mut confidence: f64 = 0.0;
        if sample.extension_lower().as_deref() == Some(".obj") {
            confidence = 0.95;
        }

        let commands = command_count(sample);
        if commands >= 2 {
            let score = match commands {
                n if n > 10 => 0.9,
                n if n > 5 => 0.8,
                _ => 0.7,
            };
            confidence = confidence.max(score);
        }
        confidence.min(1.0)
    }

    fn mime_type(&self, sample: &ContentSample<'_>) -> Option<&'static str> {
        Some(if self.detect(sample) > 0.5 {
            mime::APPLICATION_OBJ
        } else {
            mime::TEXT_PLAIN
        })
    }
}
