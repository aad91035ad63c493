//! Source-code detection: Python, C, C++, JavaScript, JSX and TypeScript.
//!
//! Each language is recognised by counting pattern hits over the full text.
//! Languages are tried in a fixed order (Python, the C family, JS/JSX, then
//! TypeScript) and the first one that clears its threshold wins.

use std::sync::OnceLock;

use regex::Regex;

use super::data_format::is_valid_json_document;
use super::detector::ContentDetector;
use super::sample::ContentSample;
use crate::mime;

const PYTHON_STDLIB: &[&str] = &["os", "sys", "re", "json", "math", "random", "datetime"];

/// Snippets this short only need a single Python pattern hit.
const SHORT_SNIPPET_LINES: usize = 5;

static PYTHON_IMPORTS: OnceLock<Vec<Regex>> = OnceLock::new();
static PYTHON_DEF: OnceLock<Regex> = OnceLock::new();
static PYTHON_CLASS: OnceLock<Regex> = OnceLock::new();
static PYTHON_DECORATOR: OnceLock<Regex> = OnceLock::new();
static PYTHON_PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
static C_PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
static CPP_PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
static JS_PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
static JSX_PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
static TS_PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();

fn compile(patterns: &[&str]) -> Vec<Regex> {
    patterns.iter().map(|p| Regex::new(p).unwrap()).collect()
}

fn python_imports() -> &'static Vec<Regex> {
    PYTHON_IMPORTS.get_or_init(|| {
        compile(&[
            r"(?m)^\s*import\s+(\w+|\w+\.\w+)",
            r"(?m)^\s*from\s+(\w+|\w+\.\w+)\s+import\s+",
        ])
    })
}

fn python_def() -> &'static Regex {
    PYTHON_DEF.get_or_init(|| Regex::new(r"^\s*def\s+\w+\s*\(").unwrap())
}

fn python_class() -> &'static Regex {
    PYTHON_CLASS.get_or_init(|| Regex::new(r"(?m)^\s*class\s+\w+\s*[\(:]").unwrap())
}

fn python_decorator() -> &'static Regex {
    PYTHON_DECORATOR.get_or_init(|| Regex::new(r"(?m)^\s*@\w+").unwrap())
}

fn python_patterns() -> &'static Vec<Regex> {
    PYTHON_PATTERNS.get_or_init(|| {
        compile(&[
            r"\bif\b.*?:",
            r"\belif\b.*?:",
            r"\belse\s*:",
            r"\bfor\b.*?\bin\b.*?:",
            r"\bwhile\b.*?:",
            r"\btry\s*:",
            r"\bexcept\b.*?:",
            r"\bfinally\s*:",
            r"\bNone\b",
            r"\bTrue\b",
            r"\bFalse\b",
            r#"f["'].*?\{.*?\}["']"#,
            r"\bdef\b",
            r"\bclass\b",
            r"\bimport\b",
            r"\bfrom\b",
            r"\blambda\b.*?:",
        ])
    })
}

fn c_patterns() -> &'static Vec<Regex> {
    C_PATTERNS.get_or_init(|| {
        compile(&[
            r"#include\s*<.*?>",
            r#"#include\s*".*?""#,
            r"\b(int|void|char|float|double)\s+main\s*\(.*\)\s*\{",
            r"\bstruct\s+\w+\s*\{",
            r"#define\s+\w+",
            r"printf\(.*?\);",
            r"scanf\(.*?\);",
        ])
    })
}

fn cpp_patterns() -> &'static Vec<Regex> {
    CPP_PATTERNS.get_or_init(|| {
        compile(&[
            r"\bclass\s+\w+\s*\{",
            r"\bnamespace\s+\w+\s*\{",
            r"\btemplate\s*<.*?>",
            r"::",
            r"\bstd::",
            r"\bcout\s*<<",
            r"\bcin\s*>>",
            r"\bnew\s+\w+",
            r"\bdelete\s+\w+",
            r"#include\s*<iostream>",
        ])
    })
}

fn js_patterns() -> &'static Vec<Regex> {
    JS_PATTERNS.get_or_init(|| {
        compile(&[
            r"function\s+\w+\s*\(",
            r"\bconst\s+\w+\s*=",
            r"\blet\s+\w+\s*=",
            r"\bvar\s+\w+\s*=",
            r"\bimport\s+.*\s+from",
            r"\bexport\s+",
            r"=>\s*\{",
            r"console\.log\(",
        ])
    })
}

fn jsx_patterns() -> &'static Vec<Regex> {
    JSX_PATTERNS.get_or_init(|| {
        compile(&[
            r"<\w+(>|\s+.*?>)[\s\S]*?</\w+>",
            r"<\w+\s+/>",
            r"className=",
            r"React\.createElement",
        ])
    })
}

fn ts_patterns() -> &'static Vec<Regex> {
    TS_PATTERNS.get_or_init(|| {
        compile(&[
            r":\s*(string|number|boolean|any|void|null|undefined)\b",
            r"\binterface\s+\w+\s*\{",
            r"\bclass\s+\w+\s+implements\s+\w+",
            r"\btype\s+\w+\s*=",
            r"\b(public|private|protected)\s+",
            r"\bnamespace\s+\w+\s*\{",
            r"<\w+>",
        ])
    })
}

fn count_matches(patterns: &[Regex], text: &str) -> usize {
    patterns.iter().filter(|p| p.is_match(text)).count()
}

/// Recognises common programming languages from source text.
pub struct ProgrammingLanguageDetector;

impl ProgrammingLanguageDetector {
    /// Classify the sample as source code, or `text/plain` when no language
    /// clears its threshold.
    pub fn classify(sample: &ContentSample<'_>) -> &'static str {
        let text = sample.text();
        if is_python(sample.first_line(), text, sample.lines()) {
            return mime::TEXT_PYTHON;
        }
        if let Some(c_family) = detect_c_family(text) {
            return c_family;
        }
        if let Some(js) = detect_js(text) {
            return js;
        }
        if is_typescript(text) {
            return mime::TEXT_TYPESCRIPT;
        }
        mime::TEXT_PLAIN
    }
}

impl ContentDetector for ProgrammingLanguageDetector {
    fn detect(&self, sample: &ContentSample<'_>) -> f64 {
        if Self::classify(sample) == mime::TEXT_PLAIN {
            0.0
        } else {
            0.95
        }
    }

    fn mime_type(&self, sample: &ContentSample<'_>) -> Option<&'static str> {
        Some(Self::classify(sample))
    }
}

fn is_python(first_line: &str, text: &str, lines: &[String]) -> bool {
    if python_imports().iter().any(|p| p.is_match(text))
        && PYTHON_STDLIB.iter().any(|lib| {
            text.contains(&format!("import {lib}")) || text.contains(&format!("from {lib}"))
        })
    {
        return true;
    }

    if first_line.starts_with("#!") && first_line.to_lowercase().contains("python") {
        return true;
    }

    if text.contains("if __name__ ==") && text.contains("__main__") {
        return true;
    }
    if python_def().is_match(text) && !text.contains("function") {
        return true;
    }
    if python_class().is_match(text) || python_decorator().is_match(text) {
        return true;
    }

    let count = count_matches(python_patterns(), text);
    let non_empty = lines.iter().filter(|l| !l.trim().is_empty()).count();
    if non_empty <= SHORT_SNIPPET_LINES && count >= 1 {
        return true;
    }
    count >= 3
}

fn detect_c_family(text: &str) -> Option<&'static str> {
    let c_count = count_matches(c_patterns(), text);
    let cpp_count = count_matches(cpp_patterns(), text);

    if cpp_count >= 2 || (cpp_count >= 1 && text.contains("std::")) {
        return Some(mime::TEXT_CPP);
    }
    if c_count >= 2 {
        return Some(mime::TEXT_C);
    }
    None
}

fn detect_js(text: &str) -> Option<&'static str> {
    let js_count = count_matches(js_patterns(), text);
    let jsx_count = count_matches(jsx_patterns(), text);

    if jsx_count > 0 && (text.contains("import React") || text.contains("from \"react\"")) {
        return Some(mime::TEXT_JSX);
    }
    if jsx_count >= 2 {
        return Some(mime::TEXT_JSX);
    }
    if js_count >= 2 {
        // JSON whose string values happen to read like JS is still JSON.
        if is_valid_json_document(text) {
            return None;
        }
        return Some(mime::TEXT_JAVASCRIPT);
    }
    None
}

fn is_typescript(text: &str) -> bool {
    count_matches(ts_patterns(), text) >= 2
}
