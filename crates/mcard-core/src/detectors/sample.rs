//! Per-call detection input: the content plus its decoded line sample.

use std::borrow::Cow;

/// Default size of the head sample that lines are taken from.
pub const DEFAULT_SAMPLE_BYTES: usize = 8192;

/// Default number of sampled lines.
pub const DEFAULT_SAMPLE_LINES: usize = 20;

/// Caller content, either already-decoded text or raw bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Content<'a> {
    Text(&'a str),
    Bytes(&'a [u8]),
}

impl<'a> Content<'a> {
    pub fn as_bytes(&self) -> &'a [u8] {
        match self {
            Content::Text(text) => text.as_bytes(),
            Content::Bytes(bytes) => bytes,
        }
    }

    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }

    pub fn is_empty(&self) -> bool {
        self.as_bytes().is_empty()
    }

    pub fn is_text(&self) -> bool {
        matches!(self, Content::Text(_))
    }
}

impl<'a> From<&'a str> for Content<'a> {
    fn from(text: &'a str) -> Self {
        Content::Text(text)
    }
}

impl<'a> From<&'a String> for Content<'a> {
    fn from(text: &'a String) -> Self {
        Content::Text(text.as_str())
    }
}

impl<'a> From<&'a [u8]> for Content<'a> {
    fn from(bytes: &'a [u8]) -> Self {
        Content::Bytes(bytes)
    }
}

impl<'a> From<&'a Vec<u8>> for Content<'a> {
    fn from(bytes: &'a Vec<u8>) -> Self {
        Content::Bytes(bytes.as_slice())
    }
}

impl<'a, const N: usize> From<&'a [u8; N]> for Content<'a> {
    fn from(bytes: &'a [u8; N]) -> Self {
        Content::Bytes(bytes.as_slice())
    }
}

/// Everything a detector looks at for one detection call.
///
/// `text` covers the whole content; `lines` and `first_line` come from the
/// head sample (a prefix of that same content).
#[derive(Debug, Clone)]
pub struct ContentSample<'a> {
    content: Content<'a>,
    text: Cow<'a, str>,
    lossless: bool,
    lines: Vec<String>,
    extension: Option<&'a str>,
}

impl<'a> ContentSample<'a> {
    /// Build a sample with the default head size and line count.
    pub fn new(content: impl Into<Content<'a>>, extension: Option<&'a str>) -> Self {
        Self::with_limits(
            content,
            extension,
            DEFAULT_SAMPLE_BYTES,
            DEFAULT_SAMPLE_LINES,
        )
    }

    /// Build a sample taking `sample_lines` lines from the first
    /// `sample_bytes` bytes (or characters, for text content).
    pub fn with_limits(
        content: impl Into<Content<'a>>,
        extension: Option<&'a str>,
        sample_bytes: usize,
        sample_lines: usize,
    ) -> Self {
        let content = content.into();
        let (text, lossless, head): (Cow<'a, str>, bool, Cow<'a, str>) = match content {
            Content::Text(text) => {
                let head = text
                    .char_indices()
                    .nth(sample_bytes)
                    .map_or(text, |(idx, _)| &text[..idx]);
                (Cow::Borrowed(text), true, Cow::Borrowed(head))
            }
            Content::Bytes(bytes) => {
                let text = String::from_utf8_lossy(bytes);
                let lossless = matches!(text, Cow::Borrowed(_));
                let head = String::from_utf8_lossy(&bytes[..bytes.len().min(sample_bytes)]);
                (text, lossless, head)
            }
        };

        let lines = head
            .split('\n')
            .take(sample_lines)
            .map(str::to_string)
            .collect();

        Self {
            content,
            text,
            lossless,
            lines,
            extension: extension.filter(|ext| !ext.is_empty()),
        }
    }

    pub fn content(&self) -> Content<'a> {
        self.content
    }

    /// Raw bytes of the full content (UTF-8 encoding for text).
    pub fn bytes(&self) -> &'a [u8] {
        self.content.as_bytes()
    }

    /// Lossy UTF-8 view of the full content.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// True for text content and for bytes that are valid UTF-8.
    pub fn is_text(&self) -> bool {
        self.lossless
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn first_line(&self) -> &str {
        self.lines.first().map_or("", String::as_str)
    }

    /// Caller-supplied extension hint, including the leading dot.
    pub fn extension(&self) -> Option<&'a str> {
        self.extension
    }

    /// Lower-cased extension hint.
    pub fn extension_lower(&self) -> Option<String> {
        self.extension.map(str::to_lowercase)
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}
