//! Handles: human-assigned, Unicode-aware names that point at a card hash.
//!
//! Handles are normalised (trim, NFC, lowercase) and must start with a letter
//! from any script. Body characters are letters, numbers, `_`, `.`, `/`,
//! space and `-`, so `文檔-v1`, `مستند` and `документ/черновик` are all valid.

use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;

use crate::error::HandleValidationError;

/// Maximum handle length in characters, after normalisation.
pub const MAX_HANDLE_LENGTH: usize = 255;

static START_CHAR: OnceLock<Regex> = OnceLock::new();
static INVALID_BODY_CHAR: OnceLock<Regex> = OnceLock::new();

fn start_char() -> &'static Regex {
    START_CHAR.get_or_init(|| Regex::new(r"^\p{L}").expect("start char regex is valid"))
}

fn invalid_body_char() -> &'static Regex {
    INVALID_BODY_CHAR
        .get_or_init(|| Regex::new(r"[^\p{L}\p{N}_./ -]").expect("body char regex is valid"))
}

/// Validate and normalise a handle.
///
/// # Errors
///
/// Returns [`HandleValidationError`] when the handle is empty, longer than
/// [`MAX_HANDLE_LENGTH`] characters, does not start with a letter, or contains
/// a character outside the allowed set.
pub fn validate_handle(raw: &str) -> Result<String, HandleValidationError> {
    if raw.is_empty() {
        return Err(HandleValidationError::Empty);
    }

    let normalized: String = raw.trim().nfc().collect::<String>().to_lowercase();

    if normalized.is_empty() {
        return Err(HandleValidationError::EmptyAfterNormalization);
    }

    let length = normalized.chars().count();
    if length > MAX_HANDLE_LENGTH {
        return Err(HandleValidationError::TooLong {
            handle: raw.to_string(),
            length,
            max: MAX_HANDLE_LENGTH,
        });
    }

    if !start_char().is_match(&normalized) {
        return Err(HandleValidationError::InvalidStart {
            handle: raw.to_string(),
        });
    }

    let first_len = normalized.chars().next().map_or(0, char::len_utf8);
    let body = &normalized[first_len..];
    if let Some(found) = invalid_body_char().find(body) {
        let position = 1 + body[..found.start()].chars().count();
        let character = found.as_str().chars().next().unwrap_or_default();
        return Err(HandleValidationError::InvalidCharacter {
            handle: raw.to_string(),
            character,
            position,
        });
    }

    Ok(normalized)
}

/// A mutable pointer from a handle to the current hash of an immutable card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentHandle {
    handle: String,
    current_hash: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ContentHandle {
    /// Create a handle pointing at `current_hash`, stamped now.
    pub fn new(
        handle: &str,
        current_hash: impl Into<String>,
    ) -> Result<Self, HandleValidationError> {
        let now = Utc::now();
        Self::with_timestamps(handle, current_hash, now, now)
    }

    /// Rebuild a handle with known timestamps (e.g. loaded from storage).
    pub fn with_timestamps(
        handle: &str,
        current_hash: impl Into<String>,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Result<Self, HandleValidationError> {
        Ok(Self {
            handle: validate_handle(handle)?,
            current_hash: current_hash.into(),
            created_at,
            updated_at,
        })
    }

    /// Point the handle at `new_hash`, returning the previous hash for history.
    pub fn update(&mut self, new_hash: impl Into<String>) -> String {
        self.updated_at = Utc::now();
        std::mem::replace(&mut self.current_hash, new_hash.into())
    }

    pub fn handle(&self) -> &str {
        &self.handle
    }

    pub fn current_hash(&self) -> &str {
        &self.current_hash
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}
