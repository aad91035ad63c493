//! Error types for hashing, stamps, handles, records and scans.
//!
//! Content-type detection never produces errors: "unknown" is expressed as
//! `text/plain` or a low confidence. Only the validation and format layers
//! below surface failures to the caller.

use std::path::PathBuf;
use thiserror::Error;

pub type CoreResult<T> = Result<T, CoreError>;

/// Rejection reasons for a user-supplied handle.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HandleValidationError {
    #[error("Handle cannot be empty.")]
    Empty,

    #[error("Handle cannot be empty after normalization.")]
    EmptyAfterNormalization,

    #[error("Handle '{handle}' is too long ({length} chars). Maximum is {max}.")]
    TooLong {
        handle: String,
        length: usize,
        max: usize,
    },

    #[error("Invalid handle '{handle}'. Must start with a letter (any language).")]
    InvalidStart { handle: String },

    #[error("Invalid character '{character}' at position {position} in handle '{handle}'.")]
    InvalidCharacter {
        handle: String,
        character: char,
        position: usize,
    },
}

/// Malformed `algorithm|timestamp|region` stamps.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GTimeError {
    #[error("Invalid GTime format: {0}")]
    InvalidFormat(String),
}

/// Failures while building an [`MCard`](crate::MCard).
#[derive(Error, Debug)]
pub enum CardError {
    #[error("Content cannot be empty")]
    EmptyContent,

    #[error(transparent)]
    GTime(#[from] GTimeError),

    #[error("Failed to serialize card event: {0}")]
    Event(#[from] serde_json::Error),
}

/// Configuration loading and validation errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file: {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: &'static str, message: String },

    #[error("Invalid exclude pattern: {pattern} ({message})")]
    InvalidExcludePattern { pattern: String, message: String },
}

/// Directory scan errors.
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Scan root does not exist or is not a directory: {path}")]
    InvalidRoot { path: PathBuf },

    #[error("Failed to read file: {path}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Too many files to scan: more than {limit} files found")]
    TooManyFiles { limit: usize },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Umbrella error for callers that drive several layers at once.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error(transparent)]
    Handle(#[from] HandleValidationError),

    #[error(transparent)]
    GTime(#[from] GTimeError),

    #[error(transparent)]
    Card(#[from] CardError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Scan(#[from] ScanError),
}
