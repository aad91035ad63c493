//! # mcard-core
//!
//! Content detection and content addressing for MCard records.
//!
//! | Module | Purpose |
//! |---|---|
//! | [`hash`] | SHA digests and SHA-256 validation |
//! | [`gtime`] | `algorithm|timestamp|region` stamps |
//! | [`handle`] | Unicode-aware handle validation |
//! | [`detectors`] | Confidence-scored content-type detectors |
//! | [`interpreter`] | MIME + extension detection, binary heuristics |
//! | [`card`] | The immutable [`MCard`] record |
//! | [`events`] | Duplicate and collision events |
//! | [`config`] | TOML configuration |
//! | `scan` | Parallel directory scan (`filesystem` feature) |
//!
//! ```
//! use mcard_core::{compute_hash, detect_content_type, validate_handle};
//!
//! let result = detect_content_type(r#"{"a": 1}"#, None);
//! assert_eq!(result.mime_type, "application/json");
//! assert_eq!(result.extension, ".json");
//!
//! assert_eq!(compute_hash("hello", "sha256").len(), 64);
//! assert_eq!(validate_handle("  My Notes ").unwrap(), "my notes");
//! ```

pub mod card;
pub mod config;
pub mod detectors;
pub mod error;
pub mod events;
pub mod gtime;
pub mod handle;
pub mod hash;
pub mod interpreter;
pub mod mime;
#[cfg(feature = "filesystem")]
pub mod scan;

pub use card::{MCard, MCardObject};
pub use config::McardConfig;
pub use detectors::{Content, ContentDetector, ContentSample, DetectorRegistry};
pub use error::{
    CardError, ConfigError, CoreError, CoreResult, GTimeError, HandleValidationError, ScanError,
};
pub use events::{collision_event, duplication_event, next_hash_function};
pub use gtime::{GTime, GTimeStamp};
pub use handle::{ContentHandle, validate_handle};
pub use hash::{HashAlgorithm, compute_hash, compute_hash_default, validate};
pub use interpreter::{
    ContentTypeInterpreter, DetectionResult, detect_content_type, is_binary_content,
};
#[cfg(feature = "filesystem")]
pub use scan::{ScanEntry, ScanOptions, ScanReport, scan_directory};
