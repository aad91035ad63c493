//! TOML-backed configuration for hashing, detection and directory scans.
//!
//! Every field has a default, so an empty file (or no file) reproduces the
//! built-in behaviour exactly.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::detectors::{
    DEFAULT_EARLY_EXIT_CONFIDENCE, DEFAULT_SAMPLE_BYTES, DEFAULT_SAMPLE_LINES, DetectorRegistry,
};
use crate::error::ConfigError;
use crate::hash::{DEFAULT_ALGORITHM, HashAlgorithm};

/// Samples shorter than this are never called unstructured binary.
pub const DEFAULT_BINARY_MIN_SAMPLE: usize = 512;
/// Bytes inspected by the null/control-ratio heuristic.
pub const DEFAULT_BINARY_SCAN_BYTES: usize = 32 * 1024;
pub const DEFAULT_NULL_RATIO_THRESHOLD: f64 = 0.1;
pub const DEFAULT_CONTROL_RATIO_THRESHOLD: f64 = 0.2;
/// A sample this long with no line break has pathological lines.
pub const DEFAULT_PATHOLOGICAL_SCAN_BYTES: usize = 32 * 1024;

/// Bytes read from each file during a directory scan.
pub const DEFAULT_MAX_SAMPLE_BYTES: usize = 32 * 1024;
/// Maximum files visited by one directory scan.
pub const DEFAULT_MAX_FILES: usize = 100_000;
/// Files larger than this are problematic and are not hashed.
pub const DEFAULT_MAX_FILE_BYTES: u64 = 50 * 1024 * 1024;
/// Known long-line formats larger than this are problematic.
pub const DEFAULT_KNOWN_LONG_LINE_MAX_BYTES: u64 = 1024 * 1024;

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct McardConfig {
    pub hashing: HashingConfig,
    pub detection: DetectionConfig,
    pub scan: ScanConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HashingConfig {
    /// Algorithm used when a command or caller does not name one.
    pub default_algorithm: String,
}

impl Default for HashingConfig {
    fn default() -> Self {
        Self {
            default_algorithm: DEFAULT_ALGORITHM.to_string(),
        }
    }
}

/// Tunables for content sampling and the binary heuristics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    pub sample_bytes: usize,
    pub sample_lines: usize,
    pub early_exit_confidence: f64,
    pub binary_min_sample: usize,
    pub binary_scan_bytes: usize,
    pub null_ratio_threshold: f64,
    pub control_ratio_threshold: f64,
    pub pathological_scan_bytes: usize,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            sample_bytes: DEFAULT_SAMPLE_BYTES,
            sample_lines: DEFAULT_SAMPLE_LINES,
            early_exit_confidence: DEFAULT_EARLY_EXIT_CONFIDENCE,
            binary_min_sample: DEFAULT_BINARY_MIN_SAMPLE,
            binary_scan_bytes: DEFAULT_BINARY_SCAN_BYTES,
            null_ratio_threshold: DEFAULT_NULL_RATIO_THRESHOLD,
            control_ratio_threshold: DEFAULT_CONTROL_RATIO_THRESHOLD,
            pathological_scan_bytes: DEFAULT_PATHOLOGICAL_SCAN_BYTES,
        }
    }
}

impl DetectionConfig {
    /// Built-in detectors with this config's early-exit threshold.
    pub fn registry(&self) -> DetectorRegistry {
        DetectorRegistry::with_builtin().with_early_exit_confidence(self.early_exit_confidence)
    }

    /// Whether every value matches the built-in defaults, so the shared
    /// registry can be used as-is.
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    pub max_sample_bytes: usize,
    /// `None` (or `0` on the command line) disables the limit.
    pub max_files: Option<usize>,
    /// Glob patterns, relative to the scan root.
    pub exclude: Vec<String>,
    pub max_file_bytes: u64,
    /// Size cap for `.min.js`, `.json` and other long-line formats.
    pub known_long_line_max_bytes: u64,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            max_sample_bytes: DEFAULT_MAX_SAMPLE_BYTES,
            max_files: Some(DEFAULT_MAX_FILES),
            exclude: vec![
                "target/**".to_string(),
                "node_modules/**".to_string(),
                ".git/**".to_string(),
            ],
            max_file_bytes: DEFAULT_MAX_FILE_BYTES,
            known_long_line_max_bytes: DEFAULT_KNOWN_LONG_LINE_MAX_BYTES,
        }
    }
}

impl McardConfig {
    /// Read and parse a TOML config file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Read`] or [`ConfigError::Parse`].
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Load config or use default, returning any load warning.
    ///
    /// A path that cannot be read or parsed yields the default config plus a
    /// message describing the failure, so typos are reported rather than
    /// silently ignored.
    pub fn load_or_default(path: Option<&PathBuf>) -> (Self, Option<String>) {
        match path {
            Some(p) => match Self::load(p) {
                Ok(config) => (config, None),
                Err(e) => {
                    let cause = std::error::Error::source(&e)
                        .map(|s| format!(": {s}"))
                        .unwrap_or_default();
                    (Self::default(), Some(format!("{e}{cause}")))
                }
            },
            None => (Self::default(), None),
        }
    }

    /// Check value ranges and exclude patterns.
    ///
    /// # Errors
    ///
    /// Returns the first invalid setting found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self
            .hashing
            .default_algorithm
            .parse::<HashAlgorithm>()
            .is_err()
        {
            return Err(ConfigError::InvalidValue {
                field: "hashing.default_algorithm",
                message: format!(
                    "unsupported algorithm '{}'",
                    self.hashing.default_algorithm
                ),
            });
        }

        let d = &self.detection;
        for (field, value) in [
            ("detection.early_exit_confidence", d.early_exit_confidence),
            ("detection.null_ratio_threshold", d.null_ratio_threshold),
            ("detection.control_ratio_threshold", d.control_ratio_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::InvalidValue {
                    field,
                    message: format!("{value} is outside [0, 1]"),
                });
            }
        }
        for (field, value) in [
            ("detection.sample_bytes", d.sample_bytes),
            ("detection.sample_lines", d.sample_lines),
            ("detection.binary_scan_bytes", d.binary_scan_bytes),
            ("detection.pathological_scan_bytes", d.pathological_scan_bytes),
            ("scan.max_sample_bytes", self.scan.max_sample_bytes),
        ]
        .into_iter()
        .map(|(field, value)| (field, value as u64))
        .chain([
            ("scan.max_file_bytes", self.scan.max_file_bytes),
            ("scan.known_long_line_max_bytes", self.scan.known_long_line_max_bytes),
        ]) {
            if value == 0 {
                return Err(ConfigError::InvalidValue {
                    field,
                    message: "must be greater than zero".to_string(),
                });
            }
        }

        for pattern in &self.scan.exclude {
            validate_glob(pattern)?;
        }
        Ok(())
    }
}

#[cfg(feature = "filesystem")]
fn validate_glob(pattern: &str) -> Result<(), ConfigError> {
    glob::Pattern::new(pattern)
        .map(|_| ())
        .map_err(|e| ConfigError::InvalidExcludePattern {
            pattern: pattern.to_string(),
            message: e.to_string(),
        })
}

#[cfg(not(feature = "filesystem"))]
fn validate_glob(_pattern: &str) -> Result<(), ConfigError> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_match_documented_constants() {
        let config = McardConfig::default();
        assert_eq!(config.hashing.default_algorithm, "sha256");
        assert_eq!(config.detection.sample_bytes, 8192);
        assert_eq!(config.detection.sample_lines, 20);
        assert_eq!(config.detection.early_exit_confidence, 0.99);
        assert_eq!(config.detection.binary_min_sample, 512);
        assert_eq!(config.detection.binary_scan_bytes, 32768);
        assert_eq!(config.detection.null_ratio_threshold, 0.1);
        assert_eq!(config.detection.control_ratio_threshold, 0.2);
        assert_eq!(config.detection.pathological_scan_bytes, 32768);
        assert_eq!(config.scan.max_sample_bytes, 32768);
        assert_eq!(config.scan.max_files, Some(100_000));
        assert_eq!(config.scan.max_file_bytes, 50 * 1024 * 1024);
        assert_eq!(config.scan.known_long_line_max_bytes, 1024 * 1024);
        assert_eq!(
            config.scan.exclude,
            vec!["target/**", "node_modules/**", ".git/**"]
        );
        assert!(config.validate().is_ok());
        assert!(config.detection.is_default());
    }

    #[test]
    fn empty_toml_is_default() {
        assert_eq!(McardConfig::from_toml("").unwrap(), McardConfig::default());
    }

    #[test]
    fn partial_toml_keeps_other_defaults() {
        let config = McardConfig::from_toml(
            r#"
[hashing]
default_algorithm = "sha512"

[detection]
sample_lines = 40
"#,
        )
        .unwrap();
        assert_eq!(config.hashing.default_algorithm, "sha512");
        assert_eq!(config.detection.sample_lines, 40);
        assert_eq!(config.detection.sample_bytes, 8192);
        assert_eq!(config.scan, ScanConfig::default());
        assert!(!config.detection.is_default());
    }

    #[test]
    fn validate_rejects_out_of_range_ratio() {
        let mut config = McardConfig::default();
        config.detection.null_ratio_threshold = 1.5;
        let err = config.validate().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue {
                field: "detection.null_ratio_threshold",
                ..
            }
        ));
    }

    #[test]
    fn validate_rejects_zero_sample() {
        let mut config = McardConfig::default();
        config.detection.sample_lines = 0;
        assert!(config.validate().is_err());

        let mut config = McardConfig::default();
        config.scan.max_file_bytes = 0;
        assert!(matches!(
            config.validate().unwrap_err(),
            ConfigError::InvalidValue {
                field: "scan.max_file_bytes",
                ..
            }
        ));
    }

    #[test]
    fn validate_rejects_unknown_algorithm() {
        let mut config = McardConfig::default();
        config.hashing.default_algorithm = "md5".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue {
                field: "hashing.default_algorithm",
                ..
            })
        ));
    }

    #[cfg(feature = "filesystem")]
    #[test]
    fn validate_rejects_bad_glob() {
        let mut config = McardConfig::default();
        config.scan.exclude.push("[unclosed".to_string());
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidExcludePattern { .. })
        ));
    }

    #[test]
    fn load_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[scan]\nmax_files = 5").unwrap();
        let config = McardConfig::load(file.path()).unwrap();
        assert_eq!(config.scan.max_files, Some(5));
    }

    #[test]
    fn load_reports_parse_errors() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[scan\nmax_files = 5").unwrap();
        let err = McardConfig::load(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn load_or_default_warns_on_missing_file() {
        let path = PathBuf::from("/definitely/not/here/mcard.toml");
        let (config, warning) = McardConfig::load_or_default(Some(&path));
        assert_eq!(config, McardConfig::default());
        let warning = warning.unwrap();
        assert!(warning.contains("Failed to read config file"), "{warning}");
    }

    #[test]
    fn load_or_default_without_path() {
        let (config, warning) = McardConfig::load_or_default(None);
        assert_eq!(config, McardConfig::default());
        assert!(warning.is_none());
    }

    #[test]
    fn registry_uses_configured_early_exit() {
        let mut detection = DetectionConfig::default();
        detection.early_exit_confidence = 0.9;
        assert_eq!(detection.registry().early_exit_confidence(), 0.9);
    }
}
