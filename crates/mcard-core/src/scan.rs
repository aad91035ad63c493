//! Directory scan: detect the content type of every file under a root.

use std::io::Read;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Instant;

use rayon::iter::ParallelBridge;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::{DetectionConfig, McardConfig, ScanConfig};
use crate::error::{ConfigError, ScanError};
use crate::hash::HashAlgorithm;
use crate::interpreter::ContentTypeInterpreter;

/// Everything a scan needs: walk limits, detection tunables and the
/// algorithm used for per-file hashes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScanOptions {
    pub scan: ScanConfig,
    pub detection: DetectionConfig,
    pub hash_algorithm: HashAlgorithm,
}

impl ScanOptions {
    pub fn from_config(config: &McardConfig) -> Self {
        Self {
            scan: config.scan.clone(),
            detection: config.detection.clone(),
            hash_algorithm: HashAlgorithm::parse_lenient(&config.hashing.default_algorithm),
        }
    }

    /// Add an exclude glob (builder pattern).
    pub fn exclude(mut self, pattern: impl Into<String>) -> Self {
        self.scan.exclude.push(pattern.into());
        self
    }

    /// Set or clear the file limit (builder pattern).
    pub fn with_max_files(mut self, limit: Option<usize>) -> Self {
        self.scan.max_files = limit;
        self
    }
}

/// One scanned file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanEntry {
    /// Path relative to the scan root, `/`-separated.
    pub path: String,
    pub mime_type: String,
    pub extension: String,
    pub is_binary: bool,
    /// Sampled head has no line break within the pathological-line window.
    pub has_long_lines: bool,
    /// Size on disk in bytes.
    pub size: u64,
    /// Too large, binary noise or long-lined: unsafe to ingest as a card.
    pub is_problematic: bool,
    /// Digest of the whole file; `None` above `max_file_bytes`.
    pub hash: Option<String>,
}

/// A file that was found but could not be read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanFailure {
    pub path: String,
    pub message: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanReport {
    /// Sorted by path.
    pub entries: Vec<ScanEntry>,
    pub failures: Vec<ScanFailure>,
    pub files_scanned: usize,
    pub scan_time_ms: u64,
}

struct ExcludePattern {
    pattern: glob::Pattern,
    dir_only_prefix: Option<String>,
    allow_probe: bool,
}

fn compile_exclude_patterns(excludes: &[String]) -> Result<Vec<ExcludePattern>, ConfigError> {
    excludes
        .iter()
        .map(|pattern| {
            let normalized = pattern.replace('\\', "/");
            let (glob_str, dir_only_prefix) = match normalized.strip_suffix('/') {
                Some(prefix) => (format!("{prefix}/**"), Some(prefix.to_string())),
                None => (normalized.clone(), None),
            };
            let allow_probe = dir_only_prefix.is_some() || glob_str.contains("**");
            let compiled =
                glob::Pattern::new(&glob_str).map_err(|e| ConfigError::InvalidExcludePattern {
                    pattern: pattern.clone(),
                    message: e.to_string(),
                })?;
            Ok(ExcludePattern {
                pattern: compiled,
                dir_only_prefix,
                allow_probe,
            })
        })
        .collect()
}

fn normalize_rel_path(entry_path: &Path, root: &Path) -> String {
    let rel_path = entry_path.strip_prefix(root).unwrap_or(entry_path);
    let path_str = rel_path.to_string_lossy().replace('\\', "/");
    match path_str.strip_prefix("./") {
        Some(stripped) => stripped.to_string(),
        None => path_str,
    }
}

fn should_prune_dir(rel_dir: &str, exclude_patterns: &[ExcludePattern]) -> bool {
    if rel_dir.is_empty() {
        return false;
    }
    // Recursive patterns like `target/**` also match anything inside the dir.
    let probe = format!("{}/__mcard_probe__", rel_dir.trim_end_matches('/'));
    exclude_patterns
        .iter()
        .any(|p| p.pattern.matches(rel_dir) || (p.allow_probe && p.pattern.matches(&probe)))
}

fn is_excluded_file(path_str: &str, exclude_patterns: &[ExcludePattern]) -> bool {
    exclude_patterns
        .iter()
        .any(|p| p.pattern.matches(path_str) && p.dir_only_prefix.as_deref() != Some(path_str))
}

struct FileRead {
    head: Vec<u8>,
    size: u64,
    hash: Option<String>,
}

/// Read at most `max_sample_bytes` for detection and, when the file is
/// within `max_file_bytes`, stream the rest through the hasher.
fn read_file(
    path: &Path,
    scan: &ScanConfig,
    algorithm: HashAlgorithm,
) -> Result<FileRead, ScanError> {
    let to_err = |source| ScanError::FileRead {
        path: path.to_path_buf(),
        source,
    };
    let file = std::fs::File::open(path).map_err(to_err)?;
    let size = file.metadata().map_err(to_err)?.len();
    let limit = scan.max_sample_bytes;
    let mut head = Vec::with_capacity(limit.min(size as usize));
    (&file)
        .take(limit as u64)
        .read_to_end(&mut head)
        .map_err(to_err)?;

    let hash = if size <= scan.max_file_bytes {
        Some(
            algorithm
                .digest_reader(head.as_slice().chain(&file))
                .map_err(to_err)?,
        )
    } else {
        None
    };
    Ok(FileRead { head, size, hash })
}

/// Whether a file would cause trouble if ingested whole. Empty files never
/// are.
fn is_problematic(
    size: u64,
    known_long: bool,
    unstructured_binary: bool,
    has_long_lines: bool,
    scan: &ScanConfig,
) -> bool {
    if size == 0 {
        return false;
    }
    size > scan.max_file_bytes
        || (known_long && size > scan.known_long_line_max_bytes)
        || unstructured_binary
        || has_long_lines
}

fn scan_file(
    path: &Path,
    rel_path: String,
    options: &ScanOptions,
    interpreter: &ContentTypeInterpreter<'_>,
) -> Result<ScanEntry, ScanError> {
    let FileRead { head, size, hash } = read_file(path, &options.scan, options.hash_algorithm)?;

    let hint = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{e}"));
    let detected = interpreter.detect_content_type(head.as_slice(), hint.as_deref());

    let file_name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
    let known_long = ContentTypeInterpreter::is_known_long_line_extension(file_name);
    let unstructured_binary = interpreter.is_unstructured_binary(&head);
    let has_long_lines = interpreter.has_pathological_lines(&head, known_long);

    Ok(ScanEntry {
        is_binary: interpreter.is_binary_content(head.as_slice(), Some(&detected.mime_type))
            || unstructured_binary,
        has_long_lines,
        is_problematic: is_problematic(
            size,
            known_long,
            unstructured_binary,
            has_long_lines,
            &options.scan,
        ),
        hash,
        path: rel_path,
        mime_type: detected.mime_type,
        extension: detected.extension,
        size,
    })
}

/// Walk `root` and detect the content type of each regular file.
///
/// `.gitignore` is honoured, hidden files are included and symlinks are
/// skipped. Files that cannot be read are reported in
/// [`ScanReport::failures`] rather than failing the scan.
///
/// # Errors
///
/// Returns [`ScanError::InvalidRoot`] if `root` is not a directory,
/// [`ScanError::Config`] for a bad exclude glob, and
/// [`ScanError::TooManyFiles`] when `max_files` is exceeded.
pub fn scan_directory(root: &Path, options: &ScanOptions) -> Result<ScanReport, ScanError> {
    use ignore::WalkBuilder;

    let scan_start = Instant::now();

    if !root.is_dir() {
        return Err(ScanError::InvalidRoot {
            path: root.to_path_buf(),
        });
    }
    let walk_root = std::fs::canonicalize(root).unwrap_or_else(|_| root.to_path_buf());

    let exclude_patterns = Arc::new(compile_exclude_patterns(&options.scan.exclude)?);
    let interpreter = ContentTypeInterpreter::with_config(options.detection.clone());
    let max_files = options.scan.max_files.filter(|&limit| limit > 0);

    // Atomic so every worker sees the limit trip immediately.
    let files_seen = AtomicUsize::new(0);
    let limit_exceeded = AtomicBool::new(false);

    let (mut entries, mut failures) = WalkBuilder::new(&walk_root)
        .hidden(false)
        .git_ignore(true)
        .git_exclude(false)
        .filter_entry({
            let exclude_patterns = Arc::clone(&exclude_patterns);
            let root_path = walk_root.clone();
            move |entry| {
                let entry_path = entry.path();
                if entry_path == root_path {
                    return true;
                }
                if entry.file_type().is_some_and(|ft| ft.is_dir()) {
                    let rel_path = normalize_rel_path(entry_path, &root_path);
                    return !should_prune_dir(&rel_path, exclude_patterns.as_slice());
                }
                true
            }
        })
        .build()
        .filter_map(|entry| entry.ok())
        // Symlinks report their own file type, so they fall out here.
        .filter(|entry| entry.file_type().is_some_and(|ft| ft.is_file()))
        .filter_map(|entry| {
            let rel_path = normalize_rel_path(entry.path(), &walk_root);
            if is_excluded_file(&rel_path, exclude_patterns.as_slice()) {
                None
            } else {
                Some((entry.into_path(), rel_path))
            }
        })
        .par_bridge()
        .fold(
            || (Vec::<ScanEntry>::new(), Vec::<ScanFailure>::new()),
            |(mut entries, mut failures), (path, rel_path)| {
                if limit_exceeded.load(Ordering::SeqCst) {
                    return (entries, failures);
                }
                let count = files_seen.fetch_add(1, Ordering::SeqCst);
                if let Some(limit) = max_files
                    && count >= limit
                {
                    limit_exceeded.store(true, Ordering::SeqCst);
                    return (entries, failures);
                }

                match scan_file(&path, rel_path.clone(), options, &interpreter) {
                    Ok(entry) => {
                        tracing::trace!(path = %entry.path, mime_type = %entry.mime_type, "scanned");
                        entries.push(entry);
                    }
                    Err(e) => {
                        tracing::warn!(path = %rel_path, error = %e, "skipping unreadable file");
                        failures.push(ScanFailure {
                            path: rel_path,
                            message: e.to_string(),
                        });
                    }
                }
                (entries, failures)
            },
        )
        .reduce(
            || (Vec::new(), Vec::new()),
            |(mut e1, mut f1), (e2, f2)| {
                e1.extend(e2);
                f1.extend(f2);
                (e1, f1)
            },
        );

    if limit_exceeded.load(Ordering::Relaxed)
        && let Some(limit) = max_files
    {
        return Err(ScanError::TooManyFiles { limit });
    }

    entries.sort_by(|a, b| a.path.cmp(&b.path));
    failures.sort_by(|a, b| a.path.cmp(&b.path));

    let files_scanned = entries.len() + failures.len();
    let elapsed_ms = std::cmp::min(scan_start.elapsed().as_millis(), u64::MAX as u128) as u64;
    tracing::debug!(root = %walk_root.display(), files_scanned, elapsed_ms, "scan complete");

    Ok(ScanReport {
        entries,
        failures,
        files_scanned,
        scan_time_ms: elapsed_ms,
    })
}

/// [`scan_directory`] with options taken from a loaded config.
pub fn scan_with_config(root: &Path, config: &McardConfig) -> Result<ScanReport, ScanError> {
    scan_directory(root, &ScanOptions::from_config(config))
}
