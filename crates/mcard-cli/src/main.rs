//! mcard: content-type detection, hashing and g_time stamps from the shell.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use mcard_core::{
    ContentTypeInterpreter, GTime, MCard, McardConfig, ScanOptions, compute_hash,
    scan_directory, validate, validate_handle,
};

mod output;

#[derive(Parser)]
#[command(name = "mcard")]
#[command(author, version, about = "Content detection and content addressing for MCard records", long_about = None)]
struct Cli {
    /// Path to a TOML config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Detect the content type of one or more files
    Detect {
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Extension hint (e.g. ".json"); defaults to each file's extension
        #[arg(long)]
        ext: Option<String>,

        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },

    /// Detect the content type of every file under a directory
    Scan {
        dir: PathBuf,

        /// Additional glob to exclude, relative to DIR
        #[arg(long)]
        exclude: Vec<String>,

        /// Maximum files to visit (0 disables the limit)
        #[arg(long)]
        max_files: Option<usize>,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the hex digest of a file
    Hash {
        file: PathBuf,

        /// sha1, sha256, sha384 or sha512; other names hash with sha256
        #[arg(long, short)]
        algorithm: Option<String>,
    },

    /// Check a file against a SHA-256 digest
    Verify { file: PathBuf, hash: String },

    /// Validate and normalise a handle
    Handle { name: String },

    /// Print a g_time stamp for the current moment
    Stamp {
        #[arg(long, short)]
        algorithm: Option<String>,
    },

    /// Build an MCard from a file and print it as JSON
    Card {
        file: PathBuf,

        #[arg(long, short)]
        algorithm: Option<String>,
    },
}

/// Exit code 1 is reserved for a negative answer, not a failure to run.
enum Outcome {
    Success,
    ValidationFailed,
}

fn setup_logging(verbose: bool, quiet: bool) {
    let default_level = if verbose {
        "debug"
    } else if quiet {
        "error"
    } else {
        "warn"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn load_config(path: Option<&PathBuf>) -> Result<McardConfig> {
    let (config, warning) = McardConfig::load_or_default(path);
    if let Some(warning) = warning {
        return Err(anyhow::anyhow!(warning));
    }
    config.validate().context("Invalid configuration")?;
    match path {
        Some(path) => tracing::debug!(path = %path.display(), "loaded config"),
        None => tracing::debug!("using default config"),
    }
    Ok(config)
}

fn read_file(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn file_hint(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{e}"))
}

fn run(cli: Cli) -> Result<Outcome> {
    let config = load_config(cli.config.as_ref())?;
    let algorithm_or_default =
        |algorithm: Option<String>| algorithm.unwrap_or_else(|| config.hashing.default_algorithm.clone());

    match cli.command {
        Commands::Detect { files, ext, json } => {
            let interpreter = ContentTypeInterpreter::with_config(config.detection.clone());
            let mut rows = Vec::with_capacity(files.len());
            for file in &files {
                let content = read_file(file)?;
                let hint = ext.clone().or_else(|| file_hint(file));
                let result = interpreter.detect_content_type(content.as_slice(), hint.as_deref());
                tracing::debug!(
                    path = %file.display(),
                    bytes = content.len(),
                    mime = %result.mime_type,
                    "detected"
                );
                let is_binary =
                    interpreter.is_binary_content(content.as_slice(), Some(&result.mime_type));
                rows.push(output::DetectRow {
                    path: file.display().to_string(),
                    mime_type: result.mime_type,
                    extension: result.extension,
                    is_binary,
                });
            }
            if json {
                output::print_json(&rows)?;
            } else {
                output::print_detect(&rows);
            }
        }
        Commands::Scan {
            dir,
            exclude,
            max_files,
            json,
        } => {
            let mut options = ScanOptions::from_config(&config);
            options.scan.exclude.extend(exclude);
            if let Some(limit) = max_files {
                options = options.with_max_files(Some(limit));
            }
            let report = scan_directory(&dir, &options)
                .with_context(|| format!("Failed to scan {}", dir.display()))?;
            if !report.failures.is_empty() {
                tracing::warn!(count = report.failures.len(), "some files could not be read");
            }
            if json {
                output::print_json(&report)?;
            } else {
                output::print_scan(&report);
            }
        }
        Commands::Hash { file, algorithm } => {
            let algorithm = algorithm_or_default(algorithm);
            let content = read_file(&file)?;
            println!("{}  {}", compute_hash(&content, &algorithm), file.display());
        }
        Commands::Verify { file, hash } => {
            let content = read_file(&file)?;
            if validate(&content, hash.trim()) {
                println!("{}: {}", file.display(), "OK".green().bold());
            } else {
                println!("{}: {}", file.display(), "MISMATCH".red().bold());
                return Ok(Outcome::ValidationFailed);
            }
        }
        Commands::Handle { name } => match validate_handle(&name) {
            Ok(handle) => println!("{handle}"),
            Err(e) => {
                eprintln!("{} {e}", "invalid:".red().bold());
                return Ok(Outcome::ValidationFailed);
            }
        },
        Commands::Stamp { algorithm } => {
            println!("{}", GTime::stamp_now(&algorithm_or_default(algorithm)));
        }
        Commands::Card { file, algorithm } => {
            let algorithm = algorithm_or_default(algorithm);
            let content = read_file(&file)?;
            let card = MCard::create(&content, &algorithm)
                .with_context(|| format!("Failed to build card for {}", file.display()))?;
            output::print_json(&card.to_object())?;
        }
    }

    Ok(Outcome::Success)
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    setup_logging(cli.verbose, cli.quiet);

    match run(cli) {
        Ok(Outcome::Success) => ExitCode::SUCCESS,
        Ok(Outcome::ValidationFailed) => ExitCode::from(1),
        Err(e) => {
            eprintln!("{} {e:#}", "error:".red().bold());
            ExitCode::from(2)
        }
    }
}
