//! Human and JSON renderings of command results.

use anyhow::Result;
use colored::Colorize;
use serde::Serialize;

use mcard_core::ScanReport;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectRow {
    pub path: String,
    pub mime_type: String,
    pub extension: String,
    pub is_binary: bool,
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn mime_label(mime_type: &str, is_binary: bool) -> colored::ColoredString {
    if is_binary {
        mime_type.yellow()
    } else {
        mime_type.cyan()
    }
}

pub fn print_detect(rows: &[DetectRow]) {
    for row in rows {
        println!(
            "{}: {} ({})",
            row.path.bold(),
            mime_label(&row.mime_type, row.is_binary),
            row.extension
        );
    }
}

pub fn print_scan(report: &ScanReport) {
    let width = report
        .entries
        .iter()
        .map(|e| e.mime_type.len())
        .max()
        .unwrap_or(0);

    for entry in &report.entries {
        let padded = format!("{:<width$}", entry.mime_type);
        let mut line = format!("{}  {}", mime_label(&padded, entry.is_binary), entry.path);
        if entry.has_long_lines {
            line.push_str(&format!(" {}", "[long lines]".dimmed()));
        }
        if entry.is_problematic {
            line.push_str(&format!(" {}", "[problematic]".red()));
        }
        println!("{line}");
    }
    for failure in &report.failures {
        println!("{}  {}: {}", "unreadable".red(), failure.path, failure.message);
    }

    println!();
    println!(
        "Scanned {} files in {} ms",
        report.files_scanned.to_string().bold(),
        report.scan_time_ms
    );
}
