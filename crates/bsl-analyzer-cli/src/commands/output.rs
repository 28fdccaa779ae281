//! Shared output formatting for analysis results.

use anyhow::Result;
use bsl_analyzer::{AnalysisReport, Severity, Violation};
use std::path::Path;

use crate::OutputFormat;

/// Print an analysis report in the specified format.
pub fn print(report: &AnalysisReport, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => print_text(report),
        OutputFormat::Json => return print_json(report),
        OutputFormat::Compact => print_compact(report),
    }
    Ok(())
}

/// Print the violations of a single file as a one-file report.
pub fn print_file(path: &Path, violations: Vec<Violation>, format: OutputFormat) -> Result<()> {
    let mut report = AnalysisReport::new();
    report.push(path.to_path_buf(), violations);
    print(&report, format)
}

fn print_text(report: &AnalysisReport) {
    for (path, violation) in report.violations() {
        print_violation(path, violation);
    }
    println!("{}", summary_line(&report.count_by_severity(), report.files_checked));
}

fn print_violation(path: &Path, violation: &Violation) {
    println!(
        "{} at {}:{}:{}",
        violation.code,
        path.display(),
        violation.range.start.line + 1,
        violation.range.start.character + 1,
    );
    println!("  {}: {}", colored(violation.severity), violation.message);
    println!();
}

fn colored(severity: Severity) -> String {
    let color = match severity {
        Severity::Blocker | Severity::Critical => "\x1b[31m",
        Severity::Major => "\x1b[33m",
        Severity::Minor => "\x1b[36m",
        Severity::Info => "\x1b[34m",
    };
    format!("{color}{severity}\x1b[0m")
}

fn summary_line(counts: &[(Severity, usize)], files_checked: usize) -> String {
    let total: usize = counts.iter().map(|(_, n)| n).sum();
    let worst = counts.iter().find(|(_, n)| *n > 0).map(|(s, _)| *s);
    let color = match worst {
        Some(Severity::Blocker | Severity::Critical) => "\x1b[31m",
        Some(_) => "\x1b[33m",
        None => "\x1b[32m",
    };
    let breakdown = counts
        .iter()
        .filter(|(_, n)| *n > 0)
        .map(|(s, n)| format!("{n} {s}"))
        .collect::<Vec<_>>()
        .join(", ");

    if breakdown.is_empty() {
        format!("{color}Found 0 problem(s) in {files_checked} file(s)\x1b[0m")
    } else {
        format!("{color}Found {total} problem(s) ({breakdown}) in {files_checked} file(s)\x1b[0m")
    }
}

fn print_json(report: &AnalysisReport) -> Result<()> {
    let json = serde_json::to_string_pretty(report)?;
    println!("{json}");
    Ok(())
}

fn print_compact(report: &AnalysisReport) {
    for (path, violation) in report.violations() {
        println!("{}:{violation}", path.display());
    }
}
