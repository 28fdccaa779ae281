//! Core types for reported problems and analysis results.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::metadata::{DiagnosticTag, DiagnosticType};

/// Severity of a reported problem, lowest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational hint.
    Info,
    /// Minor issue.
    Minor,
    /// Major issue.
    Major,
    /// Critical issue.
    Critical,
    /// Must be fixed before release.
    Blocker,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Minor => write!(f, "minor"),
            Self::Major => write!(f, "major"),
            Self::Critical => write!(f, "critical"),
            Self::Blocker => write!(f, "blocker"),
        }
    }
}

/// Zero-based position in a document, in characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    /// Line number.
    pub line: usize,
    /// Character offset within the line.
    pub character: usize,
}

impl Position {
    /// Creates a new position.
    #[must_use]
    pub fn new(line: usize, character: usize) -> Self {
        Self { line, character }
    }
}

/// Half-open range between two positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Range {
    /// Inclusive start.
    pub start: Position,
    /// Exclusive end.
    pub end: Position,
}

impl Range {
    /// Creates a range between two positions.
    #[must_use]
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// Creates a range covering `start..end` characters of a single line.
    #[must_use]
    pub fn on_line(line: usize, start: usize, end: usize) -> Self {
        Self {
            start: Position::new(line, start),
            end: Position::new(line, end),
        }
    }
}

/// A location found by a rule, before its message is rendered.
///
/// Rules report where the problem is and the values that fill the
/// placeholders of their localized message template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    /// Affected range.
    pub range: Range,
    /// Positional message arguments (`{0}`, `{1}`, ...).
    pub args: Vec<String>,
}

impl Finding {
    /// Creates a finding without message arguments.
    #[must_use]
    pub fn at(range: Range) -> Self {
        Self {
            range,
            args: Vec::new(),
        }
    }

    /// Appends a message argument.
    #[must_use]
    pub fn with_arg(mut self, arg: impl ToString) -> Self {
        self.args.push(arg.to_string());
        self
    }
}

/// A problem reported to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    /// Code of the rule that produced it.
    pub code: String,
    /// Severity.
    pub severity: Severity,
    /// Problem category.
    pub kind: DiagnosticType,
    /// Affected range.
    pub range: Range,
    /// Rendered, localized message.
    pub message: String,
    /// Rule tags.
    pub tags: Vec<DiagnosticTag>,
}

impl Violation {
    /// Returns `true` if this violation should fail a check run.
    #[must_use]
    pub fn is_blocking(&self) -> bool {
        self.kind == DiagnosticType::Error || self.severity >= Severity::Critical
    }
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:{}: {} [{}] {}",
            self.range.start.line + 1,
            self.range.start.character + 1,
            self.severity,
            self.code,
            self.message
        )
    }
}

/// Violations found in one file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileReport {
    /// File path as given to the analyzer.
    pub path: PathBuf,
    /// Violations sorted by position.
    pub violations: Vec<Violation>,
}

/// Result of analyzing a set of files.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// Per-file results, only files with violations.
    pub files: Vec<FileReport>,
    /// Number of files analyzed.
    pub files_checked: usize,
}

impl AnalysisReport {
    /// Creates an empty report.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the violations of one analyzed file.
    pub fn push(&mut self, path: PathBuf, mut violations: Vec<Violation>) {
        self.files_checked += 1;
        if violations.is_empty() {
            return;
        }
        violations.sort_by(|a, b| a.range.cmp(&b.range).then_with(|| a.code.cmp(&b.code)));
        self.files.push(FileReport { path, violations });
    }

    /// Iterates over every violation with its file.
    pub fn violations(&self) -> impl Iterator<Item = (&PathBuf, &Violation)> {
        self.files
            .iter()
            .flat_map(|file| file.violations.iter().map(move |v| (&file.path, v)))
    }

    /// Total number of violations.
    #[must_use]
    pub fn violation_count(&self) -> usize {
        self.files.iter().map(|f| f.violations.len()).sum()
    }

    /// Returns true if any violation should fail the run.
    #[must_use]
    pub fn has_blocking(&self) -> bool {
        self.violations().any(|(_, v)| v.is_blocking())
    }

    /// Counts violations per severity, highest first.
    #[must_use]
    pub fn count_by_severity(&self) -> Vec<(Severity, usize)> {
        let mut counts = [
            (Severity::Blocker, 0),
            (Severity::Critical, 0),
            (Severity::Major, 0),
            (Severity::Minor, 0),
            (Severity::Info, 0),
        ];
        for (_, violation) in self.violations() {
            if let Some(slot) = counts.iter_mut().find(|(s, _)| *s == violation.severity) {
                slot.1 += 1;
            }
        }
        counts.to_vec()
    }
}
