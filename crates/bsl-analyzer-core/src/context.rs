//! Context types for rule selection and execution.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::metadata::{CompatibilityMode, DiagnosticScope};

/// Kind of source file being analyzed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    /// 1C:Enterprise module.
    Bsl,
    /// OneScript script.
    Os,
}

impl FileType {
    /// Detects the file type from its extension.
    ///
    /// Returns `None` for files the analyzer does not handle.
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        if ext.eq_ignore_ascii_case("bsl") {
            Some(Self::Bsl)
        } else if ext.eq_ignore_ascii_case("os") {
            Some(Self::Os)
        } else {
            None
        }
    }

    /// The rule scope matching this file type.
    #[must_use]
    pub fn scope(self) -> DiagnosticScope {
        match self {
            Self::Os => DiagnosticScope::Os,
            Self::Bsl => DiagnosticScope::Bsl,
        }
    }
}

/// Per-request inputs for choosing which rules apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalysisContext {
    /// Kind of the analyzed file.
    pub file_type: FileType,
    /// Compatibility mode of the workspace, if known.
    pub compatibility_mode: Option<CompatibilityMode>,
}

impl AnalysisContext {
    /// Creates a context with unknown compatibility mode.
    #[must_use]
    pub fn new(file_type: FileType) -> Self {
        Self {
            file_type,
            compatibility_mode: None,
        }
    }

    /// Sets the workspace compatibility mode.
    #[must_use]
    pub fn with_compatibility_mode(mut self, mode: Option<CompatibilityMode>) -> Self {
        self.compatibility_mode = mode;
        self
    }
}

/// The document a rule instance checks.
#[derive(Debug, Clone)]
pub struct DocumentContext<'a> {
    /// Path of the document.
    pub path: &'a Path,
    /// Full text.
    pub content: &'a str,
    /// Kind of the document.
    pub file_type: FileType,
}

impl<'a> DocumentContext<'a> {
    /// Creates a new document context. A leading byte order mark is not
    /// part of the content.
    #[must_use]
    pub fn new(path: &'a Path, content: &'a str, file_type: FileType) -> Self {
        Self {
            path,
            content: content.strip_prefix('\u{FEFF}').unwrap_or(content),
            file_type,
        }
    }

    /// Iterates over `(line_number, line)` pairs, zero-based, without line
    /// terminators.
    pub fn lines(&self) -> impl Iterator<Item = (usize, &'a str)> {
        self.content
            .lines()
            .map(|line| line.strip_suffix('\r').unwrap_or(line))
            .enumerate()
    }
}
