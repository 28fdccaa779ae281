//! Run-rule command implementation.

use anyhow::{Context, Result};
use std::path::Path;

use crate::OutputFormat;

/// Runs a single rule on one file, regardless of its activation and scope.
pub fn run(code: &str, file: &Path, format: OutputFormat, config: Option<&Path>) -> Result<()> {
    let session = super::check::open_session(file, config)?;
    let content = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;

    let violations = session.run_rule(code, file, &content)?;
    tracing::info!("{} reported {} problem(s)", code, violations.len());

    super::output::print_file(file, violations, format)
}
