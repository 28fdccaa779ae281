//! Helpers for rule unit tests.

use bsl_analyzer_core::{DocumentContext, FileType, Finding, ParameterError, Parameters, Rule};
use std::path::Path;

pub(crate) fn check(rule: &impl Rule, file_type: FileType, content: &str) -> Vec<Finding> {
    let path = match file_type {
        FileType::Bsl => Path::new("Module.bsl"),
        FileType::Os => Path::new("script.os"),
    };
    rule.check(&DocumentContext::new(path, content, file_type))
}

pub(crate) fn check_bsl(rule: &impl Rule, content: &str) -> Vec<Finding> {
    check(rule, FileType::Bsl, content)
}

pub(crate) fn configured<R: Rule + Default>(parameters: &Parameters) -> Result<R, ParameterError> {
    let mut rule = R::default();
    rule.configure(parameters)?;
    Ok(rule)
}

/// `(line, start, end)` of every finding.
pub(crate) fn spans(findings: &[Finding]) -> Vec<(usize, usize, usize)> {
    findings
        .iter()
        .map(|f| (f.range.start.line, f.range.start.character, f.range.end.character))
        .collect()
}
