//! Limits the length of source lines.
//!
//! # Rationale
//!
//! Long lines are hard to read and review side by side. The 1C development
//! standards recommend at most 120 characters.
//!
//! # Configuration
//!
//! - `maxLineLength`: maximum number of characters (default: 120)

use bsl_analyzer_core::{parse_parameters, DocumentContext, Finding, ParameterError, Parameters, Range, Rule};
use bsl_analyzer_macros::DiagnosticMetadata;
use serde::Deserialize;

const DEFAULT_MAX_LINE_LENGTH: usize = 120;

/// Reports lines longer than the configured limit.
#[derive(Debug, Clone, DiagnosticMetadata)]
#[diagnostic(
    code = "LineLength",
    tags = ["standard", "badpractice"],
    severity = "minor",
    kind = "code_smell",
    minutes_to_fix = 1
)]
pub struct LineLength {
    max_line_length: usize,
}

impl Default for LineLength {
    fn default() -> Self {
        Self {
            max_line_length: DEFAULT_MAX_LINE_LENGTH,
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct Params {
    #[serde(default = "default_max_line_length")]
    max_line_length: usize,
}

fn default_max_line_length() -> usize {
    DEFAULT_MAX_LINE_LENGTH
}

impl Rule for LineLength {
    fn configure(&mut self, parameters: &Parameters) -> Result<(), ParameterError> {
        let params: Params = parse_parameters(parameters)?;
        if params.max_line_length == 0 {
            return Err(ParameterError::value("maxLineLength", "must be positive"));
        }
        self.max_line_length = params.max_line_length;
        Ok(())
    }

    fn check(&self, ctx: &DocumentContext<'_>) -> Vec<Finding> {
        ctx.lines()
            .filter_map(|(number, line)| {
                let length = line.trim_end().chars().count();
                (length > self.max_line_length).then(|| {
                    Finding::at(Range::on_line(number, 0, length))
                        .with_arg(length)
                        .with_arg(self.max_line_length)
                })
            })
            .collect()
    }
}
