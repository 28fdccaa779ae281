//! Finds service tags such as `TODO` or `FIXME` left in comments.
//!
//! # Configuration
//!
//! - `serviceTags`: `|`-separated list of tags, each a regular expression
//!   (default: `todo|fixme|!!|mrg|@|отладка|для\s*отладки`)

use bsl_analyzer_core::utils::{char_column, split_comment};
use bsl_analyzer_core::{parse_parameters, DocumentContext, Finding, ParameterError, Parameters, Range, Rule};
use bsl_analyzer_macros::DiagnosticMetadata;
use regex::Regex;
use serde::Deserialize;

const DEFAULT_SERVICE_TAGS: &str = r"todo|fixme|!!|mrg|@|отладка|для\s*отладки";

/// Reports comments that contain a service tag.
#[derive(Debug, Clone, DiagnosticMetadata)]
#[diagnostic(
    code = "UsingServiceTag",
    tags = ["badpractice"],
    severity = "info",
    kind = "code_smell",
    minutes_to_fix = 0
)]
pub struct UsingServiceTag {
    pattern: Regex,
}

impl Default for UsingServiceTag {
    fn default() -> Self {
        // The default list is a fixed, valid expression.
        #[allow(clippy::expect_used)]
        let pattern = build_pattern(DEFAULT_SERVICE_TAGS).expect("default service tags compile");
        Self { pattern }
    }
}

/// Matches any tag as a whole word, case-insensitively.
fn build_pattern(tags: &str) -> Result<Regex, regex::Error> {
    Regex::new(&format!(r"(?i)(?:^|[^\w])({tags})(?:[^\w]|$)"))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct Params {
    service_tags: Option<String>,
}

impl Rule for UsingServiceTag {
    fn configure(&mut self, parameters: &Parameters) -> Result<(), ParameterError> {
        let params: Params = parse_parameters(parameters)?;
        if let Some(tags) = params.service_tags {
            if tags.trim().is_empty() {
                return Err(ParameterError::value("serviceTags", "must not be empty"));
            }
            self.pattern = build_pattern(&tags)
                .map_err(|e| ParameterError::value("serviceTags", e.to_string()))?;
        }
        Ok(())
    }

    fn check(&self, ctx: &DocumentContext<'_>) -> Vec<Finding> {
        let mut findings = Vec::new();

        for (number, line) in ctx.lines() {
            let (_, Some(comment)) = split_comment(line) else {
                continue;
            };
            let Some(tag) = self.pattern.captures(comment).and_then(|c| c.get(1)) else {
                continue;
            };
            let offset = line.len() - comment.len();
            let start = char_column(line, offset + tag.start());
            let end = char_column(line, offset + tag.end());
            findings.push(Finding::at(Range::on_line(number, start, end)).with_arg(tag.as_str()));
        }

        findings
    }
}
