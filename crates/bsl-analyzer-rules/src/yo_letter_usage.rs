//! Forbids the letter `Ё` in identifiers.
//!
//! The standards require `Е` instead of `Ё` in names, so that searching for
//! a name never depends on which of the two letters was typed. Strings and
//! comments are not checked.

use bsl_analyzer_core::utils::{char_column, mask_strings, split_comment};
use bsl_analyzer_core::{DocumentContext, Finding, Range, Rule};
use bsl_analyzer_macros::DiagnosticMetadata;
use regex::Regex;
use std::sync::OnceLock;

/// Reports identifiers spelled with `Ё`.
#[derive(Debug, Clone, Copy, Default, DiagnosticMetadata)]
#[diagnostic(
    code = "YoLetterUsage",
    scope = "bsl",
    tags = ["standard"],
    severity = "info",
    kind = "code_smell",
    minutes_to_fix = 5
)]
pub struct YoLetterUsage;

#[allow(clippy::expect_used)]
fn identifier() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"[\p{L}_]\w*").expect("valid identifier regex"))
}

impl Rule for YoLetterUsage {
    fn check(&self, ctx: &DocumentContext<'_>) -> Vec<Finding> {
        let mut findings = Vec::new();

        for (number, line) in ctx.lines() {
            let (code, _) = split_comment(line);
            let masked = mask_strings(code);
            for word in identifier().find_iter(&masked) {
                if !word.as_str().contains(['ё', 'Ё']) {
                    continue;
                }
                let range = Range::on_line(
                    number,
                    char_column(&masked, word.start()),
                    char_column(&masked, word.end()),
                );
                findings.push(Finding::at(range).with_arg(word.as_str()));
            }
        }

        findings
    }
}
