//! Requires `#Использовать` directives at the top of OneScript modules.
//!
//! The OneScript loader only honours `#Использовать` (`#Use`) before the
//! first statement; a directive further down is silently ignored.

use bsl_analyzer_core::utils::split_comment;
use bsl_analyzer_core::{DocumentContext, Finding, Range, Rule};
use bsl_analyzer_macros::DiagnosticMetadata;
use regex::Regex;
use std::sync::OnceLock;

/// Reports `#Использовать` directives that follow code.
#[derive(Debug, Clone, Copy, Default, DiagnosticMetadata)]
#[diagnostic(
    code = "UseDirectivePosition",
    scope = "os",
    tags = ["standard"],
    severity = "critical",
    kind = "error",
    minutes_to_fix = 1
)]
pub struct UseDirectivePosition;

#[allow(clippy::expect_used)]
fn use_directive() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)^\s*#(использовать|use)\b").expect("valid directive regex")
    })
}

impl Rule for UseDirectivePosition {
    fn check(&self, ctx: &DocumentContext<'_>) -> Vec<Finding> {
        let mut findings = Vec::new();
        let mut seen_code = false;

        for (number, line) in ctx.lines() {
            let (code, _) = split_comment(line);
            let code = code.trim_end();
            if code.trim_start().is_empty() {
                continue;
            }
            if !use_directive().is_match(code) {
                seen_code = true;
                continue;
            }
            if seen_code {
                let indent = code.chars().take_while(|c| c.is_whitespace()).count();
                let directive = code.trim_start();
                findings.push(
                    Finding::at(Range::on_line(number, indent, indent + directive.chars().count()))
                        .with_arg(directive),
                );
            }
        }

        findings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::{check, spans};
    use bsl_analyzer_core::FileType;

    #[test]
    fn directives_before_code_pass() {
        let code = "\
// Скрипт сборки
#Использовать json
#Use asserts

Сообщить(\"ok\");";
        assert!(check(&UseDirectivePosition, FileType::Os, code).is_empty());
    }

    #[test]
    fn directive_after_code_is_reported() {
        let code = "\
#Использовать json
Перем Парсер;
  #Использовать  logos // логирование";
        let findings = check(&UseDirectivePosition, FileType::Os, code);

        assert_eq!(spans(&findings), vec![(2, 2, 22)]);
        assert_eq!(findings[0].args, vec!["#Использовать  logos"]);
    }

    #[test]
    fn other_preprocessor_lines_count_as_code() {
        let code = "#Если Сервер Тогда\n#Использовать json\n#КонецЕсли";
        assert_eq!(check(&UseDirectivePosition, FileType::Os, code).len(), 1);
    }
}
