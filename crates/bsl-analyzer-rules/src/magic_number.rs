//! Finds numeric literals used without a name.
//!
//! # Rationale
//!
//! A bare `86400` says nothing about its meaning; a variable or constant
//! named `СекундВСутках` does. Assigning a literal to a variable is how a
//! number gets its name, so such assignments are not reported.
//!
//! # Configuration
//!
//! - `authorizedNumbers`: comma-separated numbers that are always allowed
//!   (default: `-1,0,1`)
//! - `allowMagicIndexes`: allow literals as collection indexes, `Массив[5]`
//!   (default: `true`)

use bsl_analyzer_core::utils::{char_column, mask_strings, split_comment};
use bsl_analyzer_core::{parse_parameters, DocumentContext, Finding, ParameterError, Parameters, Range, Rule};
use bsl_analyzer_macros::DiagnosticMetadata;
use regex::Regex;
use serde::Deserialize;
use std::collections::HashSet;
use std::sync::OnceLock;

const DEFAULT_AUTHORIZED_NUMBERS: &str = "-1,0,1";

/// Reports unnamed numeric literals.
#[derive(Debug, Clone, DiagnosticMetadata)]
#[diagnostic(
    code = "MagicNumber",
    tags = ["badpractice"],
    severity = "minor",
    kind = "code_smell",
    minutes_to_fix = 1
)]
pub struct MagicNumber {
    authorized: HashSet<String>,
    allow_magic_indexes: bool,
}

impl Default for MagicNumber {
    fn default() -> Self {
        Self {
            authorized: parse_authorized(DEFAULT_AUTHORIZED_NUMBERS).unwrap_or_default(),
            allow_magic_indexes: true,
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct Params {
    authorized_numbers: Option<String>,
    allow_magic_indexes: Option<bool>,
}

/// Parses a number into the form used for comparison, so `1`, `1.0` and
/// `01` are the same number.
fn normalize(number: &str) -> Option<String> {
    number.trim().parse::<f64>().ok().map(|value| value.to_string())
}

fn parse_authorized(list: &str) -> Result<HashSet<String>, String> {
    list.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(|item| normalize(item).ok_or_else(|| format!("`{item}` is not a number")))
        .collect()
}

#[allow(clippy::expect_used)]
fn number_literal() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\b\d+(?:\.\d+)?\b").expect("valid number regex"))
}

/// `Имя = 42;`: a literal that gets a name right here.
#[allow(clippy::expect_used)]
fn literal_assignment() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^\s*[\p{L}_][\w.]*\s*=\s*-?\s*\d+(?:\.\d+)?\s*;?\s*$")
            .expect("valid assignment regex")
    })
}

/// Last non-space character before `end`, with its byte index.
fn previous_char(text: &str, end: usize) -> Option<(usize, char)> {
    text[..end].char_indices().rev().find(|(_, c)| !c.is_whitespace())
}

fn next_char(text: &str, start: usize) -> Option<char> {
    text[start..].chars().find(|c| !c.is_whitespace())
}

/// A `-` is a sign, not a subtraction, when nothing that ends an operand
/// precedes it.
fn sign_start(text: &str, number_start: usize) -> Option<usize> {
    let (minus, c) = previous_char(text, number_start)?;
    if c != '-' {
        return None;
    }
    match previous_char(text, minus) {
        Some((_, before)) if before.is_alphanumeric() || matches!(before, '_' | ')' | ']') => None,
        _ => Some(minus),
    }
}

impl Rule for MagicNumber {
    fn configure(&mut self, parameters: &Parameters) -> Result<(), ParameterError> {
        let params: Params = parse_parameters(parameters)?;
        if let Some(list) = params.authorized_numbers {
            self.authorized = parse_authorized(&list)
                .map_err(|reason| ParameterError::value("authorizedNumbers", reason))?;
        }
        if let Some(allow) = params.allow_magic_indexes {
            self.allow_magic_indexes = allow;
        }
        Ok(())
    }

    fn check(&self, ctx: &DocumentContext<'_>) -> Vec<Finding> {
        let mut findings = Vec::new();

        for (line_number, line) in ctx.lines() {
            let (code, _) = split_comment(line);
            let masked = mask_strings(code);
            if literal_assignment().is_match(&masked) {
                continue;
            }

            for literal in number_literal().find_iter(&masked) {
                let start = sign_start(&masked, literal.start()).unwrap_or(literal.start());
                let text: String = masked[start..literal.end()]
                    .chars()
                    .filter(|c| !c.is_whitespace())
                    .collect();

                if normalize(&text).is_some_and(|n| self.authorized.contains(&n)) {
                    continue;
                }
                let is_index = matches!(previous_char(&masked, start), Some((_, '[')))
                    && next_char(&masked, literal.end()) == Some(']');
                if self.allow_magic_indexes && is_index {
                    continue;
                }

                let range = Range::on_line(
                    line_number,
                    char_column(&masked, start),
                    char_column(&masked, literal.end()),
                );
                findings.push(Finding::at(range).with_arg(text));
            }
        }

        findings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::{check_bsl, configured, spans};

    fn args(findings: &[Finding]) -> Vec<&str> {
        findings.iter().map(|f| f.args[0].as_str()).collect()
    }

    #[test]
    fn reports_numbers_in_expressions() {
        let findings = check_bsl(&MagicNumber::default(), "Итог = Сумма * 1.2 + 86400;");
        assert_eq!(args(&findings), vec!["1.2", "86400"]);
        assert_eq!(spans(&findings), vec![(0, 15, 18), (0, 21, 26)]);
    }

    #[test]
    fn literal_assignments_name_the_number() {
        let code = "СекундВСутках = 86400;\nЭтотОбъект.Лимит = -5;";
        assert!(check_bsl(&MagicNumber::default(), code).is_empty());
    }

    #[test]
    fn authorized_numbers_pass() {
        let code = "Если Индекс > 0 И Счет <> -1 Тогда Возврат Индекс + 1.0; КонецЕсли;";
        assert!(check_bsl(&MagicNumber::default(), code).is_empty());
    }

    #[test]
    fn subtraction_is_not_a_sign() {
        let findings = check_bsl(&MagicNumber::default(), "Остаток = Всего - 1 - 7;");
        assert_eq!(args(&findings), vec!["7"]);

        let findings = check_bsl(&MagicNumber::default(), "Сдвиг(-7, Значение)");
        assert_eq!(args(&findings), vec!["-7"]);
    }

    #[test]
    fn ignores_identifiers_strings_dates_and_comments() {
        let code = r#"Строка2 = "Код 42" + '20240101' + Стр3(); // 99"#;
        assert!(check_bsl(&MagicNumber::default(), code).is_empty());
    }

    #[test]
    fn indexes_follow_configuration() {
        let code = "Значение = Массив[5];";
        assert!(check_bsl(&MagicNumber::default(), code).is_empty());

        let strict: MagicNumber =
            configured(&Parameters::new().with("allowMagicIndexes", false)).unwrap();
        assert_eq!(args(&check_bsl(&strict, code)), vec!["5"]);
    }

    #[test]
    fn authorized_list_is_configurable() {
        let rule: MagicNumber =
            configured(&Parameters::new().with("authorizedNumbers", "0, 7, 24")).unwrap();
        let findings = check_bsl(&rule, "Часы = Дни * 24 + 7 + 1;");
        assert_eq!(args(&findings), vec!["1"]);
    }

    #[test]
    fn rejects_non_numeric_list() {
        let err = configured::<MagicNumber>(&Parameters::new().with("authorizedNumbers", "1,два"))
            .unwrap_err();
        assert!(matches!(err, ParameterError::Value { name: "authorizedNumbers", .. }));
    }
}
