//! Finds blocks of commented-out code.
//!
//! A block is a run of consecutive lines holding only a comment. Each line
//! of the block is classified as code or prose; the block is reported when
//! the share of code lines reaches the threshold.
//!
//! # Configuration
//!
//! - `threshold`: share of code lines, from 0 to 1 (default: 0.9)

use bsl_analyzer_core::utils::split_comment;
use bsl_analyzer_core::{
    parse_parameters, DocumentContext, Finding, ParameterError, Parameters, Position, Range, Rule,
};
use bsl_analyzer_macros::DiagnosticMetadata;
use regex::Regex;
use serde::Deserialize;
use std::sync::OnceLock;

const DEFAULT_THRESHOLD: f32 = 0.9;

/// Statement keywords, Russian and English.
const KEYWORDS: &[&str] = &[
    "если", "иначеесли", "иначе", "конецесли", "для", "пока", "конеццикла", "процедура",
    "конецпроцедуры", "функция", "конецфункции", "возврат", "попытка", "исключение",
    "конецпопытки", "перем", "прервать", "продолжить", "if", "elsif", "else", "endif", "for",
    "while", "enddo", "procedure", "endprocedure", "function", "endfunction", "return", "try",
    "except", "endtry", "var", "break", "continue",
];

/// Reports comment blocks that look like disabled code.
#[derive(Debug, Clone, DiagnosticMetadata)]
#[diagnostic(
    code = "CommentedCode",
    activated_by_default = false,
    tags = ["standard", "badpractice"],
    severity = "minor",
    kind = "code_smell",
    minutes_to_fix = 1
)]
pub struct CommentedCode {
    threshold: f32,
}

impl Default for CommentedCode {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
        }
    }
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct Params {
    threshold: Option<f32>,
}

#[allow(clippy::expect_used)]
fn statement() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            r"(?x)
            ^[\p{L}_][\w.]*\s*=\s*\S         # assignment
            | ^[\p{L}_][\w.]*\s*\(.*\)\s*;?$  # call
            | ^[&\#][\p{L}]                   # annotation or preprocessor
            | (?i:\b(тогда|цикл|then|do))$    # block header
            ",
        )
        .expect("valid statement regex")
    })
}

fn looks_like_code(text: &str) -> bool {
    if text.ends_with(';') || statement().is_match(text) {
        return true;
    }
    let first_word: String = text
        .chars()
        .take_while(|c| c.is_alphanumeric() || *c == '_')
        .flat_map(char::to_lowercase)
        .collect();
    KEYWORDS.contains(&first_word.as_str())
}

struct Block {
    start: Position,
    end: Position,
    lines: usize,
    code_lines: usize,
}

impl CommentedCode {
    #[allow(clippy::cast_precision_loss)]
    fn is_code(&self, block: &Block) -> bool {
        block.lines > 0 && block.code_lines as f32 / block.lines as f32 >= self.threshold
    }
}

impl Rule for CommentedCode {
    fn configure(&mut self, parameters: &Parameters) -> Result<(), ParameterError> {
        let params: Params = parse_parameters(parameters)?;
        if let Some(threshold) = params.threshold {
            if !(0.0..=1.0).contains(&threshold) {
                return Err(ParameterError::value("threshold", "must be between 0 and 1"));
            }
            self.threshold = threshold;
        }
        Ok(())
    }

    fn check(&self, ctx: &DocumentContext<'_>) -> Vec<Finding> {
        let mut findings = Vec::new();
        let mut current: Option<Block> = None;

        for (number, line) in ctx.lines() {
            let (code, comment) = split_comment(line);
            let Some(comment) = comment.filter(|_| code.trim().is_empty()) else {
                if let Some(block) = current.take() {
                    if self.is_code(&block) {
                        findings.push(Finding::at(Range::new(block.start, block.end)));
                    }
                }
                continue;
            };

            let block = current.get_or_insert_with(|| Block {
                start: Position::new(number, code.chars().count()),
                end: Position::new(number, 0),
                lines: 0,
                code_lines: 0,
            });
            block.end = Position::new(number, line.chars().count());

            let text = comment.trim();
            if text.is_empty() {
                continue;
            }
            block.lines += 1;
            if looks_like_code(text) {
                block.code_lines += 1;
            }
        }

        if let Some(block) = current {
            if self.is_code(&block) {
                findings.push(Finding::at(Range::new(block.start, block.end)));
            }
        }

        findings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::{check_bsl, configured};

    #[test]
    fn reports_disabled_code_block() {
        let code = "\
Процедура Тест()
    //Если Отказ Тогда
    //    Сообщить(\"Отказ\");
    //КонецЕсли;
    Возврат;
КонецПроцедуры";
        let findings = check_bsl(&CommentedCode::default(), code);

        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].range, Range::new(Position::new(1, 4), Position::new(3, 16)));
    }

    #[test]
    fn prose_is_not_code() {
        let code = "\
// Процедура заполняет табличную часть
// по данным документа-основания.
// Параметры:
//   Источник - ДокументСсылка";
        assert!(check_bsl(&CommentedCode::default(), code).is_empty());
    }

    #[test]
    fn trailing_comments_do_not_form_blocks() {
        let code = "А = 1; // Б = 2;\nВ = 3; // Г();";
        assert!(check_bsl(&CommentedCode::default(), code).is_empty());
    }

    #[test]
    fn threshold_controls_mixed_blocks() {
        let code = "\
// Старый вариант расчета:
// Итог = Сумма * Курс;
// Сообщить(Итог);
// Возврат Итог;";
        assert!(check_bsl(&CommentedCode::default(), code).is_empty());

        let lenient: CommentedCode = configured(&Parameters::new().with("threshold", 0.7)).unwrap();
        assert_eq!(check_bsl(&lenient, code).len(), 1);
    }

    #[test]
    fn blank_comment_lines_do_not_dilute() {
        let code = "//Для Каждого Строка Из Таблица Цикл\n//\n//КонецЦикла;";
        assert_eq!(check_bsl(&CommentedCode::default(), code).len(), 1);
    }

    #[test]
    fn rejects_threshold_out_of_range() {
        assert!(configured::<CommentedCode>(&Parameters::new().with("threshold", 1.5)).is_err());
        assert!(configured::<CommentedCode>(&Parameters::new().with("threshold", -0.1)).is_err());
        assert!(configured::<CommentedCode>(&Parameters::new().with("threshold", "high")).is_err());
    }
}
