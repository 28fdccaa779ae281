//! Forbids modal dialogs in configurations that run without modality.
//!
//! From platform 8.3.3 the web client and mobile platform do not support
//! modal windows; every modal method has a non-blocking counterpart that
//! takes a notification handler.

use bsl_analyzer_core::utils::{char_column, mask_strings, split_comment};
use bsl_analyzer_core::{DocumentContext, Finding, Range, Rule};
use bsl_analyzer_macros::DiagnosticMetadata;
use regex::Regex;
use std::sync::OnceLock;

/// Global modal methods and their asynchronous replacements.
const GLOBAL_METHODS: &[(&str, &str)] = &[
    ("Вопрос", "ПоказатьВопрос"),
    ("Предупреждение", "ПоказатьПредупреждение"),
    ("ОткрытьЗначение", "ПоказатьЗначение"),
    ("ОткрытьФормуМодально", "ОткрытьФорму"),
    ("ВвестиЧисло", "ПоказатьВводЧисла"),
    ("ВвестиСтроку", "ПоказатьВводСтроки"),
    ("ВвестиДату", "ПоказатьВводДаты"),
    ("ВвестиЗначение", "ПоказатьВводЗначения"),
    ("DoQueryBox", "ShowQueryBox"),
    ("DoMessageBox", "ShowMessageBox"),
    ("OpenValue", "ShowValue"),
    ("OpenFormModal", "OpenForm"),
    ("InputNumber", "ShowInputNumber"),
    ("InputString", "ShowInputString"),
    ("InputDate", "ShowInputDate"),
    ("InputValue", "ShowInputValue"),
];

/// Form methods, called through a form object.
const FORM_METHODS: &[(&str, &str)] = &[("ОткрытьМодально", "Открыть"), ("DoModal", "Open")];

/// Reports calls of modal methods.
#[derive(Debug, Clone, Copy, Default, DiagnosticMetadata)]
#[diagnostic(
    code = "UsingModalWindows",
    scope = "bsl",
    compatibility_mode = "8.3.3",
    tags = ["standard"],
    severity = "major",
    kind = "code_smell",
    minutes_to_fix = 15
)]
pub struct UsingModalWindows;

/// A call: optional `.`, a name, then `(`.
#[allow(clippy::expect_used)]
fn call() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(\.\s*)?([\p{L}_]\w*)\s*\(").expect("valid call regex"))
}

fn replacement(name: &str, through_object: bool) -> Option<&'static str> {
    let table = if through_object { FORM_METHODS } else { GLOBAL_METHODS };
    let name = name.to_lowercase();
    table
        .iter()
        .find(|(modal, _)| modal.to_lowercase() == name)
        .map(|(_, replacement)| *replacement)
}

impl Rule for UsingModalWindows {
    fn check(&self, ctx: &DocumentContext<'_>) -> Vec<Finding> {
        let mut findings = Vec::new();

        for (number, line) in ctx.lines() {
            let (code, _) = split_comment(line);
            let masked = mask_strings(code);
            for captures in call().captures_iter(&masked) {
                let Some(name) = captures.get(2) else {
                    continue;
                };
                let through_object = captures.get(1).is_some();
                let Some(replacement) = replacement(name.as_str(), through_object) else {
                    continue;
                };
                let range = Range::on_line(
                    number,
                    char_column(&masked, name.start()),
                    char_column(&masked, name.end()),
                );
                findings.push(
                    Finding::at(range)
                        .with_arg(name.as_str())
                        .with_arg(replacement),
                );
            }
        }

        findings
    }
}
