//! Built-in registry contents and end-to-end behaviour.

use bsl_analyzer_core::{
    AnalysisContext, CompatibilityMode, ConfigurationSnapshot, DiagnosticSupplier, DocumentContext,
    FileType, Language, Parameters, RuleSetting,
};
use bsl_analyzer_rules::{builtin_catalog, builtin_registry};
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

fn supplier() -> DiagnosticSupplier {
    DiagnosticSupplier::new(Arc::new(builtin_registry().unwrap()))
}

#[test]
fn registry_lists_rules_in_registration_order() {
    let registry = builtin_registry().unwrap();
    let codes: Vec<_> = registry.codes().collect();
    insta::assert_snapshot!(codes.join("\n"), @r"
    LineLength
    UsingServiceTag
    YoLetterUsage
    UsingModalWindows
    MagicNumber
    CommentedCode
    UseDirectivePosition
    ");
}

#[test]
fn every_rule_has_texts_and_valid_tags() {
    let registry = builtin_registry().unwrap();
    for descriptor in registry.all_descriptors() {
        let tags = descriptor.tags();
        assert!((1..=3).contains(&tags.len()), "{}", descriptor.code());
        assert_eq!(tags.iter().collect::<HashSet<_>>().len(), tags.len());

        for language in Language::ALL {
            assert!(!descriptor.name(language).is_empty());
            assert!(!descriptor.message(language).is_empty());
            assert!(!descriptor.description(language).is_empty());
        }
    }
}

#[test]
fn catalog_has_no_unregistered_rules() {
    let catalog = builtin_catalog().unwrap();
    let registry = builtin_registry().unwrap();
    for code in ["LineLength", "MagicNumber", "UseDirectivePosition"] {
        assert!(registry.lookup(code).is_some());
        assert!(catalog.get(Language::En, code).is_some());
        assert!(catalog.get(Language::Ru, code).is_some());
    }
    assert!(catalog.get(Language::En, "NoSuchRule").is_none());
}

#[test]
fn selection_by_file_type_and_compatibility() {
    let supplier = supplier();
    let snapshot = ConfigurationSnapshot::default();
    let codes = |ctx: AnalysisContext| -> Vec<&'static str> {
        supplier
            .descriptors_for(&ctx, &snapshot)
            .iter()
            .map(|d| d.code())
            .collect()
    };

    let bsl = AnalysisContext::new(FileType::Bsl);
    assert_eq!(
        codes(bsl),
        vec!["LineLength", "UsingServiceTag", "YoLetterUsage", "MagicNumber"]
    );
    assert_eq!(
        codes(bsl.with_compatibility_mode(Some(CompatibilityMode::new(8, 3, 14)))),
        vec!["LineLength", "UsingServiceTag", "YoLetterUsage", "UsingModalWindows", "MagicNumber"]
    );
    assert_eq!(
        codes(AnalysisContext::new(FileType::Os)),
        vec!["LineLength", "UsingServiceTag", "MagicNumber", "UseDirectivePosition"]
    );
}

#[test]
fn configured_run_renders_localized_messages() {
    let supplier = supplier();
    let snapshot = ConfigurationSnapshot::new()
        .with_language(Language::En)
        .with_rule("MagicNumber", RuleSetting::Toggle(false))
        .with_rule(
            "LineLength",
            RuleSetting::Parameters(Parameters::new().with("maxLineLength", 20)),
        )
        .with_rule("CommentedCode", RuleSetting::Parameters(Parameters::new()));

    let content = "\
Процедура Расчет() // TODO: убрать
    //Итог = 0;
    Счётчик = Счётчик + 100;
КонецПроцедуры";
    let doc = DocumentContext::new(Path::new("Module.bsl"), content, FileType::Bsl);
    let ctx = AnalysisContext::new(FileType::Bsl);

    let mut messages: Vec<String> = supplier
        .instances_for(&ctx, &snapshot)
        .iter()
        .flat_map(|instance| instance.run(&doc))
        .map(|v| format!("{}:{} [{}] {}", v.range.start.line + 1, v.range.start.character + 1, v.code, v.message))
        .collect();
    messages.sort();

    insta::assert_snapshot!(messages.join("\n"), @r#"
    1:1 [LineLength] Line is 34 characters long, the limit is 20
    1:23 [UsingServiceTag] Comment contains service tag "TODO"
    2:5 [CommentedCode] Remove commented-out code
    3:1 [LineLength] Line is 28 characters long, the limit is 20
    3:15 [YoLetterUsage] Identifier "Счётчик" uses the letter Ё, use Е instead
    3:5 [YoLetterUsage] Identifier "Счётчик" uses the letter Ё, use Е instead
    "#);
}

#[test]
fn single_rule_runs_regardless_of_scope() {
    let supplier = supplier();
    let instance = supplier
        .instantiate_single("UseDirectivePosition", &ConfigurationSnapshot::default())
        .unwrap();
    let doc = DocumentContext::new(Path::new("m.bsl"), "А = 1;\n#Использовать json", FileType::Bsl);

    let violations = instance.run(&doc);
    assert_eq!(violations.len(), 1);
    assert_eq!(
        violations[0].message,
        "Директива \"#Использовать json\" должна предшествовать коду модуля"
    );
    assert!(violations[0].is_blocking());
}
