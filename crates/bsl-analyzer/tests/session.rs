//! Session behaviour against a real workspace directory.

use bsl_analyzer::{AnalysisSession, Language, SessionError, TreeOptions, WatcherState, CONFIG_FILE_NAME};
use std::path::Path;
use std::time::Duration;
use tokio::time::timeout;

const MODULE: &str = "\
Процедура Заполнить() // TODO: проверить
    Счётчик = Счётчик + 42;
КонецПроцедуры
";

fn codes(violations: &[bsl_analyzer::Violation]) -> Vec<&str> {
    violations.iter().map(|v| v.code.as_str()).collect()
}

#[test]
fn analyzes_with_defaults_when_configuration_is_missing() {
    let dir = tempfile::tempdir().unwrap();
    let session = AnalysisSession::new(dir.path(), None).unwrap();

    assert_eq!(session.snapshot().diagnostic_language, Language::Ru);
    let violations = session.analyze(Path::new("Module.bsl"), MODULE).unwrap();
    assert_eq!(
        codes(&violations),
        vec!["UsingServiceTag", "YoLetterUsage", "YoLetterUsage", "MagicNumber"]
    );
}

#[test]
fn configuration_file_controls_rules() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join(CONFIG_FILE_NAME),
        r#"{ "diagnosticLanguage": "en", "diagnostics": { "YoLetterUsage": false, "MagicNumber": { "authorizedNumbers": "42" } } }"#,
    )
    .unwrap();
    let session = AnalysisSession::new(dir.path(), None).unwrap();

    let violations = session.analyze(Path::new("Module.bsl"), MODULE).unwrap();
    assert_eq!(codes(&violations), vec!["UsingServiceTag"]);
    assert_eq!(violations[0].message, "Comment contains service tag \"TODO\"");
}

#[test]
fn run_rule_and_errors() {
    let dir = tempfile::tempdir().unwrap();
    let session = AnalysisSession::new(dir.path(), None).unwrap();

    let violations = session
        .run_rule("CommentedCode", Path::new("Module.bsl"), "//А = 1;\n//Б();")
        .unwrap();
    assert_eq!(codes(&violations), vec!["CommentedCode"]);

    assert!(matches!(
        session.run_rule("Nope", Path::new("Module.bsl"), ""),
        Err(SessionError::Lookup(_))
    ));
    assert!(matches!(
        session.analyze(Path::new("notes.txt"), ""),
        Err(SessionError::UnsupportedFile(_))
    ));
}

#[test]
fn byte_order_mark_does_not_count_as_code() {
    let dir = tempfile::tempdir().unwrap();
    let script = dir.path().join("main.os");
    std::fs::write(
        &script,
        "\u{FEFF}#Использовать json\n#Использовать asserts\n\nСообщить(\"ok\");\n",
    )
    .unwrap();
    let session = AnalysisSession::new(dir.path(), None).unwrap();

    assert!(session.analyze_file(&script).unwrap().is_empty());

    let late = session
        .analyze(Path::new("main.os"), "\u{FEFF}Сообщить(\"ok\");\n#Использовать json\n")
        .unwrap();
    assert_eq!(codes(&late), vec!["UseDirectivePosition"]);
    assert_eq!(late[0].range.start.line, 1);
}

#[test]
fn tree_analysis_reports_per_file() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(dir.path().join("src")).unwrap();
    std::fs::write(dir.path().join("src/Module.bsl"), MODULE).unwrap();
    std::fs::write(dir.path().join("src/Clean.bsl"), "Возврат;\n").unwrap();
    std::fs::write(dir.path().join("main.os"), "Сообщить(1);\n#Использовать json\n").unwrap();

    let session = AnalysisSession::new(dir.path(), None).unwrap();
    let report = session.analyze_tree(dir.path(), &TreeOptions::default()).unwrap();
    assert_eq!(report.files_checked, 3);
    assert_eq!(report.files.len(), 2);
    assert!(report.has_blocking());

    let only_tags = TreeOptions {
        rules: Some(vec!["UsingServiceTag".to_string()]),
        ..TreeOptions::default()
    };
    let report = session.analyze_tree(dir.path(), &only_tags).unwrap();
    assert_eq!(report.violation_count(), 1);
    assert!(!report.has_blocking());
}

#[tokio::test]
async fn reloads_configuration_while_watching() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join(CONFIG_FILE_NAME);
    std::fs::write(&config, r#"{ "diagnosticLanguage": "ru" }"#).unwrap();

    let mut session = AnalysisSession::new(dir.path(), None).unwrap();
    let mut changes = session.subscribe();
    session.start_watching();
    assert_eq!(session.watcher_started().await, WatcherState::Watching);

    std::fs::write(&config, r#"{ "diagnostics": { "UsingServiceTag": false } }"#).unwrap();
    timeout(Duration::from_secs(10), changes.recv())
        .await
        .expect("no reload within timeout")
        .unwrap();

    let violations = session.analyze(Path::new("Module.bsl"), MODULE).unwrap();
    assert!(!codes(&violations).contains(&"UsingServiceTag"));

    assert_eq!(session.shutdown().await, Some(WatcherState::Stopped));
    assert_eq!(session.shutdown().await, None);
    assert_eq!(session.watcher_state(), WatcherState::Idle);
}
