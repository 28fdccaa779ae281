//! Check command implementation.

use anyhow::Result;
use bsl_analyzer::{AnalysisReport, AnalysisSession, TreeOptions};
use std::path::{Path, PathBuf};

use crate::config_resolver::{self, Origin};
use crate::OutputFormat;

/// Runs the check command. Exits with code 1 if a blocking problem is found.
pub fn run(
    path: &Path,
    format: OutputFormat,
    rules_filter: Option<String>,
    exclude: Vec<String>,
    config: Option<&Path>,
) -> Result<()> {
    let session = open_session(path, config)?;
    let options = tree_options(&session, rules_filter.as_deref(), exclude);

    let report = analyze(&session, path, &options)?;
    super::output::print(&report, format)?;

    if report.has_blocking() {
        std::process::exit(1);
    }

    Ok(())
}

/// Opens a session for `path`, resolving the configuration file the way
/// every subcommand does.
pub fn open_session(path: &Path, explicit: Option<&Path>) -> Result<AnalysisSession> {
    let root = workspace_root(path);
    let config = config_resolver::resolve(&root, explicit)?;
    if config.origin == Origin::Global {
        tracing::info!("Using global config: {}", config.path.display());
    }
    Ok(AnalysisSession::new(root, Some(config.path))?)
}

/// Builds the file and rule selection for a tree run.
pub fn tree_options(
    session: &AnalysisSession,
    rules_filter: Option<&str>,
    exclude: Vec<String>,
) -> TreeOptions {
    let rules = rules_filter.map(|filter| {
        let registry = session.supplier().registry();
        filter
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .filter(|name| {
                let known = registry.lookup(name).is_some();
                if !known {
                    tracing::warn!("Unknown rule: {}", name);
                }
                known
            })
            .map(str::to_string)
            .collect()
    });

    TreeOptions { exclude, rules }
}

/// Analyzes `path` with the session's current configuration.
pub fn analyze(session: &AnalysisSession, path: &Path, options: &TreeOptions) -> Result<AnalysisReport> {
    let report = session.analyze_tree(path, options)?;
    tracing::debug!(
        "{} problem(s) in {} file(s)",
        report.violation_count(),
        report.files_checked
    );
    Ok(report)
}

fn workspace_root(path: &Path) -> PathBuf {
    if path.is_file() {
        match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        }
    } else {
        path.to_path_buf()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn file_root_is_its_directory() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("Module.bsl");
        fs::write(&file, "").unwrap();

        assert_eq!(workspace_root(&file), tmp.path());
        assert_eq!(workspace_root(tmp.path()), tmp.path());
    }

    #[test]
    fn unknown_rules_are_dropped_from_filter() {
        let tmp = TempDir::new().unwrap();
        let session = open_session(tmp.path(), None).unwrap();

        let options = tree_options(&session, Some("LineLength, Nope,,MagicNumber"), Vec::new());
        assert_eq!(
            options.rules,
            Some(vec!["LineLength".to_string(), "MagicNumber".to_string()])
        );
        assert!(tree_options(&session, None, Vec::new()).rules.is_none());
    }

    #[test]
    fn session_reads_project_config() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join(".bsl-language-server.json"),
            r#"{"diagnosticLanguage": "en", "diagnostics": {"LineLength": false}}"#,
        )
        .unwrap();

        let session = open_session(tmp.path(), None).unwrap();
        assert_eq!(session.snapshot().diagnostic_language, bsl_analyzer::Language::En);
        assert!(session.config_path().is_absolute());
    }
}
