//! Finds the configuration file a session loads and watches.
//!
//! The `--config` flag wins. Otherwise the workspace is searched, then the
//! global directory (`$BSL_ANALYZER_CONFIG_DIR` or `~/.bsl-analyzer/`). In
//! each directory JSON is preferred over TOML. When nothing exists the
//! workspace's `.bsl-language-server.json` is used, so creating it later is
//! picked up by `watch`.

use anyhow::{Context, Result};
use bsl_analyzer::{ConfigFormat, CONFIG_FILE_NAME};
use std::path::{Path, PathBuf};

/// Formats tried in each directory, most preferred first.
const FORMAT_PRECEDENCE: [ConfigFormat; 2] = [ConfigFormat::Json, ConfigFormat::Toml];

/// Where a configuration file comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// Given with `--config`.
    Flag,
    /// Found in the workspace.
    Workspace,
    /// Found in the global directory.
    Global,
    /// Nothing exists yet; defaults apply until the file appears.
    Missing,
}

/// An absolute configuration path and how it was chosen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    /// File to load and watch.
    pub path: PathBuf,
    /// How it was found.
    pub origin: Origin,
}

impl ResolvedConfig {
    /// Format the file is parsed with.
    #[must_use]
    pub fn format(&self) -> ConfigFormat {
        ConfigFormat::from_path(&self.path)
    }
}

/// Resolves the configuration of the workspace at `root`.
///
/// # Errors
///
/// Returns an error if a relative path cannot be made absolute.
pub fn resolve(root: &Path, explicit: Option<&Path>) -> Result<ResolvedConfig> {
    let cwd = std::env::current_dir().context("Failed to read the current directory")?;
    let resolved = resolve_in(&cwd.join(root), explicit.map(|p| cwd.join(p)), global_config_dir());
    tracing::debug!(
        "Configuration {} ({:?}, {:?})",
        resolved.path.display(),
        resolved.origin,
        resolved.format()
    );
    Ok(resolved)
}

/// Resolution over absolute paths; `global_dir` is a parameter so tests
/// need no environment variables.
fn resolve_in(root: &Path, explicit: Option<PathBuf>, global_dir: Option<PathBuf>) -> ResolvedConfig {
    if let Some(path) = explicit {
        return ResolvedConfig {
            path,
            origin: Origin::Flag,
        };
    }

    let workspace = find_in(root, workspace_file_name).map(|path| (path, Origin::Workspace));
    let global = || {
        global_dir
            .as_deref()
            .and_then(|dir| find_in(dir, global_file_name))
            .map(|path| (path, Origin::Global))
    };

    let (path, origin) = workspace
        .or_else(global)
        .unwrap_or_else(|| (root.join(CONFIG_FILE_NAME), Origin::Missing));
    ResolvedConfig { path, origin }
}

fn find_in(dir: &Path, file_name: fn(ConfigFormat) -> &'static str) -> Option<PathBuf> {
    FORMAT_PRECEDENCE
        .into_iter()
        .map(|format| dir.join(file_name(format)))
        .find(|candidate| candidate.is_file())
}

fn workspace_file_name(format: ConfigFormat) -> &'static str {
    match format {
        ConfigFormat::Json => CONFIG_FILE_NAME,
        ConfigFormat::Toml => "bsl-analyzer.toml",
    }
}

fn global_file_name(format: ConfigFormat) -> &'static str {
    match format {
        ConfigFormat::Json => "config.json",
        ConfigFormat::Toml => "config.toml",
    }
}

/// `$BSL_ANALYZER_CONFIG_DIR`, else `~/.bsl-analyzer/`.
fn global_config_dir() -> Option<PathBuf> {
    std::env::var_os("BSL_ANALYZER_CONFIG_DIR")
        .map(PathBuf::from)
        .or_else(|| home::home_dir().map(|h| h.join(".bsl-analyzer")))
}
