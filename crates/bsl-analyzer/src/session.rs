//! Analysis session: one workspace, its live configuration, and the rules
//! that run against its files.

use bsl_analyzer_core::{
    AnalysisContext, AnalysisReport, CompatibilityMode, ConfigError, ConfigurationSnapshot,
    ConfigurationStore, ConfigurationWatcher, DiagnosticSupplier, DocumentContext, FileType,
    LookupError, Registry, Violation, WatcherHandle, WatcherState, CONFIG_FILE_NAME,
};
use bsl_analyzer_rules::{builtin_registry, BuiltinError};
use arc_swap::ArcSwap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::workspace::detect_compatibility_mode;

/// Errors that can occur during a session.
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum SessionError {
    /// The built-in rules are inconsistent.
    #[error(transparent)]
    #[diagnostic(transparent)]
    Registry(#[from] BuiltinError),

    /// The initial configuration could not be loaded.
    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),

    /// No rule with the requested code.
    #[error(transparent)]
    #[diagnostic(transparent)]
    Lookup(#[from] LookupError),

    /// A source file could not be read.
    #[error("failed to read {path}: {source}")]
    #[diagnostic(code(bsl_analyzer::session::io))]
    Io {
        /// File path.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// The file is neither a `.bsl` module nor an `.os` script.
    #[error("unsupported file type: {0}")]
    #[diagnostic(
        code(bsl_analyzer::session::unsupported_file),
        help("only .bsl and .os files can be analyzed")
    )]
    UnsupportedFile(PathBuf),

    /// Directory traversal failed.
    #[error("failed to walk the workspace: {0}")]
    #[diagnostic(code(bsl_analyzer::session::walk))]
    Walk(#[from] ignore::Error),

    /// An exclude pattern is not a valid glob.
    #[error("invalid exclude pattern: {0}")]
    #[diagnostic(code(bsl_analyzer::session::glob))]
    Glob(#[from] glob::PatternError),
}

/// File selection for [`AnalysisSession::analyze_tree`].
#[derive(Debug, Clone, Default)]
pub struct TreeOptions {
    /// Glob patterns of paths to skip, matched against paths relative to
    /// the analyzed directory.
    pub exclude: Vec<String>,
    /// Restricts the run to these rule codes, among the enabled ones.
    pub rules: Option<Vec<String>>,
}

/// A workspace under analysis.
///
/// The compatibility mode is detected from the metadata under the
/// snapshot's `configurationRoot`, and detected again when a reload moves it.
///
/// Reads take the current configuration snapshot once per call, so a
/// reload never changes the rules in the middle of a file.
pub struct AnalysisSession {
    root: PathBuf,
    config_path: PathBuf,
    supplier: DiagnosticSupplier,
    store: Arc<ConfigurationStore>,
    detection: ArcSwap<Detection>,
    watcher: Option<WatcherHandle>,
}

impl AnalysisSession {
    /// Opens a session over `root` with the built-in rules.
    ///
    /// `config_path` defaults to `.bsl-language-server.json` in `root`;
    /// relative paths are resolved against `root`. A missing configuration
    /// file means defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the built-in registry is invalid or the
    /// configuration file cannot be parsed.
    pub fn new(root: impl Into<PathBuf>, config_path: Option<PathBuf>) -> Result<Self, SessionError> {
        let registry = builtin_registry()?;
        Self::with_registry(root, config_path, registry)
    }

    /// Opens a session with a custom registry.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file cannot be parsed.
    pub fn with_registry(
        root: impl Into<PathBuf>,
        config_path: Option<PathBuf>,
        registry: Registry,
    ) -> Result<Self, SessionError> {
        let root = root.into();
        let config_path = match config_path {
            Some(path) if path.is_absolute() => path,
            Some(path) => root.join(path),
            None => root.join(CONFIG_FILE_NAME),
        };

        let snapshot = ConfigurationSnapshot::from_file_or_default(&config_path)?;
        let detection = Detection::run(&root, &snapshot);
        let compatibility_mode = detection.compatibility_mode;
        info!(
            "Session at {} with {} rules, compatibility mode {}",
            root.display(),
            registry.len(),
            describe(compatibility_mode)
        );

        Ok(Self {
            root,
            config_path,
            supplier: DiagnosticSupplier::new(Arc::new(registry)),
            store: Arc::new(ConfigurationStore::new(snapshot)),
            detection: ArcSwap::from_pointee(detection),
            watcher: None,
        })
    }

    /// Workspace root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Configuration file this session reads and watches.
    #[must_use]
    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// The rule supplier.
    #[must_use]
    pub fn supplier(&self) -> &DiagnosticSupplier {
        &self.supplier
    }

    /// Compatibility mode detected in the workspace metadata.
    #[must_use]
    pub fn compatibility_mode(&self) -> Option<CompatibilityMode> {
        self.compatibility_mode_for(&self.store.current())
    }

    /// The current configuration.
    #[must_use]
    pub fn snapshot(&self) -> Arc<ConfigurationSnapshot> {
        self.store.current()
    }

    /// Receives every configuration published after this call.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<Arc<ConfigurationSnapshot>> {
        self.store.subscribe()
    }

    /// Rule selection inputs for a file, `None` for unsupported files.
    #[must_use]
    pub fn context_for(&self, path: &Path) -> Option<AnalysisContext> {
        self.context_with(path, &self.store.current())
    }

    fn context_with(&self, path: &Path, snapshot: &ConfigurationSnapshot) -> Option<AnalysisContext> {
        let file_type = FileType::from_path(path)?;
        Some(AnalysisContext::new(file_type).with_compatibility_mode(self.compatibility_mode_for(snapshot)))
    }

    fn compatibility_mode_for(&self, snapshot: &ConfigurationSnapshot) -> Option<CompatibilityMode> {
        let current = self.detection.load();
        if current.configuration_root == snapshot.configuration_root {
            return current.compatibility_mode;
        }

        let detection = Detection::run(&self.root, snapshot);
        info!(
            "Configuration root changed, compatibility mode {}",
            describe(detection.compatibility_mode)
        );
        let mode = detection.compatibility_mode;
        self.detection.store(Arc::new(detection));
        mode
    }

    /// Runs every applicable rule on a document.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::UnsupportedFile`] for files that are neither
    /// `.bsl` nor `.os`.
    pub fn analyze(&self, path: &Path, content: &str) -> Result<Vec<Violation>, SessionError> {
        self.analyze_with(path, content, None)
    }

    /// Runs one rule on a document, whatever its activation and scope.
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown code or an unsupported file.
    pub fn run_rule(&self, code: &str, path: &Path, content: &str) -> Result<Vec<Violation>, SessionError> {
        let file_type =
            FileType::from_path(path).ok_or_else(|| SessionError::UnsupportedFile(path.to_path_buf()))?;
        let snapshot = self.store.current();
        let instance = self.supplier.instantiate_single(code, &snapshot)?;

        let mut violations = instance.run(&DocumentContext::new(path, content, file_type));
        violations.sort_by_key(|v| v.range);
        Ok(violations)
    }

    /// Reads and analyzes one file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is unsupported.
    pub fn analyze_file(&self, path: &Path) -> Result<Vec<Violation>, SessionError> {
        let content = read_source(path)?;
        self.analyze(path, &content)
    }

    /// Analyzes every `.bsl` and `.os` file under `path`, honouring
    /// `.gitignore`.
    ///
    /// # Errors
    ///
    /// Returns an error if traversal fails or a file cannot be read.
    pub fn analyze_tree(&self, path: &Path, options: &TreeOptions) -> Result<AnalysisReport, SessionError> {
        info!("Starting analysis at {}", path.display());
        let files = discover_files(path, &options.exclude)?;
        info!("Found {} files to analyze", files.len());

        let mut report = AnalysisReport::new();
        for file in files {
            let content = read_source(&file)?;
            let violations = self.analyze_with(&file, &content, options.rules.as_deref())?;
            report.push(file, violations);
        }

        info!(
            "Analysis complete: {} violations in {} files",
            report.violation_count(),
            report.files_checked
        );
        Ok(report)
    }

    fn analyze_with(
        &self,
        path: &Path,
        content: &str,
        only: Option<&[String]>,
    ) -> Result<Vec<Violation>, SessionError> {
        let snapshot = self.store.current();
        let context = self
            .context_with(path, &snapshot)
            .ok_or_else(|| SessionError::UnsupportedFile(path.to_path_buf()))?;
        let document = DocumentContext::new(path, content, context.file_type);

        debug!("Analyzing: {}", path.display());
        let mut violations: Vec<Violation> = self
            .supplier
            .instances_for(&context, &snapshot)
            .iter()
            .filter(|instance| only.map_or(true, |codes| codes.iter().any(|c| c == instance.code())))
            .flat_map(|instance| instance.run(&document))
            .collect();
        violations.sort_by_key(|v| v.range);
        Ok(violations)
    }

    /// Starts hot reload of the configuration file. Does nothing if already
    /// watching. Must be called inside a Tokio runtime.
    pub fn start_watching(&mut self) {
        if self.watcher.is_some() {
            return;
        }
        let watcher = ConfigurationWatcher::new(&self.config_path, Arc::clone(&self.store));
        self.watcher = Some(watcher.start());
    }

    /// State of the configuration watcher; [`WatcherState::Idle`] if it was
    /// never started.
    #[must_use]
    pub fn watcher_state(&self) -> WatcherState {
        self.watcher
            .as_ref()
            .map_or(WatcherState::Idle, WatcherHandle::state)
    }

    /// Waits until the watcher is running or has failed to start.
    pub async fn watcher_started(&mut self) -> WatcherState {
        match self.watcher.as_mut() {
            Some(handle) => handle.wait_started().await,
            None => WatcherState::Idle,
        }
    }

    /// Stops the configuration watcher and waits for it to release the
    /// file system watch. Returns its final state, or `None` if it was not
    /// running.
    pub async fn shutdown(&mut self) -> Option<WatcherState> {
        let handle = self.watcher.take()?;
        let state = handle.shutdown().await;
        if state != WatcherState::Stopped {
            warn!("Configuration watcher ended in state {state:?}");
        }
        Some(state)
    }
}

impl std::fmt::Debug for AnalysisSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnalysisSession")
            .field("root", &self.root)
            .field("config_path", &self.config_path)
            .field("compatibility_mode", &self.detection.load().compatibility_mode)
            .field("watcher", &self.watcher_state())
            .finish_non_exhaustive()
    }
}

/// Compatibility mode found under one configuration root.
#[derive(Debug)]
struct Detection {
    configuration_root: Option<PathBuf>,
    compatibility_mode: Option<CompatibilityMode>,
}

impl Detection {
    fn run(root: &Path, snapshot: &ConfigurationSnapshot) -> Self {
        Self {
            configuration_root: snapshot.configuration_root.clone(),
            compatibility_mode: detect_compatibility_mode(root, snapshot.configuration_root.as_deref()),
        }
    }
}

fn describe(mode: Option<CompatibilityMode>) -> String {
    mode.map_or_else(|| "unknown".to_string(), |m| m.to_string())
}

fn read_source(path: &Path) -> Result<String, SessionError> {
    std::fs::read_to_string(path).map_err(|source| SessionError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Finds analyzable files under `root`, sorted, skipping ignored and
/// excluded paths.
fn discover_files(root: &Path, exclude: &[String]) -> Result<Vec<PathBuf>, SessionError> {
    if root.is_file() {
        return Ok(vec![root.to_path_buf()]);
    }

    let patterns = exclude
        .iter()
        .map(String::as_str)
        .map(glob::Pattern::new)
        .collect::<Result<Vec<_>, _>>()?;

    let mut builder = ignore::WalkBuilder::new(root);
    builder.hidden(false).git_ignore(true);

    let mut files = Vec::new();
    for entry in builder.build() {
        let entry = entry?;
        let path = entry.path();
        if !path.is_file() || FileType::from_path(path).is_none() {
            continue;
        }

        let relative = path.strip_prefix(root).unwrap_or(path);
        if patterns.iter().any(|p| p.matches_path(relative)) {
            debug!("Excluding: {}", path.display());
            continue;
        }
        files.push(path.to_path_buf());
    }

    files.sort();
    Ok(files)
}
