//! Hot reload of the configuration file.
//!
//! The watcher runs as one background task. It observes the directory that
//! contains the configuration file, reloads the file when it is created,
//! modified or removed, and publishes the result to a
//! [`ConfigurationStore`]. A file that fails to parse leaves the previous
//! configuration in place.
//!
//! ```text
//! Idle ──start──▶ Watching ──event──▶ Reloading ──▶ Watching
//!   │                │                                  │
//!   └── setup error ─┴──── shutdown / watch error ──────┴──▶ Stopped
//! ```

use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::config::{ConfigError, ConfigFormat, ConfigurationSnapshot, ConfigurationStore};

/// Lifecycle state of a [`ConfigurationWatcher`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatcherState {
    /// Created, not yet watching.
    Idle,
    /// Waiting for filesystem events.
    Watching,
    /// Loading a changed configuration file.
    Reloading,
    /// Terminated by shutdown or by a watch failure.
    Stopped,
}

/// Failures of the watch primitive. They stop the watcher, not the process.
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum WatchError {
    /// The configuration path has no file name.
    #[error("cannot watch {path}: not a file path")]
    #[diagnostic(code(bsl_analyzer::watcher::invalid_path))]
    InvalidPath {
        /// The rejected path.
        path: PathBuf,
    },

    /// The platform watcher could not be created.
    #[error("failed to create file watcher: {0}")]
    #[diagnostic(code(bsl_analyzer::watcher::init))]
    Init(#[source] notify::Error),

    /// The configuration directory could not be watched.
    #[error("failed to watch {path}: {source}")]
    #[diagnostic(
        code(bsl_analyzer::watcher::watch),
        help("the directory containing the configuration file must exist")
    )]
    Watch {
        /// Watched directory.
        path: PathBuf,
        /// Underlying error.
        source: notify::Error,
    },

    /// The platform watcher reported an error.
    #[error("file watcher failed: {0}")]
    #[diagnostic(code(bsl_analyzer::watcher::event))]
    Event(#[source] notify::Error),

    /// The platform watcher stopped delivering events.
    #[error("file watcher event channel closed")]
    #[diagnostic(code(bsl_analyzer::watcher::closed))]
    ChannelClosed,
}

/// Watches a configuration file and publishes every successful reload.
#[derive(Debug)]
pub struct ConfigurationWatcher {
    path: PathBuf,
    store: Arc<ConfigurationStore>,
}

impl ConfigurationWatcher {
    /// Creates a watcher for `path` publishing into `store`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, store: Arc<ConfigurationStore>) -> Self {
        Self {
            path: path.into(),
            store,
        }
    }

    /// Starts the background task. Must be called inside a Tokio runtime.
    ///
    /// Setup failures are not returned: they are logged and the handle
    /// reports [`WatcherState::Stopped`].
    #[must_use]
    pub fn start(self) -> WatcherHandle {
        let (state_tx, state_rx) = watch::channel(WatcherState::Idle);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let task = tokio::spawn(async move {
            match self.run(&state_tx, shutdown_rx).await {
                Ok(()) => info!("Configuration watcher stopped"),
                Err(e) => error!(
                    "Configuration watcher for {} stopped, hot reload disabled: {e}",
                    self.path.display()
                ),
            }
            state_tx.send_replace(WatcherState::Stopped);
        });

        WatcherHandle {
            shutdown: shutdown_tx,
            state: state_rx,
            task,
        }
    }

    async fn run(
        &self,
        state: &watch::Sender<WatcherState>,
        mut shutdown: watch::Receiver<bool>,
    ) -> Result<(), WatchError> {
        let file_name = self
            .path
            .file_name()
            .ok_or_else(|| WatchError::InvalidPath {
                path: self.path.clone(),
            })?
            .to_os_string();
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };

        let (tx, mut events) = mpsc::unbounded_channel();
        // Owned by this function, so the OS watch is released on every return.
        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| {
                let _ = tx.send(res);
            },
            notify::Config::default(),
        )
        .map_err(WatchError::Init)?;
        watcher
            .watch(&dir, RecursiveMode::NonRecursive)
            .map_err(|source| WatchError::Watch {
                path: dir.clone(),
                source,
            })?;

        state.send_replace(WatcherState::Watching);
        info!("Watching configuration file: {}", self.path.display());

        loop {
            tokio::select! {
                _ = shutdown.changed() => return Ok(()),
                event = events.recv() => {
                    let event = event.ok_or(WatchError::ChannelClosed)?.map_err(WatchError::Event)?;
                    if !is_relevant(&event, &file_name) {
                        continue;
                    }
                    state.send_replace(WatcherState::Reloading);
                    self.reload().await;
                    state.send_replace(WatcherState::Watching);
                }
            }
        }
    }

    async fn reload(&self) {
        debug!("Configuration change detected, reloading {}", self.path.display());
        match load(&self.path).await {
            Ok(snapshot) if *self.store.current() == snapshot => {
                debug!("Configuration unchanged");
            }
            Ok(snapshot) => {
                self.store.publish(snapshot);
                info!("Configuration reloaded from {}", self.path.display());
            }
            Err(e) => warn!("Keeping previous configuration: {e}"),
        }
    }
}

/// A create, modify or remove event touching the tracked file name.
fn is_relevant(event: &Event, file_name: &OsString) -> bool {
    let kind_matches = matches!(
        event.kind,
        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
    );
    kind_matches
        && event
            .paths
            .iter()
            .any(|p| p.file_name() == Some(file_name.as_os_str()))
}

/// Reads the configuration; a missing file means defaults.
async fn load(path: &Path) -> Result<ConfigurationSnapshot, ConfigError> {
    match tokio::fs::read_to_string(path).await {
        Ok(content) => ConfigurationSnapshot::parse(&content, ConfigFormat::from_path(path)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(ConfigurationSnapshot::default()),
        Err(source) => Err(ConfigError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Handle to a running [`ConfigurationWatcher`].
///
/// Dropping the handle also stops the watcher, without waiting for it.
#[derive(Debug)]
pub struct WatcherHandle {
    shutdown: watch::Sender<bool>,
    state: watch::Receiver<WatcherState>,
    task: JoinHandle<()>,
}

impl WatcherHandle {
    /// Current state.
    #[must_use]
    pub fn state(&self) -> WatcherState {
        *self.state.borrow()
    }

    /// Receiver of state transitions.
    #[must_use]
    pub fn state_changes(&self) -> watch::Receiver<WatcherState> {
        self.state.clone()
    }

    /// Waits until the watcher has left [`WatcherState::Idle`] and returns
    /// the state it reached.
    pub async fn wait_started(&mut self) -> WatcherState {
        match self.state.wait_for(|s| *s != WatcherState::Idle).await {
            Ok(state) => *state,
            Err(_) => WatcherState::Stopped,
        }
    }

    /// Stops the watcher and waits for its task to finish.
    pub async fn shutdown(self) -> WatcherState {
        let Self {
            shutdown,
            state,
            task,
        } = self;

        // Fails only if the task already ended.
        let _ = shutdown.send(true);
        if let Err(e) = task.await {
            error!("Configuration watcher task failed: {e}");
            return WatcherState::Stopped;
        }
        let final_state = *state.borrow();
        final_state
    }
}
