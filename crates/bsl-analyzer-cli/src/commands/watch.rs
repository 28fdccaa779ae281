//! Watch command implementation.
//!
//! Analyzes the workspace once, then again every time the configuration
//! file changes, until interrupted.

use anyhow::{bail, Result};
use bsl_analyzer::{AnalysisSession, TreeOptions, WatcherState};
use std::path::Path;
use tokio::sync::broadcast::error::RecvError;

use crate::OutputFormat;

/// Runs the watch command.
pub async fn run(
    path: &Path,
    format: OutputFormat,
    rules_filter: Option<String>,
    exclude: Vec<String>,
    config: Option<&Path>,
) -> Result<()> {
    let mut session = super::check::open_session(path, config)?;
    let options = super::check::tree_options(&session, rules_filter.as_deref(), exclude);
    let mut updates = session.subscribe();

    report(&session, path, &options, format)?;

    session.start_watching();
    let state = session.watcher_started().await;
    if state != WatcherState::Watching {
        session.shutdown().await;
        bail!(
            "Could not watch {} (watcher {state:?})",
            session.config_path().display()
        );
    }
    tracing::info!(
        "Watching {} for changes, press Ctrl-C to stop",
        session.config_path().display()
    );

    let result = loop {
        tokio::select! {
            update = updates.recv() => match update {
                Ok(_) => {
                    tracing::info!("Configuration changed, re-running analysis");
                    if let Err(e) = report(&session, path, &options, format) {
                        break Err(e);
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::debug!("Skipped {} intermediate configuration(s)", skipped);
                }
                Err(RecvError::Closed) => break Ok(()),
            },
            signal = tokio::signal::ctrl_c() => break signal.map_err(Into::into),
        }
    };

    if let Some(state) = session.shutdown().await {
        tracing::debug!("Watcher finished in state {state:?}");
    }
    result
}

fn report(session: &AnalysisSession, path: &Path, options: &TreeOptions, format: OutputFormat) -> Result<()> {
    let report = super::check::analyze(session, path, options)?;
    super::output::print(&report, format)
}
