//! # bsl-analyzer
//!
//! Diagnostic rule engine for 1C:Enterprise (BSL) and OneScript sources.
//!
//! This is the main facade crate that re-exports the engine, the derive
//! macro and the built-in rules, and adds [`AnalysisSession`]: a workspace
//! with a live, hot-reloaded configuration.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use bsl_analyzer::AnalysisSession;
//!
//! let mut session = AnalysisSession::new(".", None)?;
//! session.start_watching();
//!
//! let violations = session.analyze(Path::new("Module.bsl"), &content)?;
//! for v in &violations {
//!     println!("{v}");
//! }
//!
//! session.shutdown().await;
//! ```
//!
//! ## Custom Rules
//!
//! ```rust,ignore
//! use bsl_analyzer::{DiagnosticMetadata, DocumentContext, Finding, Rule};
//!
//! #[derive(Default, DiagnosticMetadata)]
//! #[diagnostic(code = "NoTabs", tags = ["clumsy"], severity = "info")]
//! struct NoTabs;
//!
//! impl Rule for NoTabs {
//!     fn check(&self, ctx: &DocumentContext<'_>) -> Vec<Finding> {
//!         /* ... */
//!     }
//! }
//! ```
//!
//! The derive expands to paths under `bsl_analyzer_core`, so crates
//! defining rules depend on it directly.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

// Re-export core types and traits
pub use bsl_analyzer_core::*;

// Re-export the derive for #[derive(DiagnosticMetadata)]
pub use bsl_analyzer_macros::DiagnosticMetadata;

/// Built-in rules.
pub mod rules {
    pub use bsl_analyzer_rules::*;
}

mod session;
pub mod workspace;

pub use session::{AnalysisSession, SessionError, TreeOptions};
