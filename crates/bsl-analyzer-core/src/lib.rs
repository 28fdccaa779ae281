//! # bsl-analyzer-core
//!
//! Rule engine of the BSL analyzer: decides which diagnostic checks run on a
//! source file, with which parameters, under the current configuration.
//!
//! - [`Registry`] holds every known check with its static [`RuleMetadata`]
//!   and localized texts
//! - [`resolve`] combines a rule's default activation with the configuration
//! - [`applies`] gates rules by file type and platform compatibility mode
//! - [`DiagnosticSupplier`] produces fresh, configured [`CheckInstance`]s
//! - [`ConfigurationStore`] and [`ConfigurationWatcher`] keep the
//!   configuration current while files change on disk
//!
//! ## Example
//!
//! ```ignore
//! use bsl_analyzer_core::{AnalysisContext, ConfigurationSnapshot, DiagnosticSupplier, FileType};
//!
//! let supplier = DiagnosticSupplier::new(registry);
//! let snapshot = ConfigurationSnapshot::from_file_or_default(path)?;
//! let ctx = AnalysisContext::new(FileType::Bsl);
//!
//! for instance in supplier.instances_for(&ctx, &snapshot) {
//!     violations.extend(instance.run(&document));
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod activation;
mod config;
mod context;
mod descriptor;
mod filter;
mod i18n;
mod metadata;
mod registry;
mod rule;
mod supplier;
mod types;
mod watcher;

/// Utility modules for rule implementations.
pub mod utils;

#[cfg(test)]
mod test_support;

pub use activation::{resolve, ActivationDecision};
pub use config::{
    ConfigError, ConfigFormat, ConfigOverride, ConfigurationSnapshot, ConfigurationStore,
    Parameters, RuleSetting, CONFIG_FILE_NAME,
};
pub use context::{AnalysisContext, DocumentContext, FileType};
pub use descriptor::{LocalizedTexts, RuleDescriptor};
pub use filter::applies;
pub use i18n::{format_message, Catalog, CatalogError, Language, RuleTexts};
pub use metadata::{
    CompatibilityMode, DiagnosticMetadata, DiagnosticScope, DiagnosticTag, DiagnosticType,
    ParseCompatibilityModeError, RuleMetadata,
};
pub use registry::{Registry, RegistryBuilder, RegistryError};
pub use rule::{parse_parameters, ParameterError, Rule, RuleBox, RuleFactory};
pub use supplier::{CheckInstance, DiagnosticSupplier, LookupError};
pub use types::{AnalysisReport, FileReport, Finding, Position, Range, Severity, Violation};
pub use watcher::{ConfigurationWatcher, WatchError, WatcherHandle, WatcherState};
