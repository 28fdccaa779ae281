//! # bsl-analyzer-rules
//!
//! Built-in diagnostic checks for bsl-analyzer.
//!
//! The checks work line by line on the source text; they need no parser.
//!
//! ## Available Rules
//!
//! | Code | Default | Scope | Description |
//! |------|---------|-------|-------------|
//! | `LineLength` | on | all | Limits the length of source lines |
//! | `UsingServiceTag` | on | all | Finds `TODO`, `FIXME` and similar tags in comments |
//! | `YoLetterUsage` | on | bsl | Forbids `Ё` in identifiers |
//! | `UsingModalWindows` | on | bsl, 8.3.3+ | Forbids modal dialogs |
//! | `MagicNumber` | on | all | Finds unnamed numeric literals |
//! | `CommentedCode` | off | all | Finds commented-out code |
//! | `UseDirectivePosition` | on | os | Requires `#Использовать` at the top |
//!
//! ## Usage
//!
//! ```ignore
//! use bsl_analyzer_core::DiagnosticSupplier;
//! use std::sync::Arc;
//!
//! let registry = bsl_analyzer_rules::builtin_registry()?;
//! let supplier = DiagnosticSupplier::new(Arc::new(registry));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod commented_code;
mod line_length;
mod magic_number;
mod use_directive_position;
mod using_modal_windows;
mod using_service_tag;
mod yo_letter_usage;

#[cfg(test)]
mod test_util;

pub use commented_code::CommentedCode;
pub use line_length::LineLength;
pub use magic_number::MagicNumber;
pub use use_directive_position::UseDirectivePosition;
pub use using_modal_windows::UsingModalWindows;
pub use using_service_tag::UsingServiceTag;
pub use yo_letter_usage::YoLetterUsage;

use bsl_analyzer_core::{Catalog, CatalogError, Language, Registry, RegistryError};
use tracing::debug;

/// Re-export core types for convenience.
pub use bsl_analyzer_core::{Rule, Severity, Violation};

const CATALOG_EN: &str = include_str!("../resources/en.toml");
const CATALOG_RU: &str = include_str!("../resources/ru.toml");

/// Failure to assemble the built-in rule set.
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum BuiltinError {
    /// An embedded message catalog is malformed.
    #[error(transparent)]
    #[diagnostic(transparent)]
    Catalog(#[from] CatalogError),

    /// The rules do not form a valid registry.
    #[error(transparent)]
    #[diagnostic(transparent)]
    Registry(#[from] RegistryError),
}

/// Loads the texts of the built-in rules for every language.
///
/// # Errors
///
/// Returns an error if an embedded catalog is malformed.
pub fn builtin_catalog() -> Result<Catalog, CatalogError> {
    let mut catalog = Catalog::new();
    for (language, content) in [(Language::En, CATALOG_EN), (Language::Ru, CATALOG_RU)] {
        catalog.load_toml(language, content)?;
    }
    Ok(catalog)
}

/// Builds the registry of all built-in rules.
///
/// Registration order is the order rules are reported and listed in.
///
/// # Errors
///
/// Returns an error if a rule's metadata or texts are invalid.
pub fn builtin_registry() -> Result<Registry, BuiltinError> {
    let catalog = builtin_catalog()?;
    let registry = Registry::builder()
        .register::<LineLength>()
        .register::<UsingServiceTag>()
        .register::<YoLetterUsage>()
        .register::<UsingModalWindows>()
        .register::<MagicNumber>()
        .register::<CommentedCode>()
        .register::<UseDirectivePosition>()
        .build(&catalog)?;
    debug!("Built-in registry ready with {} rules", registry.len());
    Ok(registry)
}
