//! Rule trait for defining diagnostic checks.

use serde::de::DeserializeOwned;

use crate::config::Parameters;
use crate::context::DocumentContext;
use crate::types::Finding;

/// A diagnostic check.
///
/// Implementations are plain structs holding their parameters. The engine
/// creates a fresh instance through [`Default`] for every analysis request,
/// calls [`Rule::configure`] with the user's parameters, and then runs
/// [`Rule::check`] against one document.
///
/// # Example
///
/// ```ignore
/// use bsl_analyzer_core::{DocumentContext, Finding, Range, Rule};
///
/// #[derive(Debug, Default, DiagnosticMetadata)]
/// #[diagnostic(code = "NoTabs", severity = "info", kind = "code_smell", tags = ["clumsy"])]
/// pub struct NoTabs;
///
/// impl Rule for NoTabs {
///     fn check(&self, ctx: &DocumentContext<'_>) -> Vec<Finding> {
///         ctx.lines()
///             .filter_map(|(n, line)| line.find('\t').map(|c| Finding::at(Range::on_line(n, c, c + 1))))
///             .collect()
///     }
/// }
/// ```
pub trait Rule: Send + Sync {
    /// Applies user parameters.
    ///
    /// The default implementation accepts anything and changes nothing, for
    /// rules without parameters.
    ///
    /// # Errors
    ///
    /// Returns an error if the parameters do not fit the rule. The engine
    /// then discards this instance and uses a default one.
    fn configure(&mut self, parameters: &Parameters) -> Result<(), ParameterError> {
        let _ = parameters;
        Ok(())
    }

    /// Checks a document and returns the problems found.
    fn check(&self, ctx: &DocumentContext<'_>) -> Vec<Finding>;
}

/// Type alias for boxed Rule trait objects.
pub type RuleBox = Box<dyn Rule>;

/// Creates a default instance of a rule.
pub type RuleFactory = fn() -> RuleBox;

/// Parameters that do not fit a rule.
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum ParameterError {
    /// Parameters have the wrong shape or types.
    #[error("invalid parameters: {0}")]
    #[diagnostic(code(bsl_analyzer::parameters::shape))]
    Shape(#[from] serde_json::Error),

    /// A parameter has the right type but an unusable value.
    #[error("invalid value for `{name}`: {reason}")]
    #[diagnostic(code(bsl_analyzer::parameters::value))]
    Value {
        /// Parameter name.
        name: &'static str,
        /// Why the value was rejected.
        reason: String,
    },
}

impl ParameterError {
    /// Creates a [`ParameterError::Value`].
    pub fn value(name: &'static str, reason: impl Into<String>) -> Self {
        Self::Value {
            name,
            reason: reason.into(),
        }
    }
}

/// Deserializes rule parameters into a typed struct.
///
/// Missing keys fall back to the struct's `#[serde(default)]` values;
/// unknown keys are rejected when the struct says so.
///
/// # Errors
///
/// Returns [`ParameterError::Shape`] when a value has the wrong type.
pub fn parse_parameters<T: DeserializeOwned>(parameters: &Parameters) -> Result<T, ParameterError> {
    Ok(parameters.parse()?)
}
