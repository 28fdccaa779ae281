//! Supplies configured rule instances for analysis requests.
//!
//! The supplier is stateless apart from the shared, read-only registry:
//! every call takes the configuration snapshot it should use and builds
//! new instances, so concurrent requests never share rule state.

use std::sync::Arc;
use tracing::{debug, warn};

use crate::activation::resolve;
use crate::config::ConfigurationSnapshot;
use crate::context::{AnalysisContext, DocumentContext};
use crate::descriptor::RuleDescriptor;
use crate::filter::applies;
use crate::i18n::{format_message, Language};
use crate::registry::Registry;
use crate::rule::RuleBox;
use crate::types::Violation;

/// Lookup of an unknown rule code.
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum LookupError {
    /// No rule with this code is registered.
    #[error("unknown rule code `{0}`")]
    #[diagnostic(
        code(bsl_analyzer::supplier::not_found),
        help("run `bsl-analyzer list-rules` to see the available codes")
    )]
    NotFound(String),
}

/// A configured rule instance, owned by one analysis request.
pub struct CheckInstance {
    descriptor: Arc<RuleDescriptor>,
    language: Language,
    rule: RuleBox,
}

impl CheckInstance {
    /// The descriptor of the rule.
    #[must_use]
    pub fn descriptor(&self) -> &Arc<RuleDescriptor> {
        &self.descriptor
    }

    /// Rule code.
    #[must_use]
    pub fn code(&self) -> &'static str {
        self.descriptor.code()
    }

    /// Runs the rule and renders its findings as violations.
    #[must_use]
    pub fn run(&self, document: &DocumentContext<'_>) -> Vec<Violation> {
        let template = self.descriptor.message(self.language);
        self.rule
            .check(document)
            .into_iter()
            .map(|finding| Violation {
                code: self.code().to_string(),
                severity: self.descriptor.severity(),
                kind: self.descriptor.kind(),
                range: finding.range,
                message: format_message(template, &finding.args),
                tags: self.descriptor.tags().to_vec(),
            })
            .collect()
    }
}

impl std::fmt::Debug for CheckInstance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CheckInstance")
            .field("code", &self.code())
            .field("language", &self.language)
            .finish_non_exhaustive()
    }
}

/// Builds rule instances from a registry and a configuration snapshot.
#[derive(Debug, Clone)]
pub struct DiagnosticSupplier {
    registry: Arc<Registry>,
}

impl DiagnosticSupplier {
    /// Creates a supplier over a registry.
    #[must_use]
    pub fn new(registry: Arc<Registry>) -> Self {
        Self { registry }
    }

    /// The underlying registry.
    #[must_use]
    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    /// Returns the descriptors of rules that are enabled under `snapshot`
    /// and apply to `context`, in registry order.
    #[must_use]
    pub fn descriptors_for(
        &self,
        context: &AnalysisContext,
        snapshot: &ConfigurationSnapshot,
    ) -> Vec<Arc<RuleDescriptor>> {
        self.registry
            .all_descriptors()
            .filter(|descriptor| {
                if !resolve(descriptor, snapshot).enabled {
                    debug!("Skipping disabled rule: {}", descriptor.code());
                    return false;
                }
                if !applies(descriptor, context) {
                    debug!("Skipping rule outside context: {}", descriptor.code());
                    return false;
                }
                true
            })
            .cloned()
            .collect()
    }

    /// Creates a fresh instance of a rule, configured from `snapshot`.
    ///
    /// Parameters the rule rejects are logged and replaced by the rule's
    /// defaults, so one bad setting never blocks the other rules.
    ///
    /// # Errors
    ///
    /// Returns [`LookupError::NotFound`] if the descriptor does not belong
    /// to this supplier's registry.
    pub fn instantiate(
        &self,
        descriptor: &Arc<RuleDescriptor>,
        snapshot: &ConfigurationSnapshot,
    ) -> Result<CheckInstance, LookupError> {
        let code = descriptor.code();
        let factory = self
            .registry
            .factory(code)
            .ok_or_else(|| LookupError::NotFound(code.to_string()))?;

        let decision = resolve(descriptor, snapshot);
        let mut rule = factory();
        if !decision.parameters.is_empty() {
            if let Err(e) = rule.configure(&decision.parameters) {
                warn!("Ignoring parameters of rule {code}, using defaults: {e}");
                rule = factory();
            }
        }

        Ok(CheckInstance {
            descriptor: Arc::clone(descriptor),
            language: snapshot.diagnostic_language,
            rule,
        })
    }

    /// Creates configured instances of every rule that applies to `context`.
    #[must_use]
    pub fn instances_for(
        &self,
        context: &AnalysisContext,
        snapshot: &ConfigurationSnapshot,
    ) -> Vec<CheckInstance> {
        self.instantiate_each(&self.descriptors_for(context, snapshot), snapshot)
    }

    /// Instantiates every descriptor; ones this supplier cannot build are
    /// logged and left out.
    fn instantiate_each(
        &self,
        descriptors: &[Arc<RuleDescriptor>],
        snapshot: &ConfigurationSnapshot,
    ) -> Vec<CheckInstance> {
        descriptors
            .iter()
            .filter_map(|descriptor| match self.instantiate(descriptor, snapshot) {
                Ok(instance) => Some(instance),
                Err(e) => {
                    warn!("Skipping rule {}: {}", descriptor.code(), e);
                    None
                }
            })
            .collect()
    }

    /// Creates a configured instance of one rule by code, ignoring scope,
    /// compatibility mode and activation.
    ///
    /// # Errors
    ///
    /// Returns [`LookupError::NotFound`] for an unknown code.
    pub fn instantiate_single(
        &self,
        code: &str,
        snapshot: &ConfigurationSnapshot,
    ) -> Result<CheckInstance, LookupError> {
        let descriptor = self
            .registry
            .lookup(code)
            .ok_or_else(|| LookupError::NotFound(code.to_string()))?;
        self.instantiate(descriptor, snapshot)
    }
}
