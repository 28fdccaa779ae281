//! Decides whether a rule applies to an analysis context.

use crate::context::AnalysisContext;
use crate::descriptor::RuleDescriptor;
use crate::metadata::DiagnosticScope;

/// Returns `true` if the rule may run in this context: its scope covers
/// the file type and the workspace satisfies its compatibility mode.
#[must_use]
pub fn applies(descriptor: &RuleDescriptor, context: &AnalysisContext) -> bool {
    in_scope(descriptor, context) && passes_compatibility_mode(descriptor, context)
}

fn in_scope(descriptor: &RuleDescriptor, context: &AnalysisContext) -> bool {
    let scope = descriptor.scope();
    scope == DiagnosticScope::All || scope == context.file_type.scope()
}

/// A stated minimum is never satisfied by an unknown workspace mode.
fn passes_compatibility_mode(descriptor: &RuleDescriptor, context: &AnalysisContext) -> bool {
    match (descriptor.compatibility_mode(), context.compatibility_mode) {
        (None, _) => true,
        (Some(_), None) => false,
        (Some(required), Some(actual)) => actual >= required,
    }
}
