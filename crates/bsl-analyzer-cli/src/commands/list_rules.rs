//! List rules command implementation.

use anyhow::Result;
use bsl_analyzer::rules::builtin_registry;
use bsl_analyzer::{CompatibilityMode, DiagnosticScope, DiagnosticTag, Language, RuleDescriptor, Severity};
use serde::Serialize;

use crate::ListFormat;

/// One row of the rule listing.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RuleInfo<'a> {
    code: &'static str,
    name: &'a str,
    description: &'a str,
    severity: Severity,
    scope: DiagnosticScope,
    activated_by_default: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    compatibility_mode: Option<CompatibilityMode>,
    tags: &'static [DiagnosticTag],
}

impl<'a> RuleInfo<'a> {
    fn new(descriptor: &'a RuleDescriptor, language: Language) -> Self {
        Self {
            code: descriptor.code(),
            name: descriptor.name(language),
            description: descriptor.description(language),
            severity: descriptor.severity(),
            scope: descriptor.scope(),
            activated_by_default: descriptor.activated_by_default(),
            compatibility_mode: descriptor.compatibility_mode(),
            tags: descriptor.tags(),
        }
    }
}

/// Runs the list-rules command.
pub fn run(language: Language, format: ListFormat) -> Result<()> {
    let registry = builtin_registry()?;
    let rules: Vec<RuleInfo<'_>> = registry
        .all_descriptors()
        .map(|d| RuleInfo::new(d, language))
        .collect();

    match format {
        ListFormat::Json => println!("{}", serde_json::to_string_pretty(&rules)?),
        ListFormat::Text => print_table(&rules),
    }
    Ok(())
}

fn print_table(rules: &[RuleInfo<'_>]) {
    println!("Available rules:\n");
    println!(
        "{:<22} {:<9} {:<6} {:<8} {:<10} Name",
        "Code", "Severity", "Scope", "Default", "Since"
    );
    println!("{}", "-".repeat(90));

    for rule in rules {
        let since = rule
            .compatibility_mode
            .map_or_else(|| "-".to_string(), |m| m.to_string());
        println!(
            "{:<22} {:<9} {:<6} {:<8} {:<10} {}",
            rule.code,
            rule.severity.to_string(),
            rule.scope.to_string(),
            if rule.activated_by_default { "on" } else { "off" },
            since,
            rule.name
        );
    }

    println!("\nEnable or disable rules in .bsl-language-server.json, e.g.:");
    println!("  {{ \"diagnostics\": {{ \"CommentedCode\": true, \"LineLength\": {{ \"maxLineLength\": 150 }} }} }}");
}
