//! Init command implementation.

use anyhow::{bail, Result};
use bsl_analyzer::rules::builtin_registry;
use bsl_analyzer::{Language, Registry, CONFIG_FILE_NAME};
use serde_json::{json, Map, Value};
use std::path::Path;

/// Runs the init command, writing a configuration that lists every
/// built-in rule with its default activation.
pub fn run(language: Language, force: bool) -> Result<()> {
    let config_path = Path::new(CONFIG_FILE_NAME);

    if config_path.exists() && !force {
        bail!(
            "Configuration file already exists at {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    let registry = builtin_registry()?;
    std::fs::write(config_path, render(&registry, language)?)?;

    println!("Created {CONFIG_FILE_NAME}");
    println!("\nNext steps:");
    println!("  1. Edit {CONFIG_FILE_NAME} to switch rules on or off");
    println!("  2. Run: bsl-analyzer check");

    Ok(())
}

fn render(registry: &Registry, language: Language) -> Result<String> {
    let diagnostics: Map<String, Value> = registry
        .all_descriptors()
        .map(|d| (d.code().to_string(), Value::Bool(d.activated_by_default())))
        .collect();

    let config = json!({
        "diagnosticLanguage": language,
        "diagnostics": diagnostics,
    });
    Ok(serde_json::to_string_pretty(&config)? + "\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use bsl_analyzer::{ConfigFormat, ConfigurationSnapshot, RuleSetting};

    #[test]
    fn rendered_config_round_trips_defaults() {
        let registry = builtin_registry().unwrap();
        let text = render(&registry, Language::En).unwrap();
        let snapshot = ConfigurationSnapshot::parse(&text, ConfigFormat::Json).unwrap();

        assert_eq!(snapshot.diagnostic_language, Language::En);
        assert_eq!(snapshot.diagnostics.len(), registry.len());
        assert_eq!(
            snapshot.diagnostics.get("CommentedCode"),
            Some(&RuleSetting::Toggle(false))
        );
        assert_eq!(
            snapshot.diagnostics.get("LineLength"),
            Some(&RuleSetting::Toggle(true))
        );
    }
}
