//! Decides whether a rule runs and with which parameters.

use crate::config::{ConfigOverride, ConfigurationSnapshot, Parameters};
use crate::descriptor::RuleDescriptor;

/// Outcome of combining a rule's defaults with the configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ActivationDecision {
    /// Whether the rule runs.
    pub enabled: bool,
    /// Parameters to configure the rule with; empty means defaults.
    pub parameters: Parameters,
}

/// Resolves the activation of a rule under a configuration.
///
/// - not mentioned: the rule's default, no parameters;
/// - parameter object: enabled, with those parameters, whatever the default;
/// - `true`/`false`: as written, no parameters.
#[must_use]
pub fn resolve(descriptor: &RuleDescriptor, snapshot: &ConfigurationSnapshot) -> ActivationDecision {
    match snapshot.override_for(descriptor.code()) {
        ConfigOverride::Absent => ActivationDecision {
            enabled: descriptor.activated_by_default(),
            parameters: Parameters::new(),
        },
        ConfigOverride::Parameters(parameters) => ActivationDecision {
            enabled: true,
            parameters: parameters.clone(),
        },
        ConfigOverride::Toggle(enabled) => ActivationDecision {
            enabled,
            parameters: Parameters::new(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RuleSetting;
    use crate::test_support::{descriptor, metadata};

    fn rule(activated_by_default: bool) -> RuleDescriptor {
        let mut meta = metadata("R");
        meta.activated_by_default = activated_by_default;
        descriptor(meta)
    }

    #[test]
    fn absent_override_uses_default() {
        let snapshot = ConfigurationSnapshot::new();
        for default in [true, false] {
            let decision = resolve(&rule(default), &snapshot);
            assert_eq!(decision.enabled, default);
            assert!(decision.parameters.is_empty());
        }
    }

    #[test]
    fn parameters_always_enable() {
        let params = Parameters::new().with("threshold", 5);
        let snapshot =
            ConfigurationSnapshot::new().with_rule("R", RuleSetting::Parameters(params.clone()));
        for default in [true, false] {
            let decision = resolve(&rule(default), &snapshot);
            assert!(decision.enabled);
            assert_eq!(decision.parameters, params);
        }
    }

    #[test]
    fn empty_parameter_object_still_enables() {
        let snapshot = ConfigurationSnapshot::new()
            .with_rule("R", RuleSetting::Parameters(Parameters::new()));
        assert!(resolve(&rule(false), &snapshot).enabled);
    }

    #[test]
    fn toggle_overrides_default() {
        let on = ConfigurationSnapshot::new().with_rule("R", RuleSetting::Toggle(true));
        let off = ConfigurationSnapshot::new().with_rule("R", RuleSetting::Toggle(false));

        assert!(resolve(&rule(false), &on).enabled);
        assert!(!resolve(&rule(true), &off).enabled);
        assert!(resolve(&rule(false), &on).parameters.is_empty());
    }

    #[test]
    fn other_rules_do_not_interfere() {
        let snapshot = ConfigurationSnapshot::new().with_rule("Other", RuleSetting::Toggle(false));
        assert!(resolve(&rule(true), &snapshot).enabled);
    }
}
