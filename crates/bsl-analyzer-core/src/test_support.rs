//! Rules and catalogs shared by unit tests.

use serde::Deserialize;

use crate::config::Parameters;
use crate::context::DocumentContext;
use crate::descriptor::{LocalizedTexts, RuleDescriptor};
use crate::i18n::{Catalog, Language, RuleTexts};
use crate::metadata::{DiagnosticMetadata, DiagnosticScope, DiagnosticTag, DiagnosticType, RuleMetadata};
use crate::rule::{parse_parameters, ParameterError, Rule, RuleBox};
use crate::types::{Finding, Range, Severity};

pub(crate) fn metadata(code: &'static str) -> RuleMetadata {
    RuleMetadata {
        code,
        activated_by_default: true,
        scope: DiagnosticScope::All,
        compatibility_mode: None,
        tags: &[DiagnosticTag::Standard],
        severity: Severity::Minor,
        kind: DiagnosticType::CodeSmell,
        minutes_to_fix: 1,
    }
}

fn texts(language: Language, code: &str) -> RuleTexts {
    let message = match language {
        Language::En => "threshold is {0}",
        Language::Ru => "порог {0}",
    };
    RuleTexts {
        name: format!("{code} name"),
        message: message.to_string(),
        description: format!("{code} description"),
    }
}

pub(crate) fn descriptor(metadata: RuleMetadata) -> RuleDescriptor {
    RuleDescriptor::new(
        metadata,
        LocalizedTexts {
            en: texts(Language::En, metadata.code),
            ru: texts(Language::Ru, metadata.code),
        },
    )
}

pub(crate) fn catalog_for(codes: &[&str]) -> Catalog {
    let mut catalog = Catalog::new();
    for code in codes {
        for language in Language::ALL {
            catalog.insert(language, *code, texts(language, code));
        }
    }
    catalog
}

#[derive(Debug, Default)]
pub(crate) struct Noop;

impl Rule for Noop {
    fn check(&self, _ctx: &DocumentContext<'_>) -> Vec<Finding> {
        Vec::new()
    }
}

pub(crate) fn noop_factory() -> RuleBox {
    Box::new(Noop)
}

/// Off by default; reports its configured threshold once per document.
#[derive(Debug)]
pub(crate) struct Threshold {
    threshold: u32,
}

impl Default for Threshold {
    fn default() -> Self {
        Self { threshold: 10 }
    }
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct ThresholdParams {
    threshold: u32,
}

impl DiagnosticMetadata for Threshold {
    const METADATA: RuleMetadata = RuleMetadata {
        code: "Threshold",
        activated_by_default: false,
        scope: DiagnosticScope::All,
        compatibility_mode: None,
        tags: &[DiagnosticTag::Design, DiagnosticTag::BrainOverload],
        severity: Severity::Major,
        kind: DiagnosticType::CodeSmell,
        minutes_to_fix: 5,
    };
}

impl Rule for Threshold {
    fn configure(&mut self, parameters: &Parameters) -> Result<(), ParameterError> {
        let params: ThresholdParams = parse_parameters(parameters)?;
        if params.threshold == 0 {
            return Err(ParameterError::value("threshold", "must be positive"));
        }
        self.threshold = params.threshold;
        Ok(())
    }

    fn check(&self, _ctx: &DocumentContext<'_>) -> Vec<Finding> {
        vec![Finding::at(Range::on_line(0, 0, 0)).with_arg(self.threshold)]
    }
}
