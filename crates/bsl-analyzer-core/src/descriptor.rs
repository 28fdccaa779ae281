//! Rule descriptors: metadata plus localized texts.

use crate::i18n::{Language, RuleTexts};
use crate::metadata::{CompatibilityMode, DiagnosticScope, DiagnosticTag, DiagnosticType, RuleMetadata};
use crate::types::Severity;

/// Texts of one rule in every supported language.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocalizedTexts {
    /// English texts.
    pub en: RuleTexts,
    /// Russian texts.
    pub ru: RuleTexts,
}

impl LocalizedTexts {
    /// Returns the texts for a language.
    #[must_use]
    pub fn get(&self, language: Language) -> &RuleTexts {
        match language {
            Language::En => &self.en,
            Language::Ru => &self.ru,
        }
    }
}

/// Everything known about one rule kind, built once by the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleDescriptor {
    metadata: RuleMetadata,
    texts: LocalizedTexts,
}

impl RuleDescriptor {
    /// Creates a descriptor. Validation happens in the registry builder.
    #[must_use]
    pub fn new(metadata: RuleMetadata, texts: LocalizedTexts) -> Self {
        Self { metadata, texts }
    }

    /// The static metadata.
    #[must_use]
    pub fn metadata(&self) -> &RuleMetadata {
        &self.metadata
    }

    /// Rule code.
    #[must_use]
    pub fn code(&self) -> &'static str {
        self.metadata.code
    }

    /// Whether the rule runs when the configuration does not mention it.
    #[must_use]
    pub fn activated_by_default(&self) -> bool {
        self.metadata.activated_by_default
    }

    /// File kinds the rule applies to.
    #[must_use]
    pub fn scope(&self) -> DiagnosticScope {
        self.metadata.scope
    }

    /// Minimum workspace compatibility mode.
    #[must_use]
    pub fn compatibility_mode(&self) -> Option<CompatibilityMode> {
        self.metadata.compatibility_mode
    }

    /// Classification tags.
    #[must_use]
    pub fn tags(&self) -> &'static [DiagnosticTag] {
        self.metadata.tags
    }

    /// Severity of reported problems.
    #[must_use]
    pub fn severity(&self) -> Severity {
        self.metadata.severity
    }

    /// Problem category.
    #[must_use]
    pub fn kind(&self) -> DiagnosticType {
        self.metadata.kind
    }

    /// Texts in a language.
    #[must_use]
    pub fn texts(&self, language: Language) -> &RuleTexts {
        self.texts.get(language)
    }

    /// Display name in a language.
    #[must_use]
    pub fn name(&self, language: Language) -> &str {
        &self.texts(language).name
    }

    /// Message template in a language.
    #[must_use]
    pub fn message(&self, language: Language) -> &str {
        &self.texts(language).message
    }

    /// Long-form description in a language.
    #[must_use]
    pub fn description(&self, language: Language) -> &str {
        &self.texts(language).description
    }
}
