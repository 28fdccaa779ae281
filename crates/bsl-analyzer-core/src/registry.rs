//! Registry of every known rule kind.
//!
//! Built once at startup from an explicit registration list. Construction
//! validates the whole rule set and refuses inconsistent ones; after that
//! the registry is read-only.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info};

use crate::descriptor::{LocalizedTexts, RuleDescriptor};
use crate::i18n::{Catalog, Language};
use crate::metadata::{DiagnosticMetadata, RuleMetadata};
use crate::rule::{Rule, RuleBox, RuleFactory};

/// Inclusive bounds on the number of tags per rule.
const MIN_TAGS: usize = 1;
const MAX_TAGS: usize = 3;

/// Errors that make a rule set unusable. All of them are fatal.
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum RegistryError {
    /// A rule declared an empty code.
    #[error("a rule declares an empty code")]
    #[diagnostic(code(bsl_analyzer::registry::empty_code))]
    EmptyCode,

    /// Two rules share a code.
    #[error("duplicate rule code `{code}`")]
    #[diagnostic(
        code(bsl_analyzer::registry::duplicate_code),
        help("rule codes must be unique across the registration list")
    )]
    DuplicateCode {
        /// The shared code.
        code: String,
    },

    /// A rule has too few or too many tags.
    #[error("rule `{code}` has {count} tag(s), expected between 1 and 3")]
    #[diagnostic(code(bsl_analyzer::registry::tag_count))]
    TagCount {
        /// Rule code.
        code: String,
        /// Number of declared tags.
        count: usize,
    },

    /// A rule lists the same tag twice.
    #[error("rule `{code}` lists tag `{tag}` more than once")]
    #[diagnostic(code(bsl_analyzer::registry::duplicate_tag))]
    DuplicateTag {
        /// Rule code.
        code: String,
        /// Repeated tag.
        tag: String,
    },

    /// A rule lacks a localized text.
    #[error("rule `{code}` has no `{field}` text for language `{language}`")]
    #[diagnostic(
        code(bsl_analyzer::registry::missing_text),
        help("add the text to the `{language}` message catalog")
    )]
    MissingText {
        /// Rule code.
        code: String,
        /// Language lacking the text.
        language: Language,
        /// Missing field: name, message or description.
        field: &'static str,
    },
}

#[derive(Debug)]
struct RuleEntry {
    descriptor: Arc<RuleDescriptor>,
    factory: RuleFactory,
}

/// Builder for a [`Registry`].
#[derive(Default)]
pub struct RegistryBuilder {
    pending: Vec<(RuleMetadata, RuleFactory)>,
}

fn create<R: Rule + Default + 'static>() -> RuleBox {
    Box::new(R::default())
}

impl RegistryBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a rule type.
    #[must_use]
    pub fn register<R>(self) -> Self
    where
        R: Rule + DiagnosticMetadata + Default + 'static,
    {
        self.register_with(R::METADATA, create::<R>)
    }

    /// Registers a rule from explicit metadata and factory.
    #[must_use]
    pub fn register_with(mut self, metadata: RuleMetadata, factory: RuleFactory) -> Self {
        self.pending.push((metadata, factory));
        self
    }

    /// Validates the rule set and builds the registry.
    ///
    /// # Errors
    ///
    /// Returns the first problem found: empty or duplicate code, tag count
    /// outside 1..=3, repeated tag, or missing localized text.
    pub fn build(self, catalog: &Catalog) -> Result<Registry, RegistryError> {
        let mut entries = Vec::with_capacity(self.pending.len());
        let mut index = HashMap::with_capacity(self.pending.len());

        for (metadata, factory) in self.pending {
            validate_metadata(&metadata)?;
            if index.insert(metadata.code, entries.len()).is_some() {
                return Err(RegistryError::DuplicateCode {
                    code: metadata.code.to_string(),
                });
            }

            let texts = localized_texts(&metadata, catalog)?;
            debug!("Registered rule {}", metadata.code);
            entries.push(RuleEntry {
                descriptor: Arc::new(RuleDescriptor::new(metadata, texts)),
                factory,
            });
        }

        info!("Rule registry built with {} rule(s)", entries.len());
        Ok(Registry { entries, index })
    }
}

fn validate_metadata(metadata: &RuleMetadata) -> Result<(), RegistryError> {
    if metadata.code.trim().is_empty() {
        return Err(RegistryError::EmptyCode);
    }

    let count = metadata.tags.len();
    if !(MIN_TAGS..=MAX_TAGS).contains(&count) {
        return Err(RegistryError::TagCount {
            code: metadata.code.to_string(),
            count,
        });
    }

    let mut seen = HashSet::with_capacity(count);
    for tag in metadata.tags {
        if !seen.insert(tag) {
            return Err(RegistryError::DuplicateTag {
                code: metadata.code.to_string(),
                tag: tag.to_string(),
            });
        }
    }
    Ok(())
}

fn localized_texts(
    metadata: &RuleMetadata,
    catalog: &Catalog,
) -> Result<LocalizedTexts, RegistryError> {
    let lookup = |language: Language| {
        let texts = catalog
            .get(language, metadata.code)
            .cloned()
            .unwrap_or_default();
        match texts.first_missing() {
            Some(field) => Err(RegistryError::MissingText {
                code: metadata.code.to_string(),
                language,
                field,
            }),
            None => Ok(texts),
        }
    };

    Ok(LocalizedTexts {
        en: lookup(Language::En)?,
        ru: lookup(Language::Ru)?,
    })
}

/// The set of all known rules, in registration order.
#[derive(Debug)]
pub struct Registry {
    entries: Vec<RuleEntry>,
    index: HashMap<&'static str, usize>,
}

impl Registry {
    /// Creates a new builder.
    #[must_use]
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// Iterates over all descriptors in registration order.
    pub fn all_descriptors(&self) -> impl Iterator<Item = &Arc<RuleDescriptor>> {
        self.entries.iter().map(|entry| &entry.descriptor)
    }

    /// Looks up a descriptor by rule code.
    #[must_use]
    pub fn lookup(&self, code: &str) -> Option<&Arc<RuleDescriptor>> {
        self.index.get(code).map(|&i| &self.entries[i].descriptor)
    }

    /// Iterates over all rule codes in registration order.
    pub fn codes(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|entry| entry.descriptor.code())
    }

    /// Number of registered rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no rules are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the factory of a rule.
    pub(crate) fn factory(&self, code: &str) -> Option<RuleFactory> {
        self.index.get(code).map(|&i| self.entries[i].factory)
    }
}
