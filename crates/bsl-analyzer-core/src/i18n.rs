//! Localized rule names, messages and descriptions.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Language of user-facing texts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// English.
    En,
    /// Russian.
    #[default]
    Ru,
}

impl Language {
    /// Every supported language. The registry requires texts for all of them.
    pub const ALL: [Self; 2] = [Self::En, Self::Ru];
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::En => write!(f, "en"),
            Self::Ru => write!(f, "ru"),
        }
    }
}

/// Texts of one rule in one language.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleTexts {
    /// Short display name.
    #[serde(default)]
    pub name: String,
    /// Message template with `{0}`-style placeholders.
    #[serde(default)]
    pub message: String,
    /// Long-form description.
    #[serde(default)]
    pub description: String,
}

impl RuleTexts {
    /// Returns the name of the first empty field, if any.
    #[must_use]
    pub fn first_missing(&self) -> Option<&'static str> {
        [
            ("name", &self.name),
            ("message", &self.message),
            ("description", &self.description),
        ]
        .into_iter()
        .find(|(_, text)| text.trim().is_empty())
        .map(|(field, _)| field)
    }
}

/// Rule texts for all languages, keyed by rule code.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    texts: HashMap<Language, HashMap<String, RuleTexts>>,
}

impl Catalog {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds the texts of one language from TOML, one table per rule code:
    ///
    /// ```toml
    /// [LineLength]
    /// name = "Line length limit"
    /// message = "Line length {0} exceeds {1}"
    /// description = "..."
    /// ```
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML does not have that shape.
    pub fn load_toml(&mut self, language: Language, content: &str) -> Result<(), CatalogError> {
        let table: HashMap<String, RuleTexts> =
            toml::from_str(content).map_err(|e| CatalogError {
                language,
                message: e.to_string(),
            })?;
        self.texts.entry(language).or_default().extend(table);
        Ok(())
    }

    /// Adds the texts of one rule.
    pub fn insert(&mut self, language: Language, code: impl Into<String>, texts: RuleTexts) {
        self.texts
            .entry(language)
            .or_default()
            .insert(code.into(), texts);
    }

    /// Returns the texts of a rule in a language.
    #[must_use]
    pub fn get(&self, language: Language, code: &str) -> Option<&RuleTexts> {
        self.texts.get(&language)?.get(code)
    }
}

/// A catalog file that is not valid TOML of the expected shape.
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
#[error("invalid `{language}` message catalog: {message}")]
#[diagnostic(code(bsl_analyzer::i18n::catalog))]
pub struct CatalogError {
    language: Language,
    message: String,
}

/// Substitutes `{0}`, `{1}`, ... in a template with positional arguments.
///
/// Placeholders without a matching argument are left as they are.
#[must_use]
pub fn format_message(template: &str, args: &[String]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let substituted = after.find('}').and_then(|close| {
            let index: usize = after[..close].parse().ok()?;
            Some((args.get(index)?, close))
        });
        match substituted {
            Some((arg, close)) => {
                out.push_str(arg);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}
