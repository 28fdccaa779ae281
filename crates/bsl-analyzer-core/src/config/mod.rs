//! Configuration snapshot and its on-disk formats.
//!
//! A [`ConfigurationSnapshot`] is an immutable view of the user's settings.
//! It is replaced as a whole when the configuration file changes; see
//! [`ConfigurationStore`].

mod store;

pub use store::ConfigurationStore;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::i18n::Language;

/// Default configuration file name, looked up in the workspace root.
pub const CONFIG_FILE_NAME: &str = ".bsl-language-server.json";

/// Immutable, point-in-time view of the user configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigurationSnapshot {
    /// Language of rule names and messages.
    #[serde(default)]
    pub diagnostic_language: Language,

    /// Per-rule settings keyed by rule code.
    #[serde(default)]
    pub diagnostics: HashMap<String, RuleSetting>,

    /// Directory with 1C metadata, relative to the workspace root.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub configuration_root: Option<PathBuf>,
}

impl ConfigurationSnapshot {
    /// Creates an empty snapshot: every rule uses its defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a snapshot from a file, picking the format by extension.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::parse(&content, ConfigFormat::from_path(path))
    }

    /// Like [`ConfigurationSnapshot::from_file`], but a missing file yields
    /// the default snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn from_file_or_default(path: &Path) -> Result<Self, ConfigError> {
        match Self::from_file(path) {
            Err(ConfigError::Io { source, .. }) if source.kind() == std::io::ErrorKind::NotFound => {
                Ok(Self::default())
            }
            other => other,
        }
    }

    /// Parses a snapshot from text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid in the given format.
    pub fn parse(content: &str, format: ConfigFormat) -> Result<Self, ConfigError> {
        match format {
            ConfigFormat::Json => serde_json::from_str(content).map_err(|e| ConfigError::Parse {
                message: e.to_string(),
            }),
            ConfigFormat::Toml => toml::from_str(content).map_err(|e| ConfigError::Parse {
                message: e.to_string(),
            }),
        }
    }

    /// Sets the language.
    #[must_use]
    pub fn with_language(mut self, language: Language) -> Self {
        self.diagnostic_language = language;
        self
    }

    /// Adds or replaces the setting of one rule.
    #[must_use]
    pub fn with_rule(mut self, code: impl Into<String>, setting: RuleSetting) -> Self {
        self.diagnostics.insert(code.into(), setting);
        self
    }

    /// Returns the override configured for a rule.
    #[must_use]
    pub fn override_for(&self, code: &str) -> ConfigOverride<'_> {
        match self.diagnostics.get(code) {
            None => ConfigOverride::Absent,
            Some(RuleSetting::Toggle(enabled)) => ConfigOverride::Toggle(*enabled),
            Some(RuleSetting::Parameters(parameters)) => ConfigOverride::Parameters(parameters),
        }
    }
}

/// Supported configuration file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// `.bsl-language-server.json` style.
    Json,
    /// Same shape written as TOML.
    Toml,
}

impl ConfigFormat {
    /// Picks the format by file extension; anything but `.toml` is JSON.
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("toml") => Self::Toml,
            _ => Self::Json,
        }
    }
}

/// Setting of one rule as written in the configuration file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RuleSetting {
    /// `"Code": true` / `"Code": false`.
    Toggle(bool),
    /// `"Code": { ... }`.
    Parameters(Parameters),
}

/// Override of one rule, as seen by the activation resolver.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConfigOverride<'a> {
    /// The configuration does not mention the rule.
    Absent,
    /// Explicitly switched on or off.
    Toggle(bool),
    /// Rule-specific parameters.
    Parameters(&'a Parameters),
}

/// Rule-specific parameters as key-value pairs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Parameters(serde_json::Map<String, serde_json::Value>);

impl Parameters {
    /// Creates empty parameters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a parameter.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Returns `true` if there are no parameters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the raw value of a parameter.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.0.get(key)
    }

    /// Deserializes all parameters into a typed struct.
    ///
    /// # Errors
    ///
    /// Returns an error if a value has the wrong type.
    pub fn parse<T: serde::de::DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(serde_json::Value::Object(self.0.clone()))
    }

    /// Gets a boolean parameter with a default value.
    #[must_use]
    pub fn get_bool(&self, key: &str, default: bool) -> bool {
        self.0
            .get(key)
            .and_then(serde_json::Value::as_bool)
            .unwrap_or(default)
    }

    /// Gets an integer parameter with a default value.
    #[must_use]
    pub fn get_int(&self, key: &str, default: i64) -> i64 {
        self.0
            .get(key)
            .and_then(serde_json::Value::as_i64)
            .unwrap_or(default)
    }

    /// Gets a string parameter with a default value.
    #[must_use]
    pub fn get_str<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.0
            .get(key)
            .and_then(|v| v.as_str())
            .unwrap_or(default)
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum ConfigError {
    /// IO error reading config file.
    #[error("Failed to read config file {path}: {source}")]
    #[diagnostic(code(bsl_analyzer::config::io))]
    Io {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// Parse error in config file.
    #[error("Failed to parse config: {message}")]
    #[diagnostic(
        code(bsl_analyzer::config::parse),
        help("each entry under `diagnostics` must be `true`, `false` or an object of parameters")
    )]
    Parse {
        /// Parse error message.
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ConfigurationSnapshot::default();
        assert_eq!(config.diagnostic_language, Language::Ru);
        assert!(config.diagnostics.is_empty());
        assert_eq!(config.override_for("LineLength"), ConfigOverride::Absent);
    }

    #[test]
    fn test_parse_json_config() {
        let json = r#"{
            "diagnosticLanguage": "en",
            "configurationRoot": "src/cf",
            "diagnostics": {
                "LineLength": { "maxLineLength": 140 },
                "MagicNumber": false,
                "CommentedCode": true
            }
        }"#;

        let config = ConfigurationSnapshot::parse(json, ConfigFormat::Json).expect("Failed to parse");
        assert_eq!(config.diagnostic_language, Language::En);
        assert_eq!(config.configuration_root, Some(PathBuf::from("src/cf")));
        assert_eq!(config.override_for("MagicNumber"), ConfigOverride::Toggle(false));
        assert_eq!(config.override_for("CommentedCode"), ConfigOverride::Toggle(true));

        let ConfigOverride::Parameters(params) = config.override_for("LineLength") else {
            panic!("expected parameters for LineLength");
        };
        assert_eq!(params.get_int("maxLineLength", 120), 140);
    }

    #[test]
    fn test_parse_toml_config() {
        let toml = r#"
diagnosticLanguage = "ru"

[diagnostics]
YoLetterUsage = false

[diagnostics.UsingServiceTag]
serviceTags = "todo|fixme"
"#;

        let config = ConfigurationSnapshot::parse(toml, ConfigFormat::Toml).expect("Failed to parse");
        assert_eq!(config.override_for("YoLetterUsage"), ConfigOverride::Toggle(false));
        let ConfigOverride::Parameters(params) = config.override_for("UsingServiceTag") else {
            panic!("expected parameters for UsingServiceTag");
        };
        assert_eq!(params.get_str("serviceTags", ""), "todo|fixme");
    }

    #[test]
    fn test_rejects_non_boolean_non_object_setting() {
        let json = r#"{ "diagnostics": { "LineLength": 140 } }"#;
        let err = ConfigurationSnapshot::parse(json, ConfigFormat::Json).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        let config = ConfigurationSnapshot::from_file_or_default(&path).unwrap();
        assert_eq!(config, ConfigurationSnapshot::default());
        assert!(matches!(
            ConfigurationSnapshot::from_file(&path),
            Err(ConfigError::Io { .. })
        ));
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(ConfigFormat::from_path(Path::new("a/bsl-analyzer.toml")), ConfigFormat::Toml);
        assert_eq!(ConfigFormat::from_path(Path::new(CONFIG_FILE_NAME)), ConfigFormat::Json);
    }

    #[test]
    fn test_parameter_accessors() {
        let params = Parameters::new()
            .with("flag", true)
            .with("count", 5)
            .with("name", "x");
        assert!(params.get_bool("flag", false));
        assert_eq!(params.get_int("count", 0), 5);
        assert_eq!(params.get_str("name", "y"), "x");
        assert_eq!(params.get_str("missing", "y"), "y");
    }
}
