//! Static metadata declared by every diagnostic rule.
//!
//! Rules declare their metadata at compile time, usually through
//! `#[derive(DiagnosticMetadata)]` from `bsl-analyzer-macros`. The registry
//! reads it once at startup and never again.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::types::Severity;

/// Subset of file kinds a rule is allowed to run against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticScope {
    /// Runs against every file kind.
    All,
    /// 1C:Enterprise modules (`.bsl`).
    Bsl,
    /// OneScript scripts (`.os`).
    Os,
}

impl fmt::Display for DiagnosticScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => write!(f, "all"),
            Self::Bsl => write!(f, "bsl"),
            Self::Os => write!(f, "os"),
        }
    }
}

/// Category of the problem a rule reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticType {
    /// Code that is wrong and will misbehave at runtime.
    Error,
    /// Maintainability issue.
    CodeSmell,
    /// Security weakness.
    Vulnerability,
    /// Security-sensitive code that needs manual review.
    SecurityHotspot,
}

impl fmt::Display for DiagnosticType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::CodeSmell => write!(f, "code_smell"),
            Self::Vulnerability => write!(f, "vulnerability"),
            Self::SecurityHotspot => write!(f, "security_hotspot"),
        }
    }
}

/// Classification tags. Every rule carries between one and three.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticTag {
    /// Violates the 1C development standards.
    Standard,
    /// Blocks running on Linux servers.
    LockInOs,
    /// Design flaw.
    Design,
    /// Leads to unpredictable behaviour.
    Unpredictable,
    /// Degrades performance.
    Performance,
    /// Makes the code hard to understand.
    BrainOverload,
    /// Looks like a mistake.
    Suspicious,
    /// Known bad practice.
    BadPractice,
    /// Uses deprecated platform features.
    Deprecated,
    /// Clumsy construction with a simpler equivalent.
    Clumsy,
    /// Localization problem.
    Localize,
    /// Query language problem.
    Sql,
    /// Runtime error.
    Error,
}

impl DiagnosticTag {
    /// Returns the lowercase name used in configuration and output.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::LockInOs => "lockinos",
            Self::Design => "design",
            Self::Unpredictable => "unpredictable",
            Self::Performance => "performance",
            Self::BrainOverload => "brainoverload",
            Self::Suspicious => "suspicious",
            Self::BadPractice => "badpractice",
            Self::Deprecated => "deprecated",
            Self::Clumsy => "clumsy",
            Self::Localize => "localize",
            Self::Sql => "sql",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for DiagnosticTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Platform compatibility mode, ordered by platform version.
///
/// A workspace compatibility mode of `8.3.10` means the code must run on
/// platform 8.3.10, so rules requiring `8.3.3` apply and rules requiring
/// `8.3.14` do not. [`CompatibilityMode::LATEST`] stands for "compatibility
/// mode disabled" (`DontUse` in 1C metadata) and is newer than any
/// concrete version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CompatibilityMode {
    major: u32,
    minor: u32,
    version: u32,
}

impl CompatibilityMode {
    /// No compatibility mode: the code targets the newest platform.
    pub const LATEST: Self = Self {
        major: u32::MAX,
        minor: u32::MAX,
        version: u32::MAX,
    };

    /// Creates a compatibility mode from its version components.
    #[must_use]
    pub const fn new(major: u32, minor: u32, version: u32) -> Self {
        Self {
            major,
            minor,
            version,
        }
    }

    /// Returns `(major, minor, version)`.
    #[must_use]
    pub const fn components(self) -> (u32, u32, u32) {
        (self.major, self.minor, self.version)
    }

    /// Returns `true` for [`CompatibilityMode::LATEST`].
    #[must_use]
    pub fn is_latest(self) -> bool {
        self == Self::LATEST
    }
}

impl Ord for CompatibilityMode {
    fn cmp(&self, other: &Self) -> Ordering {
        self.components().cmp(&other.components())
    }
}

impl PartialOrd for CompatibilityMode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for CompatibilityMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_latest() {
            return write!(f, "DontUse");
        }
        write!(f, "{}.{}.{}", self.major, self.minor, self.version)
    }
}

/// Error returned when a compatibility mode string cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid compatibility mode `{0}`, expected `8.3.10`, `Version8_3_10` or `DontUse`")]
pub struct ParseCompatibilityModeError(String);

impl FromStr for CompatibilityMode {
    type Err = ParseCompatibilityModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("dontuse") {
            return Ok(Self::LATEST);
        }

        let (body, separator) = match trimmed.strip_prefix("Version") {
            Some(rest) => (rest, '_'),
            None => (trimmed, '.'),
        };

        let parts = body
            .split(separator)
            .map(str::parse::<u32>)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| ParseCompatibilityModeError(s.to_string()))?;

        match parts.as_slice() {
            [major, minor] => Ok(Self::new(*major, *minor, 0)),
            [major, minor, version] => Ok(Self::new(*major, *minor, *version)),
            _ => Err(ParseCompatibilityModeError(s.to_string())),
        }
    }
}

impl Serialize for CompatibilityMode {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for CompatibilityMode {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Compile-time metadata of one rule kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleMetadata {
    /// Stable, globally unique rule code (e.g. `LineLength`).
    pub code: &'static str,
    /// Whether the rule runs when the configuration does not mention it.
    pub activated_by_default: bool,
    /// File kinds the rule applies to.
    pub scope: DiagnosticScope,
    /// Minimum workspace compatibility mode, `None` for no restriction.
    pub compatibility_mode: Option<CompatibilityMode>,
    /// Classification tags.
    pub tags: &'static [DiagnosticTag],
    /// Severity of reported problems.
    pub severity: Severity,
    /// Problem category.
    pub kind: DiagnosticType,
    /// Estimated remediation effort.
    pub minutes_to_fix: u32,
}

/// Declares the static metadata of a rule type.
///
/// Implemented by `#[derive(DiagnosticMetadata)]`; can be written by hand
/// for rules defined outside the derive's reach.
pub trait DiagnosticMetadata {
    /// The rule's metadata.
    const METADATA: RuleMetadata;
}
