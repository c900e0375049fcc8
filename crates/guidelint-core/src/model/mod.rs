//! Rule model driven by a TOML (or JSON) rule-set document.
//!
//! # Architecture
//!
//! ```text
//! document text
//!   ↓ serde (DTO layer)
//! RuleSetDto
//!   ↓ merge with base + overrides, validate, convert
//! RuleModel (pure domain model, read-only)
//! ```

use std::collections::BTreeMap;
use std::path::Path;

pub mod domain;
pub mod dto;
pub mod loader;

pub use domain::{
    AppliesTo, Category, Construct, Detection, Example, FileKind, MatchTarget, ModelError,
    Pattern, Rule, RuleId, StructuralCheck,
};
pub use loader::{LoadError, MATCHER_FAILURE, UNREADABLE_FILE};

use crate::config::ConfigError;

/// The built-in default rule-set document.
pub const DEFAULT_RULES: &str = include_str!("default_rules.toml");

/// Encoding of a rule-set document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    /// TOML (the default).
    Toml,
    /// JSON, selected by a `.json` extension.
    Json,
}

impl DocumentFormat {
    /// Chooses the format from a file extension.
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Toml,
        }
    }
}

/// Where a rule set comes from.
#[derive(Debug, Clone, Copy)]
pub enum RuleSource<'a> {
    /// The built-in default set.
    Builtin,
    /// A user-supplied document.
    Document {
        /// Document text.
        content: &'a str,
        /// Encoding of `content`.
        format: DocumentFormat,
    },
}

/// Immutable mapping from rule identifier to rule.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleModel {
    rules: BTreeMap<RuleId, Rule>,
}

impl RuleModel {
    /// Builds a model from validated rules. Later rules win on duplicate ids.
    #[must_use]
    pub fn from_rules(rules: impl IntoIterator<Item = Rule>) -> Self {
        Self {
            rules: rules.into_iter().map(|r| (r.id().clone(), r)).collect(),
        }
    }

    /// Loads the built-in default set.
    ///
    /// # Errors
    ///
    /// Returns an error only if the embedded document is invalid.
    pub fn builtin() -> Result<Self, ConfigError> {
        load_rules(RuleSource::Builtin)
    }

    /// Looks a rule up by identifier.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Rule> {
        self.rules.get(id)
    }

    /// Tests whether a rule with this identifier exists.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Iterates rules in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = &Rule> {
        self.rules.values()
    }

    /// Iterates rules that cover the given file kind, engine notes excluded.
    pub fn rules_for(&self, kind: FileKind) -> impl Iterator<Item = &Rule> {
        self.rules.values().filter(move |r| {
            r.applies_to().covers(kind)
                && !matches!(r.detection(), Detection::Structural(c) if c.is_engine_note())
        })
    }

    /// Number of rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns true if the model holds no rules.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Loads and validates a rule model.
///
/// All validation happens here, before any file is scanned.
///
/// # Errors
///
/// Returns [`ConfigError`] if the document cannot be parsed or fails validation.
pub fn load_rules(source: RuleSource<'_>) -> Result<RuleModel, ConfigError> {
    match source {
        RuleSource::Builtin => {
            let dto = parse_document(DEFAULT_RULES, DocumentFormat::Toml)?;
            Ok(loader::load(dto, Vec::new())?)
        }
        RuleSource::Document { content, format } => {
            let dto = parse_document(content, format)?;
            let base = match dto.base.as_deref() {
                None | Some("default") => parse_document(DEFAULT_RULES, DocumentFormat::Toml)?.rules,
                Some("empty") => Vec::new(),
                Some(other) => {
                    return Err(LoadError::UnknownBase {
                        value: other.to_string(),
                    }
                    .into())
                }
            };
            Ok(loader::load(dto, base)?)
        }
    }
}

pub(crate) fn parse_document(
    content: &str,
    format: DocumentFormat,
) -> Result<dto::RuleSetDto, ConfigError> {
    match format {
        DocumentFormat::Toml => toml::from_str(content).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        }),
        DocumentFormat::Json => serde_json::from_str(content).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        }),
    }
}
