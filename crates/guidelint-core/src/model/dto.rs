//! Rule document deserialization types (DTO layer).
//!
//! These types exist solely for serde deserialization.
//! They are converted to domain types via the loader.

use serde::de::IgnoredAny;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Raw representation of a rule-set document.
///
/// Shares the document with [`crate::Config`], which reads `fail_on` and
/// `[analyzer]`; this type reads `base`, `[[rule]]` and `[rules.<id>]`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RuleSetDto {
    /// Starting rule set: `"default"` (built-in) or `"empty"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base: Option<String>,

    /// Rule definitions; a definition replaces a base rule with the same id.
    #[serde(rename = "rule", default)]
    pub rules: Vec<RuleDto>,

    /// Field overrides for rules defined in the base or in `[[rule]]`.
    #[serde(rename = "rules", default, skip_serializing_if = "BTreeMap::is_empty")]
    pub overrides: BTreeMap<String, RuleOverrideDto>,

    /// Read by [`crate::Config`].
    #[serde(default, skip_serializing)]
    pub fail_on: Option<IgnoredAny>,

    /// Read by [`crate::Config`].
    #[serde(default, skip_serializing)]
    pub analyzer: Option<IgnoredAny>,
}

/// Raw representation of one rule definition.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RuleDto {
    /// Rule identifier (e.g., "class_names").
    pub id: String,
    /// Reporting category.
    pub category: String,
    /// Human-readable description.
    pub description: String,
    /// Severity: error, warning or info.
    pub severity: String,
    /// Remediation hint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    /// File kinds covered: all, headers or sources.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub applies_to: Option<String>,
    /// Construct for naming rules; requires `pattern`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub construct: Option<String>,
    /// Regex detection (mutually exclusive with `keywords` and `check`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    /// Keyword detection (mutually exclusive with `pattern` and `check`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keywords: Option<Vec<String>>,
    /// Structural predicate (mutually exclusive with `pattern` and `keywords`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub check: Option<String>,
    /// Limit for measuring predicates.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<usize>,
    /// Safe counter-pattern for pattern and keyword rules.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unless: Option<String>,
    /// Text pattern and keyword rules run against: code or raw.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub match_on: Option<String>,
    /// Documentation examples.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub examples: Vec<ExampleDto>,
}

/// Raw good/bad example pair.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ExampleDto {
    /// Compliant code.
    pub good: String,
    /// Non-compliant code.
    pub bad: String,
}

/// Partial update of an existing rule.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RuleOverrideDto {
    /// `false` removes the rule from the model.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    /// Replacement severity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<String>,
    /// Replacement limit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<usize>,
    /// Replacement pattern.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    /// Replacement suggestion.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl RuleOverrideDto {
    /// Applies the set fields onto a rule definition.
    pub fn apply_to(&self, rule: &mut RuleDto) {
        if let Some(severity) = &self.severity {
            rule.severity.clone_from(severity);
        }
        if let Some(max) = self.max {
            rule.max = Some(max);
        }
        if let Some(pattern) = &self.pattern {
            rule.pattern = Some(pattern.clone());
        }
        if let Some(suggestion) = &self.suggestion {
            rule.suggestion = Some(suggestion.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialize_empty() {
        let dto: RuleSetDto = toml::from_str("").unwrap();
        assert!(dto.base.is_none());
        assert!(dto.rules.is_empty());
        assert!(dto.overrides.is_empty());
    }

    #[test]
    fn deserialize_rules_and_overrides() {
        let toml_str = r#"
base = "empty"

[[rule]]
id = "no_goto"
category = "best_practice"
description = "Avoid goto"
severity = "warning"
keywords = ["goto"]

[[rule.examples]]
good = "break;"
bad = "goto end;"

[rules.no_goto]
severity = "error"
"#;
        let dto: RuleSetDto = toml::from_str(toml_str).unwrap();
        assert_eq!(dto.base.as_deref(), Some("empty"));
        assert_eq!(dto.rules.len(), 1);
        assert_eq!(dto.rules[0].keywords, Some(vec!["goto".to_string()]));
        assert_eq!(dto.rules[0].examples.len(), 1);
        assert_eq!(
            dto.overrides["no_goto"].severity.as_deref(),
            Some("error")
        );
    }

    #[test]
    fn missing_required_field_is_rejected() {
        let toml_str = r#"
[[rule]]
id = "no_goto"
category = "best_practice"
description = "Avoid goto"
keywords = ["goto"]
"#;
        let err = toml::from_str::<RuleSetDto>(toml_str).unwrap_err();
        assert!(err.to_string().contains("severity"));
    }

    #[test]
    fn ignores_analyzer_section() {
        let toml_str = r#"
fail_on = "warning"
[analyzer]
workers = 2
"#;
        let dto: RuleSetDto = toml::from_str(toml_str).unwrap();
        assert!(dto.rules.is_empty());
    }

    #[test]
    fn override_applies_only_set_fields() {
        let mut rule = RuleDto {
            id: "function_length".into(),
            category: "structure".into(),
            description: "d".into(),
            severity: "warning".into(),
            check: Some("function_length".into()),
            max: Some(50),
            ..RuleDto::default()
        };
        let ov = RuleOverrideDto {
            max: Some(80),
            ..RuleOverrideDto::default()
        };
        ov.apply_to(&mut rule);
        assert_eq!(rule.max, Some(80));
        assert_eq!(rule.severity, "warning");
    }
}
