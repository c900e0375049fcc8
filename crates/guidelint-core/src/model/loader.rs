//! DTO → domain conversion with validation.

use crate::types::Severity;

use super::domain::{
    AppliesTo, Category, Construct, Detection, Example, MatchTarget, ModelError, Pattern, Rule,
    RuleId, StructuralCheck,
};
use super::dto::{RuleDto, RuleSetDto};
use super::RuleModel;

/// Identifier of the engine note emitted for files that cannot be read as text.
pub const UNREADABLE_FILE: &str = "unreadable_file";

/// Identifier of the engine note emitted when a rule cannot be evaluated.
pub const MATCHER_FAILURE: &str = "matcher_failure";

/// Errors during DTO → domain conversion.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// A field-level validation error.
    #[error("{context}: {source}")]
    Validation {
        /// Where the error occurred (e.g., "rule 'class_names'.pattern").
        context: String,
        /// The underlying model error.
        source: ModelError,
    },

    /// Zero or several of `pattern`, `keywords` and `check` are set.
    #[error("rule '{rule}': exactly one of `pattern`, `keywords` or `check` must be set")]
    AmbiguousDetection {
        /// The rule that has the conflict.
        rule: String,
    },

    /// Unknown severity string.
    #[error("{context}: unknown severity `{value}`, expected: error, warning, info")]
    UnknownSeverity {
        /// Where the error occurred.
        context: String,
        /// The invalid value.
        value: String,
    },

    /// A field holds a value outside its vocabulary.
    #[error("{context}: unknown {field} `{value}`, expected: {expected}")]
    InvalidValue {
        /// Where the error occurred.
        context: String,
        /// Field name.
        field: &'static str,
        /// The invalid value.
        value: String,
        /// Accepted values.
        expected: String,
    },

    /// A measuring predicate has no `max`.
    #[error("rule '{rule}': check `{check}` requires `max`")]
    MissingLimit {
        /// The rule missing the limit.
        rule: String,
        /// The predicate name.
        check: String,
    },

    /// Fields that cannot be combined.
    #[error("rule '{rule}': {message}")]
    Inconsistent {
        /// The offending rule.
        rule: String,
        /// What is wrong.
        message: String,
    },

    /// The same id is defined twice in one document.
    #[error("rule '{rule}' is defined more than once")]
    DuplicateRule {
        /// The duplicated id.
        rule: String,
    },

    /// An override names a rule that does not exist.
    #[error("override for unknown rule '{rule}'")]
    UnknownOverride {
        /// The unknown id.
        rule: String,
    },

    /// Unknown `base` value.
    #[error("unknown base `{value}`, expected: default, empty")]
    UnknownBase {
        /// The invalid value.
        value: String,
    },
}

/// Converts a document on top of `base` rule definitions into a [`RuleModel`].
///
/// Definitions in the document replace base definitions with the same id,
/// overrides are applied next, then every definition is validated.
///
/// # Errors
///
/// Returns the first error encountered during conversion.
pub fn load(dto: RuleSetDto, base: Vec<RuleDto>) -> Result<RuleModel, LoadError> {
    let mut seen = std::collections::HashSet::new();
    for rule in &dto.rules {
        if !seen.insert(rule.id.as_str()) {
            return Err(LoadError::DuplicateRule {
                rule: rule.id.clone(),
            });
        }
    }

    let mut merged = base;
    for rule in dto.rules {
        match merged.iter_mut().find(|r| r.id == rule.id) {
            Some(slot) => *slot = rule,
            None => merged.push(rule),
        }
    }

    for note in engine_notes() {
        if !merged.iter().any(|r| r.id == note.id) {
            merged.push(note);
        }
    }

    let mut disabled = Vec::new();
    for (id, ov) in &dto.overrides {
        let rule = merged
            .iter_mut()
            .find(|r| &r.id == id)
            .ok_or_else(|| LoadError::UnknownOverride { rule: id.clone() })?;
        ov.apply_to(rule);
        if ov.enabled == Some(false) {
            disabled.push(id.clone());
        }
    }
    merged.retain(|r| !disabled.contains(&r.id));

    let rules = merged
        .into_iter()
        .map(convert_rule)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(RuleModel::from_rules(rules))
}

/// Definitions of the notes the engine itself emits.
fn engine_notes() -> Vec<RuleDto> {
    vec![
        RuleDto {
            id: UNREADABLE_FILE.to_string(),
            category: "structure".to_string(),
            description: "File could not be read as text and was skipped".to_string(),
            severity: "info".to_string(),
            check: Some("unreadable_file".to_string()),
            ..RuleDto::default()
        },
        RuleDto {
            id: MATCHER_FAILURE.to_string(),
            category: "structure".to_string(),
            description: "A rule could not be evaluated for this file and was skipped".to_string(),
            severity: "info".to_string(),
            check: Some("matcher_failure".to_string()),
            ..RuleDto::default()
        },
    ]
}

fn convert_rule(dto: RuleDto) -> Result<Rule, LoadError> {
    let ctx = format!("rule '{}'", dto.id);
    let id = RuleId::new(&dto.id).map_err(|e| LoadError::Validation {
        context: format!("{ctx}.id"),
        source: e,
    })?;

    let category = Category::parse(&dto.category).ok_or_else(|| LoadError::InvalidValue {
        context: ctx.clone(),
        field: "category",
        value: dto.category.clone(),
        expected: "naming, best_practice, structure, formatting".to_string(),
    })?;

    let severity = parse_severity(&dto.severity, &ctx)?;

    let applies_to = match dto.applies_to.as_deref() {
        None => AppliesTo::All,
        Some(value) => AppliesTo::parse(value).ok_or_else(|| LoadError::InvalidValue {
            context: ctx.clone(),
            field: "applies_to",
            value: value.to_string(),
            expected: "all, headers, sources".to_string(),
        })?,
    };

    let detection = convert_detection(&dto, &ctx)?;

    let examples = dto
        .examples
        .into_iter()
        .map(|e| Example {
            good: e.good,
            bad: e.bad,
        })
        .collect();

    Ok(Rule::new(id, category, dto.description, severity, detection)
        .with_suggestion(dto.suggestion)
        .with_applies_to(applies_to)
        .with_examples(examples))
}

fn convert_detection(dto: &RuleDto, ctx: &str) -> Result<Detection, LoadError> {
    let set = [
        dto.pattern.is_some(),
        dto.keywords.is_some(),
        dto.check.is_some(),
    ]
    .iter()
    .filter(|b| **b)
    .count();
    if set != 1 {
        return Err(LoadError::AmbiguousDetection {
            rule: dto.id.clone(),
        });
    }

    let inconsistent = |message: &str| LoadError::Inconsistent {
        rule: dto.id.clone(),
        message: message.to_string(),
    };

    if dto.construct.is_some() && dto.pattern.is_none() {
        return Err(inconsistent("`construct` requires `pattern`"));
    }
    if dto.max.is_some() && dto.check.is_none() {
        return Err(inconsistent("`max` is only valid with `check`"));
    }

    if let Some(check) = &dto.check {
        if dto.unless.is_some() || dto.match_on.is_some() {
            return Err(inconsistent(
                "`unless` and `match_on` are only valid with `pattern` or `keywords`",
            ));
        }
        return convert_check(check, dto.max, &dto.id, ctx).map(Detection::Structural);
    }

    let target = match dto.match_on.as_deref() {
        None | Some("code") => MatchTarget::Code,
        Some("raw") => MatchTarget::Raw,
        Some(other) => {
            return Err(LoadError::InvalidValue {
                context: ctx.to_string(),
                field: "match_on",
                value: other.to_string(),
                expected: "code, raw".to_string(),
            })
        }
    };

    let unless = dto
        .unless
        .as_deref()
        .map(|u| compile(u, &format!("{ctx}.unless")))
        .transpose()?;

    if let Some(keywords) = &dto.keywords {
        let matcher = Pattern::keywords(keywords).map_err(|e| LoadError::Validation {
            context: format!("{ctx}.keywords"),
            source: e,
        })?;
        return Ok(Detection::Keywords {
            keywords: keywords.iter().map(|k| k.trim().to_string()).collect(),
            matcher,
            unless,
            target,
        });
    }

    // Exactly one detection is set and it is not `check` or `keywords`.
    let raw = dto.pattern.as_deref().unwrap_or_default();
    let pattern = compile(raw, &format!("{ctx}.pattern"))?;

    match dto.construct.as_deref() {
        Some(name) => {
            if unless.is_some() || dto.match_on.is_some() {
                return Err(inconsistent(
                    "naming rules accept neither `unless` nor `match_on`",
                ));
            }
            let construct = Construct::parse(name).ok_or_else(|| LoadError::InvalidValue {
                context: ctx.to_string(),
                field: "construct",
                value: name.to_string(),
                expected: "class, function, variable, member_variable, constant, \
                           global_variable, namespace"
                    .to_string(),
            })?;
            Ok(Detection::Naming { construct, pattern })
        }
        None => Ok(Detection::Pattern {
            pattern,
            unless,
            target,
        }),
    }
}

fn convert_check(
    name: &str,
    max: Option<usize>,
    rule: &str,
    ctx: &str,
) -> Result<StructuralCheck, LoadError> {
    let limit = || {
        max.ok_or_else(|| LoadError::MissingLimit {
            rule: rule.to_string(),
            check: name.to_string(),
        })
    };
    let no_limit = |check: StructuralCheck| {
        if max.is_some() {
            Err(LoadError::Inconsistent {
                rule: rule.to_string(),
                message: format!("check `{name}` does not take `max`"),
            })
        } else {
            Ok(check)
        }
    };

    match name {
        "include_guard" => no_limit(StructuralCheck::IncludeGuard),
        "function_length" => Ok(StructuralCheck::FunctionLength { max_lines: limit()? }),
        "function_parameters" => Ok(StructuralCheck::FunctionParameters { max: limit()? }),
        "function_comments" => no_limit(StructuralCheck::FunctionComments),
        "explicit_constructors" => no_limit(StructuralCheck::ExplicitConstructors),
        "line_length" => Ok(StructuralCheck::LineLength { max: limit()? }),
        "trailing_whitespace" => no_limit(StructuralCheck::TrailingWhitespace),
        "tab_indentation" => no_limit(StructuralCheck::TabIndentation),
        "unreadable_file" => no_limit(StructuralCheck::UnreadableFile),
        "matcher_failure" => no_limit(StructuralCheck::MatcherFailure),
        _ => Err(LoadError::InvalidValue {
            context: ctx.to_string(),
            field: "check",
            value: name.to_string(),
            expected: StructuralCheck::NAMES.join(", "),
        }),
    }
}

fn compile(pattern: &str, context: &str) -> Result<Pattern, LoadError> {
    Pattern::new(pattern).map_err(|e| LoadError::Validation {
        context: context.to_string(),
        source: e,
    })
}

fn parse_severity(value: &str, context: &str) -> Result<Severity, LoadError> {
    Severity::parse(value).ok_or_else(|| LoadError::UnknownSeverity {
        context: context.to_string(),
        value: value.to_string(),
    })
}
