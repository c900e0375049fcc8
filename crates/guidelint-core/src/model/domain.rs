//! Pure domain types for guideline rules.
//!
//! This module has no serde and no I/O. Every invariant is enforced at
//! construction time through validated newtypes.

use crate::types::Severity;
use regex::Regex;
use std::borrow::Borrow;
use std::fmt;

// ────────────────────────────────────────────
// Newtypes with validation
// ────────────────────────────────────────────

/// A validated rule identifier (non-empty, `[a-z0-9_-]` only).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RuleId(String);

impl RuleId {
    /// Creates a new rule identifier.
    ///
    /// # Errors
    ///
    /// Returns error if the identifier is empty or contains invalid characters.
    pub fn new(id: &str) -> Result<Self, ModelError> {
        if id.is_empty() {
            return Err(ModelError::EmptyRuleId);
        }
        if !id
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-')
        {
            return Err(ModelError::InvalidRuleId { id: id.to_string() });
        }
        Ok(Self(id.to_string()))
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for RuleId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A validated regular expression.
///
/// The regex is compiled once at construction and reused for every match.
#[derive(Debug, Clone)]
pub struct Pattern {
    raw: String,
    compiled: Regex,
}

impl Pattern {
    /// Compiles a new pattern.
    ///
    /// # Errors
    ///
    /// Returns error if the pattern is empty or is not a valid regex.
    pub fn new(pattern: &str) -> Result<Self, ModelError> {
        if pattern.is_empty() {
            return Err(ModelError::EmptyPattern);
        }
        let compiled = Regex::new(pattern).map_err(|e| ModelError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            raw: pattern.to_string(),
            compiled,
        })
    }

    /// Builds a word-boundary alternation over literal keywords.
    ///
    /// # Errors
    ///
    /// Returns error if the list is empty or contains an empty keyword.
    pub fn keywords(keywords: &[String]) -> Result<Self, ModelError> {
        if keywords.is_empty() {
            return Err(ModelError::EmptyKeywords);
        }
        if keywords.iter().any(|k| k.trim().is_empty()) {
            return Err(ModelError::EmptyKeyword);
        }
        let alternation = keywords
            .iter()
            .map(|k| regex::escape(k.trim()))
            .collect::<Vec<_>>()
            .join("|");
        Self::new(&format!(r"\b(?:{alternation})\b"))
    }

    /// Tests whether the pattern matches anywhere in `text`.
    #[must_use]
    pub fn is_match(&self, text: &str) -> bool {
        self.compiled.is_match(text)
    }

    /// Returns the pattern source.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl Eq for Pattern {}

// ────────────────────────────────────────────
// Enumerations
// ────────────────────────────────────────────

/// Reporting category of a rule. Has no effect on matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Category {
    /// Identifier casing conventions.
    Naming,
    /// Language best practices.
    BestPractice,
    /// Cross-line structure (guards, function size).
    Structure,
    /// Layout of individual lines.
    Formatting,
}

impl Category {
    /// All categories in display order.
    pub const ALL: [Self; 4] = [
        Self::Naming,
        Self::BestPractice,
        Self::Structure,
        Self::Formatting,
    ];

    /// Parses the document spelling of a category.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "naming" => Some(Self::Naming),
            "best_practice" => Some(Self::BestPractice),
            "structure" => Some(Self::Structure),
            "formatting" => Some(Self::Formatting),
            _ => None,
        }
    }

    /// Returns the document spelling.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Naming => "naming",
            Self::BestPractice => "best_practice",
            Self::Structure => "structure",
            Self::Formatting => "formatting",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which files a rule applies to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AppliesTo {
    /// Headers and sources.
    #[default]
    All,
    /// Header files only.
    Headers,
    /// Non-header files only.
    Sources,
}

impl AppliesTo {
    /// Parses the document spelling.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "all" => Some(Self::All),
            "headers" | "header" => Some(Self::Headers),
            "sources" | "source" => Some(Self::Sources),
            _ => None,
        }
    }
}

/// Kind of source file, derived from its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileKind {
    /// Header (`.h`, `.hpp`, ...).
    Header,
    /// Translation unit (`.cpp`, `.cc`, ...).
    Source,
}

impl AppliesTo {
    /// Tests whether a file of the given kind is covered.
    #[must_use]
    pub fn covers(self, kind: FileKind) -> bool {
        match self {
            Self::All => true,
            Self::Headers => kind == FileKind::Header,
            Self::Sources => kind == FileKind::Source,
        }
    }
}

/// Syntactic construct whose declared identifier a naming rule checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Construct {
    /// `class`, `struct` and `union` definitions.
    Class,
    /// Free functions and methods (constructors and operators excluded).
    Function,
    /// Local variables inside function bodies.
    Variable,
    /// Non-constant data members.
    MemberVariable,
    /// `const`/`constexpr` objects.
    Constant,
    /// Non-constant variables at file or namespace scope.
    GlobalVariable,
    /// Named namespaces.
    Namespace,
}

impl Construct {
    /// Parses the document spelling.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "class" => Some(Self::Class),
            "function" => Some(Self::Function),
            "variable" => Some(Self::Variable),
            "member_variable" => Some(Self::MemberVariable),
            "constant" => Some(Self::Constant),
            "global_variable" => Some(Self::GlobalVariable),
            "namespace" => Some(Self::Namespace),
            _ => None,
        }
    }

    /// Human label used in violation hints.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Class => "Class",
            Self::Function => "Function",
            Self::Variable => "Variable",
            Self::MemberVariable => "Member variable",
            Self::Constant => "Constant",
            Self::GlobalVariable => "Global variable",
            Self::Namespace => "Namespace",
        }
    }
}

/// Text a line-level pattern is evaluated against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MatchTarget {
    /// The line with comments and literal contents blanked out.
    #[default]
    Code,
    /// The line exactly as written.
    Raw,
}

/// Predicates that need more than one line of text, or per-line measurements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StructuralCheck {
    /// Header must open with an include guard or `#pragma once`.
    IncludeGuard,
    /// Function bodies must not exceed `max_lines`.
    FunctionLength {
        /// Maximum lines from signature to closing brace.
        max_lines: usize,
    },
    /// Functions must not declare more than `max` parameters.
    FunctionParameters {
        /// Maximum parameter count.
        max: usize,
    },
    /// Function declarations in headers need a Doxygen comment.
    FunctionComments,
    /// Single-argument constructors must be `explicit`.
    ExplicitConstructors,
    /// Lines must not exceed `max` characters.
    LineLength {
        /// Maximum characters per line.
        max: usize,
    },
    /// Non-blank lines must not end in whitespace.
    TrailingWhitespace,
    /// Indentation must not contain tabs.
    TabIndentation,
    /// Engine note: the file could not be read as text.
    UnreadableFile,
    /// Engine note: a rule could not be evaluated for a file.
    MatcherFailure,
}

impl StructuralCheck {
    /// Document names of the predicates, as accepted by `check = "..."`.
    pub const NAMES: [&'static str; 10] = [
        "include_guard",
        "function_length",
        "function_parameters",
        "function_comments",
        "explicit_constructors",
        "line_length",
        "trailing_whitespace",
        "tab_indentation",
        "unreadable_file",
        "matcher_failure",
    ];

    /// Returns the document name of this predicate.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::IncludeGuard => "include_guard",
            Self::FunctionLength { .. } => "function_length",
            Self::FunctionParameters { .. } => "function_parameters",
            Self::FunctionComments => "function_comments",
            Self::ExplicitConstructors => "explicit_constructors",
            Self::LineLength { .. } => "line_length",
            Self::TrailingWhitespace => "trailing_whitespace",
            Self::TabIndentation => "tab_indentation",
            Self::UnreadableFile => "unreadable_file",
            Self::MatcherFailure => "matcher_failure",
        }
    }

    /// True for notes emitted by the engine itself rather than a matcher.
    #[must_use]
    pub fn is_engine_note(self) -> bool {
        matches!(self, Self::UnreadableFile | Self::MatcherFailure)
    }
}

/// How a rule detects violations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Detection {
    /// The identifier declared by `construct` must match `pattern`.
    Naming {
        /// Construct whose identifier is checked.
        construct: Construct,
        /// Required casing pattern.
        pattern: Pattern,
    },
    /// A line matching `pattern` violates, unless it also matches `unless`.
    Pattern {
        /// Forbidden pattern.
        pattern: Pattern,
        /// Safe counter-pattern.
        unless: Option<Pattern>,
        /// Text the patterns run against.
        target: MatchTarget,
    },
    /// A line containing any keyword as a whole word violates, unless it matches `unless`.
    Keywords {
        /// Keywords as written in the document.
        keywords: Vec<String>,
        /// Compiled word-boundary alternation of `keywords`.
        matcher: Pattern,
        /// Safe counter-pattern.
        unless: Option<Pattern>,
        /// Text the patterns run against.
        target: MatchTarget,
    },
    /// A structural predicate.
    Structural(StructuralCheck),
}

impl Detection {
    /// Short label for listings.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Naming { .. } => "naming",
            Self::Pattern { .. } => "pattern",
            Self::Keywords { .. } => "keywords",
            Self::Structural(_) => "structural",
        }
    }
}

/// A good/bad example pair attached to a rule for documentation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Example {
    /// Code that follows the rule.
    pub good: String,
    /// Code that breaks the rule.
    pub bad: String,
}

// ────────────────────────────────────────────
// Rule entity
// ────────────────────────────────────────────

/// A named, immutable check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    id: RuleId,
    category: Category,
    description: String,
    severity: Severity,
    suggestion: Option<String>,
    applies_to: AppliesTo,
    detection: Detection,
    examples: Vec<Example>,
}

impl Rule {
    /// Creates a new rule.
    #[must_use]
    pub fn new(
        id: RuleId,
        category: Category,
        description: String,
        severity: Severity,
        detection: Detection,
    ) -> Self {
        Self {
            id,
            category,
            description,
            severity,
            suggestion: None,
            applies_to: AppliesTo::All,
            detection,
            examples: Vec::new(),
        }
    }

    /// Sets the suggestion text.
    #[must_use]
    pub fn with_suggestion(mut self, suggestion: Option<String>) -> Self {
        self.suggestion = suggestion;
        self
    }

    /// Restricts the rule to a file kind.
    #[must_use]
    pub fn with_applies_to(mut self, applies_to: AppliesTo) -> Self {
        self.applies_to = applies_to;
        self
    }

    /// Attaches documentation examples.
    #[must_use]
    pub fn with_examples(mut self, examples: Vec<Example>) -> Self {
        self.examples = examples;
        self
    }

    /// Returns the rule identifier.
    #[must_use]
    pub fn id(&self) -> &RuleId {
        &self.id
    }

    /// Returns the category.
    #[must_use]
    pub fn category(&self) -> Category {
        self.category
    }

    /// Returns the description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the configured severity.
    #[must_use]
    pub fn severity(&self) -> Severity {
        self.severity
    }

    /// Returns the configured suggestion, if any.
    #[must_use]
    pub fn suggestion(&self) -> Option<&str> {
        self.suggestion.as_deref()
    }

    /// Returns which files the rule covers.
    #[must_use]
    pub fn applies_to(&self) -> AppliesTo {
        self.applies_to
    }

    /// Returns the detection method.
    #[must_use]
    pub fn detection(&self) -> &Detection {
        &self.detection
    }

    /// Returns the documentation examples.
    #[must_use]
    pub fn examples(&self) -> &[Example] {
        &self.examples
    }
}

/// Field-level validation errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    /// Rule identifier is empty.
    #[error("rule id must not be empty")]
    EmptyRuleId,

    /// Rule identifier contains invalid characters.
    #[error("invalid rule id `{id}`: only [a-z0-9_-] allowed")]
    InvalidRuleId {
        /// The invalid identifier.
        id: String,
    },

    /// Pattern is empty.
    #[error("pattern must not be empty")]
    EmptyPattern,

    /// Pattern failed to compile.
    #[error("invalid pattern `{pattern}`: {reason}")]
    InvalidPattern {
        /// The pattern source.
        pattern: String,
        /// Compiler message.
        reason: String,
    },

    /// Keyword list is empty.
    #[error("keyword list must not be empty")]
    EmptyKeywords,

    /// A keyword is blank.
    #[error("keywords must not be blank")]
    EmptyKeyword,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rule_id_accepts_snake_and_kebab() {
        assert!(RuleId::new("class_names").is_ok());
        assert!(RuleId::new("no-goto").is_ok());
        assert_eq!(RuleId::new(""), Err(ModelError::EmptyRuleId));
        assert!(matches!(
            RuleId::new("ClassNames"),
            Err(ModelError::InvalidRuleId { .. })
        ));
    }

    #[test]
    fn pattern_rejects_invalid_regex() {
        assert!(matches!(
            Pattern::new("(unclosed"),
            Err(ModelError::InvalidPattern { .. })
        ));
        assert_eq!(Pattern::new(""), Err(ModelError::EmptyPattern));
    }

    #[test]
    fn keywords_match_whole_words_only() {
        let p = Pattern::keywords(&["new".to_string(), "delete".to_string()]).unwrap();
        assert!(p.is_match("int* p = new int(42);"));
        assert!(p.is_match("delete p;"));
        assert!(!p.is_match("auto renewal = newest + 1;"));
        assert!(!p.is_match("auto p = std::make_unique<int>(42);"));
        // Case-sensitive
        assert!(!p.is_match("New()"));
    }

    #[test]
    fn keywords_are_escaped() {
        let p = Pattern::keywords(&["operator+".to_string()]).unwrap();
        assert_eq!(p.as_str(), r"\b(?:operator\+)\b");
    }

    #[test]
    fn keywords_reject_empty_lists() {
        assert_eq!(Pattern::keywords(&[]), Err(ModelError::EmptyKeywords));
        assert_eq!(
            Pattern::keywords(&[" ".to_string()]),
            Err(ModelError::EmptyKeyword)
        );
    }

    #[test]
    fn applies_to_covers_kinds() {
        assert!(AppliesTo::All.covers(FileKind::Header));
        assert!(AppliesTo::Headers.covers(FileKind::Header));
        assert!(!AppliesTo::Headers.covers(FileKind::Source));
        assert!(AppliesTo::Sources.covers(FileKind::Source));
    }

    #[test]
    fn structural_names_round_trip_through_name() {
        for name in StructuralCheck::NAMES {
            assert!(!name.is_empty());
        }
        assert_eq!(StructuralCheck::IncludeGuard.name(), "include_guard");
        assert!(StructuralCheck::UnreadableFile.is_engine_note());
        assert!(!StructuralCheck::TabIndentation.is_engine_note());
    }
}
