//! # guidelint-core
//!
//! Engine for reviewing C and C++ sources against a configurable guideline
//! set. It works at the lexical level (lines, masked code, brace blocks)
//! rather than on a syntax tree.
//!
//! This crate provides:
//!
//! - [`RuleModel`] and [`load_rules`] for the rule set (built-in or user document)
//! - [`SourceFile`] for the per-file lexical model
//! - [`Matcher`] trait implemented by the rule matchers
//! - [`Analyzer`] for running matchers over files in parallel
//! - [`ChangeScope`] and [`compute_scope`] for diff-scoped reports
//! - [`report`] renderers for text, JSON, markdown and compact output
//!
//! ## Example
//!
//! ```ignore
//! use guidelint_core::{load_rules, Analyzer, RuleSource};
//!
//! let analyzer = Analyzer::builder()
//!     .model(load_rules(RuleSource::Builtin)?)
//!     .matchers(guidelint_rules::default_matchers())
//!     .build()?;
//!
//! let result = analyzer.analyze(&files);
//! println!("{}", guidelint_core::report::render_text(&result));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod allowance;
mod analyzer;
mod config;
mod context;
mod rule;
mod types;

pub mod model;
pub mod report;
pub mod scope;
pub mod source;

pub use allowance::{AllowCheck, AllowDirective, Allowances};
pub use analyzer::{Analyzer, AnalyzerBuilder, AnalyzerError};
pub use config::{read_document, AnalyzerConfig, Config, ConfigError};
pub use context::{display_path, FileContext};
pub use model::{load_rules, Rule, RuleModel, RuleSource};
pub use rule::{Matcher, MatcherBox, MatcherError};
pub use scope::{compute_scope, ChangeScope, GitCli, ScopeError, ScopeMode, VersionControl};
pub use source::SourceFile;
pub use types::{excerpt, AnalysisResult, Severity, Summary, Violation, EXCERPT_LIMIT};
