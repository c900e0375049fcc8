//! Matcher for structural rules that need more than one line of context.
//!
//! # Checks
//!
//! - `include_guard`: the first code line of a header is `#pragma once`,
//!   `#if !defined(X)`, or `#ifndef X` directly followed by `#define X`.
//! - `function_length`: lines from the function head to its closing brace.
//!   Braces inside comments and literals never count; a file whose braces do
//!   not balance is reported as a [`MatcherError`] instead of measured.
//! - `function_parameters`: declared parameter count.
//! - `function_comments`: a Doxygen comment (`/**`, `///`, `//!`, `/*!`,
//!   `@brief`, `\brief`) in the comment block directly above a declaration.
//! - `explicit_constructors`: constructors callable with a single argument
//!   must be `explicit`. Copy, move and `initializer_list` constructors are
//!   exempt.

use crate::decl::{parse_signature, FunctionKind, Signature};
use guidelint_core::model::{Detection, StructuralCheck};
use guidelint_core::source::{ScopeKind, Statement, Terminator};
use guidelint_core::{FileContext, Matcher, MatcherError, Rule, SourceFile, Violation};

/// Matcher name for structural rules.
pub const NAME: &str = "structure";

const DOC_MARKERS: [&str; 6] = ["/**", "///", "//!", "/*!", "@brief", "\\brief"];

/// Evaluates cross-line structural predicates.
#[derive(Debug, Clone, Copy, Default)]
pub struct StructureMatcher;

impl StructureMatcher {
    /// Creates the matcher.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Matcher for StructureMatcher {
    fn name(&self) -> &'static str {
        NAME
    }

    fn description(&self) -> &'static str {
        "Include guards, function size, documentation and constructor checks"
    }

    fn handles(&self, detection: &Detection) -> bool {
        matches!(
            detection,
            Detection::Structural(
                StructuralCheck::IncludeGuard
                    | StructuralCheck::FunctionLength { .. }
                    | StructuralCheck::FunctionParameters { .. }
                    | StructuralCheck::FunctionComments
                    | StructuralCheck::ExplicitConstructors
            )
        )
    }

    fn check(&self, ctx: &FileContext<'_>, rule: &Rule) -> Result<Vec<Violation>, MatcherError> {
        let Detection::Structural(check) = rule.detection() else {
            return Err(unsupported(rule));
        };
        let source = ctx.source;

        let violations = match *check {
            StructuralCheck::IncludeGuard => {
                if has_include_guard(source) {
                    Vec::new()
                } else {
                    vec![ctx.violation(rule, 1, None)]
                }
            }
            StructuralCheck::FunctionLength { max_lines } => {
                if let Some(line) = source.first_unbalanced() {
                    return Err(MatcherError::Unbalanced { line });
                }
                source
                    .blocks()
                    .iter()
                    .filter(|b| b.kind == ScopeKind::Function)
                    .filter_map(|b| {
                        let length = b.close_line? - b.header_line + 1;
                        (length > max_lines).then(|| {
                            let detail =
                                format!("Function is {length} lines long (limit {max_lines})");
                            ctx.violation(rule, b.header_line, Some(detail))
                        })
                    })
                    .collect()
            }
            StructuralCheck::FunctionParameters { max } => functions(source)
                .filter(|(_, sig)| sig.params.len() > max)
                .map(|(stmt, sig)| {
                    let detail = format!(
                        "'{}' takes {} parameters (limit {max}); group related ones into a struct",
                        sig.name,
                        sig.params.len()
                    );
                    ctx.violation(rule, stmt.line_at(sig.name_offset), Some(detail))
                })
                .collect(),
            StructuralCheck::FunctionComments => functions(source)
                .filter(|(_, sig)| {
                    matches!(sig.kind, FunctionKind::Regular | FunctionKind::Operator)
                        && !sig.is_deleted
                        && !sig.is_defaulted
                })
                .filter(|(stmt, _)| !has_doc_comment(source, stmt.first_line()))
                .map(|(stmt, sig)| ctx.violation(rule, stmt.line_at(sig.name_offset), None))
                .collect(),
            StructuralCheck::ExplicitConstructors => functions(source)
                .filter(|(stmt, sig)| stmt.scope == ScopeKind::Class && needs_explicit(sig))
                .map(|(stmt, sig)| {
                    let detail = format!("Mark constructor '{}' explicit", sig.name);
                    ctx.violation(rule, stmt.line_at(sig.name_offset), Some(detail))
                })
                .collect(),
            _ => return Err(unsupported(rule)),
        };
        Ok(violations)
    }
}

fn unsupported(rule: &Rule) -> MatcherError {
    MatcherError::Unsupported {
        matcher: NAME,
        detection: rule.detection().kind(),
    }
}

/// Function declarations and definitions outside function bodies.
fn functions(source: &SourceFile) -> impl Iterator<Item = (&Statement, Signature)> {
    source.statements().iter().filter_map(|stmt| {
        let declares = matches!(
            stmt.scope,
            ScopeKind::File | ScopeKind::Namespace | ScopeKind::Class
        ) && matches!(
            stmt.terminator,
            Terminator::Semicolon | Terminator::OpenBrace(ScopeKind::Function)
        );
        if !declares {
            return None;
        }
        parse_signature(&stmt.text, stmt.class_name.as_deref()).map(|sig| (stmt, sig))
    })
}

fn has_include_guard(source: &SourceFile) -> bool {
    let mut code = source
        .lines()
        .map(|(_, _, code)| code.trim())
        .filter(|c| !c.is_empty());
    let Some(first) = code.next() else {
        return true;
    };
    let Some(head) = directive(first) else {
        return false;
    };
    let mut words = head.split_whitespace();
    match words.next() {
        Some("pragma") => words.next() == Some("once"),
        Some("ifndef") => {
            let Some(guard) = words.next() else {
                return false;
            };
            code.next()
                .and_then(directive)
                .is_some_and(|d| {
                    let mut words = d.split_whitespace();
                    words.next() == Some("define") && words.next() == Some(guard)
                })
        }
        Some(word) if word.starts_with("if") => head["if".len()..]
            .trim_start()
            .strip_prefix('!')
            .is_some_and(|rest| rest.trim_start().starts_with("defined")),
        _ => false,
    }
}

/// Text of a preprocessor line after `#`.
fn directive(line: &str) -> Option<&str> {
    line.strip_prefix('#').map(str::trim_start)
}

/// Walks up from `line` over comment and blank lines looking for a Doxygen marker.
fn has_doc_comment(source: &SourceFile, line: usize) -> bool {
    let mut n = line;
    while n > 1 {
        n -= 1;
        let raw = source.raw_line(n);
        if raw.trim().is_empty() {
            continue;
        }
        if !source.is_comment_only(n) {
            return false;
        }
        if DOC_MARKERS.iter().any(|m| raw.contains(m)) {
            return true;
        }
    }
    false
}

fn needs_explicit(sig: &Signature) -> bool {
    if sig.kind != FunctionKind::Constructor || sig.is_explicit || sig.is_deleted {
        return false;
    }
    let Some((first, rest)) = sig.params.split_first() else {
        return false;
    };
    if !rest.iter().all(|p| p.has_default) {
        return false;
    }
    let copy_or_move = first.is_reference && first.words.iter().any(|w| *w == sig.name);
    let init_list = first.words.iter().any(|w| w == "initializer_list");
    !(copy_or_move || init_list)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{lines, run, run_rule};
    use guidelint_core::model::{Category, FileKind, RuleId};
    use guidelint_core::Severity;
    use std::path::Path;

    fn check(rule_id: &str, path: &str, src: &str) -> Vec<Violation> {
        run(&StructureMatcher::new(), rule_id, path, src)
    }

    fn length_rule(max_lines: usize) -> Rule {
        Rule::new(
            RuleId::new("function_length").unwrap(),
            Category::Structure,
            "Short functions".into(),
            Severity::Warning,
            Detection::Structural(StructuralCheck::FunctionLength { max_lines }),
        )
    }

    #[test]
    fn include_guard_forms() {
        let guarded = [
            "#pragma once\nint x;\n",
            "// Copyright\n\n#ifndef APP_WIDGET_H_\n#define APP_WIDGET_H_\n#endif\n",
            "#if !defined(APP_H)\n#define APP_H\n#endif\n",
            "/* block\n   comment */\n#  pragma once\n",
            "",
        ];
        for src in guarded {
            assert!(check("include_guards", "inc/a.h", src).is_empty(), "{src}");
        }

        let unguarded = [
            "#include <vector>\n#pragma once\n",
            "#ifndef A_H\n#define B_H\n#endif\n",
            "int x;\n",
        ];
        for src in unguarded {
            let v = check("include_guards", "inc/a.h", src);
            assert_eq!(lines(&v), vec![1], "{src}");
            assert_eq!(v[0].severity, Severity::Error);
        }
    }

    #[test]
    fn function_length_from_head_to_close() {
        let body: String = (0..50).map(|i| format!("  Step({i});\n")).collect();
        let long = format!("void Long()\n{{\n{body}}}\n");
        let v = check("function_length", "src/a.cpp", &long);
        assert_eq!(lines(&v), vec![1]);
        assert_eq!(v[0].suggestion, "Function is 53 lines long (limit 50)");

        let body: String = (0..48).map(|i| format!("  Step({i});\n")).collect();
        let fits = format!("void Fits() {{\n{body}}}\n");
        assert!(check("function_length", "src/a.cpp", &fits).is_empty());
    }

    #[test]
    fn brace_in_string_does_not_change_length() {
        let src = "\
void Print() {
  const char* open = \"{\";
  char close = '}';
  // }
  Log(open, close);
}
";
        let rule = length_rule(6);
        assert!(run_rule(&StructureMatcher::new(), &rule, "src/a.cpp", src).is_empty());
        let rule = length_rule(5);
        let v = run_rule(&StructureMatcher::new(), &rule, "src/a.cpp", src);
        assert_eq!(lines(&v), vec![1]);
        assert_eq!(v[0].suggestion, "Function is 6 lines long (limit 5)");
    }

    #[test]
    fn unbalanced_braces_are_an_error() {
        let source = SourceFile::parse("void F() {\n  if (x) {\n}\n");
        let ctx = FileContext::new(Path::new("src/a.cpp"), FileKind::Source, &source);
        let err = StructureMatcher::new()
            .check(&ctx, &length_rule(50))
            .unwrap_err();
        assert_eq!(err, MatcherError::Unbalanced { line: 1 });
    }

    #[test]
    fn function_parameters() {
        let src = "\
void Five(int a, int b, int c, int d, int e);
void Four(int a, int b, int c, int d);
void Wrapped(int a,
             int b, int c, int d, int e) {
}
";
        let v = check("function_parameters", "src/a.cpp", src);
        assert_eq!(lines(&v), vec![1, 3]);
        assert_eq!(
            v[0].suggestion,
            "'Five' takes 5 parameters (limit 4); group related ones into a struct"
        );
    }

    #[test]
    fn function_comments_in_headers() {
        let src = "\
#pragma once

/// Adds two numbers.
int Add(int a, int b);

int Sub(int a, int b);
/**
 * @brief Multiplies.
 */
int Mul(int a, int b);
class Widget {
 public:
  Widget();
  // plain comment
  int Size() const;
  Widget(const Widget&) = delete;
  template <typename T>
  T Get() const { return T{}; }
};
";
        assert_eq!(
            lines(&check("function_comments", "inc/widget.h", src)),
            vec![6, 15, 18]
        );
    }

    #[test]
    fn explicit_constructors() {
        let src = "\
class Widget {
 public:
  Widget(int size);
  explicit Widget(double scale);
  Widget(int a, int b);
  Widget(int a, int b = 2);
  Widget(const Widget& other);
  Widget(Widget&& other) noexcept;
  Widget(std::initializer_list<int> values);
  Widget(const char* name) = delete;
  Widget();
};
Widget::Widget(int size) : m_size{size} {}
";
        let v = check("explicit_constructors", "src/widget.cpp", src);
        assert_eq!(lines(&v), vec![3, 6]);
        assert_eq!(v[0].severity, Severity::Info);
    }

    #[test]
    fn formatting_checks_are_not_handled_here() {
        let rule = Rule::new(
            RuleId::new("tabs").unwrap(),
            Category::Formatting,
            "Tabs".into(),
            Severity::Warning,
            Detection::Structural(StructuralCheck::TabIndentation),
        );
        assert!(!StructureMatcher::new().handles(rule.detection()));
    }
}
