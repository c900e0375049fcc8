//! Matcher for identifier casing rules.
//!
//! # Rationale
//!
//! Consistent casing makes the kind of a name visible at its use site:
//! types and functions in `PascalCase`, locals in `camelCase`, members with
//! `m_`, constants with `k` and globals with `g_`.
//!
//! # Detection
//!
//! Each statement of the file is looked at once per rule. The identifier is
//! taken from the construct's marker (`class <Name>`, the name before a
//! parameter list, the first declarator of a declaration). Statements that
//! cannot be read with confidence are skipped rather than guessed.
//!
//! Constructors, destructors, operators and `main` are not function names
//! for this purpose.

use crate::decl::{parse_declaration, parse_signature, FunctionKind};
use guidelint_core::model::{Construct, Detection};
use guidelint_core::source::{class_name, namespace_names, ScopeKind, Statement, Terminator};
use guidelint_core::{FileContext, Matcher, MatcherError, Rule, Violation};

/// Matcher name for naming rules.
pub const NAME: &str = "naming";

/// Checks declared identifiers against a casing pattern.
#[derive(Debug, Clone, Copy, Default)]
pub struct NamingMatcher;

impl NamingMatcher {
    /// Creates the matcher.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Matcher for NamingMatcher {
    fn name(&self) -> &'static str {
        NAME
    }

    fn description(&self) -> &'static str {
        "Checks declared identifiers against per-construct casing patterns"
    }

    fn handles(&self, detection: &Detection) -> bool {
        matches!(detection, Detection::Naming { .. })
    }

    fn check(&self, ctx: &FileContext<'_>, rule: &Rule) -> Result<Vec<Violation>, MatcherError> {
        let Detection::Naming { construct, pattern } = rule.detection() else {
            return Err(MatcherError::Unsupported {
                matcher: NAME,
                detection: rule.detection().kind(),
            });
        };

        let mut violations = Vec::new();
        for stmt in ctx.source.statements() {
            for (name, offset) in declared_names(stmt, *construct) {
                if pattern.is_match(&name) {
                    continue;
                }
                let detail = format!("Rename '{name}' to match `{}`", pattern.as_str());
                violations.push(ctx.violation(rule, stmt.line_at(offset), Some(detail)));
            }
        }
        Ok(violations)
    }
}

/// Identifiers of `construct` declared by one statement, with byte offsets.
fn declared_names(stmt: &Statement, construct: Construct) -> Vec<(String, usize)> {
    match construct {
        Construct::Class => {
            if stmt.terminator != Terminator::OpenBrace(ScopeKind::Class) {
                return Vec::new();
            }
            class_name(&stmt.text).into_iter().collect()
        }
        Construct::Namespace => {
            if stmt.terminator != Terminator::OpenBrace(ScopeKind::Namespace) {
                return Vec::new();
            }
            namespace_names(&stmt.text)
        }
        Construct::Function => function_name(stmt).into_iter().collect(),
        Construct::Variable
        | Construct::MemberVariable
        | Construct::Constant
        | Construct::GlobalVariable => variables(stmt)
            .into_iter()
            .filter(|(kind, _, _)| *kind == construct)
            .map(|(_, name, offset)| (name, offset))
            .collect(),
    }
}

fn function_name(stmt: &Statement) -> Option<(String, usize)> {
    if !matches!(
        stmt.scope,
        ScopeKind::File | ScopeKind::Namespace | ScopeKind::Class
    ) {
        return None;
    }
    if !matches!(
        stmt.terminator,
        Terminator::Semicolon | Terminator::OpenBrace(ScopeKind::Function)
    ) {
        return None;
    }
    let sig = parse_signature(&stmt.text, stmt.class_name.as_deref())?;
    if sig.kind != FunctionKind::Regular || sig.name == "main" {
        return None;
    }
    Some((sig.name, sig.name_offset))
}

/// Classifies each declarator of a declaration statement by where it appears.
fn variables(stmt: &Statement) -> Vec<(Construct, String, usize)> {
    if stmt.terminator != Terminator::Semicolon {
        return Vec::new();
    }
    let construct = match stmt.scope {
        ScopeKind::Class => Construct::MemberVariable,
        ScopeKind::Function | ScopeKind::Control => Construct::Variable,
        ScopeKind::File | ScopeKind::Namespace => Construct::GlobalVariable,
        ScopeKind::Enum | ScopeKind::Initializer => return Vec::new(),
    };
    parse_declaration(&stmt.text)
        .unwrap_or_default()
        .into_iter()
        .map(|decl| {
            let kind = if decl.is_constant {
                Construct::Constant
            } else {
                construct
            };
            (kind, decl.name, decl.name_offset)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{lines, run};
    use guidelint_core::Severity;

    fn check(rule_id: &str, src: &str) -> Vec<Violation> {
        run(&NamingMatcher::new(), rule_id, "src/sample.cpp", src)
    }

    const VARIABLES: &str = "\
int g_counter = 0;
int totalCount;
namespace App {
const int kMaxSize = 10;
constexpr int max_size = 5;
}
class Counter {
 private:
  int m_count;
  int count_;
  static const int kLimit = 3;
};
void Run() {
  int totalSum = 0;
  int Bad_Name = 1;
  for (int i = 0; i < 3; ++i) {
    double scaledValue{};
  }
  return;
}
";

    #[test]
    fn class_names() {
        let src = "#include <vector>\n\nclass MyClass {\n};\nclass myClass {\n};\nstruct point_t;\n";
        let v = check("class_names", src);
        assert_eq!(lines(&v), vec![5]);
        assert_eq!(v[0].severity, Severity::Warning);
        assert_eq!(v[0].rule, "class_names");
        assert_eq!(
            v[0].suggestion,
            "Rename 'myClass' to match `^[A-Z][a-zA-Z0-9]*$`"
        );
    }

    #[test]
    fn class_name_on_continuation_line() {
        let v = check("class_names", "class\n    lower_case\n{\n};\n");
        assert_eq!(lines(&v), vec![2]);
    }

    #[test]
    fn function_names_skip_special_members() {
        let src = "\
int ComputeTotal(int a);
void do_thing() {
}
class Widget {
 public:
  explicit Widget(int v);
  ~Widget();
  bool operator==(const Widget& o) const;
  int getValue() const;
};
int main() {
  return Helper(1);
}
void Widget::resetAll() {
}
";
        assert_eq!(lines(&check("function_names", src)), vec![2, 9, 14]);
    }

    #[test]
    fn variables_by_scope() {
        assert_eq!(lines(&check("global_variables", VARIABLES)), vec![2]);
        assert_eq!(lines(&check("constant_names", VARIABLES)), vec![5]);
        assert_eq!(lines(&check("member_variables", VARIABLES)), vec![10]);
        assert_eq!(lines(&check("variable_names", VARIABLES)), vec![15]);
    }

    #[test]
    fn every_declarator_is_named() {
        let src = "void Run() {\n  int a,\n      Bad_Name = 2, *other_bad;\n  int first = Max(1, 2), second_one;\n}\n";
        let v = check("variable_names", src);
        assert_eq!(lines(&v), vec![3, 3, 4]);
        assert_eq!(v[0].suggestion, "Rename 'Bad_Name' to match `^[a-z][a-zA-Z0-9]*$`");
    }

    #[test]
    fn namespace_names() {
        let src = "\
namespace App {
namespace detail {
}
}
namespace {
}
namespace Outer::inner {
}
";
        assert_eq!(lines(&check("namespace_names", src)), vec![2, 7]);
    }

    #[test]
    fn names_in_comments_and_strings_are_ignored() {
        let src = "// class badName {\nconst char* kText = \"class worse {\";\n";
        assert!(check("class_names", src).is_empty());
    }
}
