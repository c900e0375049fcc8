//! List rules command implementation.

use anyhow::Result;
use guidelint_core::RuleModel;
use std::fmt::Write;
use std::path::Path;

use crate::config_resolver;

/// Runs the list-rules command against the effective rule model.
///
/// With `verbose`, each rule is followed by its good/bad examples.
pub fn run(config: Option<&Path>, verbose: bool) -> Result<()> {
    let source = config_resolver::resolve(Path::new("."), config);
    let settings = config_resolver::load(&source)?;
    print!("{}", table(&settings.model, source.label(), verbose));
    Ok(())
}

fn table(model: &RuleModel, origin: &str, verbose: bool) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Rules ({} from {origin} config):\n", model.len());
    let _ = writeln!(
        out,
        "{:<26} {:<14} {:<8} Description",
        "Rule", "Category", "Severity"
    );
    let _ = writeln!(out, "{}", "-".repeat(90));

    for rule in model.iter() {
        let _ = writeln!(
            out,
            "{:<26} {:<14} {:<8} {}",
            rule.id().as_str(),
            rule.category().as_str(),
            rule.severity().as_str(),
            rule.description()
        );
        if !verbose {
            continue;
        }
        for example in rule.examples() {
            let _ = writeln!(out, "{:<26} good: {}", "", example.good);
            let _ = writeln!(out, "{:<26} bad:  {}", "", example.bad);
        }
    }

    let _ = writeln!(out, "\nOverride a rule in guidelint.toml, e.g.:");
    let _ = writeln!(out, "  [rules.function_length]\n  max = 80");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_table_lists_every_rule() {
        let model = RuleModel::builtin().unwrap();
        let out = table(&model, "built-in", false);

        assert!(out.starts_with(&format!("Rules ({} from built-in config):", model.len())));
        let include_guards = out
            .lines()
            .find(|l| l.starts_with("include_guards"))
            .unwrap();
        assert!(include_guards.contains("structure"));
        assert!(include_guards.contains("error"));
        for rule in model.iter() {
            assert!(out.contains(rule.id().as_str()), "{}", rule.id().as_str());
        }
        assert!(!out.contains("good:"));
    }

    #[test]
    fn verbose_table_shows_examples_under_their_rule() {
        let model = RuleModel::builtin().unwrap();
        let out = table(&model, "built-in", true);
        let lines: Vec<&str> = out.lines().collect();

        let at = lines
            .iter()
            .position(|l| l.starts_with("class_names"))
            .unwrap();
        assert_eq!(lines[at + 1].trim(), "good: class UrlTable {};");
        assert_eq!(lines[at + 2].trim(), "bad:  class urlTable {};");
        assert!(lines[at + 3].starts_with("constant_names"));
    }
}
