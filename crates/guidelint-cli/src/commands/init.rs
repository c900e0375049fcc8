//! Init command implementation.

use anyhow::{bail, Context, Result};
use guidelint_core::model::DEFAULT_RULES;
use std::path::Path;

const STARTER_CONFIG: &str = r#"# guidelint configuration

# Start from the built-in rule set ("default") or from nothing ("empty")
base = "default"

# Exit non-zero on "error" violations, or on "warning" as well
fail_on = "error"

[analyzer]
extensions = ["cpp", "cc", "cxx", "c", "h", "hpp", "hxx", "hh"]
header_extensions = ["h", "hpp", "hxx", "hh"]
exclude = ["**/build/**", "**/third_party/**"]
# workers = 4
# Keep only the most severe violation per line
dedupe_same_line = false

# Override a built-in rule
# [rules.function_length]
# severity = "error"
# max = 80

# [rules.line_length]
# enabled = false

# Add a rule
# [[rule]]
# id = "no_goto"
# category = "best_practice"
# description = "Avoid goto"
# severity = "warning"
# keywords = ["goto"]
"#;

/// Runs the init command.
pub fn run(force: bool, with_defaults: bool) -> Result<()> {
    write_config(Path::new("guidelint.toml"), force, with_defaults)?;

    println!("Created guidelint.toml");
    println!("\nNext steps:");
    println!("  1. Edit guidelint.toml to configure rules");
    println!("  2. Run: guidelint check");
    Ok(())
}

fn write_config(path: &Path, force: bool, with_defaults: bool) -> Result<()> {
    if path.exists() && !force {
        bail!(
            "Configuration file already exists at {}. Use --force to overwrite.",
            path.display()
        );
    }

    let content = starter(with_defaults);
    std::fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))
}

/// Starter document; with the full default rule set inlined on request.
fn starter(with_defaults: bool) -> String {
    if !with_defaults {
        return STARTER_CONFIG.to_string();
    }
    format!(
        "{}\n{DEFAULT_RULES}",
        STARTER_CONFIG.replacen("base = \"default\"", "base = \"empty\"", 1)
    )
}
