//! Init command implementation.

use anyhow::{bail, Context, Result};
use std::path::Path;

use super::CONFIG_FILE_NAMES;

const DEFAULT_CONFIG: &str = r#"# ruleset configuration
#
# Each [[section]] becomes one entry of the generated linter config.
# Paths are relative to this file.

[check]
# off | on | verbose (CHECK_RULES and --check take precedence)
mode = "off"

[[section]]
name = "javascript"
files = ["**/*.{js,mjs,cjs}"]
# plugins = ["import"]

# Catalogs list every rule the toolchain knows, with its category:
#   [rules.eqeqeq]
#   type = "suggestion"
catalogs = [
    { path = "catalogs/core.json" },
    # { path = "catalogs/import.json", prefix = "import" },
]

# One or more rule tables (or globs) per category. Rules in `override`
# deliberately replace another config's settings and are never
# cross-checked against the catalog.
[section.categories]
problem = ["rules/problem.toml"]
suggestion = ["rules/suggestion.toml"]
layout = ["rules/layout.toml"]
override = []

# Sections without a catalog can list their rules inline instead:
# [[section]]
# name = "scripts"
# files = ["scripts/**/*.js"]
# rules = { "no-console" = "off" }
"#;

/// Runs the init command.
pub fn run(dir: &Path, force: bool) -> Result<()> {
    let config_path = dir.join(CONFIG_FILE_NAMES[0]);

    if config_path.exists() && !force {
        bail!(
            "Configuration file already exists at {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    std::fs::write(&config_path, DEFAULT_CONFIG)
        .with_context(|| format!("Failed to write {}", config_path.display()))?;

    println!("Created {}", config_path.display());
    println!("\nNext steps:");
    println!("  1. Point `catalogs` at your rule catalogs");
    println!("  2. Split your rules into per-category tables");
    println!("  3. Run: ruleset check");

    Ok(())
}
