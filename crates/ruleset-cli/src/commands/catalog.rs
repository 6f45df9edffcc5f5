//! Catalog command implementation.

use anyhow::{bail, Context, Result};
use ruleset_core::{Catalog, CatalogSource, Config};
use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;

use crate::OutputFormat;

/// Runs the catalog command.
pub fn run(
    path: &Path,
    config_path: Option<&Path>,
    section: Option<&str>,
    format: OutputFormat,
) -> Result<()> {
    let loaded = super::load_config(path, config_path)?;
    let catalogs = load_catalogs(&loaded.config, &loaded.base_dir, section)?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    match format {
        OutputFormat::Text => print_text(&mut out, &catalogs)?,
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&catalogs)?;
            writeln!(out, "{json}")?;
        }
    }
    Ok(())
}

/// Loads the catalog of every selected section that declares one.
fn load_catalogs(
    config: &Config,
    base_dir: &Path,
    only: Option<&str>,
) -> Result<BTreeMap<String, Catalog>> {
    if let Some(name) = only {
        if config.section(name).is_none() {
            bail!("No section named `{name}`");
        }
    }

    let mut catalogs = BTreeMap::new();
    for section in &config.sections {
        if only.is_some_and(|name| name != section.name) || section.catalogs.is_empty() {
            continue;
        }
        let catalog = section
            .catalog_source(base_dir)
            .load()
            .with_context(|| format!("Failed to load catalogs of section `{}`", section.name))?;
        catalogs.insert(section.name.clone(), catalog);
    }
    Ok(catalogs)
}

fn print_text(out: &mut impl Write, catalogs: &BTreeMap<String, Catalog>) -> std::io::Result<()> {
    if catalogs.is_empty() {
        writeln!(out, "No catalogs configured.")?;
        return Ok(());
    }

    for (section, catalog) in catalogs {
        writeln!(out, "Section {section} ({} rules):", catalog.len())?;
        for (category, rules) in catalog.by_category() {
            writeln!(out, "\n  [{category}]")?;
            for rule in rules {
                let deprecated = catalog.get(rule.as_str()).is_some_and(|m| m.deprecated);
                if deprecated {
                    writeln!(out, "    {rule} (deprecated)")?;
                } else {
                    writeln!(out, "    {rule}")?;
                }
            }
        }
        writeln!(out)?;
    }
    Ok(())
}
