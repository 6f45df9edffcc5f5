//! Build command implementation.

use anyhow::{Context, Result};
use ruleset_core::{
    assemble, AssembleError, CheckMode, RenderOptions, MISCONFIGURED_EXIT_CODE,
};
use std::path::Path;

use super::output;

/// Runs the build command.
///
/// `mode` comes from the command line or `CHECK_RULES`; `None` uses the
/// config file's `[check] mode`.
pub fn run(
    path: &Path,
    config_path: Option<&Path>,
    output_path: Option<&Path>,
    mode: Option<CheckMode>,
    no_color: bool,
) -> Result<()> {
    let loaded = super::load_config(path, config_path)?;
    let mode = mode.unwrap_or(loaded.config.check.mode);

    tracing::info!(
        "Assembling {} section(s) (check mode: {mode})",
        loaded.config.sections.len()
    );

    let stderr = std::io::stderr();
    let options = RenderOptions::for_mode(mode).with_color(output::use_color(&stderr, no_color));

    let assembled = match assemble(&loaded.config, &loaded.base_dir, mode) {
        Ok(assembled) => assembled,
        Err(AssembleError::Misconfigured { failed, passed }) => {
            let mut err = stderr.lock();
            if options.verbose {
                output::write_reports(&mut err, &passed, options)?;
            }
            output::write_reports(&mut err, &failed, options)?;
            std::process::exit(MISCONFIGURED_EXIT_CODE);
        }
        Err(e) => return Err(e).context("Failed to assemble rule sets"),
    };

    if options.verbose {
        output::write_reports(&mut stderr.lock(), &assembled.reports, options)?;
    }

    let json = serde_json::to_string_pretty(&assembled.config)?;
    match output_path {
        Some(file) => {
            std::fs::write(file, format!("{json}\n"))
                .with_context(|| format!("Failed to write {}", file.display()))?;
            tracing::info!("Wrote {}", file.display());
        }
        None => println!("{json}"),
    }

    Ok(())
}
