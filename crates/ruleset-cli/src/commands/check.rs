//! Check command implementation.

use anyhow::{Context, Result};
use ruleset_core::{
    AssembleError, Assembler, CheckMode, RenderOptions, SectionReport, MISCONFIGURED_EXIT_CODE,
};
use std::io::Write;
use std::path::Path;

use super::output;
use crate::OutputFormat;

/// Printed when every verified section passes.
pub const CONSISTENT_SUMMARY: &str = "Rules are consistent.";

/// Printed when no section could be verified.
pub const UNVERIFIED_SUMMARY: &str = "No rules were verified.";

/// Options of the check command.
#[derive(Debug, Clone, Default)]
pub struct CheckOptions {
    /// Only verify this section.
    pub section: Option<String>,
    /// List every rule's status.
    pub verbose: bool,
    /// Print each finding as a diagnostic.
    pub explain: bool,
    /// Output format.
    pub format: OutputFormat,
    /// Never colour the report.
    pub no_color: bool,
}

/// Runs the check command.
///
/// The report is this command's primary output and goes to stdout, unlike
/// `build`, whose stdout carries the generated configuration. Logs and
/// `--explain` diagnostics go to stderr.
pub fn run(path: &Path, config_path: Option<&Path>, options: &CheckOptions) -> Result<()> {
    let loaded = super::load_config(path, config_path)?;
    let mode = if options.verbose {
        CheckMode::Verbose
    } else {
        CheckMode::On
    };

    let mut assembler = Assembler::new(&loaded.config, &loaded.base_dir).mode(mode);
    if let Some(name) = &options.section {
        assembler = assembler.section(name.clone());
    }

    let (passed, failed, skipped) = match assembler.run() {
        Ok(assembled) => (assembled.reports, Vec::new(), assembled.skipped),
        Err(AssembleError::Misconfigured { failed, passed }) => (passed, failed, Vec::new()),
        Err(e) => return Err(e).context("Failed to verify rule sets"),
    };

    tracing::info!(
        "Verified {} section(s), {} failed",
        passed.len() + failed.len(),
        failed.len()
    );

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    match options.format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&output::findings_json(&failed))?;
            writeln!(out, "{json}")?;
        }
        OutputFormat::Text => {
            let render = RenderOptions::for_mode(mode)
                .with_color(output::use_color(&stdout, options.no_color));
            print_text(&mut out, &passed, &failed, &skipped, render)?;
            if options.explain {
                explain(&failed);
            }
        }
    }

    if !failed.is_empty() {
        out.flush()?;
        std::process::exit(MISCONFIGURED_EXIT_CODE);
    }
    Ok(())
}

fn print_text(
    out: &mut impl Write,
    passed: &[SectionReport],
    failed: &[SectionReport],
    skipped: &[String],
    options: RenderOptions,
) -> std::io::Result<()> {
    output::write_reports(out, passed, options)?;
    output::write_reports(out, failed, options)?;

    if !failed.is_empty() {
        writeln!(out, "Findings:")?;
        output::write_tally(out, failed)?;
        return Ok(());
    }

    if !skipped.is_empty() {
        writeln!(out, "Skipped without catalogs: {}", skipped.join(", "))?;
    }
    if passed.is_empty() && !skipped.is_empty() {
        writeln!(out, "{UNVERIFIED_SUMMARY}")?;
    } else {
        writeln!(out, "{CONSISTENT_SUMMARY}")?;
    }
    Ok(())
}

fn explain(failed: &[SectionReport]) {
    for entry in failed {
        for finding in entry.report.findings() {
            eprintln!("{:?}", miette::Report::new(finding));
        }
    }
}
