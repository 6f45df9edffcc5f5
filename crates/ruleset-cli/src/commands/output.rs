//! Shared output formatting for check reports.

use miette::Diagnostic;
use ruleset_core::{RenderOptions, SectionReport};
use std::collections::BTreeMap;
use std::io::{self, IsTerminal, Write};

/// Returns `true` if reports written to `stream` should be coloured.
pub fn use_color(stream: &impl IsTerminal, no_color: bool) -> bool {
    !no_color && std::env::var_os("NO_COLOR").is_none() && stream.is_terminal()
}

/// Writes each non-empty report under a section header.
pub fn write_reports(
    out: &mut impl Write,
    reports: &[SectionReport],
    options: RenderOptions,
) -> io::Result<()> {
    for entry in reports {
        let text = entry.report.render(options);
        if text.is_empty() {
            continue;
        }
        writeln!(out, "==> {} <==", entry.section)?;
        writeln!(out, "{text}")?;
        writeln!(out)?;
    }
    Ok(())
}

/// Writes how many findings of each diagnostic code the reports contain.
pub fn write_tally(out: &mut impl Write, reports: &[SectionReport]) -> io::Result<()> {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for entry in reports {
        for finding in entry.report.findings() {
            let code = finding
                .code()
                .map_or_else(|| "ruleset::finding".to_string(), |c| c.to_string());
            *counts.entry(code).or_default() += 1;
        }
    }

    for (code, count) in counts {
        writeln!(out, "  {count:>3} {code}")?;
    }
    Ok(())
}

/// Findings as JSON objects tagged with their section.
pub fn findings_json(reports: &[SectionReport]) -> serde_json::Value {
    let findings: Vec<serde_json::Value> = reports
        .iter()
        .flat_map(|entry| {
            entry.report.findings().into_iter().map(|finding| {
                serde_json::json!({
                    "section": entry.section,
                    "code": finding.code().map(|c| c.to_string()),
                    "message": finding.to_string(),
                    "help": finding.help().map(|h| h.to_string()),
                })
            })
        })
        .collect();
    serde_json::Value::Array(findings)
}
