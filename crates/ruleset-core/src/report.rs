//! Consistency checking: duplicate detection plus category classification,
//! aggregated into a single report.

use miette::Diagnostic;
use std::fmt::Write;
use tracing::debug;

use crate::catalog::{Catalog, CatalogSource};
use crate::classify::{classify, Classification, RuleStatus};
use crate::definitions::DefinitionSet;
use crate::duplicates::{find_duplicates, Duplicates};
use crate::loader::LoadError;
use crate::merge::merge;
use crate::mode::CheckMode;
use crate::types::{RuleId, RuleTable};

/// Process exit status used when rule definitions are misconfigured.
pub const MISCONFIGURED_EXIT_CODE: i32 = 10;

/// Summary line written after a failed check.
pub const MISCONFIGURED_SUMMARY: &str = "Rules are misconfigured.";

/// A single consistency problem.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Diagnostic)]
pub enum Finding {
    /// A rule is configured in more than one location.
    #[error("rule `{rule}` is configured more than once: {}", .locations.join(", "))]
    #[diagnostic(
        code(ruleset::duplicate_rule),
        help("configure each rule in exactly one table")
    )]
    DuplicateRule {
        /// The duplicated rule.
        rule: RuleId,
        /// Every `category[index]` it appears at.
        locations: Vec<String>,
    },

    /// A catalog rule is configured under a category the catalog disagrees with.
    #[error("rule `{rule}` is configured in [{category}] but belongs in [{expected}]")]
    #[diagnostic(
        code(ruleset::wrong_category),
        help("move the rule to [{expected}], or list it under [override]")
    )]
    WrongCategory {
        /// The misplaced rule.
        rule: RuleId,
        /// Category it is configured in.
        category: String,
        /// Category the catalog assigns.
        expected: String,
    },

    /// A configured rule is not in the catalog.
    #[error("rule `{rule}` in [{category}] is not a known rule")]
    #[diagnostic(
        code(ruleset::unknown_rule),
        help("check for a typo, a removed or deprecated rule, or a renamed plugin")
    )]
    UnknownRule {
        /// The unknown rule.
        rule: RuleId,
        /// Category it is configured in.
        category: String,
    },

    /// A catalog rule has no configuration at all.
    #[error("rule `{rule}` in [{category}] is not configured")]
    #[diagnostic(
        code(ruleset::missing_rule),
        help("review the rule and configure it, even if only to turn it off")
    )]
    MissingRule {
        /// The unconfigured rule.
        rule: RuleId,
        /// Catalog category of the rule.
        category: String,
    },
}

/// How a [`CheckReport`] is rendered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderOptions {
    /// List defined and overridden rules, and every category.
    pub verbose: bool,
    /// Dim the status annotations with ANSI escapes.
    pub color: bool,
}

impl RenderOptions {
    /// Options matching a check mode, without colour.
    #[must_use]
    pub fn for_mode(mode: CheckMode) -> Self {
        Self {
            verbose: mode.is_verbose(),
            color: false,
        }
    }

    /// Enables or disables colour.
    #[must_use]
    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }
}

/// Outcome of a consistency check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckReport {
    duplicates: Duplicates,
    classification: Classification,
}

impl CheckReport {
    /// Returns `true` if there are no duplicates and no classification errors.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.duplicates.is_empty() && !self.classification.has_errors()
    }

    /// Returns the duplicate detector output.
    #[must_use]
    pub fn duplicates(&self) -> &Duplicates {
        &self.duplicates
    }

    /// Returns the classifier output.
    #[must_use]
    pub fn classification(&self) -> &Classification {
        &self.classification
    }

    /// Lists every problem: duplicates first, then classification problems
    /// in category order.
    #[must_use]
    pub fn findings(&self) -> Vec<Finding> {
        let mut findings: Vec<Finding> = self
            .duplicates
            .iter()
            .map(|(rule, locations)| Finding::DuplicateRule {
                rule: rule.clone(),
                locations: locations.iter().map(ToString::to_string).collect(),
            })
            .collect();

        for report in self.classification.categories() {
            for (rule, status) in &report.rules {
                let rule = rule.clone();
                let category = report.category.clone();
                match status {
                    RuleStatus::WrongType { expected } => findings.push(Finding::WrongCategory {
                        rule,
                        category,
                        expected: expected.clone(),
                    }),
                    RuleStatus::Unknown => findings.push(Finding::UnknownRule { rule, category }),
                    RuleStatus::Missing => findings.push(Finding::MissingRule { rule, category }),
                    RuleStatus::Overridden | RuleStatus::Defined => {}
                }
            }
        }

        findings
    }

    /// Renders the human-readable diagnostic text.
    ///
    /// Blocks are separated by blank lines: duplicates first, then one block
    /// per category, then the summary line if the check failed. In quiet
    /// mode only failing categories and problem statuses are shown. Returns
    /// an empty string for a passing quiet check.
    #[must_use]
    pub fn render(&self, options: RenderOptions) -> String {
        let mut blocks: Vec<String> = Vec::new();

        if !self.duplicates.is_empty() {
            let mut block = String::from("Duplicate rule definitions:");
            for (rule, locations) in self.duplicates.iter() {
                let labels: Vec<String> = locations.iter().map(ToString::to_string).collect();
                let _ = write!(block, "\n  {rule}: {}", labels.join(", "));
            }
            blocks.push(block);
        }

        for report in self.classification.categories() {
            if !report.has_errors() && !options.verbose {
                continue;
            }

            let mut block = format!("[{}]:", report.category);
            for (rule, status) in &report.rules {
                let line = match status {
                    RuleStatus::Overridden if options.verbose => {
                        format!("- {rule} {}", annotate("(overridden)", options.color))
                    }
                    RuleStatus::Defined if options.verbose => {
                        format!("✔ {rule} {}", annotate("(defined)", options.color))
                    }
                    RuleStatus::WrongType { expected } => format!(
                        "! {rule} {}",
                        annotate(
                            &format!("(wrong category, should be in [{expected}])"),
                            options.color
                        )
                    ),
                    RuleStatus::Unknown => {
                        format!("? {rule} {}", annotate("(unknown rule)", options.color))
                    }
                    RuleStatus::Missing => {
                        format!("✘ {rule} {}", annotate("(not configured)", options.color))
                    }
                    RuleStatus::Overridden | RuleStatus::Defined => continue,
                };
                block.push('\n');
                block.push_str(&line);
            }
            blocks.push(block);
        }

        if !self.passed() {
            blocks.push(MISCONFIGURED_SUMMARY.to_string());
        }

        blocks.join("\n\n")
    }
}

fn annotate(text: &str, color: bool) -> String {
    if color {
        format!("\x1b[2m{text}\x1b[22m")
    } else {
        text.to_string()
    }
}

/// Runs duplicate detection and category classification.
///
/// Deprecated catalog rules are dropped before classification. Both checks
/// always run, so one pass surfaces every problem.
#[must_use]
pub fn check(catalog: &Catalog, definitions: &DefinitionSet) -> CheckReport {
    let active = catalog.without_deprecated();
    debug!(
        "Checking {} table(s) against {} active catalog rule(s) ({} deprecated)",
        definitions.table_count(),
        active.len(),
        catalog.len() - active.len()
    );

    CheckReport {
        duplicates: find_duplicates(definitions),
        classification: classify(&active, definitions),
    }
}

/// Result of [`merge_and_check`] when nothing blocks the merged table.
#[derive(Debug, Clone, PartialEq)]
pub struct MergeOutcome {
    /// The effective rule table.
    pub rules: RuleTable,
    /// The passing report, when checking was enabled.
    pub report: Option<CheckReport>,
}

/// Errors from [`merge_and_check`].
#[derive(Debug, thiserror::Error)]
pub enum CheckError {
    /// The catalog could not be loaded.
    #[error(transparent)]
    Catalog(#[from] LoadError),

    /// Verification found problems.
    #[error("{}", MISCONFIGURED_SUMMARY)]
    Misconfigured(Box<CheckReport>),
}

/// Merges the definitions and, if `mode` enables it, verifies them.
///
/// The catalog is loaded only when checking is enabled. Verification never
/// changes the merged table; it only decides whether it is returned.
///
/// # Errors
///
/// Returns [`CheckError::Catalog`] if the catalog cannot be loaded and
/// [`CheckError::Misconfigured`] if the check fails.
pub fn merge_and_check<S>(
    source: &S,
    definitions: &DefinitionSet,
    mode: CheckMode,
) -> Result<MergeOutcome, CheckError>
where
    S: CatalogSource + ?Sized,
{
    let report = if mode.is_enabled() {
        let catalog = source.load()?;
        let report = check(&catalog, definitions);
        if !report.passed() {
            return Err(CheckError::Misconfigured(Box::new(report)));
        }
        Some(report)
    } else {
        None
    };

    Ok(MergeOutcome {
        rules: merge(definitions),
        report,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{rule_table, RuleEntry, RuleMetadata};
    use std::cell::Cell;

    fn scenario() -> (Catalog, DefinitionSet) {
        let catalog = Catalog::new()
            .with_rule("a", RuleMetadata::new("problem"))
            .with_rule("b", RuleMetadata::new("suggestion"));
        let definitions = DefinitionSet::new()
            .with_category("problem", [rule_table([("a", "error")])])
            .with_category(
                "suggestion",
                [rule_table([("b", "warn")]), rule_table([("b", "off")])],
            )
            .with_category("override", []);
        (catalog, definitions)
    }

    #[test]
    fn end_to_end_scenario() {
        let (catalog, definitions) = scenario();
        let report = check(&catalog, &definitions);

        assert_eq!(
            report.duplicates().labels("b"),
            Some(vec!["suggestion[0]".to_string(), "suggestion[1]".to_string()])
        );
        assert_eq!(report.duplicates().len(), 1);
        let classification = report.classification();
        assert_eq!(classification.status_of("problem", "a"), Some(&RuleStatus::Defined));
        assert_eq!(
            classification.status_of("suggestion", "b"),
            Some(&RuleStatus::Defined)
        );
        assert!(!report.passed());

        assert_eq!(
            merge(&definitions),
            rule_table([("a", "error"), ("b", "off")])
        );
    }

    #[test]
    fn deprecated_configured_rule_becomes_unknown() {
        let catalog = Catalog::new()
            .with_rule("a", RuleMetadata::new("problem"))
            .with_rule("old", RuleMetadata::new("problem").deprecated());
        let definitions = DefinitionSet::new()
            .with_category("problem", [rule_table([("a", "error"), ("old", "error")])]);

        let report = check(&catalog, &definitions);
        assert_eq!(
            report.classification().status_of("problem", "old"),
            Some(&RuleStatus::Unknown)
        );
    }

    #[test]
    fn deprecated_unconfigured_rule_is_not_missing() {
        let catalog = Catalog::new()
            .with_rule("a", RuleMetadata::new("problem"))
            .with_rule("old", RuleMetadata::new("layout").deprecated());
        let definitions =
            DefinitionSet::new().with_category("problem", [rule_table([("a", "error")])]);

        let report = check(&catalog, &definitions);
        assert!(report.passed());
        assert!(report.classification().category("layout").is_none());
    }

    #[test]
    fn findings_cover_every_problem() {
        let catalog = Catalog::new()
            .with_rule("a", RuleMetadata::new("problem"))
            .with_rule("c", RuleMetadata::new("layout"));
        let definitions = DefinitionSet::new()
            .with_category("suggestion", [rule_table([("a", "warn"), ("typo", "warn")])])
            .with_category("override", [rule_table([("typo", "off")])]);

        let findings = check(&catalog, &definitions).findings();
        assert_eq!(
            findings,
            vec![
                Finding::DuplicateRule {
                    rule: RuleId::new("typo"),
                    locations: vec!["override[0]".to_string(), "suggestion[0]".to_string()],
                },
                Finding::MissingRule {
                    rule: RuleId::new("c"),
                    category: "layout".to_string(),
                },
                Finding::MissingRule {
                    rule: RuleId::new("a"),
                    category: "problem".to_string(),
                },
                Finding::WrongCategory {
                    rule: RuleId::new("a"),
                    category: "suggestion".to_string(),
                    expected: "problem".to_string(),
                },
            ]
        );
    }

    #[test]
    fn findings_carry_diagnostic_codes() {
        let finding = Finding::UnknownRule {
            rule: RuleId::new("typo"),
            category: "problem".to_string(),
        };
        let code = finding.code().map(|c| c.to_string());
        assert_eq!(code.as_deref(), Some("ruleset::unknown_rule"));
        assert_eq!(finding.to_string(), "rule `typo` in [problem] is not a known rule");
    }

    #[test]
    fn quiet_render_lists_only_problems() {
        let (catalog, definitions) = scenario();
        let text = check(&catalog, &definitions).render(RenderOptions::default());
        insta::assert_snapshot!(text, @r"
Duplicate rule definitions:
  b: suggestion[0], suggestion[1]

Rules are misconfigured.
");
    }

    #[test]
    fn verbose_render_lists_every_rule() {
        let (catalog, definitions) = scenario();
        let text = check(&catalog, &definitions).render(RenderOptions::for_mode(CheckMode::Verbose));
        insta::assert_snapshot!(text, @r"
Duplicate rule definitions:
  b: suggestion[0], suggestion[1]

[problem]:
✔ a (defined)

[suggestion]:
✔ b (defined)

Rules are misconfigured.
");
    }

    #[test]
    fn verbose_render_marks_overridden_rules() {
        let catalog = Catalog::new()
            .with_rule("a", RuleMetadata::new("problem"))
            .with_rule("b", RuleMetadata::new("suggestion"))
            .with_rule("c", RuleMetadata::new("layout"));
        let definitions = DefinitionSet::new()
            .with_category("problem", [rule_table([("a", "error")])])
            .with_category("override", [rule_table([("b", "off"), ("c", "off")])]);

        let report = check(&catalog, &definitions);
        assert!(report.passed());
        assert_eq!(report.render(RenderOptions::default()), "");

        let text = report.render(RenderOptions::for_mode(CheckMode::Verbose));
        insta::assert_snapshot!(text, @r"
[layout]:
- c (overridden)

[problem]:
✔ a (defined)

[suggestion]:
- b (overridden)
");
    }

    #[test]
    fn render_marks_each_problem_status() {
        let catalog = Catalog::new()
            .with_rule("a", RuleMetadata::new("problem"))
            .with_rule("c", RuleMetadata::new("layout"))
            .with_rule("d", RuleMetadata::new("layout"));
        let definitions = DefinitionSet::new()
            .with_category("layout", [rule_table([("d", "off")])])
            .with_category("suggestion", [rule_table([("a", "warn"), ("typo", "warn")])]);

        let text = check(&catalog, &definitions).render(RenderOptions::default());
        insta::assert_snapshot!(text, @r"
[layout]:
✘ c (not configured)

[problem]:
✘ a (not configured)

[suggestion]:
! a (wrong category, should be in [problem])
? typo (unknown rule)

Rules are misconfigured.
");
    }

    #[test]
    fn render_dims_annotations_with_color() {
        let catalog = Catalog::new().with_rule("c", RuleMetadata::new("layout"));
        let text = check(&catalog, &DefinitionSet::new())
            .render(RenderOptions::default().with_color(true));
        assert!(text.contains("✘ c \x1b[2m(not configured)\x1b[22m"));
    }

    #[test]
    fn passing_quiet_render_is_empty() {
        let catalog = Catalog::new().with_rule("a", RuleMetadata::new("problem"));
        let definitions =
            DefinitionSet::new().with_category("problem", [rule_table([("a", "error")])]);
        assert_eq!(check(&catalog, &definitions).render(RenderOptions::default()), "");
    }

    #[test]
    fn merge_and_check_skips_catalog_when_off() {
        let loads = Cell::new(0);
        let source = || -> Result<Catalog, LoadError> {
            loads.set(loads.get() + 1);
            Ok(Catalog::new())
        };
        let (_, definitions) = scenario();

        let outcome = merge_and_check(&source, &definitions, CheckMode::Off).unwrap();
        assert_eq!(loads.get(), 0);
        assert!(outcome.report.is_none());
        assert_eq!(outcome.rules.get("b"), Some(&RuleEntry::from("off")));
    }

    #[test]
    fn merge_and_check_fails_on_problems() {
        let (catalog, definitions) = scenario();
        let err = merge_and_check(&catalog, &definitions, CheckMode::On).unwrap_err();
        match err {
            CheckError::Misconfigured(report) => assert_eq!(report.duplicates().len(), 1),
            CheckError::Catalog(e) => panic!("unexpected catalog error: {e}"),
        }
    }

    #[test]
    fn merge_and_check_returns_passing_report() {
        let catalog = Catalog::new().with_rule("a", RuleMetadata::new("problem"));
        let definitions =
            DefinitionSet::new().with_category("problem", [rule_table([("a", "error")])]);

        let outcome = merge_and_check(&catalog, &definitions, CheckMode::Verbose).unwrap();
        assert!(outcome.report.is_some_and(|r| r.passed()));
        assert_eq!(outcome.rules, rule_table([("a", "error")]));
    }

    #[test]
    fn merge_and_check_surfaces_catalog_errors() {
        let source = || -> Result<Catalog, LoadError> {
            Err(LoadError::Unavailable {
                message: "plugin not installed".to_string(),
            })
        };
        let err = merge_and_check(&source, &DefinitionSet::new(), CheckMode::On).unwrap_err();
        assert!(matches!(err, CheckError::Catalog(LoadError::Unavailable { .. })));
    }
}
