//! Assembling the complete linter configuration from a [`Config`].

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::catalog::{Catalog, CatalogSource};
use crate::config::{Config, SectionConfig, SectionRules};
use crate::definitions::DefinitionSet;
use crate::loader::{load_definitions, LoadError};
use crate::merge::merge;
use crate::mode::CheckMode;
use crate::report::{merge_and_check, CheckError, CheckReport};
use crate::types::RuleTable;

/// The assembled linter configuration, one entry per section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LinterConfig {
    /// Sections in config order.
    pub overrides: Vec<LinterSection>,
}

/// Effective rules for one set of file globs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinterSection {
    /// File globs the rules apply to.
    pub files: Vec<String>,
    /// Plugins to enable.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub plugins: Vec<String>,
    /// Effective rule table.
    pub rules: RuleTable,
}

/// The check report of one section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionReport {
    /// Section name.
    pub section: String,
    /// Its consistency report.
    pub report: CheckReport,
}

/// Successful assembly.
#[derive(Debug, Clone, Default)]
pub struct Assembled {
    /// The linter configuration.
    pub config: LinterConfig,
    /// Passing reports of verified sections (empty when checking is off).
    pub reports: Vec<SectionReport>,
    /// Categorized sections left unverified because they have no catalogs.
    pub skipped: Vec<String>,
}

/// Errors during assembly.
#[derive(Debug, thiserror::Error)]
pub enum AssembleError {
    /// A rule table or catalog could not be loaded.
    #[error("section `{section}`: {source}")]
    Load {
        /// Section being assembled.
        section: String,
        /// Underlying load error.
        source: LoadError,
    },

    /// The requested section does not exist.
    #[error("no section named `{name}`")]
    UnknownSection {
        /// The requested name.
        name: String,
    },

    /// Verification failed for one or more sections.
    #[error("Rules are misconfigured in {} section(s)", .failed.len())]
    Misconfigured {
        /// Failing reports, in section order.
        failed: Vec<SectionReport>,
        /// Passing reports of the other verified sections.
        passed: Vec<SectionReport>,
    },
}

/// Builder-style driver for assembling a [`Config`].
#[derive(Debug, Clone)]
pub struct Assembler<'a> {
    config: &'a Config,
    base_dir: PathBuf,
    mode: CheckMode,
    only: Option<String>,
}

impl<'a> Assembler<'a> {
    /// Creates an assembler; relative paths resolve against `base_dir`
    /// (normally the config file's directory). Checking is off by default.
    #[must_use]
    pub fn new(config: &'a Config, base_dir: impl Into<PathBuf>) -> Self {
        Self {
            config,
            base_dir: base_dir.into(),
            mode: CheckMode::Off,
            only: None,
        }
    }

    /// Sets the check mode.
    #[must_use]
    pub fn mode(mut self, mode: CheckMode) -> Self {
        self.mode = mode;
        self
    }

    /// Restricts assembly to one section.
    #[must_use]
    pub fn section(mut self, name: impl Into<String>) -> Self {
        self.only = Some(name.into());
        self
    }

    /// Assembles every selected section.
    ///
    /// All rule tables and catalogs are loaded before anything is verified,
    /// then every section is evaluated before verification failures are
    /// reported, so one run surfaces all drift.
    ///
    /// # Errors
    ///
    /// Returns [`AssembleError::Load`] on the first load failure,
    /// [`AssembleError::UnknownSection`] for a bad section filter, and
    /// [`AssembleError::Misconfigured`] if any section fails verification.
    pub fn run(&self) -> Result<Assembled, AssembleError> {
        let sections: Vec<&SectionConfig> = match &self.only {
            Some(name) => vec![self
                .config
                .section(name)
                .ok_or_else(|| AssembleError::UnknownSection { name: name.clone() })?],
            None => self.config.sections.iter().collect(),
        };

        let inputs = sections
            .iter()
            .map(|&section| self.load_section(section))
            .collect::<Result<Vec<_>, _>>()?;

        let mut assembled = Assembled::default();
        let mut failed = Vec::new();

        for (section, input) in sections.into_iter().zip(inputs) {
            let rules = match input {
                SectionInput::Plain(rules) => {
                    debug!("Section `{}`: {} inline rule(s)", section.name, rules.len());
                    rules.clone()
                }
                SectionInput::Categorized {
                    definitions,
                    catalog: None,
                } => {
                    if self.mode.is_enabled() {
                        warn!(
                            "Section `{}` has no catalogs; skipping verification",
                            section.name
                        );
                        assembled.skipped.push(section.name.clone());
                    }
                    merge(&definitions)
                }
                SectionInput::Categorized {
                    definitions,
                    catalog: Some(catalog),
                } => match merge_and_check(&catalog, &definitions, self.mode) {
                    Ok(outcome) => {
                        assembled
                            .reports
                            .extend(outcome.report.map(|report| SectionReport {
                                section: section.name.clone(),
                                report,
                            }));
                        outcome.rules
                    }
                    Err(CheckError::Misconfigured(report)) => {
                        failed.push(SectionReport {
                            section: section.name.clone(),
                            report: *report,
                        });
                        continue;
                    }
                    Err(CheckError::Catalog(source)) => {
                        return Err(AssembleError::Load {
                            section: section.name.clone(),
                            source,
                        })
                    }
                },
            };

            assembled.config.overrides.push(LinterSection {
                files: section.files.clone(),
                plugins: section.plugins.clone(),
                rules,
            });
        }

        if !failed.is_empty() {
            return Err(AssembleError::Misconfigured {
                failed,
                passed: assembled.reports,
            });
        }

        info!(
            "Assembled {} section(s) (check mode: {})",
            assembled.config.overrides.len(),
            self.mode
        );
        Ok(assembled)
    }

    /// Loads the rule tables of one section and, when it will be verified,
    /// its catalog.
    fn load_section<'c>(
        &self,
        section: &'c SectionConfig,
    ) -> Result<SectionInput<'c>, AssembleError> {
        let categories = match section.rules() {
            SectionRules::Plain(rules) => return Ok(SectionInput::Plain(rules)),
            SectionRules::Categorized(categories) => categories,
        };

        let load_error = |source| AssembleError::Load {
            section: section.name.clone(),
            source,
        };

        let definitions = load_definitions(&self.base_dir, categories).map_err(load_error)?;
        let source = section.catalog_source(&self.base_dir);
        let catalog = if self.mode.is_enabled() && !source.is_empty() {
            Some(source.load().map_err(load_error)?)
        } else {
            None
        };

        Ok(SectionInput::Categorized {
            definitions,
            catalog,
        })
    }
}

enum SectionInput<'c> {
    Plain(&'c RuleTable),
    Categorized {
        definitions: DefinitionSet,
        catalog: Option<Catalog>,
    },
}

/// Assembles every section of `config` with the given check mode.
///
/// # Errors
///
/// See [`Assembler::run`].
pub fn assemble(
    config: &Config,
    base_dir: &Path,
    mode: CheckMode,
) -> Result<Assembled, AssembleError> {
    Assembler::new(config, base_dir).mode(mode).run()
}
