//! Configuration types for ruleset (`ruleset.toml`).

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use crate::catalog::{CatalogFile, FileCatalog};
use crate::mode::CheckMode;
use crate::types::RuleTable;

/// Top-level configuration for ruleset.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Verification defaults.
    #[serde(default)]
    pub check: CheckConfig,

    /// Linter sections, in output order.
    #[serde(default, rename = "section")]
    pub sections: Vec<SectionConfig>,
}

impl Config {
    /// Creates a new default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::parse(&content)
    }

    /// Parses and validates configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid or a section is malformed.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Checks section invariants: unique non-empty names, non-empty file
    /// globs, and exactly one of `categories` or `rules`.
    ///
    /// # Errors
    ///
    /// Returns the first invalid section.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut names = HashSet::new();

        for (index, section) in self.sections.iter().enumerate() {
            let context = format!("section[{index}]");
            if section.name.trim().is_empty() {
                return Err(ConfigError::Validation {
                    context: format!("{context}.name"),
                    message: "must not be empty".to_string(),
                });
            }
            if !names.insert(section.name.as_str()) {
                return Err(ConfigError::Validation {
                    context: format!("{context}.name"),
                    message: format!("duplicate section name `{}`", section.name),
                });
            }
            if section.files.is_empty() {
                return Err(ConfigError::Validation {
                    context: format!("{context}.files"),
                    message: "must list at least one glob".to_string(),
                });
            }
            if section.categories.is_some() == section.rules.is_some() {
                return Err(ConfigError::Validation {
                    context,
                    message: format!(
                        "{}: exactly one of `categories` or `rules` must be set",
                        section.name
                    ),
                });
            }
        }

        Ok(())
    }

    /// Looks up a section by name.
    #[must_use]
    pub fn section(&self, name: &str) -> Option<&SectionConfig> {
        self.sections.iter().find(|s| s.name == name)
    }
}

/// Verification defaults; the `CHECK_RULES` environment variable and CLI
/// flags take precedence.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct CheckConfig {
    /// Default check mode.
    #[serde(default)]
    pub mode: CheckMode,
}

/// One block of the assembled linter configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SectionConfig {
    /// Unique section name, used in diagnostics.
    pub name: String,

    /// File globs the section applies to.
    #[serde(default)]
    pub files: Vec<String>,

    /// Plugins the section enables.
    #[serde(default)]
    pub plugins: Vec<String>,

    /// Catalog files describing the rules known for this section.
    #[serde(default)]
    pub catalogs: Vec<CatalogFile>,

    /// Category -> rule table paths or globs, relative to the config file.
    #[serde(default)]
    pub categories: Option<BTreeMap<String, Vec<String>>>,

    /// Inline rule table, applied as-is without verification.
    #[serde(default)]
    pub rules: Option<RuleTable>,
}

/// How a section supplies its rules.
#[derive(Debug, Clone, Copy)]
pub enum SectionRules<'a> {
    /// Categorized rule table files, merged and verifiable.
    Categorized(&'a BTreeMap<String, Vec<String>>),
    /// A plain inline rule table.
    Plain(&'a RuleTable),
}

impl SectionConfig {
    /// Returns how this section supplies its rules.
    ///
    /// Validated configs always set exactly one source; an unvalidated
    /// section with both prefers `categories`, and one with neither is an
    /// empty plain table.
    #[must_use]
    pub fn rules(&self) -> SectionRules<'_> {
        static EMPTY: RuleTable = RuleTable::new();
        match (&self.categories, &self.rules) {
            (Some(categories), _) => SectionRules::Categorized(categories),
            (None, Some(rules)) => SectionRules::Plain(rules),
            (None, None) => SectionRules::Plain(&EMPTY),
        }
    }

    /// Returns the catalog source for this section, resolving paths
    /// against `base`.
    #[must_use]
    pub fn catalog_source(&self, base: &Path) -> FileCatalog {
        FileCatalog::new(base, &self.catalogs)
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO error reading config file.
    #[error("Failed to read config file {path}: {source}")]
    Io {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// Parse error in config file.
    #[error("Failed to parse config: {message}")]
    Parse {
        /// Parse error message.
        message: String,
    },

    /// A section violates a config invariant.
    #[error("Invalid config at {context}: {message}")]
    Validation {
        /// Where the error occurred (e.g. "section[0].files").
        context: String,
        /// What is wrong.
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
[check]
mode = "verbose"

[[section]]
name = "typescript"
files = ["**/*.{js,ts}"]
plugins = ["@typescript-eslint"]
catalogs = [
  { path = "catalogs/core.json" },
  { path = "catalogs/ts.json", prefix = "@typescript-eslint" },
]

[section.categories]
problem = ["rules/core/problem.toml", "rules/*/problem.toml"]
override = []

[[section]]
name = "javascript"
files = ["**/*.js"]
rules = { "no-var" = "error", "no-cond-assign" = ["error", "except-parens"] }
"#;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.check.mode, CheckMode::Off);
        assert!(config.sections.is_empty());
    }

    #[test]
    fn test_parse_config() {
        let config = Config::parse(SAMPLE).expect("Failed to parse");
        assert_eq!(config.check.mode, CheckMode::Verbose);
        assert_eq!(config.sections.len(), 2);

        let ts = config.section("typescript").unwrap();
        assert_eq!(ts.catalogs[1].prefix.as_deref(), Some("@typescript-eslint"));
        match ts.rules() {
            SectionRules::Categorized(categories) => {
                assert_eq!(categories["problem"].len(), 2);
                assert!(categories["override"].is_empty());
            }
            SectionRules::Plain(_) => panic!("expected categorized section"),
        }

        let js = config.section("javascript").unwrap();
        assert!(matches!(js.rules(), SectionRules::Plain(rules) if rules.len() == 2));
    }

    #[test]
    fn rejects_section_with_both_sources() {
        let err = Config::parse(
            r#"
[[section]]
name = "both"
files = ["*.js"]
rules = { "no-var" = "error" }
categories = { problem = ["p.toml"] }
"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("exactly one of"));
    }

    #[test]
    fn rejects_section_without_sources() {
        let err = Config::parse("[[section]]\nname = \"none\"\nfiles = [\"*.js\"]\n").unwrap_err();
        assert!(matches!(err, ConfigError::Validation { .. }));
    }

    #[test]
    fn rejects_duplicate_section_names() {
        let err = Config::parse(
            r#"
[[section]]
name = "js"
files = ["*.js"]
rules = {}

[[section]]
name = "js"
files = ["*.cjs"]
rules = {}
"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("section[1].name"));
    }

    #[test]
    fn rejects_section_without_files() {
        let err = Config::parse("[[section]]\nname = \"js\"\nrules = {}\n").unwrap_err();
        assert!(err.to_string().contains("section[0].files"));
    }

    #[test]
    fn rejects_unknown_check_mode() {
        let err = Config::parse("[check]\nmode = \"loud\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}
