//! # ruleset-core
//!
//! Assembly and consistency checking of categorized lint rule sets.
//!
//! Rule sets are authored as many small rule tables grouped by category
//! (`problem`, `suggestion`, `layout`, ... plus the special `override`
//! category). This crate provides:
//!
//! - [`merge`] to flatten a [`DefinitionSet`] into the effective rule table
//! - [`find_duplicates`] to find rules configured in more than one table
//! - [`classify`] to cross-reference configured rules with a [`Catalog`]
//! - [`check`] / [`CheckReport`] to aggregate both into a pass/fail report
//! - [`merge_and_check`] as the single entry point, gated by a [`CheckMode`]
//! - [`Config`] / [`Assembler`] to build a whole linter configuration from
//!   `ruleset.toml`
//!
//! ## Example
//!
//! ```
//! use ruleset_core::{merge_and_check, rule_table, Catalog, CheckMode, DefinitionSet, RuleMetadata};
//!
//! let catalog = Catalog::new().with_rule("for-direction", RuleMetadata::new("problem"));
//! let definitions = DefinitionSet::new()
//!     .with_category("problem", [rule_table([("for-direction", "error")])]);
//!
//! let outcome = merge_and_check(&catalog, &definitions, CheckMode::On).unwrap();
//! assert!(outcome.report.is_some_and(|r| r.passed()));
//! assert_eq!(outcome.rules.len(), 1);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod assemble;
mod catalog;
mod classify;
mod config;
mod definitions;
mod duplicates;
mod merge;
mod mode;
mod report;
mod types;

/// Reading rule tables and catalogs from disk.
pub mod loader;

pub use assemble::{
    assemble, AssembleError, Assembled, Assembler, LinterConfig, LinterSection, SectionReport,
};
pub use catalog::{Catalog, CatalogFile, CatalogSource, FileCatalog};
pub use classify::{classify, CategoryReport, Classification, RuleStatus};
pub use config::{CheckConfig, Config, ConfigError, SectionConfig, SectionRules};
pub use definitions::{CategoryTable, DefinitionSet};
pub use duplicates::{find_duplicates, Duplicates, RuleLocation};
pub use loader::LoadError;
pub use merge::merge;
pub use mode::{CheckMode, ParseCheckModeError};
pub use report::{
    check, merge_and_check, CheckError, CheckReport, Finding, MergeOutcome, RenderOptions,
    MISCONFIGURED_EXIT_CODE, MISCONFIGURED_SUMMARY,
};
pub use types::{
    rule_table, RuleEntry, RuleId, RuleMetadata, RuleTable, OVERRIDE_CATEGORY, UNKNOWN_CATEGORY,
};
