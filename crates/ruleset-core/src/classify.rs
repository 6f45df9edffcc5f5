//! Cross-referencing configured rules against catalog categories.

use std::collections::BTreeSet;
use std::fmt;

use crate::catalog::Catalog;
use crate::definitions::DefinitionSet;
use crate::types::{RuleId, OVERRIDE_CATEGORY};

/// Classification outcome of one rule within one category.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RuleStatus {
    /// Listed in the override category; exempt from checks.
    Overridden,
    /// Configured in the category the catalog assigns it to.
    Defined,
    /// Known to the catalog, but configured in another category.
    WrongType {
        /// Category the catalog assigns the rule to.
        expected: String,
    },
    /// Configured, but not in the catalog.
    Unknown,
    /// In the catalog for this category, but not configured.
    Missing,
}

impl RuleStatus {
    /// Returns `true` for statuses that fail the check.
    #[must_use]
    pub fn is_problem(&self) -> bool {
        matches!(self, Self::WrongType { .. } | Self::Unknown | Self::Missing)
    }

    /// Returns the kebab-case status name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Overridden => "overridden",
            Self::Defined => "defined",
            Self::WrongType { .. } => "wrong-type",
            Self::Unknown => "unknown",
            Self::Missing => "missing",
        }
    }
}

impl fmt::Display for RuleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classification of every rule relevant to one category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryReport {
    /// Category name.
    pub category: String,
    /// Rules in identifier order with their status.
    pub rules: Vec<(RuleId, RuleStatus)>,
}

impl CategoryReport {
    /// Returns `true` if any rule has a failing status.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.rules.iter().any(|(_, status)| status.is_problem())
    }

    /// Returns the status of a rule in this category.
    #[must_use]
    pub fn status_of(&self, rule: &str) -> Option<&RuleStatus> {
        self.rules
            .iter()
            .find(|(id, _)| id.as_str() == rule)
            .map(|(_, status)| status)
    }
}

/// Per-category classification results.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classification {
    categories: Vec<CategoryReport>,
}

impl Classification {
    /// Returns `true` if any category failed.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.categories.iter().any(CategoryReport::has_errors)
    }

    /// Returns the category reports in name order.
    #[must_use]
    pub fn categories(&self) -> &[CategoryReport] {
        &self.categories
    }

    /// Returns the report for one category.
    #[must_use]
    pub fn category(&self, name: &str) -> Option<&CategoryReport> {
        self.categories.iter().find(|c| c.category == name)
    }

    /// Returns the status of a rule in a category.
    #[must_use]
    pub fn status_of(&self, category: &str, rule: &str) -> Option<&RuleStatus> {
        self.category(category)?.status_of(rule)
    }
}

/// Classifies configured rules against the catalog.
///
/// `catalog` must already have deprecated rules removed. The override
/// category is not classified itself; it only exempts its rules everywhere.
/// Every category known to either side is reported, in name order.
#[must_use]
pub fn classify(catalog: &Catalog, definitions: &DefinitionSet) -> Classification {
    let known_by_category = catalog.by_category();
    let overrides = definitions.rules_in(OVERRIDE_CATEGORY);

    let mut all_categories: BTreeSet<&str> = known_by_category.keys().copied().collect();
    all_categories.extend(definitions.category_names());
    all_categories.remove(OVERRIDE_CATEGORY);

    let no_rules = BTreeSet::new();
    let categories = all_categories
        .into_iter()
        .map(|category| {
            let known = known_by_category.get(category).unwrap_or(&no_rules);
            let defined = definitions.rules_in(category);

            let rules = known
                .union(&defined)
                .map(|&rule| {
                    let status = if overrides.contains(rule) {
                        RuleStatus::Overridden
                    } else if !defined.contains(rule) {
                        RuleStatus::Missing
                    } else if known.contains(rule) {
                        RuleStatus::Defined
                    } else if let Some(expected) = catalog.category_of(rule.as_str()) {
                        RuleStatus::WrongType {
                            expected: expected.to_string(),
                        }
                    } else {
                        RuleStatus::Unknown
                    };
                    (rule.clone(), status)
                })
                .collect();

            CategoryReport {
                category: category.to_string(),
                rules,
            }
        })
        .collect();

    Classification { categories }
}
