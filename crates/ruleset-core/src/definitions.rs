//! The developer-authored rule definitions, grouped by category.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::types::{RuleId, RuleTable};

/// Ordered list of rule tables authored for one category.
pub type CategoryTable = Vec<RuleTable>;

/// Category name -> ordered list of partial rule tables.
///
/// Categories iterate in lexicographic order of their names; tables inside
/// a category keep their insertion order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DefinitionSet {
    categories: BTreeMap<String, CategoryTable>,
}

impl DefinitionSet {
    /// Creates an empty definition set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds tables to a category, after any tables it already holds.
    #[must_use]
    pub fn with_category<I>(mut self, category: impl Into<String>, tables: I) -> Self
    where
        I: IntoIterator<Item = RuleTable>,
    {
        self.categories
            .entry(category.into())
            .or_default()
            .extend(tables);
        self
    }

    /// Appends one table to a category.
    pub fn push(&mut self, category: impl Into<String>, table: RuleTable) {
        self.categories
            .entry(category.into())
            .or_default()
            .push(table);
    }

    /// Makes sure a category exists, even without tables.
    pub fn ensure_category(&mut self, category: &str) {
        if !self.categories.contains_key(category) {
            self.categories.insert(category.to_string(), Vec::new());
        }
    }

    /// Iterates over categories and their tables.
    pub fn categories(&self) -> impl Iterator<Item = (&str, &[RuleTable])> {
        self.categories
            .iter()
            .map(|(name, tables)| (name.as_str(), tables.as_slice()))
    }

    /// Iterates over category names.
    pub fn category_names(&self) -> impl Iterator<Item = &str> {
        self.categories.keys().map(String::as_str)
    }

    /// Returns the tables of one category.
    #[must_use]
    pub fn category(&self, name: &str) -> Option<&[RuleTable]> {
        self.categories.get(name).map(Vec::as_slice)
    }

    /// Returns the set of rules configured anywhere in one category.
    #[must_use]
    pub fn rules_in(&self, category: &str) -> BTreeSet<&RuleId> {
        self.categories
            .get(category)
            .into_iter()
            .flatten()
            .flat_map(RuleTable::keys)
            .collect()
    }

    /// Returns the number of tables across all categories.
    #[must_use]
    pub fn table_count(&self) -> usize {
        self.categories.values().map(Vec::len).sum()
    }

    /// Returns `true` if no category holds any table.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.table_count() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::rule_table;

    #[test]
    fn categories_iterate_by_name() {
        let definitions = DefinitionSet::new()
            .with_category("suggestion", [rule_table([("b", "warn")])])
            .with_category("layout", [rule_table([("c", "off")])])
            .with_category("problem", [rule_table([("a", "error")])]);

        let names: Vec<_> = definitions.category_names().collect();
        assert_eq!(names, vec!["layout", "problem", "suggestion"]);
    }

    #[test]
    fn tables_keep_insertion_order() {
        let mut definitions = DefinitionSet::new();
        definitions.push("problem", rule_table([("first", "error")]));
        definitions.push("problem", rule_table([("second", "error")]));

        let tables = definitions.category("problem").unwrap();
        assert!(tables[0].contains_key("first"));
        assert!(tables[1].contains_key("second"));
    }

    #[test]
    fn rules_in_flattens_tables() {
        let definitions = DefinitionSet::new().with_category(
            "problem",
            [
                rule_table([("a", "error"), ("b", "error")]),
                rule_table([("b", "off"), ("c", "warn")]),
            ],
        );

        let rules: Vec<_> = definitions
            .rules_in("problem")
            .into_iter()
            .map(RuleId::as_str)
            .collect();
        assert_eq!(rules, vec!["a", "b", "c"]);
        assert!(definitions.rules_in("layout").is_empty());
    }

    #[test]
    fn empty_category_is_still_listed() {
        let mut definitions = DefinitionSet::new();
        definitions.ensure_category("override");
        assert!(definitions.is_empty());
        assert_eq!(definitions.category_names().count(), 1);
    }
}
