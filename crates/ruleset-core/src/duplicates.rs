//! Detection of rules configured in more than one place.

use std::collections::BTreeMap;
use std::fmt;

use crate::definitions::DefinitionSet;
use crate::types::RuleId;

/// Position of a rule table: category name plus index in that category.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RuleLocation {
    /// Category holding the table.
    pub category: String,
    /// Index of the table within the category.
    pub index: usize,
}

impl RuleLocation {
    /// Creates a location.
    #[must_use]
    pub fn new(category: impl Into<String>, index: usize) -> Self {
        Self {
            category: category.into(),
            index,
        }
    }
}

impl fmt::Display for RuleLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.category, self.index)
    }
}

/// Rules configured more than once, with every location they appear at.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Duplicates(BTreeMap<RuleId, Vec<RuleLocation>>);

impl Duplicates {
    /// Returns `true` if no rule is duplicated.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the number of duplicated rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns the locations of a duplicated rule.
    #[must_use]
    pub fn get(&self, rule: &str) -> Option<&[RuleLocation]> {
        self.0.get(rule).map(Vec::as_slice)
    }

    /// Returns the location labels (`category[index]`) of a duplicated rule.
    #[must_use]
    pub fn labels(&self, rule: &str) -> Option<Vec<String>> {
        self.get(rule)
            .map(|locations| locations.iter().map(ToString::to_string).collect())
    }

    /// Iterates over duplicated rules in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = (&RuleId, &[RuleLocation])> {
        self.0.iter().map(|(rule, locations)| (rule, locations.as_slice()))
    }
}

/// Finds every rule configured at more than one `(category, index)` location.
///
/// All categories count, `override` included: a rule listed under
/// `override` and under its own category is reported. Repeats across
/// tables of the same category are reported as well.
#[must_use]
pub fn find_duplicates(definitions: &DefinitionSet) -> Duplicates {
    let mut seen_at: BTreeMap<RuleId, Vec<RuleLocation>> = BTreeMap::new();

    for (category, tables) in definitions.categories() {
        for (index, table) in tables.iter().enumerate() {
            for rule in table.keys() {
                seen_at
                    .entry(rule.clone())
                    .or_default()
                    .push(RuleLocation::new(category, index));
            }
        }
    }

    seen_at.retain(|_, locations| locations.len() > 1);
    Duplicates(seen_at)
}
