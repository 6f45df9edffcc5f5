//! Flattening a definition set into the effective rule table.

use tracing::debug;

use crate::definitions::DefinitionSet;
use crate::types::RuleTable;

/// Flattens all categories into one rule table.
///
/// Categories are visited in name order and tables in list order; a later
/// entry replaces an earlier one for the same rule. Category boundaries are
/// ignored and nothing is validated.
#[must_use]
pub fn merge(definitions: &DefinitionSet) -> RuleTable {
    let mut merged = RuleTable::new();
    for (_, tables) in definitions.categories() {
        for table in tables {
            merged.extend(table.iter().map(|(rule, entry)| (rule.clone(), entry.clone())));
        }
    }

    debug!(
        "Merged {} table(s) into {} rule(s)",
        definitions.table_count(),
        merged.len()
    );
    merged
}
