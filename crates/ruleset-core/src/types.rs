//! Core types for rule identifiers, entries and rule tables.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::collections::BTreeMap;
use std::fmt;

/// Category whose rules are exempt from classification checks.
///
/// Rules listed here intentionally supersede a default from another tool
/// (e.g. disabling a core rule in favour of a plugin-specific one).
pub const OVERRIDE_CATEGORY: &str = "override";

/// Category assigned to catalog rules that declare no type.
pub const UNKNOWN_CATEGORY: &str = "unknown";

/// Identifier of a lint rule, optionally namespaced by a plugin prefix.
///
/// Examples: `no-var`, `import/order`, `@typescript-eslint/no-shadow`.
/// Equality is exact string match.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleId(String);

impl RuleId {
    /// Creates a rule identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Creates a rule identifier namespaced by a plugin prefix (`prefix/name`).
    #[must_use]
    pub fn namespaced(prefix: &str, name: &str) -> Self {
        Self(format!("{prefix}/{name}"))
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the plugin prefix, if the identifier is namespaced.
    #[must_use]
    pub fn plugin(&self) -> Option<&str> {
        self.0.rsplit_once('/').map(|(plugin, _)| plugin)
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for RuleId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for RuleId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for RuleId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Configured severity and options of a rule, e.g. `"error"` or
/// `["error", "except-parens"]`.
///
/// Opaque to the checker: only its presence and position matter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleEntry(serde_json::Value);

impl RuleEntry {
    /// Creates an entry from any JSON-compatible value.
    #[must_use]
    pub fn new(value: impl Into<serde_json::Value>) -> Self {
        Self(value.into())
    }

    /// Returns the underlying value.
    #[must_use]
    pub fn as_value(&self) -> &serde_json::Value {
        &self.0
    }
}

impl From<&str> for RuleEntry {
    fn from(severity: &str) -> Self {
        Self::new(severity)
    }
}

impl From<serde_json::Value> for RuleEntry {
    fn from(value: serde_json::Value) -> Self {
        Self(value)
    }
}

/// One authored rule table: rule identifier to configured entry.
pub type RuleTable = BTreeMap<RuleId, RuleEntry>;

/// Builds a [`RuleTable`] from `(rule, entry)` pairs.
///
/// ```
/// use ruleset_core::rule_table;
///
/// let table = rule_table([("no-var", "error"), ("eqeqeq", "warn")]);
/// assert_eq!(table.len(), 2);
/// ```
pub fn rule_table<I, K, V>(entries: I) -> RuleTable
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<RuleId>,
    V: Into<RuleEntry>,
{
    entries
        .into_iter()
        .map(|(rule, entry)| (rule.into(), entry.into()))
        .collect()
}

/// Metadata of a rule known to the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleMetadata {
    /// Classification bucket (e.g. "problem", "suggestion", "layout").
    ///
    /// Spelled `type` in catalog files, matching the linter's own rule
    /// metadata; `category` is accepted as well.
    #[serde(rename = "type", alias = "category", default = "default_category")]
    pub category: String,

    /// Deprecated rules are treated as if they were not in the catalog.
    #[serde(default)]
    pub deprecated: bool,
}

impl RuleMetadata {
    /// Creates metadata for an active rule in the given category.
    #[must_use]
    pub fn new(category: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            deprecated: false,
        }
    }

    /// Marks the rule as deprecated.
    #[must_use]
    pub fn deprecated(mut self) -> Self {
        self.deprecated = true;
        self
    }
}

fn default_category() -> String {
    UNKNOWN_CATEGORY.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plugin_prefix_of_namespaced_rule() {
        assert_eq!(
            RuleId::new("@typescript-eslint/no-shadow").plugin(),
            Some("@typescript-eslint")
        );
        assert_eq!(RuleId::new("import/order").plugin(), Some("import"));
        assert_eq!(RuleId::new("no-var").plugin(), None);
    }

    #[test]
    fn namespaced_joins_with_slash() {
        assert_eq!(RuleId::namespaced("react", "jsx-key").as_str(), "react/jsx-key");
    }

    #[test]
    fn metadata_defaults_to_unknown_category() {
        let meta: RuleMetadata = serde_json::from_str("{}").unwrap();
        assert_eq!(meta.category, UNKNOWN_CATEGORY);
        assert!(!meta.deprecated);
    }

    #[test]
    fn metadata_accepts_category_alias() {
        let meta: RuleMetadata =
            serde_json::from_str(r#"{"category": "layout", "deprecated": true}"#).unwrap();
        assert_eq!(meta, RuleMetadata::new("layout").deprecated());
    }

    #[test]
    fn entries_keep_options_verbatim() {
        let table: RuleTable =
            toml::from_str(r#""no-cond-assign" = ["error", "except-parens"]"#).unwrap();
        let entry = table.get("no-cond-assign").unwrap();
        assert_eq!(
            entry.as_value(),
            &serde_json::json!(["error", "except-parens"])
        );
    }
}
