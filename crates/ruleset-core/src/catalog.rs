//! The catalog of rules a linting toolchain makes available.
//!
//! The checker never introspects the linter itself: callers inject a
//! [`CatalogSource`], which is only asked for rules when verification is
//! enabled.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::loader::{read_document, LoadError};
use crate::types::{RuleId, RuleMetadata};

/// Rule identifier -> metadata for every rule the toolchain knows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    rules: BTreeMap<RuleId, RuleMetadata>,
}

impl Catalog {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads a catalog file (`.toml` or `.json`).
    ///
    /// The document holds a `rules` table mapping rule names to
    /// `{ type, deprecated }`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self, LoadError> {
        let catalog: Self = read_document(path)?;
        debug!("Loaded {} catalog rule(s) from {}", catalog.len(), path.display());
        Ok(catalog)
    }

    /// Adds or replaces a rule.
    pub fn insert(&mut self, rule: impl Into<RuleId>, metadata: RuleMetadata) {
        self.rules.insert(rule.into(), metadata);
    }

    /// Builder-style [`Catalog::insert`].
    #[must_use]
    pub fn with_rule(mut self, rule: impl Into<RuleId>, metadata: RuleMetadata) -> Self {
        self.insert(rule, metadata);
        self
    }

    /// Adds every rule of `other`, replacing rules with the same identifier.
    pub fn extend(&mut self, other: Self) {
        self.rules.extend(other.rules);
    }

    /// Namespaces every rule with a plugin prefix (`prefix/rule`).
    #[must_use]
    pub fn prefixed(self, prefix: &str) -> Self {
        self.rules
            .into_iter()
            .map(|(rule, meta)| (RuleId::namespaced(prefix, rule.as_str()), meta))
            .collect()
    }

    /// Returns a copy with deprecated rules removed.
    ///
    /// Deprecated rules are treated as if they no longer exist.
    #[must_use]
    pub fn without_deprecated(&self) -> Self {
        self.rules
            .iter()
            .filter(|(_, meta)| !meta.deprecated)
            .map(|(rule, meta)| (rule.clone(), meta.clone()))
            .collect()
    }

    /// Returns metadata for a rule.
    #[must_use]
    pub fn get(&self, rule: &str) -> Option<&RuleMetadata> {
        self.rules.get(rule)
    }

    /// Returns `true` if the catalog knows the rule.
    #[must_use]
    pub fn contains(&self, rule: &str) -> bool {
        self.rules.contains_key(rule)
    }

    /// Returns the catalog category of a rule.
    #[must_use]
    pub fn category_of(&self, rule: &str) -> Option<&str> {
        self.get(rule).map(|meta| meta.category.as_str())
    }

    /// Groups rule identifiers by catalog category.
    #[must_use]
    pub fn by_category(&self) -> BTreeMap<&str, BTreeSet<&RuleId>> {
        let mut by_category: BTreeMap<&str, BTreeSet<&RuleId>> = BTreeMap::new();
        for (rule, meta) in &self.rules {
            by_category
                .entry(meta.category.as_str())
                .or_default()
                .insert(rule);
        }
        by_category
    }

    /// Iterates over rules in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = (&RuleId, &RuleMetadata)> {
        self.rules.iter()
    }

    /// Returns the number of rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns `true` if the catalog has no rules.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl FromIterator<(RuleId, RuleMetadata)> for Catalog {
    fn from_iter<T: IntoIterator<Item = (RuleId, RuleMetadata)>>(iter: T) -> Self {
        Self {
            rules: iter.into_iter().collect(),
        }
    }
}

/// Injected provider of the rule catalog.
pub trait CatalogSource {
    /// Loads the current catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog cannot be produced.
    fn load(&self) -> Result<Catalog, LoadError>;
}

impl CatalogSource for Catalog {
    fn load(&self) -> Result<Catalog, LoadError> {
        Ok(self.clone())
    }
}

impl<F> CatalogSource for F
where
    F: Fn() -> Result<Catalog, LoadError>,
{
    fn load(&self) -> Result<Catalog, LoadError> {
        self()
    }
}

/// One catalog file, optionally namespaced by a plugin prefix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogFile {
    /// Path to the `.toml` or `.json` catalog.
    pub path: PathBuf,

    /// Plugin prefix prepended to every rule (e.g. `@typescript-eslint`).
    #[serde(default)]
    pub prefix: Option<String>,
}

impl CatalogFile {
    /// Creates an un-prefixed catalog file reference.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            prefix: None,
        }
    }

    /// Sets the plugin prefix.
    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }
}

/// A catalog assembled from several files, later files winning.
#[derive(Debug, Clone, Default)]
pub struct FileCatalog {
    files: Vec<CatalogFile>,
}

impl FileCatalog {
    /// Creates a catalog source from file references, resolving relative
    /// paths against `base`.
    #[must_use]
    pub fn new(base: &Path, files: &[CatalogFile]) -> Self {
        let files = files
            .iter()
            .map(|file| CatalogFile {
                path: base.join(&file.path),
                prefix: file.prefix.clone(),
            })
            .collect();
        Self { files }
    }

    /// Returns `true` if no catalog file is configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl CatalogSource for FileCatalog {
    fn load(&self) -> Result<Catalog, LoadError> {
        let mut catalog = Catalog::new();
        for file in &self.files {
            let part = Catalog::from_file(&file.path)?;
            match &file.prefix {
                Some(prefix) => catalog.extend(part.prefixed(prefix)),
                None => catalog.extend(part),
            }
        }
        Ok(catalog)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn sample() -> Catalog {
        Catalog::new()
            .with_rule("for-direction", RuleMetadata::new("problem"))
            .with_rule("eqeqeq", RuleMetadata::new("suggestion"))
            .with_rule("indent", RuleMetadata::new("layout").deprecated())
    }

    #[test]
    fn without_deprecated_drops_rules() {
        let catalog = sample().without_deprecated();
        assert_eq!(catalog.len(), 2);
        assert!(!catalog.contains("indent"));
    }

    #[test]
    fn by_category_groups_rules() {
        let catalog = sample();
        let grouped = catalog.by_category();
        assert_eq!(grouped.len(), 3);
        assert!(grouped["problem"].contains(&RuleId::new("for-direction")));
    }

    #[test]
    fn prefixed_namespaces_rules() {
        let catalog = Catalog::new()
            .with_rule("order", RuleMetadata::new("suggestion"))
            .prefixed("import");
        assert_eq!(catalog.category_of("import/order"), Some("suggestion"));
        assert!(!catalog.contains("order"));
    }

    #[test]
    fn closures_are_catalog_sources() {
        let source = || -> Result<Catalog, LoadError> { Ok(sample()) };
        assert_eq!(source.load().unwrap(), sample());
    }

    #[test]
    fn file_catalog_combines_files() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("core.toml"),
            "[rules.no-var]\ntype = \"suggestion\"\n\n[rules.no-shadow]\ntype = \"suggestion\"\n",
        )
        .unwrap();
        fs::write(
            tmp.path().join("ts.json"),
            r#"{"rules": {"no-shadow": {"type": "suggestion", "deprecated": false}}}"#,
        )
        .unwrap();

        let source = FileCatalog::new(
            tmp.path(),
            &[
                CatalogFile::new("core.toml"),
                CatalogFile::new("ts.json").with_prefix("@typescript-eslint"),
            ],
        );
        let catalog = source.load().unwrap();

        assert_eq!(catalog.len(), 3);
        assert!(catalog.contains("no-shadow"));
        assert!(catalog.contains("@typescript-eslint/no-shadow"));
    }

    #[test]
    fn missing_catalog_file_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let source = FileCatalog::new(tmp.path(), &[CatalogFile::new("missing.json")]);
        assert!(matches!(source.load(), Err(LoadError::Io { .. })));
    }
}
