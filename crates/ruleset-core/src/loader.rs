//! Reading rule tables and catalogs from TOML or JSON files.

use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::definitions::DefinitionSet;
use crate::types::RuleTable;

/// Errors while reading rule tables or catalogs.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// IO error reading a file.
    #[error("Failed to read {path}: {source}")]
    Io {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// The file content could not be deserialized.
    #[error("Failed to parse {path}: {message}")]
    Parse {
        /// Path of the malformed file.
        path: PathBuf,
        /// Parse error message.
        message: String,
    },

    /// The file extension is neither `.toml` nor `.json`.
    #[error("Unsupported file format: {path} (expected .toml or .json)")]
    UnsupportedFormat {
        /// Path with the unsupported extension.
        path: PathBuf,
    },

    /// A table path pattern is not a valid glob.
    #[error("Invalid pattern `{pattern}`: {message}")]
    Pattern {
        /// The offending pattern.
        pattern: String,
        /// Why the pattern was rejected.
        message: String,
    },

    /// A table path pattern matched no files.
    #[error("Pattern `{pattern}` matched no files")]
    NoMatch {
        /// The pattern that matched nothing.
        pattern: String,
    },

    /// A catalog source could not produce its rules.
    #[error("Rule catalog unavailable: {message}")]
    Unavailable {
        /// Why the catalog is unavailable.
        message: String,
    },
}

/// Supported document formats, selected by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// `.toml`
    Toml,
    /// `.json`
    Json,
}

impl Format {
    /// Detects the format of a path from its extension.
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            "toml" => Some(Self::Toml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }

    /// Deserializes `content` in this format.
    ///
    /// # Errors
    ///
    /// Returns the parser's message if the content is malformed.
    pub fn parse<T: DeserializeOwned>(self, content: &str) -> Result<T, String> {
        match self {
            Self::Toml => toml::from_str(content).map_err(|e| e.to_string()),
            Self::Json => serde_json::from_str(content).map_err(|e| e.to_string()),
        }
    }
}

/// Reads and deserializes a TOML or JSON document.
///
/// # Errors
///
/// Returns an error if the extension is unsupported, or the file cannot be
/// read or parsed.
pub fn read_document<T: DeserializeOwned>(path: &Path) -> Result<T, LoadError> {
    let format = Format::from_path(path).ok_or_else(|| LoadError::UnsupportedFormat {
        path: path.to_path_buf(),
    })?;
    let content = std::fs::read_to_string(path).map_err(|e| LoadError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    format.parse(&content).map_err(|message| LoadError::Parse {
        path: path.to_path_buf(),
        message,
    })
}

/// Reads one rule table file.
///
/// # Errors
///
/// See [`read_document`].
pub fn load_table(path: &Path) -> Result<RuleTable, LoadError> {
    let table: RuleTable = read_document(path)?;
    debug!("Loaded {} rule(s) from {}", table.len(), path.display());
    Ok(table)
}

/// Expands table path patterns relative to `base`.
///
/// Plain paths are kept as-is (a missing file surfaces when it is read).
/// Glob patterns expand to their matches in sorted order, and must match at
/// least one file.
///
/// # Errors
///
/// Returns an error for invalid globs, globs without matches, and
/// directories that cannot be read while matching.
pub fn expand_patterns(base: &Path, patterns: &[String]) -> Result<Vec<PathBuf>, LoadError> {
    let mut paths = Vec::new();

    for pattern in patterns {
        if !is_glob(pattern) {
            paths.push(base.join(pattern));
            continue;
        }

        // Only the configured pattern is glob syntax, never the base directory.
        let escaped = Path::new(&glob::Pattern::escape(&base.to_string_lossy())).join(pattern);
        let entries =
            glob::glob(&escaped.to_string_lossy()).map_err(|e| LoadError::Pattern {
                pattern: pattern.clone(),
                message: e.to_string(),
            })?;

        let mut matched = Vec::new();
        for entry in entries {
            let path = entry.map_err(|e| LoadError::Io {
                path: e.path().to_path_buf(),
                source: e.into_error(),
            })?;
            if path.is_file() {
                matched.push(path);
            }
        }
        if matched.is_empty() {
            return Err(LoadError::NoMatch {
                pattern: pattern.clone(),
            });
        }
        matched.sort();
        paths.extend(matched);
    }

    Ok(paths)
}

/// Loads a [`DefinitionSet`] from category -> table path patterns.
///
/// Tables keep the order of their patterns; a glob contributes its matches
/// in sorted order.
///
/// # Errors
///
/// Returns the first pattern or file error encountered.
pub fn load_definitions<'a, I>(base: &Path, categories: I) -> Result<DefinitionSet, LoadError>
where
    I: IntoIterator<Item = (&'a String, &'a Vec<String>)>,
{
    let mut definitions = DefinitionSet::new();
    for (category, patterns) in categories {
        let paths = expand_patterns(base, patterns)?;
        // Keep empty categories: they still take part in classification.
        definitions.ensure_category(category);
        for path in paths {
            definitions.push(category.clone(), load_table(&path)?);
        }
    }
    Ok(definitions)
}

fn is_glob(pattern: &str) -> bool {
    pattern.contains(['*', '?', '['])
}
