//! Subcommand implementations and the helpers they share.

pub mod build;
pub mod catalog;
pub mod check;
pub mod init;
pub mod output;

use anyhow::{Context, Result};
use ruleset_core::{CheckMode, Config};
use std::path::{Path, PathBuf};

/// Flags selecting the check mode of `build`.
#[derive(Debug, Clone, Copy, Default, clap::Args)]
pub struct ModeFlags {
    /// Verify rule definitions before emitting the configuration
    #[arg(long)]
    pub check: bool,

    /// Verify and list every rule's status (implies --check)
    #[arg(long)]
    pub verbose_check: bool,
}

impl ModeFlags {
    /// Resolves the flag-level mode, falling back to the `CHECK_RULES`
    /// value. `None` leaves the decision to the config file.
    #[must_use]
    pub fn resolve(self, env_value: Option<&str>) -> Option<CheckMode> {
        if self.verbose_check {
            Some(CheckMode::Verbose)
        } else if self.check {
            Some(CheckMode::On)
        } else {
            env_value
                .filter(|v| !v.is_empty())
                .map(|v| CheckMode::from_env_value(Some(v)))
        }
    }
}

/// A loaded config and the directory its relative paths resolve against.
#[derive(Debug)]
pub struct LoadedConfig {
    /// Parsed configuration.
    pub config: Config,
    /// Directory containing the config file.
    pub base_dir: PathBuf,
}

/// Config file names looked up in each directory, in order.
pub const CONFIG_FILE_NAMES: &[&str] = &["ruleset.toml", ".ruleset.toml"];

/// Loads `--config` if given, else the nearest config at or above
/// `project_dir`.
pub fn load_config(project_dir: &Path, explicit: Option<&Path>) -> Result<LoadedConfig> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => {
            let start = project_dir
                .canonicalize()
                .with_context(|| format!("Cannot access {}", project_dir.display()))?;
            find_config(&start, home::home_dir().as_deref()).with_context(|| {
                format!(
                    "No {} found in {} or its parents. Run `ruleset init` to create one.",
                    CONFIG_FILE_NAMES[0],
                    project_dir.display()
                )
            })?
        }
    };
    read_config(&path)
}

/// Finds the nearest config file at or above `start`.
///
/// The search ends at the first directory that is a repository root
/// (holds `.git`) or equals `boundary`, after checking that directory.
fn find_config(start: &Path, boundary: Option<&Path>) -> Option<PathBuf> {
    for dir in start.ancestors() {
        let found = CONFIG_FILE_NAMES
            .iter()
            .map(|name| dir.join(name))
            .find(|candidate| candidate.is_file());
        if let Some(path) = found {
            tracing::debug!("Found config: {}", path.display());
            return Some(path);
        }
        if dir.join(".git").exists() || boundary == Some(dir) {
            break;
        }
    }
    None
}

fn read_config(path: &Path) -> Result<LoadedConfig> {
    let config = Config::from_file(path)
        .with_context(|| format!("Failed to load config: {}", path.display()))?;
    let base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
    tracing::debug!(
        "Loaded {} section(s) from {}",
        config.sections.len(),
        path.display()
    );

    Ok(LoadedConfig { config, base_dir })
}
