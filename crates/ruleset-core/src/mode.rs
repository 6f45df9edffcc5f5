//! Verification mode toggle.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Whether, and how loudly, rule definitions are verified.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckMode {
    /// Merge only; the catalog is never loaded.
    #[default]
    Off,
    /// Verify and report problems only.
    On,
    /// Verify and report every rule's status.
    Verbose,
}

impl CheckMode {
    /// Environment variable read by the CLI to enable verification.
    pub const ENV_VAR: &'static str = "CHECK_RULES";

    /// Interprets the value of [`CheckMode::ENV_VAR`].
    ///
    /// Unset or empty disables checking, `verbose` selects verbose output and
    /// any other value enables checking.
    #[must_use]
    pub fn from_env_value(value: Option<&str>) -> Self {
        match value {
            None | Some("") => Self::Off,
            Some("verbose") => Self::Verbose,
            Some(_) => Self::On,
        }
    }

    /// Returns `true` unless checking is off.
    #[must_use]
    pub fn is_enabled(self) -> bool {
        self != Self::Off
    }

    /// Returns `true` for verbose reporting.
    #[must_use]
    pub fn is_verbose(self) -> bool {
        self == Self::Verbose
    }
}

impl fmt::Display for CheckMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Off => write!(f, "off"),
            Self::On => write!(f, "on"),
            Self::Verbose => write!(f, "verbose"),
        }
    }
}

/// Error for unrecognised check mode names.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown check mode `{0}`, expected: off, on, verbose")]
pub struct ParseCheckModeError(String);

impl FromStr for CheckMode {
    type Err = ParseCheckModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "off" => Ok(Self::Off),
            "on" => Ok(Self::On),
            "verbose" => Ok(Self::Verbose),
            other => Err(ParseCheckModeError(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_value_selects_mode() {
        assert_eq!(CheckMode::from_env_value(None), CheckMode::Off);
        assert_eq!(CheckMode::from_env_value(Some("")), CheckMode::Off);
        assert_eq!(CheckMode::from_env_value(Some("1")), CheckMode::On);
        assert_eq!(CheckMode::from_env_value(Some("true")), CheckMode::On);
        assert_eq!(CheckMode::from_env_value(Some("verbose")), CheckMode::Verbose);
    }

    #[test]
    fn parse_round_trips_display() {
        for mode in [CheckMode::Off, CheckMode::On, CheckMode::Verbose] {
            assert_eq!(mode.to_string().parse::<CheckMode>(), Ok(mode));
        }
        assert!("loud".parse::<CheckMode>().is_err());
    }

    #[test]
    fn only_off_is_disabled() {
        assert!(!CheckMode::Off.is_enabled());
        assert!(CheckMode::On.is_enabled());
        assert!(CheckMode::Verbose.is_enabled());
        assert!(CheckMode::Verbose.is_verbose());
        assert!(!CheckMode::On.is_verbose());
    }
}
