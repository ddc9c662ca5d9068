//! Error types for configuration, phase transitions and persistence

use std::fmt;

use crate::sim::{GamePhase, Subtype};

/// Rejected tuning table. Raised once, at construction, never per tick.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// JSON could not be parsed into a `Config`
    Parse(String),
    /// A numeric field is NaN or infinite
    NonFinite { field: &'static str },
    /// A numeric field is outside its allowed range
    OutOfRange { field: &'static str, value: f64 },
    /// A spawnable subtype has no entry in a required table
    MissingEntry { table: &'static str, subtype: Subtype },
    /// A table holds a subtype of the wrong kind
    ForeignEntry { table: &'static str, subtype: Subtype },
    /// Every weight in a spawn table is zero
    EmptyTable { table: &'static str },
    /// Combo tiers must ascend in both streak and multiplier
    NonMonotonicTiers { index: usize },
    /// At least one level definition is required
    NoLevels,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(msg) => write!(f, "config parse error: {msg}"),
            Self::NonFinite { field } => write!(f, "config value `{field}` is not finite"),
            Self::OutOfRange { field, value } => {
                write!(f, "config value `{field}` out of range: {value}")
            }
            Self::MissingEntry { table, subtype } => {
                write!(f, "config table `{table}` has no entry for {subtype:?}")
            }
            Self::ForeignEntry { table, subtype } => {
                write!(f, "config table `{table}` must not contain {subtype:?}")
            }
            Self::EmptyTable { table } => write!(f, "config table `{table}` has no positive weight"),
            Self::NonMonotonicTiers { index } => {
                write!(f, "combo tier {index} does not ascend")
            }
            Self::NoLevels => write!(f, "config defines no levels"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// A host asked for a phase change the state machine does not allow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionError {
    /// The action is not valid from the current phase
    InvalidPhase { from: GamePhase, action: &'static str },
    /// Legend mode has not been unlocked yet
    LegendLocked,
}

impl fmt::Display for TransitionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidPhase { from, action } => {
                write!(f, "cannot {action} from phase {from:?}")
            }
            Self::LegendLocked => write!(f, "legend mode is locked"),
        }
    }
}

impl std::error::Error for TransitionError {}

/// Save data could not be encoded or decoded
#[derive(Debug)]
pub enum PersistenceError {
    Json(serde_json::Error),
    UnsupportedVersion { found: u32, expected: u32 },
}

impl fmt::Display for PersistenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json(e) => write!(f, "save data json error: {e}"),
            Self::UnsupportedVersion { found, expected } => {
                write!(f, "unsupported save version {found} (expected {expected})")
            }
        }
    }
}

impl std::error::Error for PersistenceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Json(e) => Some(e),
            Self::UnsupportedVersion { .. } => None,
        }
    }
}

impl From<serde_json::Error> for PersistenceError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e)
    }
}
