//! Query status and edge error types.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Outcome of a batch query.
///
/// Batch queries always return whatever partial results they could assemble;
/// the status records the most severe condition seen along the way.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    #[default]
    Ok,
    /// A registered entity's provider returned no data for it.
    FailedTransaction,
    /// A requested entity id was outside the registered range.
    BadValue,
}

impl Status {
    fn priority(self) -> u8 {
        match self {
            Self::Ok => 0,
            Self::FailedTransaction => 1,
            Self::BadValue => 2,
        }
    }

    /// Record `condition`, keeping whichever of the two has higher priority.
    pub fn escalate(&mut self, condition: Status) {
        if condition.priority() > self.priority() {
            *self = condition;
        }
    }

    pub fn is_ok(self) -> bool {
        self == Self::Ok
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ok => write!(f, "ok"),
            Self::FailedTransaction => write!(f, "failed_transaction"),
            Self::BadValue => write!(f, "bad_value"),
        }
    }
}

/// Entity registration failures.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("power entity '{0}' is already registered")]
    DuplicateEntity(String),
}

/// Failures reported by a rail energy provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed counter in {path}: {value:?}")]
    Malformed { path: PathBuf, value: String },
}

/// Fixture loading failures.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read fixture {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse fixture {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Registry(#[from] RegistryError),
}
