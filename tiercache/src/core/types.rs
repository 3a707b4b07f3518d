use serde::{Deserialize, Serialize};
use std::fmt;

/// Which side of a [`TieredCache`](crate::TieredCache) an operation ran on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    /// In-process bounded tier
    Local,
    /// Fallback tier (Redis, another process, ...)
    Remote,
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local => f.write_str("local"),
            Self::Remote => f.write_str("remote"),
        }
    }
}

/// Store operation, used in logs, errors and failure reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Read,
    Write,
    Delete,
    Clear,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read => f.write_str("read"),
            Self::Write => f.write_str("write"),
            Self::Delete => f.write_str("delete"),
            Self::Clear => f.write_str("clear"),
        }
    }
}

/// How `Store` mutations on a `TieredCache` complete
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PropagationMode {
    /// Dispatch both tier tasks and return once they are spawned
    #[default]
    Detached,
    /// Dispatch both tier tasks and wait for both to finish
    AwaitBoth,
}
