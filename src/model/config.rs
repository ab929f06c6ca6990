use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::session::StatusFilter;

/// Configuration from pawlog.toml
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    pub log: LogInfo,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub sequence: SequenceConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogInfo {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Database file, relative to the pawlog/ directory
    #[serde(default = "default_db_path")]
    pub path: String,
    /// How long SQLite waits on a locked database before failing
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig {
            path: default_db_path(),
            busy_timeout_ms: default_busy_timeout_ms(),
        }
    }
}

fn default_db_path() -> String {
    "sessions.db".to_string()
}

fn default_busy_timeout_ms() -> u64 {
    5000
}

/// How displayed ordinals are computed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrdinalMode {
    /// Position in the (date, session_number) order. Dense even when dates repeat.
    #[default]
    Rank,
    /// Number of matching sessions dated on or before this one.
    /// Sessions sharing a date share an ordinal.
    Count,
}

impl OrdinalMode {
    pub fn as_str(self) -> &'static str {
        match self {
            OrdinalMode::Rank => "rank",
            OrdinalMode::Count => "count",
        }
    }
}

impl fmt::Display for OrdinalMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrdinalMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rank" => Ok(OrdinalMode::Rank),
            "count" => Ok(OrdinalMode::Count),
            other => Err(format!(
                "invalid ordinal mode \"{}\" (expected rank or count)",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SequenceConfig {
    #[serde(default)]
    pub ordinal: OrdinalMode,
    #[serde(default)]
    pub default_filter: StatusFilter,
}
