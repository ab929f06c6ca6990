use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::io::sqlite_store::SqliteStore;
use crate::io::store::StoreError;
use crate::model::config::LogConfig;
use crate::model::log_dir::LogDir;

/// Name of the directory holding the config, database, and state
pub const PAWLOG_DIR: &str = "pawlog";

/// Name of the config file inside the pawlog directory
pub const CONFIG_FILE: &str = "pawlog.toml";

/// Error type for log directory I/O
#[derive(Debug, thiserror::Error)]
pub enum LogError {
    #[error("not a pawlog directory: no pawlog/ directory found")]
    NotALog,
    #[error("could not read {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse pawlog.toml: {0}")]
    ConfigParseError(#[from] toml::de::Error),
    #[error("could not edit pawlog.toml: {0}")]
    ConfigEditError(#[from] toml_edit::TomlError),
    #[error("could not open session store: {0}")]
    Store(#[from] StoreError),
    #[error("io error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Walk up from `start` looking for a `pawlog/` directory with a config file.
pub fn discover_log(start: &Path) -> Result<PathBuf, LogError> {
    let mut current = start.to_path_buf();
    loop {
        let dir = current.join(PAWLOG_DIR);
        if dir.is_dir() && dir.join(CONFIG_FILE).exists() {
            return Ok(current);
        }
        if !current.pop() {
            return Err(LogError::NotALog);
        }
    }
}

/// Load the config of the log rooted at `root`.
pub fn load_log(root: &Path) -> Result<LogDir, LogError> {
    let pawlog_dir = root.join(PAWLOG_DIR);
    if !pawlog_dir.is_dir() {
        return Err(LogError::NotALog);
    }

    let config_path = pawlog_dir.join(CONFIG_FILE);
    let config_text = fs::read_to_string(&config_path).map_err(|e| LogError::ReadError {
        path: config_path.clone(),
        source: e,
    })?;
    let config: LogConfig = toml::from_str(&config_text)?;

    Ok(LogDir {
        root: root.to_path_buf(),
        pawlog_dir,
        config,
    })
}

/// Open the session database configured for this log.
pub fn open_store(log: &LogDir) -> Result<SqliteStore, LogError> {
    let timeout = Duration::from_millis(log.config.store.busy_timeout_ms);
    Ok(SqliteStore::open(&log.db_path(), timeout)?)
}
