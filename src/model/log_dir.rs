use std::path::PathBuf;

use super::config::LogConfig;

/// A discovered pawlog directory and its parsed config
#[derive(Debug)]
pub struct LogDir {
    /// Directory containing `pawlog/`
    pub root: PathBuf,
    /// Path to the `pawlog/` directory
    pub pawlog_dir: PathBuf,
    /// Parsed pawlog.toml
    pub config: LogConfig,
}

impl LogDir {
    /// Absolute path of the session database
    pub fn db_path(&self) -> PathBuf {
        self.pawlog_dir.join(&self.config.store.path)
    }
}
