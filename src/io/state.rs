use std::fs;
use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::model::session::StatusFilter;
use crate::ops::cursor::Cursor;

const STATE_FILE: &str = ".state.json";

/// Sequencer state carried between invocations (written to .state.json)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct SequencerState {
    /// Dog currently selected, if any
    #[serde(default)]
    pub dog: Option<String>,
    /// Active status filter
    #[serde(default)]
    pub filter: StatusFilter,
    /// Navigation cursor
    #[serde(default)]
    pub cursor: Cursor,
}

/// Read .state.json from the pawlog directory
pub fn read_state(pawlog_dir: &Path) -> Option<SequencerState> {
    let path = pawlog_dir.join(STATE_FILE);
    let content = fs::read_to_string(&path).ok()?;
    match serde_json::from_str(&content) {
        Ok(state) => Some(state),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable state file");
            None
        }
    }
}

/// Write .state.json atomically (temp file + rename)
pub fn write_state(pawlog_dir: &Path, state: &SequencerState) -> Result<(), std::io::Error> {
    let path = pawlog_dir.join(STATE_FILE);
    let content = serde_json::to_string_pretty(state)?;
    let mut tmp = NamedTempFile::new_in(pawlog_dir)?;
    tmp.write_all(content.as_bytes())?;
    tmp.persist(&path).map_err(|e| e.error)?;
    Ok(())
}
