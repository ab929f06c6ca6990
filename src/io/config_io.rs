use std::fs;
use std::path::Path;

use crate::io::log_io::{CONFIG_FILE, LogError};
use crate::model::config::{LogConfig, OrdinalMode};
use crate::model::session::StatusFilter;

/// Read the log config, returning both the parsed config and the raw
/// toml_edit document for round-trip-safe editing.
pub fn read_config(pawlog_dir: &Path) -> Result<(LogConfig, toml_edit::DocumentMut), LogError> {
    let config_path = pawlog_dir.join(CONFIG_FILE);
    let config_text = fs::read_to_string(&config_path).map_err(|e| LogError::ReadError {
        path: config_path.clone(),
        source: e,
    })?;
    let config: LogConfig = toml::from_str(&config_text)?;
    let doc: toml_edit::DocumentMut = config_text.parse()?;
    Ok((config, doc))
}

/// Write the config document back to disk, preserving formatting.
pub fn write_config(pawlog_dir: &Path, doc: &toml_edit::DocumentMut) -> Result<(), LogError> {
    let config_path = pawlog_dir.join(CONFIG_FILE);
    fs::write(&config_path, doc.to_string()).map_err(|e| LogError::ReadError {
        path: config_path,
        source: e,
    })?;
    Ok(())
}

fn sequence_table(doc: &mut toml_edit::DocumentMut) -> &mut toml_edit::Item {
    if !doc.contains_key("sequence") {
        doc["sequence"] = toml_edit::Item::Table(toml_edit::Table::new());
    }
    &mut doc["sequence"]
}

/// Update `sequence.ordinal` in the config document
pub fn set_ordinal_mode(doc: &mut toml_edit::DocumentMut, mode: OrdinalMode) {
    let value = match mode {
        OrdinalMode::Rank => "rank",
        OrdinalMode::Count => "count",
    };
    sequence_table(doc)["ordinal"] = toml_edit::value(value);
}

/// Update `sequence.default_filter` in the config document
pub fn set_default_filter(doc: &mut toml_edit::DocumentMut, filter: StatusFilter) {
    sequence_table(doc)["default_filter"] = toml_edit::value(filter.as_str());
}
