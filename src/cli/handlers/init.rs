use std::fs;

use crate::cli::commands::InitArgs;
use crate::io::log_io::{self, CONFIG_FILE, PAWLOG_DIR};

const CONFIG_TEMPLATE: &str = r##"[log]
name = "{name}"

[store]
# Database file, relative to this directory
path = "sessions.db"
# Milliseconds to wait when another process holds the database
busy_timeout_ms = 5000

[sequence]
# How the "#N of M" label is computed:
#   "rank"  - position in date order; sessions on the same day get distinct numbers
#   "count" - sessions on or before this date; sessions on the same day share a number
ordinal = "rank"
# Status filter used until one is chosen: "active", "deleted", or "both"
default_filter = "active"
"##;

/// Infer a log name from a directory name: replace hyphens with spaces, title-case.
fn infer_name(dir_name: &str) -> String {
    dir_name
        .split(['-', '_'])
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                None => String::new(),
                Some(c) => {
                    let upper: String = c.to_uppercase().collect();
                    upper + &chars.collect::<String>()
                }
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn render_config(name: &str) -> String {
    CONFIG_TEMPLATE.replace("{name}", &name.replace('"', "\\\""))
}

pub fn cmd_init(args: InitArgs) -> Result<(), Box<dyn std::error::Error>> {
    let cwd = std::env::current_dir()?;
    let pawlog_dir = cwd.join(PAWLOG_DIR);

    if pawlog_dir.is_dir() {
        return Err("a session log already exists in ./pawlog/".into());
    }

    if let Some(parent) = cwd.parent()
        && let Ok(parent_root) = log_io::discover_log(parent)
    {
        eprintln!(
            "Note: parent log found at {}/",
            parent_root.join(PAWLOG_DIR).display()
        );
        eprintln!("Creating new log in ./pawlog/");
    }

    let name = args.name.unwrap_or_else(|| {
        cwd.file_name()
            .and_then(|n| n.to_str())
            .map(infer_name)
            .unwrap_or_else(|| "Training Log".to_string())
    });

    fs::create_dir_all(&pawlog_dir)?;
    fs::write(pawlog_dir.join(CONFIG_FILE), render_config(&name))?;

    // Create the database now so schema problems surface at init time
    let log = log_io::load_log(&cwd)?;
    log_io::open_store(&log)?;

    println!("Initialized session log: {}", name);
    Ok(())
}
