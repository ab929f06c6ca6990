mod init;
use init::cmd_init;

use std::path::PathBuf;
use std::sync::Mutex;

/// Global override for the log directory (set by -C flag)
static LOG_DIR_OVERRIDE: Mutex<Option<PathBuf>> = Mutex::new(None);

use crate::cli::commands::*;
use crate::cli::output::*;
use crate::io::config_io;
use crate::io::lock::FileLock;
use crate::io::log_io::{self, LogError};
use crate::io::sqlite_store::SqliteStore;
use crate::io::state::{self, SequencerState};
use crate::model::config::OrdinalMode;
use crate::model::log_dir::LogDir;
use crate::model::session::{SessionDraft, StatusFilter, parse_date};
use crate::ops::sequencer::{SequenceError, SessionView, Sequencer};
use crate::ops::status_ops::MutationOutcome;

type CmdResult = Result<(), Box<dyn std::error::Error>>;

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn dispatch(cli: Cli) -> CmdResult {
    let json = cli.json;

    if let Some(ref dir) = cli.log_dir {
        let abs = std::fs::canonicalize(dir)
            .map_err(|e| format!("cannot resolve -C path '{}': {}", dir, e))?;
        LOG_DIR_OVERRIDE
            .lock()
            .map_err(|_| "log dir override poisoned")?
            .replace(abs);
    }

    match cli.command {
        // Init creates the log, so it runs without discovery
        Commands::Init(args) => cmd_init(args),

        // Read commands
        Commands::Dogs => cmd_dogs(json),
        Commands::List(args) => cmd_list(args, json),

        // Form events
        Commands::Show => with_sequencer(json, |seq| seq.reload()),
        Commands::Dog(args) => with_sequencer(json, |seq| seq.select_dog(&args.name)),
        Commands::Open(args) => with_sequencer(json, |seq| seq.open(args.number)),
        Commands::New => with_sequencer(json, |seq| seq.new_session()),
        Commands::Next => with_sequencer(json, |seq| seq.on_next()),
        Commands::Prev => with_sequencer(json, |seq| seq.on_previous()),
        Commands::Pick(args) => with_sequencer(json, |seq| seq.on_select_subset(&args.numbers)),
        Commands::Filter(args) => {
            let filter: StatusFilter = args.filter.parse()?;
            with_sequencer(json, |seq| seq.on_filter_changed(filter))
        }

        // Write commands
        Commands::Add(args) => cmd_add(args, json),
        Commands::Edit(args) => cmd_edit(args, json),
        Commands::Delete(args) => cmd_set_status(args, StatusChange::Delete, json),
        Commands::Undelete(args) => cmd_set_status(args, StatusChange::Undelete, json),
        Commands::Purge(args) => cmd_purge(args, json),

        // Maintenance
        Commands::Config(args) => cmd_config(args),
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn load_log_cwd() -> Result<LogDir, LogError> {
    let override_dir = LOG_DIR_OVERRIDE
        .lock()
        .map(|dir| dir.clone())
        .unwrap_or(None);
    let start = match override_dir {
        Some(dir) => dir,
        None => std::env::current_dir().map_err(LogError::IoError)?,
    };
    let root = log_io::discover_log(&start)?;
    log_io::load_log(&root)
}

/// Open the store and resume the sequencer from .state.json, falling back
/// to the configured default filter.
fn open_sequencer(log: &LogDir) -> Result<Sequencer<SqliteStore>, LogError> {
    let store = log_io::open_store(log)?;
    let saved = state::read_state(&log.pawlog_dir).unwrap_or_else(|| SequencerState {
        filter: log.config.sequence.default_filter,
        ..Default::default()
    });
    Ok(Sequencer::from_state(
        store,
        log.config.sequence.ordinal,
        saved,
    ))
}

fn save_sequencer(log: &LogDir, seq: &Sequencer<SqliteStore>) -> Result<(), std::io::Error> {
    state::write_state(&log.pawlog_dir, &seq.state())
}

fn print_view(view: &SessionView, json: bool) -> CmdResult {
    if json {
        println!("{}", serde_json::to_string_pretty(view)?);
    } else {
        print!("{}", format_view(view));
    }
    Ok(())
}

/// Run one form event under the write lock. State is persisted only when
/// the event succeeds, so a failure leaves the cursor where it was.
fn with_sequencer<F>(json: bool, event: F) -> CmdResult
where
    F: FnOnce(&mut Sequencer<SqliteStore>) -> Result<SessionView, SequenceError>,
{
    let log = load_log_cwd()?;
    let _lock = FileLock::acquire_default(&log.pawlog_dir)?;
    let mut seq = open_sequencer(&log)?;
    let view = event(&mut seq)?;
    save_sequencer(&log, &seq)?;
    print_view(&view, json)
}

fn parse_date_arg(value: Option<&str>) -> Result<Option<chrono::NaiveDate>, String> {
    value
        .map(|s| parse_date(s).ok_or_else(|| format!("invalid date \"{}\" (expected YYYY-MM-DD)", s)))
        .transpose()
}

// ---------------------------------------------------------------------------
// Read commands
// ---------------------------------------------------------------------------

fn cmd_dogs(json: bool) -> CmdResult {
    let log = load_log_cwd()?;
    let seq = open_sequencer(&log)?;
    let dogs = seq.dogs()?;
    if json {
        println!("{}", serde_json::to_string_pretty(&dogs)?);
    } else {
        for dog in &dogs {
            let marker = if seq.dog() == Some(dog.as_str()) { "*" } else { " " };
            println!("{} {}", marker, dog);
        }
    }
    Ok(())
}

fn cmd_list(args: ListArgs, json: bool) -> CmdResult {
    let log = load_log_cwd()?;
    let seq = open_sequencer(&log)?;
    let dog = match args.dog.as_deref().or(seq.dog()) {
        Some(dog) => dog.to_string(),
        None => return Err(SequenceError::NoDogSelected.into()),
    };
    let filter = match args.filter {
        Some(ref f) => f.parse::<StatusFilter>()?,
        None => seq.filter(),
    };
    let rows = seq.numbered_sessions(&dog, filter)?;
    if json {
        let out = session_list_to_json(&dog, filter, &rows);
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        print!("{}", format_session_list(&dog, filter, &rows));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Write commands
// ---------------------------------------------------------------------------

fn cmd_add(args: AddArgs, json: bool) -> CmdResult {
    let draft = SessionDraft {
        session_number: None,
        date: parse_date_arg(args.date.as_deref())?,
        handler: args.handler,
        location: args.location,
        notes: args.notes,
    };
    let dog = args.dog;
    with_sequencer(json, move |seq| {
        if let Some(ref dog) = dog {
            seq.select_dog(dog)?;
        }
        let (session, view) = seq.save(&draft)?;
        if !json {
            println!(
                "logged {} session {} on {}",
                session.dog_name, session.session_number, session.date
            );
        }
        Ok(view)
    })
}

fn cmd_edit(args: EditArgs, json: bool) -> CmdResult {
    let draft = SessionDraft {
        session_number: Some(args.number),
        date: parse_date_arg(args.date.as_deref())?,
        handler: args.handler,
        location: args.location,
        notes: args.notes,
    };
    with_sequencer(json, move |seq| seq.save(&draft).map(|(_, view)| view))
}

#[derive(Clone, Copy)]
enum StatusChange {
    Delete,
    Undelete,
}

impl StatusChange {
    fn verb(self) -> &'static str {
        match self {
            StatusChange::Delete => "deleted",
            StatusChange::Undelete => "restored",
        }
    }
}

fn cmd_set_status(args: StatusArgs, change: StatusChange, json: bool) -> CmdResult {
    let log = load_log_cwd()?;
    let _lock = FileLock::acquire_default(&log.pawlog_dir)?;
    let mut seq = open_sequencer(&log)?;

    if args.numbers.len() > 1 {
        let (report, view) = match change {
            StatusChange::Delete => seq.mark_deleted_many(&args.numbers)?,
            StatusChange::Undelete => seq.mark_active_many(&args.numbers)?,
        };
        save_sequencer(&log, &seq)?;
        if json {
            let out = BulkJson {
                report: &report,
                view: &view,
            };
            println!("{}", serde_json::to_string_pretty(&out)?);
        } else {
            print!("{}", format_bulk_report(change.verb(), &report));
            print!("{}", format_view(&view));
        }
        if !report.is_clean() {
            return Err(format!("{} session(s) could not be updated", report.failed.len()).into());
        }
        return Ok(());
    }

    // A single number, or the session on display
    let (dog, number) = match args.numbers.first() {
        Some(&number) => (
            seq.dog().ok_or(SequenceError::NoDogSelected)?.to_string(),
            number,
        ),
        None => match seq.cursor().current() {
            Some((dog, number)) => (dog.to_string(), number),
            None => return Err("no session on display; give a session number".into()),
        },
    };

    let (outcome, view) = match change {
        StatusChange::Delete => seq.mark_deleted(&dog, number)?,
        StatusChange::Undelete => seq.mark_active(&dog, number)?,
    };
    save_sequencer(&log, &seq)?;
    match outcome {
        MutationOutcome::Changed => {
            if !json {
                println!("{} session {}", change.verb(), number);
            }
        }
        MutationOutcome::Unchanged => {
            if !json {
                println!("session {} already {}", number, change.verb());
            }
        }
        MutationOutcome::NotFound => {
            eprintln!("warning: session {} not found for {}", number, dog);
        }
    }
    print_view(&view, json)
}

fn cmd_purge(args: PurgeArgs, json: bool) -> CmdResult {
    if !args.yes {
        return Err(format!(
            "purge permanently removes {}'s deleted sessions; re-run with --yes",
            args.dog
        )
        .into());
    }
    let log = load_log_cwd()?;
    let _lock = FileLock::acquire_default(&log.pawlog_dir)?;
    let mut seq = open_sequencer(&log)?;
    let (purged, view) = seq.purge_deleted(&args.dog)?;
    save_sequencer(&log, &seq)?;
    if json {
        let out = serde_json::json!({ "purged": purged, "view": view });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!("purged {} deleted session(s) for {}", purged.len(), args.dog.trim());
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Maintenance
// ---------------------------------------------------------------------------

fn cmd_config(args: ConfigCmd) -> CmdResult {
    let log = load_log_cwd()?;
    let _lock = FileLock::acquire_default(&log.pawlog_dir)?;
    let (_config, mut doc) = config_io::read_config(&log.pawlog_dir)?;
    match args.action {
        ConfigAction::Ordinal { mode } => {
            let mode: OrdinalMode = mode.parse()?;
            config_io::set_ordinal_mode(&mut doc, mode);
            config_io::write_config(&log.pawlog_dir, &doc)?;
            println!("ordinal mode: {}", mode);
        }
        ConfigAction::DefaultFilter { filter } => {
            let filter: StatusFilter = filter.parse()?;
            config_io::set_default_filter(&mut doc, filter);
            config_io::write_config(&log.pawlog_dir, &doc)?;
            println!("default filter: {}", filter);
        }
    }
    Ok(())
}
