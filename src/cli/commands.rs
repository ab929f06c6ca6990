use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "pawlog", about = concat!("pawlog v", env!("CARGO_PKG_VERSION"), " - dog training session log"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Run against a different log directory
    #[arg(short = 'C', long = "log-dir", global = true)]
    pub log_dir: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new session log in the current directory
    Init(InitArgs),
    /// List dogs with logged sessions
    Dogs,
    /// Select the dog to work with
    Dog(DogArgs),
    /// Log a new session
    Add(AddArgs),
    /// Edit a session's date or details
    Edit(EditArgs),
    /// List a dog's sessions under a status filter
    List(ListArgs),
    /// Show the session on display
    Show,
    /// Open a session by its session number
    Open(OpenArgs),
    /// Clear the form for a new session
    New,
    /// Go to the next session
    Next,
    /// Go to the previous session
    Prev,
    /// Walk a picked set of sessions with next/prev
    Pick(PickArgs),
    /// Change the status filter
    Filter(FilterArgs),
    /// Mark sessions deleted (default: the one on display)
    Delete(StatusArgs),
    /// Restore deleted sessions (default: the one on display)
    Undelete(StatusArgs),
    /// Permanently remove a dog's deleted sessions
    Purge(PurgeArgs),
    /// Change sequencing settings in pawlog.toml
    Config(ConfigCmd),
}

#[derive(Args)]
pub struct InitArgs {
    /// Log name (default: inferred from directory name)
    #[arg(long)]
    pub name: Option<String>,
}

#[derive(Args)]
pub struct DogArgs {
    /// Dog name
    pub name: String,
}

#[derive(Args)]
pub struct AddArgs {
    /// Dog the session belongs to (default: the selected dog)
    #[arg(long)]
    pub dog: Option<String>,
    /// Session date, YYYY-MM-DD (default: today)
    #[arg(long)]
    pub date: Option<String>,
    #[arg(long)]
    pub handler: Option<String>,
    #[arg(long)]
    pub location: Option<String>,
    #[arg(long)]
    pub notes: Option<String>,
}

#[derive(Args)]
pub struct EditArgs {
    /// Session number (physical, as shown by `list`)
    pub number: u32,
    /// New date, YYYY-MM-DD
    #[arg(long)]
    pub date: Option<String>,
    /// New handler ("" clears)
    #[arg(long)]
    pub handler: Option<String>,
    /// New location ("" clears)
    #[arg(long)]
    pub location: Option<String>,
    /// New notes ("" clears)
    #[arg(long)]
    pub notes: Option<String>,
}

#[derive(Args)]
pub struct ListArgs {
    /// Dog to list (default: the selected dog)
    pub dog: Option<String>,
    /// Status filter: active, deleted, or both (default: the current filter)
    #[arg(long)]
    pub filter: Option<String>,
}

#[derive(Args)]
pub struct OpenArgs {
    /// Session number (physical)
    pub number: u32,
}

#[derive(Args)]
pub struct PickArgs {
    /// Session numbers in the order to walk them
    #[arg(required = true)]
    pub numbers: Vec<u32>,
}

#[derive(Args)]
pub struct FilterArgs {
    /// active, deleted, or both
    pub filter: String,
}

#[derive(Args)]
pub struct StatusArgs {
    /// Session numbers; several at once resets the form afterwards
    pub numbers: Vec<u32>,
}

#[derive(Args)]
pub struct PurgeArgs {
    /// Dog whose deleted sessions are removed
    pub dog: String,
    /// Confirm the permanent removal
    #[arg(long)]
    pub yes: bool,
}

#[derive(Args)]
pub struct ConfigCmd {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// How ordinals are computed: rank or count
    Ordinal { mode: String },
    /// Filter used when no state has been saved yet
    DefaultFilter { filter: String },
}
