use clap::Parser;
use pawlog::cli::commands::Cli;
use pawlog::cli::handlers;
use tracing_subscriber::EnvFilter;

/// Log to stderr, filtered by PAWLOG_LOG (default: warnings only)
fn init_tracing() {
    let filter = EnvFilter::try_from_env("PAWLOG_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    if let Err(e) = handlers::dispatch(cli) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
