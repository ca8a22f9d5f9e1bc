//! Battle simulation and snapshot tooling.
//!
//! Run with: `cargo run -p battle-sim -- <command>`

mod commands;
mod logging;

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use commands::{Inspect, Run};

/// Battle simulation tools
#[derive(Parser)]
#[command(name = "battle-sim")]
#[command(about = "Bulk battle simulation and snapshot inspection", long_about = None)]
#[command(version)]
struct Cli {
    /// Also write logs to this file
    #[arg(long, global = true, value_name = "FILE")]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Parser)]
enum Command {
    /// Auto-play many battles concurrently and summarize the outcomes
    Run(Run),

    /// Print a saved battle snapshot as JSON
    Inspect(Inspect),
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (BATTLE_* settings, RUST_LOG)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let _guard = logging::init(cli.log_file.as_deref())?;

    match cli.command {
        Command::Run(cmd) => cmd.execute().await,
        Command::Inspect(cmd) => cmd.execute(),
    }
}
