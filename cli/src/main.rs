mod commands;
mod config;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

use crate::commands::{cmd_export, cmd_import, cmd_list, cmd_log, cmd_show};
use crate::config::Config;
use liftlog_core::Tracker;

/// Environment variable holding the tracing filter (e.g. `liftlog_core=debug`).
const LOG_ENV: &str = "LIFTLOG_LOG";

#[derive(Parser)]
#[command(
    name = "liftlog",
    version,
    about = "A simple exercise log tracker",
    long_about = "\n\n  ██╗     ██╗███████╗████████╗██╗      ██████╗  ██████╗
  ██║     ██║██╔════╝╚══██╔══╝██║     ██╔═══██╗██╔════╝
  ██║     ██║█████╗     ██║   ██║     ██║   ██║██║  ███╗
  ██║     ██║██╔══╝     ██║   ██║     ██║   ██║██║   ██║
  ███████╗██║██║        ██║   ███████╗╚██████╔╝╚██████╔╝
  ╚══════╝╚═╝╚═╝        ╚═╝   ╚══════╝ ╚═════╝  ╚═════╝
              know what you lifted.
"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List exercises with their last and best sessions
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show an exercise with its full log history
    Show {
        /// Exercise ID (e.g. "bench_press")
        exercise: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Log a workout for an exercise
    Log {
        /// Exercise ID (e.g. "bench_press")
        exercise: String,
        /// Number of sets
        #[arg(allow_negative_numbers = true)]
        sets: String,
        /// Reps per set
        #[arg(allow_negative_numbers = true)]
        reps: String,
        /// Weight in kg (0 for bodyweight)
        #[arg(allow_negative_numbers = true)]
        weight: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Export all exercises and logs as JSON
    Export {
        /// Write to a file instead of stdout
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
    /// Replace all exercises and logs with a JSON export
    Import {
        /// Path to the export file
        file: PathBuf,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let config = Config::load()?;
    tracing::debug!(db = %config.db_path.display(), "Opening tracker");
    let mut tracker = Tracker::new(&config.db_path)?;

    match cli.command {
        Commands::List { json } => cmd_list(&tracker, json),
        Commands::Show { exercise, json } => cmd_show(&tracker, &exercise, json),
        Commands::Log {
            exercise,
            sets,
            reps,
            weight,
            json,
        } => cmd_log(&mut tracker, &exercise, &sets, &reps, &weight, json),
        Commands::Export { output } => cmd_export(&tracker, output.as_deref()),
        Commands::Import { file, json } => cmd_import(&mut tracker, &file, json),
    }
}
