//! LexiSync CLI
//!
//! Operator tools for lexicon send/receive.
//!
//! # Commands
//!
//! - `state show` - Display the processing state of a project
//! - `state release` - Release a held or failed project
//! - `decode` - Decode span text into runs
//! - `render` - Render runs back to span text
//! - `merge` - Run the merge policy over JSON entry files

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// LexiSync command-line tools.
#[derive(Parser)]
#[command(name = "lexisync")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Base directory of the send/receive installation
    #[arg(global = true, short, long)]
    base_dir: Option<PathBuf>,

    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Inspect or reset project state files
    State {
        #[command(subcommand)]
        action: StateAction,
    },

    /// Decode span text and print its runs
    Decode {
        /// Span text to decode
        text: String,
    },

    /// Render a JSON array of runs as span text
    Render {
        /// Path to the runs file
        runs: PathBuf,

        /// Writing system of runs without a language
        #[arg(short, long)]
        default_ws: String,

        /// Additional writing systems known to the project
        #[arg(short, long)]
        ws: Vec<String>,
    },

    /// Merge previous, store and model entry files
    Merge {
        /// Entries as of the last sync
        previous: PathBuf,

        /// Document store entries
        store: PathBuf,

        /// Desktop model entries
        model: PathBuf,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Show version information
    Version,
}

#[derive(Subcommand)]
enum StateAction {
    /// Display the processing state of a project
    Show {
        /// Project code
        code: String,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Return a project in HOLD or ERROR to IDLE
    Release {
        /// Project code
        code: String,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let base_dir = cli
        .base_dir
        .unwrap_or_else(|| PathBuf::from(lexisync_engine::DEFAULT_BASE_DIR));

    match cli.command {
        Commands::State { action } => match action {
            StateAction::Show { code, format } => {
                commands::state::show(&base_dir, &code, &format)?;
            }
            StateAction::Release { code } => {
                commands::state::release(&base_dir, &code)?;
            }
        },
        Commands::Decode { text } => {
            commands::decode::run(&text)?;
        }
        Commands::Render {
            runs,
            default_ws,
            ws,
        } => {
            commands::render::run(&runs, &default_ws, &ws)?;
        }
        Commands::Merge {
            previous,
            store,
            model,
            format,
        } => {
            commands::merge::run(&previous, &store, &model, &format)?;
        }
        Commands::Version => {
            println!("LexiSync CLI v{}", env!("CARGO_PKG_VERSION"));
            println!("LexiSync Engine v{}", lexisync_engine::VERSION);
        }
    }

    Ok(())
}
