#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Command-line front end for incident filter trees.
//!
//! Every command works on the filter tree of one named view (`--view`;
//! `publish` for the publish command, `stats` otherwise), persisted under
//! `<data dir>/filters/`. Commands that
//! apply a tree (`count`, `stats`, `publish`) read an incident snapshot
//! from `--data`.
//!
//! Run without a subcommand for an interactive menu.

mod commands;
mod interactive;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use incident_map_storage::paths;

use crate::commands::Context;

const STATS_VIEW: &str = "stats";
const PUBLISH_VIEW: &str = "publish";

#[derive(Parser)]
#[command(name = "incident_map", about = "Incident map filter toolkit")]
struct Cli {
    /// Data directory (default: `$INCIDENT_MAP_DATA_DIR`, then `<project>/data`)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// View whose filter tree to operate on
    #[arg(long, global = true)]
    view: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the view's filter tree
    Show,
    /// List the registered views
    Views,
    /// Restore the default filters
    Reset,
    /// Add a filter (prompts for the kind when omitted)
    Add {
        /// Filter kind (category, country, date, desc, latlong, not, or)
        kind: Option<String>,
        /// Initial state as JSON
        #[arg(long)]
        state: Option<String>,
        /// Comma-separated container ids to add inside, outermost first
        #[arg(long = "in", value_delimiter = ',')]
        path: Vec<u32>,
    },
    /// Remove a filter
    Remove {
        /// Filter id
        id: u32,
        /// Comma-separated container ids holding the filter
        #[arg(long = "in", value_delimiter = ',')]
        path: Vec<u32>,
    },
    /// Replace a filter's state
    Update {
        /// Filter id
        id: u32,
        /// New state as JSON
        #[arg(long)]
        state: String,
        /// Comma-separated container ids holding the filter
        #[arg(long = "in", value_delimiter = ',')]
        path: Vec<u32>,
    },
    /// Copy the filter tree of one view into another
    Copy {
        /// Source view
        #[arg(long)]
        from: String,
        /// Destination view (defaults to `--view`)
        #[arg(long)]
        to: Option<String>,
    },
    /// Apply a JSON array of recorded actions to the view's tree
    Replay {
        /// Action log file
        file: PathBuf,
    },
    /// Count the snapshot's incidents that pass the view's filters
    Count {
        /// Incident snapshot (JSON)
        #[arg(long)]
        data: PathBuf,
    },
    /// Write the public and admin checkpoint snapshots
    Publish {
        /// Incident snapshot (JSON)
        #[arg(long)]
        data: PathBuf,
        /// Output directory (defaults to `<data dir>/published`)
        #[arg(long)]
        out: Option<PathBuf>,
        /// Also rewrite the snapshot without its soft-deleted documents
        #[arg(long)]
        prune: bool,
    },
    /// Summarize the incidents that pass the view's filters
    Stats {
        /// Incident snapshot (JSON)
        #[arg(long)]
        data: PathBuf,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let multi = incident_map_cli_utils::init_logger();
    let cli = Cli::parse();

    let default_view = match cli.command {
        Some(Commands::Publish { .. }) => PUBLISH_VIEW,
        _ => STATS_VIEW,
    };
    let ctx = Context {
        data_dir: cli.data_dir.unwrap_or_else(paths::data_dir),
        view: cli.view.unwrap_or_else(|| default_view.to_string()),
        multi,
    };
    log::debug!("Using data directory {}", ctx.data_dir.display());

    let Some(command) = cli.command else {
        return interactive::run(&ctx);
    };

    match command {
        Commands::Show => commands::show(&ctx)?,
        Commands::Views => commands::views(),
        Commands::Reset => commands::reset(&ctx)?,
        Commands::Add { kind, state, path } => {
            let kind = match kind {
                Some(kind) => commands::parse_kind(&kind)?,
                None => interactive::prompt_kind()?,
            };
            let state = state.as_deref().map(commands::parse_state).transpose()?;
            commands::add(&ctx, kind, state, &path)?;
        }
        Commands::Remove { id, path } => commands::remove(&ctx, id, &path)?,
        Commands::Update { id, state, path } => {
            commands::update(&ctx, id, commands::parse_state(&state)?, &path)?;
        }
        Commands::Copy { from, to } => {
            let to = to.unwrap_or_else(|| ctx.view.clone());
            commands::copy(&ctx, &from, &to)?;
        }
        Commands::Replay { file } => commands::replay(&ctx, &file)?,
        Commands::Count { data } => commands::count(&ctx, &data)?,
        Commands::Publish { data, out, prune } => commands::publish(&ctx, &data, out, prune)?,
        Commands::Stats { data } => commands::stats(&ctx, &data)?,
    }

    Ok(())
}
