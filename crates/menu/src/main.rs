//! Kalahari menu inspection tool.
//!
//! Usage:
//!   kalahari-menu validate [PATH]
//!   kalahari-menu show --tier premium --plugin epub=contrib/epub.json
//!   kalahari-menu shortcuts

mod cli;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use kalahari_menu::{Config, Tier};

/// Inspect and validate Kalahari menu definitions.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate a menu definition (default: configured or bundled).
    Validate {
        /// TOML or JSON definition file.
        path: Option<PathBuf>,
    },

    /// Print the visible menu tree.
    Show {
        /// Entitlement tier (overrides KALAHARI_MENU_TIER).
        #[arg(long)]
        tier: Option<Tier>,

        /// Plugin contributions as NAME=FILE.json; may be repeated.
        #[arg(long = "plugin")]
        plugins: Vec<String>,
    },

    /// Print effective keyboard shortcuts.
    Shortcuts,
}

fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    init_tracing();

    let args = Args::parse();
    let config = Config::from_env().context("failed to load configuration")?;
    debug!(?config, "configuration loaded");

    match args.command {
        Command::Validate { path } => cli::cmd_validate(&config, path.as_deref()),
        Command::Show { tier, plugins } => cli::cmd_show(&config, tier, &plugins),
        Command::Shortcuts => cli::cmd_shortcuts(&config),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
