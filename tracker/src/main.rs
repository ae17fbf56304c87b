//! ct-tracker - log influencer calls and track how they play out
//!
//! Usage:
//!   ct-tracker add-influencer Hsaka --handle @HsakaTrades --tier S
//!   ct-tracker add-signal Hsaka BTC --action long --entry 64000 --stop 61500
//!   ct-tracker resolve <signal-id> win 70400
//!   ct-tracker report --json

mod commands;
mod config;
mod logging;
mod output;

use anyhow::Result;
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use common::{Action, Outcome, Tier, Uuid};
use signal_ledger::SignalSort;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "ct-tracker")]
#[command(about = "Track crypto influencer calls, outcomes and confluence")]
#[command(version)]
pub struct Cli {
    /// Configuration file (TOML). Missing is fine.
    #[arg(short, long, global = true, default_value = "ct-tracker.toml")]
    pub config: PathBuf,

    /// Override storage.data_file from the configuration
    #[arg(long, global = true)]
    pub data_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a configuration file with every default spelled out
    #[command(name = "init-config")]
    InitConfig {
        /// Output file (default: the --config path)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Start tracking an influencer
    #[command(name = "add-influencer")]
    AddInfluencer {
        name: String,

        /// Display handle, e.g. @HsakaTrades
        #[arg(long)]
        handle: String,

        /// Trust tier: S, A, B, C or D
        #[arg(long, default_value = "B")]
        tier: Tier,

        #[arg(long, default_value = "")]
        twitter: String,

        #[arg(long, default_value = "")]
        followers: String,

        #[arg(long, default_value = "")]
        specialty: String,

        #[arg(long, default_value = "")]
        notes: String,
    },

    /// Stop tracking an influencer; their signals are kept
    #[command(name = "remove-influencer")]
    RemoveInfluencer {
        /// Influencer id or name
        influencer: String,
    },

    /// Rename an influencer, keeping their history
    #[command(name = "rename-influencer")]
    RenameInfluencer {
        /// Influencer id or name
        influencer: String,

        new_name: String,
    },

    /// Move an influencer to another tier
    #[command(name = "set-tier")]
    SetTier {
        /// Influencer id or name
        influencer: String,

        tier: Tier,
    },

    /// Log a new call
    #[command(name = "add-signal")]
    AddSignal {
        /// Influencer id or name
        influencer: String,

        coin: String,

        /// BUY, SELL, LONG or SHORT
        #[arg(short, long, default_value = "BUY")]
        action: Action,

        #[arg(short, long)]
        entry: String,

        #[arg(short, long, default_value = "")]
        target: String,

        /// Stop loss; required for a position size
        #[arg(short, long, default_value = "")]
        stop: String,

        /// When the call was made (RFC 3339), default now
        #[arg(long)]
        at: Option<DateTime<Utc>>,

        #[arg(long, default_value = "")]
        notes: String,
    },

    /// Close a pending call as a win or a loss
    Resolve {
        signal: Uuid,

        /// win or loss
        outcome: Outcome,

        exit_price: String,
    },

    /// Delete a call and undo its effect on the influencer's stats
    #[command(name = "delete-signal")]
    DeleteSignal { signal: Uuid },

    /// Show or change portfolio settings
    Settings {
        #[arg(long)]
        portfolio_value: Option<f64>,

        /// Percent of the portfolio risked per trade
        #[arg(long)]
        risk_per_trade: Option<f64>,
    },

    /// List signals, or influencers with --influencers
    List {
        /// List influencers instead of signals
        #[arg(long)]
        influencers: bool,

        #[arg(long)]
        tier: Option<Tier>,

        #[arg(long)]
        outcome: Option<Outcome>,

        /// Influencer id or name
        #[arg(long)]
        influencer: Option<String>,

        #[arg(long)]
        coin: Option<String>,

        /// recent or pnl
        #[arg(long, default_value = "recent")]
        sort: SignalSort,

        #[arg(short = 'n', long)]
        limit: Option<usize>,

        #[arg(long)]
        json: bool,
    },

    /// Performance report across the whole ledger
    Report {
        #[arg(long)]
        json: bool,
    },

    /// Coins with pending calls from several trusted influencers
    Confluence {
        /// Override confluence.min_sources
        #[arg(long)]
        min_sources: Option<usize>,

        #[arg(long)]
        json: bool,
    },

    /// Position size for an entry and stop
    Size {
        entry: String,

        stop: String,

        /// Override the stored portfolio value
        #[arg(long)]
        portfolio_value: Option<f64>,

        /// Override the stored risk per trade
        #[arg(long)]
        risk_per_trade: Option<f64>,

        #[arg(long)]
        json: bool,
    },

    /// Write the ledger as a JSON document
    Export {
        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Replace the ledger with a JSON document
    Import { input: PathBuf },

    /// Rebuild influencer stats from signal history
    Recompute {
        /// Influencer id or name (default: everyone)
        influencer: Option<String>,

        /// Also reattach orphaned signals by name
        #[arg(long)]
        relink: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = config::load_config(&cli.config)?;
    if let Some(data_file) = cli.data_file.clone() {
        config.storage.data_file = data_file;
    }

    logging::init_tracing(&config.logging);

    commands::run(cli, config).await
}
