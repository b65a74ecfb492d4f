use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use thermoview::cli;
use thermoview::config::{self, ThermoviewConfig};

#[derive(Debug, Parser)]
#[command(name = "thermoview")]
#[command(about = "Terminal dashboard for thermal capture datasets")]
struct App {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Live dashboard: refreshes the summary periodically, navigate with n/p
    Watch {
        #[command(flatten)]
        source: SourceArgs,
        /// Seconds between summary refreshes
        #[arg(long)]
        interval: Option<u64>,
    },
    /// Render the summary and one dataset once, then exit
    Snapshot {
        #[command(flatten)]
        source: SourceArgs,
        /// Zero-based dataset index to show (default: first)
        #[arg(long)]
        index: Option<usize>,
    },
    /// Serve a JSON fixture file as the dashboard API
    Replay {
        /// Fixture file with `summary` and `details` arrays
        #[arg(long)]
        fixture: PathBuf,
        /// Listen address
        #[arg(long, default_value = "127.0.0.1:5000")]
        addr: String,
    },
    /// Check config files and backend reachability
    Health {
        #[command(flatten)]
        source: SourceArgs,
    },
    /// Show or edit configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Debug, clap::Args)]
struct SourceArgs {
    /// Backend base URL (overrides config)
    #[arg(long)]
    url: Option<String>,
    /// Output format: terminal (default), json
    #[arg(long)]
    format: Option<String>,
}

#[derive(Debug, Subcommand)]
enum ConfigAction {
    /// Print the effective configuration
    Show,
    /// Write an annotated default config to ~/.thermoview/config.toml
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Set a dotted key, e.g. `refresh.interval_secs 10`
    Set { key: String, value: String },
    /// Overwrite the global config with defaults
    Reset,
}

/// Resolve config layers and apply command-line overrides on top.
fn resolve_config(source: &SourceArgs) -> Result<ThermoviewConfig> {
    let mut cfg = config::load();
    if let Some(url) = &source.url {
        cfg.source.base_url = url.clone();
    }
    if let Some(format) = &source.format {
        cfg.render.format = config::parse_format(format)
            .ok_or_else(|| anyhow::anyhow!("unknown output format '{format}' (expected terminal or json)"))?;
    }
    Ok(cfg)
}

/// Log to stderr so stdout stays free for the dashboard.
fn init_logging(default_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let app = App::parse();
    init_logging(&config::load().logging.level);

    match app.command {
        Commands::Watch { source, interval } => {
            let mut cfg = resolve_config(&source)?;
            if let Some(secs) = interval.filter(|s| *s > 0) {
                cfg.refresh.interval_secs = secs;
            }
            cli::run_watch(&cfg)
        }
        Commands::Snapshot { source, index } => {
            let cfg = resolve_config(&source)?;
            cli::run_snapshot(&cfg, index)
        }
        Commands::Replay { fixture, addr } => cli::run_replay(&addr, &fixture),
        Commands::Health { source } => {
            let cfg = resolve_config(&source)?;
            cli::run_health(&cfg)
        }
        Commands::Config { action } => match action {
            ConfigAction::Show => cli::run_config_show(),
            ConfigAction::Init { force } => cli::run_config_init(force),
            ConfigAction::Set { key, value } => cli::run_config_set(&key, &value),
            ConfigAction::Reset => cli::run_config_reset(),
        },
    }
}
