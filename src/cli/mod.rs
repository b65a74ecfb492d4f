//! CLI command implementations for thermoview.
//!
//! Provides subcommand handlers for:
//! - `thermoview watch`: interactive dashboard with background refresh
//! - `thermoview snapshot`: one-shot render of summary + one dataset
//! - `thermoview replay`: serve a fixture file as the dashboard API
//! - `thermoview health`: check config files and backend reachability
//! - `thermoview config show|init|set|reset`: configuration management

use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use colored::Colorize;

use crate::config::{self, ThermoviewConfig};
use crate::config::schema::OutputFormat;
use crate::dashboard::event_loop::EventLoop;
use crate::dashboard::{Dashboard, Outcome};
use crate::data::{DataSource, HttpDataSource};
use crate::render::{JsonSink, RenderSink, TerminalSink};
use crate::web;

// ---------------------------------------------------------------------------
// thermoview watch
// ---------------------------------------------------------------------------

/// Run the interactive dashboard until the user quits.
pub fn run_watch(cfg: &ThermoviewConfig) -> Result<()> {
    let source = Arc::new(HttpDataSource::from_config(&cfg.source));
    tracing::info!(url = source.base_url(), interval_secs = cfg.refresh.interval_secs, "starting dashboard");

    match cfg.render.format {
        OutputFormat::Terminal => watch_with(source, TerminalSink::stdout(&cfg.render), cfg),
        OutputFormat::Json => watch_with(source, JsonSink::stdout(), cfg),
    }
}

fn watch_with<R: RenderSink>(
    source: Arc<HttpDataSource>,
    sink: R,
    cfg: &ThermoviewConfig,
) -> Result<()> {
    let dashboard = Dashboard::new(source, sink, cfg.render.clone(), &cfg.refresh);
    let interval = Duration::from_secs(cfg.refresh.interval_secs.max(1));
    EventLoop::new(dashboard).run(interval)
}

// ---------------------------------------------------------------------------
// thermoview snapshot
// ---------------------------------------------------------------------------

/// Render the summary and one dataset once, then exit.
///
/// Unlike `watch`, a failed summary or detail fetch is an error here: there
/// is no later tick to recover.
pub fn run_snapshot(cfg: &ThermoviewConfig, index: Option<usize>) -> Result<()> {
    let source = Arc::new(HttpDataSource::from_config(&cfg.source));

    match cfg.render.format {
        OutputFormat::Terminal => {
            let color = colored::control::SHOULD_COLORIZE.should_colorize();
            let sink = TerminalSink::new(std::io::stdout(), &cfg.render, color, false).deferred();
            let mut dashboard = Dashboard::new(source, sink, cfg.render.clone(), &cfg.refresh);
            let result = snapshot_with(&mut dashboard, index);
            dashboard
                .into_sink()
                .present()
                .context("failed to write dashboard")?;
            result
        }
        OutputFormat::Json => {
            let mut dashboard = Dashboard::new(source, JsonSink::stdout(), cfg.render.clone(), &cfg.refresh);
            snapshot_with(&mut dashboard, index)
        }
    }
}

/// The startup sequence, optionally followed by a jump to `index`.
pub fn snapshot_with<S: DataSource, R: RenderSink>(
    dashboard: &mut Dashboard<S, R>,
    index: Option<usize>,
) -> Result<()> {
    dashboard.render_controls();

    let summary = dashboard.refresh_summary();
    if summary.outcome == Outcome::Failed {
        anyhow::bail!("could not fetch the dataset summary (see log for details)");
    }

    if !dashboard.navigator().has_selection() {
        eprintln!("{}", "No datasets available yet.".yellow());
        return Ok(());
    }

    if let Some(index) = index
        && index >= dashboard.navigator().total()
    {
        tracing::warn!(
            requested = index,
            total = dashboard.navigator().total(),
            "index out of range, showing the last dataset"
        );
    }

    let target = index.unwrap_or(0);
    if let Some(ticket) = dashboard.select_index(target) {
        tracing::debug!(index = ticket.index(), "jumping to dataset");
    }

    let shown = dashboard.navigator().index();
    if dashboard.load_detail(shown) == Outcome::Failed {
        anyhow::bail!("could not load dataset {} (see log for details)", shown + 1);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// thermoview replay
// ---------------------------------------------------------------------------

/// Serve a fixture file as the dashboard API.
pub fn run_replay(addr: &str, fixture: &Path) -> Result<()> {
    web::serve(addr, fixture)
}

// ---------------------------------------------------------------------------
// thermoview health
// ---------------------------------------------------------------------------

/// Check config files and whether the backend answers.
pub fn run_health(cfg: &ThermoviewConfig) -> Result<()> {
    println!("{}", "thermoview Health Check".bold().cyan());
    println!("{}", "=".repeat(40));

    let global_exists = config::global_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    let project_exists = config::project_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    print_health_item(
        "Global config",
        global_exists,
        if global_exists {
            "~/.thermoview/config.toml found"
        } else {
            "not found (run `thermoview config init` to create)"
        },
    );
    print_health_item(
        "Project config",
        project_exists,
        if project_exists {
            ".thermoview.toml found"
        } else {
            "none (optional)"
        },
    );

    let source = HttpDataSource::from_config(&cfg.source);
    let start = Instant::now();
    match source.fetch_summary() {
        Ok(points) => print_health_item(
            "Backend",
            true,
            &format!(
                "{}, {} datasets ({} ms)",
                source.base_url(),
                points.len(),
                start.elapsed().as_millis()
            ),
        ),
        Err(e) => print_health_item("Backend", false, &e.to_string()),
    }

    print_health_item(
        "Refresh interval",
        true,
        &format!("{} s", cfg.refresh.interval_secs),
    );
    print_health_item("Output format", true, &cfg.render.format.to_string());

    Ok(())
}

fn print_health_item(name: &str, ok: bool, detail: &str) {
    let mark = if ok { "✓".green() } else { "✗".red() };
    println!("  {mark} {:<18} {}", name.bold(), detail.dimmed());
}

// ---------------------------------------------------------------------------
// thermoview config
// ---------------------------------------------------------------------------

/// Show the effective configuration and where it came from.
pub fn run_config_show() -> Result<()> {
    let toml_str = config::show_effective_config()?;
    println!("{}", "Effective thermoview Configuration".bold().cyan());
    println!("{}", "=".repeat(50));
    println!();
    println!("{toml_str}");

    let global_exists = config::global_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    let project_exists = config::project_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    println!("{}", "Sources (highest priority last):".dimmed());
    println!("  {} built-in defaults", "·".dimmed());
    print_source("~/.thermoview/config.toml", global_exists);
    print_source(".thermoview.toml", project_exists);
    println!(
        "  {} {}",
        "·".dimmed(),
        "THERMOVIEW_* environment variables".dimmed()
    );

    Ok(())
}

fn print_source(name: &str, exists: bool) {
    if exists {
        println!("  {} {}", "✓".green(), name.dimmed());
    } else {
        println!("  {} {}", "·".dimmed(), format!("{name} (not found)").dimmed());
    }
}

/// Initialize a default config file at `~/.thermoview/config.toml`.
pub fn run_config_init(force: bool) -> Result<()> {
    let path = config::init_config(force)?;
    println!(
        "{} Config written to {}",
        "✓".green().bold(),
        path.display()
    );
    println!("  {}", "Edit the file to customize the dashboard.".dimmed());
    Ok(())
}

/// Set a single configuration value in the global config file.
pub fn run_config_set(key: &str, value: &str) -> Result<()> {
    config::set_config_value(key, value)?;
    println!("{} Set {} = {}", "✓".green().bold(), key.bold(), value);
    Ok(())
}

/// Reset configuration to defaults.
pub fn run_config_reset() -> Result<()> {
    let path = config::reset_config()?;
    println!(
        "{} Config reset to defaults at {}",
        "✓".green().bold(),
        path.display()
    );
    Ok(())
}
