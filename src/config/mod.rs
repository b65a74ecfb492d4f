/// Configuration system for thermoview.
///
/// Provides a layered configuration hierarchy:
///
/// 1. **Built-in defaults**: hardcoded in [`schema::ThermoviewConfig::default()`]
/// 2. **User global config**: `~/.thermoview/config.toml`
/// 3. **Project local config**: `.thermoview.toml` in the current working directory
/// 4. **Environment variables**: `THERMOVIEW_*` overrides
///
/// Command-line flags are applied on top by the binary.
///
/// # Usage
///
/// ```rust,ignore
/// use thermoview::config;
///
/// let cfg = config::load();
/// let source = HttpDataSource::from_config(&cfg.source);
/// ```
pub mod schema;

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};

pub use schema::ThermoviewConfig;

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Load the fully resolved configuration.
///
/// Merges all layers in order: defaults → global TOML → project TOML → env
/// vars.
pub fn load() -> ThermoviewConfig {
    let layers = [global_config_path(), project_config_path()]
        .into_iter()
        .filter_map(load_toml_file);
    let mut config = merge_layers(layers);

    apply_env_overrides(&mut config);

    config
}

/// Load a TOML config file from the given path (if it exists).
///
/// Files that fail to parse or do not fit the schema are reported and
/// skipped; a broken config file must not keep the dashboard from starting.
fn load_toml_file(path: Option<PathBuf>) -> Option<toml::Value> {
    let path = path?;
    let content = fs::read_to_string(&path).ok()?;
    let layer = match toml::from_str::<toml::Value>(&content) {
        Ok(layer) => layer,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "ignoring malformed config file");
            return None;
        }
    };
    if let Err(e) = layer.clone().try_into::<ThermoviewConfig>() {
        tracing::warn!(path = %path.display(), error = %e, "ignoring invalid config file");
        return None;
    }
    Some(layer)
}

/// Stack file layers in order and resolve them against the built-in
/// defaults. Only keys a layer actually sets override earlier layers.
fn merge_layers(layers: impl IntoIterator<Item = toml::Value>) -> ThermoviewConfig {
    let mut merged = toml::Value::Table(toml::Table::new());
    for layer in layers {
        merge_value(&mut merged, layer);
    }
    merged.try_into().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "merged config does not fit the schema, using defaults");
        ThermoviewConfig::default()
    })
}

/// Recursively merge `overlay` into `base`. Tables merge key by key; any
/// other value replaces what was there.
fn merge_value(base: &mut toml::Value, overlay: toml::Value) {
    match (base, overlay) {
        (toml::Value::Table(base), toml::Value::Table(overlay)) => {
            for (key, value) in overlay {
                match base.get_mut(&key) {
                    Some(existing) => merge_value(existing, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}

// ---------------------------------------------------------------------------
// File paths
// ---------------------------------------------------------------------------

/// Path to the user global config: `~/.thermoview/config.toml`.
fn global_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".thermoview").join("config.toml"))
}

/// Path to the project local config: `.thermoview.toml` in the current directory.
fn project_config_path() -> Option<PathBuf> {
    std::env::current_dir()
        .ok()
        .map(|cwd| cwd.join(".thermoview.toml"))
}

/// Return the path to the global config file for display/init purposes.
pub fn global_config_file() -> Option<PathBuf> {
    global_config_path()
}

/// Return the path to the project config file for display purposes.
pub fn project_config_file() -> Option<PathBuf> {
    project_config_path()
}

// ---------------------------------------------------------------------------
// Environment variable overrides
// ---------------------------------------------------------------------------

/// Apply environment variable overrides.
///
/// Supported variables:
/// - `THERMOVIEW_URL`: backend base URL
/// - `THERMOVIEW_TIMEOUT_MS`: per-request timeout
/// - `THERMOVIEW_INTERVAL_SECS`: summary refresh interval
/// - `THERMOVIEW_RELOAD_ON_CLAMP`: reload detail after a clamp (`1`/`true`/`yes`/`on`)
/// - `THERMOVIEW_FORMAT`: `terminal` or `json`
/// - `THERMOVIEW_LOG`: default log filter
fn apply_env_overrides(config: &mut ThermoviewConfig) {
    if let Ok(val) = std::env::var("THERMOVIEW_URL")
        && !val.is_empty()
    {
        config.source.base_url = val;
    }
    if let Ok(val) = std::env::var("THERMOVIEW_TIMEOUT_MS")
        && let Ok(ms) = val.parse::<u64>()
    {
        config.source.timeout_ms = ms;
    }
    if let Ok(val) = std::env::var("THERMOVIEW_INTERVAL_SECS")
        && let Ok(secs) = val.parse::<u64>()
        && secs > 0
    {
        config.refresh.interval_secs = secs;
    }
    if let Ok(val) = std::env::var("THERMOVIEW_RELOAD_ON_CLAMP") {
        config.refresh.reload_on_clamp = is_truthy(&val);
    }
    if let Ok(val) = std::env::var("THERMOVIEW_FORMAT")
        && let Some(format) = parse_format(&val)
    {
        config.render.format = format;
    }
    if let Ok(val) = std::env::var("THERMOVIEW_LOG")
        && !val.is_empty()
    {
        config.logging.level = val;
    }
}

/// Check if a string value represents a truthy boolean.
fn is_truthy(val: &str) -> bool {
    matches!(
        val.to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

/// Parse an output format string.
pub fn parse_format(val: &str) -> Option<schema::OutputFormat> {
    match val.to_ascii_lowercase().as_str() {
        "terminal" | "term" | "text" => Some(schema::OutputFormat::Terminal),
        "json" | "jsonl" => Some(schema::OutputFormat::Json),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Config init / set / reset
// ---------------------------------------------------------------------------

/// Write the default annotated config to `~/.thermoview/config.toml`.
///
/// Returns an error if the file already exists (use `force = true` to
/// overwrite).
pub fn init_config(force: bool) -> Result<PathBuf> {
    let path = global_config_path().context("could not determine home directory")?;

    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {}. Use --force to overwrite.",
            path.display()
        );
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("failed to create ~/.thermoview/ directory")?;
    }

    fs::write(&path, ThermoviewConfig::default_toml()).context("failed to write config file")?;

    Ok(path)
}

/// Set a single config key to a value in the global config file.
///
/// Supports dotted keys like `refresh.interval_secs` or
/// `render.palette.heatmap`. When no global file exists yet, the defaults
/// are written out first so every key is addressable.
pub fn set_config_value(key: &str, value: &str) -> Result<()> {
    let path = global_config_path().context("could not determine home directory")?;

    let content = if path.exists() {
        fs::read_to_string(&path).context("failed to read config file")?
    } else {
        toml::to_string_pretty(&ThermoviewConfig::default())
            .context("failed to serialize default config")?
    };

    let mut root: toml::Value =
        toml::from_str(&content).context("failed to parse config as TOML value")?;
    set_toml_value(&mut root, key, value)?;

    // Reject values the schema cannot load (e.g. an unknown colour scale).
    let _: ThermoviewConfig = root
        .clone()
        .try_into()
        .with_context(|| format!("invalid value '{value}' for '{key}'"))?;

    let output = toml::to_string_pretty(&root).context("failed to serialize updated config")?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("failed to create config directory")?;
    }
    fs::write(&path, output).context("failed to write config file")?;

    Ok(())
}

/// Set a value in a TOML value tree using a dotted key path.
fn set_toml_value(root: &mut toml::Value, key: &str, raw_value: &str) -> Result<()> {
    let parts: Vec<&str> = key.split('.').filter(|p| !p.is_empty()).collect();
    let Some((leaf, sections)) = parts.split_last() else {
        anyhow::bail!("empty config key");
    };

    let mut current = root;
    for &part in sections {
        current = current
            .get_mut(part)
            .with_context(|| format!("config key not found: section '{part}' in '{key}'"))?;
    }

    let table = current.as_table_mut().with_context(|| {
        format!(
            "expected table at '{}'",
            key.rsplit_once('.').map(|(s, _)| s).unwrap_or("")
        )
    })?;

    let new_value = match table.get(*leaf) {
        Some(toml::Value::Boolean(_)) => toml::Value::Boolean(is_truthy(raw_value)),
        Some(toml::Value::Integer(_)) => {
            let n: i64 = raw_value
                .parse()
                .with_context(|| format!("expected integer for '{key}', got '{raw_value}'"))?;
            toml::Value::Integer(n)
        }
        Some(toml::Value::Float(_)) => {
            let f: f64 = raw_value
                .parse()
                .with_context(|| format!("expected float for '{key}', got '{raw_value}'"))?;
            toml::Value::Float(f)
        }
        Some(toml::Value::Table(_)) => {
            anyhow::bail!("'{key}' is a section, not a value");
        }
        Some(_) => toml::Value::String(raw_value.to_string()),
        None => anyhow::bail!("unknown config key: '{key}'"),
    };

    table.insert((*leaf).to_string(), new_value);
    Ok(())
}

/// Reset the global config to defaults (overwrite the file).
pub fn reset_config() -> Result<PathBuf> {
    init_config(true)
}

/// Show the effective (fully resolved) config as TOML.
pub fn show_effective_config() -> Result<String> {
    let config = load();
    toml::to_string_pretty(&config).context("failed to serialize effective config")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
