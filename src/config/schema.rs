/// Configuration schema and defaults for thermoview.
///
/// Defines the TOML-serializable configuration structure with all sections:
/// `[source]`, `[refresh]`, `[render]`, `[render.palette]`, and `[logging]`.
///
/// Every field has a sensible built-in default. Users only need to set the
/// values they want to override.
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Top-level thermoview configuration.
///
/// Maps directly to `~/.thermoview/config.toml` and `.thermoview.toml`.
/// All sections and fields are optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ThermoviewConfig {
    pub source: SourceConfig,
    pub refresh: RefreshConfig,
    pub render: RenderConfig,
    pub logging: LoggingConfig,
}

// ---------------------------------------------------------------------------
// [source]
// ---------------------------------------------------------------------------

/// Where the dashboard reads its data from.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Backend base URL; the API lives under `/api/data/`.
    pub base_url: String,
    /// Per-request timeout (milliseconds).
    pub timeout_ms: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5000".to_string(),
            timeout_ms: 10_000,
        }
    }
}

// ---------------------------------------------------------------------------
// [refresh]
// ---------------------------------------------------------------------------

/// Background summary polling.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RefreshConfig {
    /// Seconds between summary refreshes.
    pub interval_secs: u64,
    /// Reload the detail view when a refresh clamps the selected index.
    /// Off by default: the detail view stays on what was last loaded.
    pub reload_on_clamp: bool,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            interval_secs: 30,
            reload_on_clamp: false,
        }
    }
}

// ---------------------------------------------------------------------------
// [render]
// ---------------------------------------------------------------------------

/// Which render sink draws the dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutputFormat {
    /// Coloured text panels redrawn in place.
    #[default]
    Terminal,
    /// One JSON object per render call on stdout.
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Terminal => write!(f, "terminal"),
            Self::Json => write!(f, "json"),
        }
    }
}

/// Named continuous colour scales for matrix views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ColorScale {
    Inferno,
    Viridis,
    Hot,
    Jet,
    Greys,
    Reds,
}

impl ColorScale {
    /// Low and high end of the scale as RGB.
    pub fn endpoints(self) -> ([u8; 3], [u8; 3]) {
        match self {
            Self::Inferno => ([0, 0, 4], [252, 255, 164]),
            Self::Viridis => ([68, 1, 84], [253, 231, 37]),
            Self::Hot => ([10, 0, 0], [255, 255, 255]),
            Self::Jet => ([0, 0, 131], [128, 0, 0]),
            Self::Greys => ([0, 0, 0], [255, 255, 255]),
            Self::Reds => ([255, 245, 240], [103, 0, 13]),
        }
    }

    /// Linear interpolation between the endpoints, `t` in `[0, 1]`.
    pub fn sample(self, t: f64) -> [u8; 3] {
        let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
        let (lo, hi) = self.endpoints();
        let mix = |a: u8, b: u8| (f64::from(a) + (f64::from(b) - f64::from(a)) * t).round() as u8;
        [mix(lo[0], hi[0]), mix(lo[1], hi[1]), mix(lo[2], hi[2])]
    }
}

impl std::fmt::Display for ColorScale {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Inferno => "inferno",
            Self::Viridis => "viridis",
            Self::Hot => "hot",
            Self::Jet => "jet",
            Self::Greys => "greys",
            Self::Reds => "reds",
        };
        write!(f, "{name}")
    }
}

/// Colours for every chart, keyed by view.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PaletteConfig {
    /// Line colour of the max-temperature series (`#rrggbb`).
    pub max_series: String,
    /// Line colour of the min-temperature series (`#rrggbb`).
    pub min_series: String,
    /// Bar colour of the temperature histogram (`#rrggbb`).
    pub histogram: String,
    pub surface: ColorScale,
    pub heatmap: ColorScale,
    pub gradient: ColorScale,
    pub hot_roi: ColorScale,
}

impl Default for PaletteConfig {
    fn default() -> Self {
        Self {
            max_series: "#ff4136".to_string(),
            min_series: "#0074d9".to_string(),
            histogram: "#ff851b".to_string(),
            surface: ColorScale::Inferno,
            heatmap: ColorScale::Inferno,
            gradient: ColorScale::Viridis,
            hot_roi: ColorScale::Reds,
        }
    }
}

/// Layout constants and sink selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Sink used by `watch` and `snapshot`.
    pub format: OutputFormat,
    /// Chart height hint (pixels for descriptor consumers, rows / 25 for the terminal).
    pub chart_height: u32,
    /// Number of bins in the temperature histogram.
    pub histogram_bins: usize,
    /// Maximum columns of a downsampled terminal heatmap.
    pub heatmap_width: usize,
    /// Maximum points shown in a terminal sparkline.
    pub sparkline_width: usize,
    pub palette: PaletteConfig,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            chart_height: 400,
            histogram_bins: 50,
            heatmap_width: 48,
            sparkline_width: 60,
            palette: PaletteConfig::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// [logging]
// ---------------------------------------------------------------------------

/// Diagnostic log settings. `RUST_LOG` takes precedence when set.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default `tracing` filter directive.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Annotated default file
// ---------------------------------------------------------------------------

impl ThermoviewConfig {
    /// The annotated default config written by `thermoview config init`.
    pub fn default_toml() -> String {
        r##"# thermoview configuration
#
# Configuration hierarchy (highest precedence wins):
#   1. Command-line flags
#   2. Environment variables (THERMOVIEW_*)
#   3. Project config (.thermoview.toml in current directory)
#   4. User global config (~/.thermoview/config.toml)
#   5. Built-in defaults

[source]
base_url = "http://127.0.0.1:5000"
timeout_ms = 10000

[refresh]
interval_secs = 30
reload_on_clamp = false       # Reload the detail view when a refresh clamps the index

[render]
format = "terminal"           # terminal | json
chart_height = 400
histogram_bins = 50
heatmap_width = 48
sparkline_width = 60

[render.palette]
max_series = "#ff4136"
min_series = "#0074d9"
histogram = "#ff851b"
surface = "inferno"           # inferno | viridis | hot | jet | greys | reds
heatmap = "inferno"
gradient = "viridis"
hot_roi = "reds"

[logging]
level = "warn"                # Overridden by RUST_LOG
"##
        .to_string()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
