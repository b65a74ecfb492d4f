/// Terminal render sink.
///
/// Keeps the latest rendering of every element and label, and redraws the
/// whole dashboard on [`flush`](RenderSink::flush). Plotting an element that
/// already has a panel replaces the panel; nothing accumulates.
///
/// Matrix views are downsampled to fit `render.heatmap_width` columns and
/// `render.chart_height / 25` rows. The time series becomes one sparkline
/// per trace, the histogram a column of horizontal bars.
use std::collections::BTreeMap;
use std::io::{self, Write};

use colored::Colorize;

use super::{ChartDescriptor, ElementId, RenderSink, TextTarget, Trace};
use crate::config::schema::{ColorScale, RenderConfig};
use crate::navigator::ControlState;

/// Intensity ramp used when colour is off.
const RAMP: [char; 5] = [' ', '░', '▒', '▓', '█'];

/// Sparkline glyphs, lowest to highest.
const SPARKS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Histogram rows are capped so the panel stays on screen.
const MAX_HISTOGRAM_ROWS: usize = 12;

/// Width of a full histogram bar.
const BAR_WIDTH: usize = 40;

/// Render sink drawing text panels.
pub struct TerminalSink<W: Write> {
    out: W,
    width: usize,
    sparkline_width: usize,
    max_rows: usize,
    color: bool,
    clear: bool,
    deferred: bool,
    panels: BTreeMap<ElementId, Vec<String>>,
    texts: BTreeMap<TextTarget, String>,
    controls: Option<ControlState>,
}

impl TerminalSink<io::Stdout> {
    /// Sink for an interactive terminal: clears and redraws on every flush.
    pub fn stdout(config: &RenderConfig) -> Self {
        let color = colored::control::SHOULD_COLORIZE.should_colorize();
        Self::new(io::stdout(), config, color, true)
    }
}

impl<W: Write> TerminalSink<W> {
    pub fn new(out: W, config: &RenderConfig, color: bool, clear: bool) -> Self {
        Self {
            out,
            width: config.heatmap_width.max(1),
            sparkline_width: config.sparkline_width.max(1),
            max_rows: (config.chart_height / 25).max(1) as usize,
            color,
            clear,
            deferred: false,
            panels: BTreeMap::new(),
            texts: BTreeMap::new(),
            controls: None,
        }
    }

    /// Make [`flush`](RenderSink::flush) a no-op; the caller draws once with
    /// [`present`](Self::present).
    pub fn deferred(mut self) -> Self {
        self.deferred = true;
        self
    }

    /// Give back the underlying writer.
    pub fn into_inner(self) -> W {
        self.out
    }

    /// Current panel lines for an element, if it has been plotted.
    pub fn panel(&self, element: ElementId) -> Option<&[String]> {
        self.panels.get(&element).map(Vec::as_slice)
    }

    /// Current text of a label, if it has been set.
    pub fn text(&self, target: TextTarget) -> Option<&str> {
        self.texts.get(&target).map(String::as_str)
    }

    fn render_chart(&self, chart: &ChartDescriptor) -> Vec<String> {
        let mut lines = vec![if self.color {
            chart.layout.title.bold().cyan().to_string()
        } else {
            chart.layout.title.clone()
        }];

        for trace in &chart.traces {
            match trace {
                Trace::Scatter { name, y, color, .. } => {
                    let spark = sparkline(y, self.sparkline_width);
                    let spark = match (self.color, parse_hex(color)) {
                        (true, Some([r, g, b])) => spark.truecolor(r, g, b).to_string(),
                        _ => spark,
                    };
                    let last = y.last().map(|v| format!("{v:.2}")).unwrap_or_else(|| "-".to_string());
                    lines.push(format!("  {name:<16} {spark} {last}"));
                }
                Trace::Surface { z, colorscale } | Trace::Heatmap { z, colorscale } => {
                    let cells = downsample(z, self.width, self.max_rows);
                    lines.extend(self.shade(&cells, *colorscale));
                }
                Trace::Histogram { x, nbins, color } => {
                    let bins = (*nbins).clamp(1, MAX_HISTOGRAM_ROWS);
                    let rgb = parse_hex(color).filter(|_| self.color);
                    for line in histogram_bars(x, bins, BAR_WIDTH) {
                        lines.push(match rgb {
                            Some([r, g, b]) => format!("  {}", line.truecolor(r, g, b)),
                            None => format!("  {line}"),
                        });
                    }
                }
            }
        }
        lines
    }

    fn shade(&self, cells: &[Vec<f64>], scale: ColorScale) -> Vec<String> {
        cells
            .iter()
            .map(|row| {
                let mut line = String::from("  ");
                for &t in row {
                    if self.color {
                        let [r, g, b] = scale.sample(t);
                        line.push_str(&"█".truecolor(r, g, b).to_string());
                    } else {
                        line.push(ramp_char(t));
                    }
                }
                line
            })
            .collect()
    }

    /// Write the whole dashboard to the output.
    pub fn present(&mut self) -> io::Result<()> {
        let mut screen = String::new();
        if self.clear {
            screen.push_str("\x1b[2J\x1b[H");
        }

        let title = "thermoview";
        screen.push_str(&if self.color {
            title.bold().cyan().to_string()
        } else {
            title.to_string()
        });
        screen.push('\n');
        screen.push_str(&"=".repeat(60));
        screen.push('\n');

        if let Some(controls) = &self.controls {
            let button = |label: &str, enabled: bool| {
                if enabled {
                    format!("[{label}]")
                } else if self.color {
                    format!("[{label}]").dimmed().to_string()
                } else {
                    format!("({label})")
                }
            };
            screen.push_str(&format!(
                "  {}  {}  {}\n",
                button("p prev", controls.prev_enabled),
                controls.label,
                button("n next", controls.next_enabled),
            ));
        }

        if let Some(filename) = self.texts.get(&TextTarget::Filename) {
            screen.push_str(&format!("  File: {filename}\n"));
        }
        let stat = |target: TextTarget| self.texts.get(&target).map(String::as_str).unwrap_or("-");
        if self.texts.contains_key(&TextTarget::StatMin) {
            screen.push_str(&format!(
                "  Min: {}  Max: {}  Avg: {}\n",
                stat(TextTarget::StatMin),
                stat(TextTarget::StatMax),
                stat(TextTarget::StatAvg),
            ));
        }
        if self.texts.contains_key(&TextTarget::HotSpot) || self.texts.contains_key(&TextTarget::ColdSpot) {
            screen.push_str(&format!(
                "  Hot spot: ({})  Cold spot: ({})\n",
                stat(TextTarget::HotSpot),
                stat(TextTarget::ColdSpot),
            ));
        }

        for element in ElementId::ALL {
            if let Some(panel) = self.panels.get(&element) {
                screen.push('\n');
                for line in panel {
                    screen.push_str(line);
                    screen.push('\n');
                }
            }
        }

        screen.push_str("\n  n: next  p: previous  r: refresh  q: quit\n");
        self.out.write_all(screen.as_bytes())?;
        self.out.flush()
    }
}

impl<W: Write> RenderSink for TerminalSink<W> {
    fn plot(&mut self, element: ElementId, chart: &ChartDescriptor) {
        let lines = self.render_chart(chart);
        self.panels.insert(element, lines);
    }

    fn set_text(&mut self, target: TextTarget, text: &str) {
        self.texts.insert(target, text.to_string());
    }

    fn clear_text(&mut self, target: TextTarget) {
        self.texts.remove(&target);
    }

    fn set_controls(&mut self, state: &ControlState) {
        self.controls = Some(state.clone());
    }

    fn flush(&mut self) {
        if self.deferred {
            return;
        }
        if let Err(e) = self.present() {
            tracing::warn!(error = %e, "failed to draw dashboard");
        }
    }
}

// ---------------------------------------------------------------------------
// Text rendering helpers
// ---------------------------------------------------------------------------

/// Parse `#rrggbb` into RGB.
fn parse_hex(color: &str) -> Option<[u8; 3]> {
    let hex = color.strip_prefix('#')?;
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    Some([channel(0)?, channel(2)?, channel(4)?])
}

/// Finite min and max of a value set.
fn finite_range<'a>(values: impl IntoIterator<Item = &'a f64>) -> Option<(f64, f64)> {
    values
        .into_iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

/// Position of `v` within `[lo, hi]`, 0 when the range is empty.
fn normalize(v: f64, lo: f64, hi: f64) -> f64 {
    if !v.is_finite() || hi <= lo {
        0.0
    } else {
        ((v - lo) / (hi - lo)).clamp(0.0, 1.0)
    }
}

fn ramp_char(t: f64) -> char {
    let i = (t * (RAMP.len() - 1) as f64).round() as usize;
    RAMP[i.min(RAMP.len() - 1)]
}

/// Sparkline of the last `width` values.
fn sparkline(values: &[f64], width: usize) -> String {
    let tail = &values[values.len().saturating_sub(width)..];
    let Some((lo, hi)) = finite_range(tail) else {
        return String::new();
    };
    tail.iter()
        .map(|&v| {
            let i = (normalize(v, lo, hi) * (SPARKS.len() - 1) as f64).round() as usize;
            SPARKS[i.min(SPARKS.len() - 1)]
        })
        .collect()
}

/// Shrink a matrix to at most `max_cols` x `max_rows` by striding, with
/// every cell normalized into `[0, 1]` against the whole matrix.
fn downsample(z: &[Vec<f64>], max_cols: usize, max_rows: usize) -> Vec<Vec<f64>> {
    let Some((lo, hi)) = finite_range(z.iter().flatten()) else {
        return Vec::new();
    };
    let cols = z.iter().map(Vec::len).max().unwrap_or(0);
    let col_step = cols.div_ceil(max_cols.max(1)).max(1);
    let row_step = z.len().div_ceil(max_rows.max(1)).max(1);

    z.iter()
        .step_by(row_step)
        .map(|row| {
            row.iter()
                .step_by(col_step)
                .map(|&v| normalize(v, lo, hi))
                .collect()
        })
        .collect()
}

/// Count values into `nbins` equal-width bins spanning their range.
fn bin_counts(values: &[f64], nbins: usize) -> Option<(f64, f64, Vec<usize>)> {
    let nbins = nbins.max(1);
    let (lo, hi) = finite_range(values)?;
    let mut counts = vec![0usize; nbins];
    for &v in values.iter().filter(|v| v.is_finite()) {
        let i = (normalize(v, lo, hi) * nbins as f64) as usize;
        counts[i.min(nbins - 1)] += 1;
    }
    Some((lo, hi, counts))
}

/// One line per bin: lower edge, bar, count.
fn histogram_bars(values: &[f64], nbins: usize, width: usize) -> Vec<String> {
    let Some((lo, hi, counts)) = bin_counts(values, nbins) else {
        return vec!["(no data)".to_string()];
    };
    let peak = counts.iter().copied().max().unwrap_or(0).max(1);
    let step = (hi - lo) / counts.len() as f64;

    counts
        .iter()
        .enumerate()
        .map(|(i, &count)| {
            let edge = lo + step * i as f64;
            let bar = "█".repeat(count * width / peak);
            format!("{edge:>8.2} │{bar} {count}")
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
