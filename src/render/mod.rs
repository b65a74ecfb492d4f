//! Render sink seam and chart descriptors.
//!
//! The dashboard never draws anything itself. It builds a
//! [`ChartDescriptor`] per view (see [`views`]) and hands it to a
//! [`RenderSink`] together with the [`ElementId`] it belongs to. Re-plotting
//! an element replaces what was there.
//!
//! Two sinks ship with the crate:
//! - [`terminal::TerminalSink`]: coloured text panels redrawn in place
//! - [`json::JsonSink`]: one JSON object per call, for piping into a
//!   charting front end

pub mod json;
pub mod terminal;
pub mod views;

use serde::Serialize;

use crate::config::schema::ColorScale;
use crate::navigator::ControlState;

pub use json::JsonSink;
pub use terminal::TerminalSink;

// ---------------------------------------------------------------------------
// Targets
// ---------------------------------------------------------------------------

/// Chart surfaces of the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ElementId {
    /// Max/min temperature over time.
    Timeseries,
    /// 3D surface of the temperature matrix.
    Surface,
    /// 2D heatmap of the temperature matrix.
    Heatmap,
    /// Distribution of all temperature values.
    Histogram,
    /// Gradient magnitude heatmap.
    Gradient,
    /// Hot region-of-interest mask.
    Roi,
}

impl ElementId {
    /// Every chart element, in display order.
    pub const ALL: [Self; 6] = [
        Self::Timeseries,
        Self::Surface,
        Self::Heatmap,
        Self::Histogram,
        Self::Gradient,
        Self::Roi,
    ];

    /// Stable identifier used by descriptor consumers.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Timeseries => "timeseries-chart",
            Self::Surface => "surface-chart",
            Self::Heatmap => "heatmap-chart",
            Self::Histogram => "histogram-chart",
            Self::Gradient => "gradient-chart",
            Self::Roi => "roi-chart",
        }
    }
}

/// Plain-text labels of the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TextTarget {
    Counter,
    Filename,
    StatMin,
    StatMax,
    StatAvg,
    /// `row, col` of the hottest cell, when the backend reports it.
    HotSpot,
    /// `row, col` of the coldest cell, when the backend reports it.
    ColdSpot,
}

impl TextTarget {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Counter => "counter",
            Self::Filename => "filename",
            Self::StatMin => "stat-min",
            Self::StatMax => "stat-max",
            Self::StatAvg => "stat-avg",
            Self::HotSpot => "hot-spot",
            Self::ColdSpot => "cold-spot",
        }
    }
}

// ---------------------------------------------------------------------------
// Descriptors
// ---------------------------------------------------------------------------

/// A chart: one or more traces plus layout options.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartDescriptor {
    pub traces: Vec<Trace>,
    pub layout: Layout,
}

/// One plotted series.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Trace {
    /// Line series over string x labels (timestamps).
    Scatter {
        name: String,
        x: Vec<String>,
        y: Vec<f64>,
        color: String,
    },
    /// 3D surface over a matrix.
    Surface {
        z: Vec<Vec<f64>>,
        colorscale: ColorScale,
    },
    /// 2D heatmap over a matrix.
    Heatmap {
        z: Vec<Vec<f64>>,
        colorscale: ColorScale,
    },
    /// Histogram over raw values; binning is left to the consumer.
    Histogram {
        x: Vec<f64>,
        nbins: usize,
        color: String,
    },
}

/// Layout options shared by all charts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Layout {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y_title: Option<String>,
    pub height: u32,
}

// ---------------------------------------------------------------------------
// Sink seam
// ---------------------------------------------------------------------------

/// Something that can show the dashboard.
pub trait RenderSink {
    /// Draw or replace the chart in `element`.
    fn plot(&mut self, element: ElementId, chart: &ChartDescriptor);

    /// Replace the text of a label.
    fn set_text(&mut self, target: TextTarget, text: &str);

    /// Remove a label that no longer applies.
    fn clear_text(&mut self, target: TextTarget) {
        self.set_text(target, "");
    }

    /// Update the counter label and the enablement of previous/next.
    fn set_controls(&mut self, state: &ControlState);

    /// Push pending updates to the screen. Called once per handled event.
    fn flush(&mut self) {}
}

/// Two-decimal formatting used by every numeric stat label.
pub fn format_stat(value: f64) -> String {
    format!("{value:.2}")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_stat_rounds_to_two_decimals() {
        assert_eq!(format_stat(24.0), "24.00");
        assert_eq!(format_stat(31.256), "31.26");
    }

    #[test]
    fn element_ids_are_unique() {
        let mut ids: Vec<&str> = ElementId::ALL.iter().map(|e| e.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), ElementId::ALL.len());
    }

    #[test]
    fn trace_serializes_with_type_tag() {
        let trace = Trace::Heatmap {
            z: vec![vec![1.0]],
            colorscale: ColorScale::Hot,
        };
        let json = serde_json::to_string(&trace).unwrap();
        assert!(json.contains("\"type\":\"heatmap\""));
        assert!(json.contains("\"colorscale\":\"hot\""));
    }

    #[test]
    fn layout_omits_missing_axis_titles() {
        let layout = Layout {
            title: "t".to_string(),
            x_title: None,
            y_title: Some("°C".to_string()),
            height: 300,
        };
        let json = serde_json::to_string(&layout).unwrap();
        assert!(!json.contains("x_title"));
        assert!(json.contains("y_title"));
    }
}
