/// JSON-lines render sink.
///
/// Every sink call becomes one JSON object on its own line:
///
/// ```text
/// {"kind":"plot","element":"heatmap-chart","chart":{...}}
/// {"kind":"text","element":"stat-min","text":"20.50"}
/// {"kind":"controls","label":"3 / 5","prev_enabled":true,"next_enabled":true}
/// ```
///
/// A consumer that keeps the latest object per element id gets the
/// in-place update semantics of the dashboard.
use std::io::{self, Write};

use serde::Serialize;

use super::{ChartDescriptor, ElementId, RenderSink, TextTarget};
use crate::navigator::ControlState;

#[derive(Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum Line<'a> {
    Plot {
        element: &'static str,
        chart: &'a ChartDescriptor,
    },
    Text {
        element: &'static str,
        text: &'a str,
    },
    Controls {
        label: &'a str,
        prev_enabled: bool,
        next_enabled: bool,
    },
}

/// Render sink writing JSON lines to any writer.
pub struct JsonSink<W: Write> {
    out: W,
}

impl JsonSink<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> JsonSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Give back the underlying writer.
    pub fn into_inner(self) -> W {
        self.out
    }

    fn emit(&mut self, line: &Line<'_>) {
        let result = serde_json::to_string(line)
            .map_err(io::Error::from)
            .and_then(|json| writeln!(self.out, "{json}"));
        if let Err(e) = result {
            tracing::warn!(error = %e, "failed to write render output");
        }
    }
}

impl<W: Write> RenderSink for JsonSink<W> {
    fn plot(&mut self, element: ElementId, chart: &ChartDescriptor) {
        self.emit(&Line::Plot {
            element: element.as_str(),
            chart,
        });
    }

    fn set_text(&mut self, target: TextTarget, text: &str) {
        self.emit(&Line::Text {
            element: target.as_str(),
            text,
        });
    }

    fn set_controls(&mut self, state: &ControlState) {
        self.emit(&Line::Controls {
            label: &state.label,
            prev_enabled: state.prev_enabled,
            next_enabled: state.next_enabled,
        });
    }

    fn flush(&mut self) {
        if let Err(e) = self.out.flush() {
            tracing::warn!(error = %e, "failed to flush render output");
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
