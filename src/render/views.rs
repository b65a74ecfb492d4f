/// Chart descriptors built from backend payloads.
///
/// Pure functions: no I/O, no sink. Colours and layout constants come from
/// [`RenderConfig`].
use crate::config::schema::RenderConfig;
use crate::data::{DetailRecord, SummaryPoint};

use super::{ChartDescriptor, ElementId, Layout, Trace};

const TEMPERATURE_AXIS: &str = "Temperature (°C)";

/// Max/min temperature over time.
pub fn timeseries(points: &[SummaryPoint], config: &RenderConfig) -> ChartDescriptor {
    let x: Vec<String> = points.iter().map(|p| p.timestamp.clone()).collect();

    ChartDescriptor {
        traces: vec![
            Trace::Scatter {
                name: "Max temperature".to_string(),
                x: x.clone(),
                y: points.iter().map(|p| p.max_temp).collect(),
                color: config.palette.max_series.clone(),
            },
            Trace::Scatter {
                name: "Min temperature".to_string(),
                x,
                y: points.iter().map(|p| p.min_temp).collect(),
                color: config.palette.min_series.clone(),
            },
        ],
        layout: Layout {
            title: "Temperature over time".to_string(),
            x_title: Some("Time".to_string()),
            y_title: Some(TEMPERATURE_AXIS.to_string()),
            height: config.chart_height,
        },
    }
}

/// The five per-dataset views, keyed by the element they belong in.
pub fn detail_views(detail: &DetailRecord, config: &RenderConfig) -> Vec<(ElementId, ChartDescriptor)> {
    let palette = &config.palette;
    let matrices = &detail.matrices;
    let layout = |title: &str| Layout {
        title: title.to_string(),
        x_title: None,
        y_title: None,
        height: config.chart_height,
    };

    vec![
        (
            ElementId::Surface,
            ChartDescriptor {
                traces: vec![Trace::Surface {
                    z: matrices.temperature.clone(),
                    colorscale: palette.surface,
                }],
                layout: layout("Temperature surface"),
            },
        ),
        (
            ElementId::Heatmap,
            ChartDescriptor {
                traces: vec![Trace::Heatmap {
                    z: matrices.temperature.clone(),
                    colorscale: palette.heatmap,
                }],
                layout: layout("Temperature map"),
            },
        ),
        (
            ElementId::Histogram,
            ChartDescriptor {
                traces: vec![Trace::Histogram {
                    x: matrices.flattened_temperature(),
                    nbins: config.histogram_bins,
                    color: palette.histogram.clone(),
                }],
                layout: Layout {
                    x_title: Some(TEMPERATURE_AXIS.to_string()),
                    y_title: Some("Pixels".to_string()),
                    ..layout("Temperature distribution")
                },
            },
        ),
        (
            ElementId::Gradient,
            ChartDescriptor {
                traces: vec![Trace::Heatmap {
                    z: matrices.gradient_magnitude.clone(),
                    colorscale: palette.gradient,
                }],
                layout: layout("Gradient magnitude"),
            },
        ),
        (
            ElementId::Roi,
            ChartDescriptor {
                traces: vec![Trace::Heatmap {
                    z: matrices.hot_roi.clone(),
                    colorscale: palette.hot_roi,
                }],
                layout: layout("Hot regions of interest"),
            },
        ),
    ]
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::ColorScale;
    use crate::data::{DetailMatrices, DetailStats};

    fn detail() -> DetailRecord {
        DetailRecord {
            filename: "thermal_data_20240101_120000.h5".to_string(),
            stats: DetailStats {
                min: 20.0,
                max: 30.0,
                avg: 25.0,
                hot_spot_coords: None,
                cold_spot_coords: None,
            },
            matrices: DetailMatrices {
                temperature: vec![vec![20.0, 25.0], vec![30.0, 25.0]],
                gradient_magnitude: vec![vec![5.0, 5.0], vec![5.0, 5.0]],
                hot_roi: vec![vec![0.0, 0.0], vec![1.0, 0.0]],
            },
        }
    }

    #[test]
    fn timeseries_has_max_and_min_series() {
        let points = vec![
            SummaryPoint {
                timestamp: "2024-01-01T12:00:00".to_string(),
                max_temp: 31.0,
                min_temp: 19.0,
            },
            SummaryPoint {
                timestamp: "2024-01-01T12:05:00".to_string(),
                max_temp: 33.0,
                min_temp: 18.0,
            },
        ];
        let chart = timeseries(&points, &RenderConfig::default());
        assert_eq!(chart.traces.len(), 2);
        match &chart.traces[0] {
            Trace::Scatter { x, y, color, .. } => {
                assert_eq!(x.len(), 2);
                assert_eq!(y, &vec![31.0, 33.0]);
                assert_eq!(color, "#ff4136");
            }
            other => panic!("expected scatter, got {other:?}"),
        }
    }

    #[test]
    fn detail_views_cover_five_elements_in_order() {
        let views = detail_views(&detail(), &RenderConfig::default());
        let ids: Vec<ElementId> = views.iter().map(|(id, _)| *id).collect();
        assert_eq!(
            ids,
            vec![
                ElementId::Surface,
                ElementId::Heatmap,
                ElementId::Histogram,
                ElementId::Gradient,
                ElementId::Roi,
            ]
        );
    }

    #[test]
    fn histogram_uses_flattened_temperature_and_configured_bins() {
        let mut config = RenderConfig::default();
        config.histogram_bins = 7;
        let views = detail_views(&detail(), &config);
        let (_, chart) = &views[2];
        match &chart.traces[0] {
            Trace::Histogram { x, nbins, .. } => {
                assert_eq!(x, &vec![20.0, 25.0, 30.0, 25.0]);
                assert_eq!(*nbins, 7);
            }
            other => panic!("expected histogram, got {other:?}"),
        }
    }

    #[test]
    fn palette_drives_colorscales() {
        let mut config = RenderConfig::default();
        config.palette.gradient = ColorScale::Jet;
        let views = detail_views(&detail(), &config);
        match &views[3].1.traces[0] {
            Trace::Heatmap { colorscale, .. } => assert_eq!(*colorscale, ColorScale::Jet),
            other => panic!("expected heatmap, got {other:?}"),
        }
    }
}
