/// End-to-end tests over HTTP.
///
/// A replay server is bound to an ephemeral port and fed a fixture file;
/// the real HTTP data source and dashboard talk to it.
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use tempfile::NamedTempFile;
use thermoview::config::schema::{RefreshConfig, RenderConfig};
use thermoview::dashboard::{Dashboard, Outcome};
use thermoview::data::{
    DataSource, DetailMatrices, DetailRecord, DetailStats, FetchError, HttpDataSource,
    SummaryPoint,
};
use thermoview::render::{JsonSink, TerminalSink, TextTarget};
use thermoview::web::{self, Fixture};

fn fixture(count: usize) -> Fixture {
    let summary = (0..count)
        .map(|i| SummaryPoint {
            timestamp: format!("2024-03-05T08:{i:02}:00"),
            max_temp: 40.0 + i as f64,
            min_temp: 18.5,
        })
        .collect();
    let details = (0..count)
        .map(|i| DetailRecord {
            filename: format!("thermal_data_20240305_08{i:02}00.h5"),
            stats: DetailStats {
                min: 18.5,
                max: 40.0 + i as f64,
                avg: 25.1,
                hot_spot_coords: Some([2, 1]),
                cold_spot_coords: Some([0, 0]),
            },
            matrices: DetailMatrices {
                temperature: vec![vec![18.5, 20.0], vec![22.0, 24.0], vec![30.0, 40.0 + i as f64]],
                gradient_magnitude: vec![vec![1.5, 2.0], vec![2.0, 3.0], vec![8.0, 10.0]],
                hot_roi: vec![vec![0.0, 0.0], vec![0.0, 0.0], vec![0.0, 1.0]],
            },
        })
        .collect();
    Fixture { summary, details }
}

fn write_fixture(file: &NamedTempFile, fixture: &Fixture) {
    let json = serde_json::to_string(fixture).unwrap();
    std::fs::write(file.path(), json).unwrap();
}

/// Start a replay server on an ephemeral port; returns its base URL.
fn spawn_server(path: PathBuf) -> String {
    let server = web::bind("127.0.0.1:0").unwrap();
    let addr = web::local_addr(&server).unwrap();
    thread::spawn(move || web::serve_on(server, &path));
    format!("http://{addr}")
}

fn source(base_url: &str) -> Arc<HttpDataSource> {
    Arc::new(HttpDataSource::new(base_url, Duration::from_secs(5)))
}

#[test]
fn fetches_summary_and_detail() {
    let file = NamedTempFile::new().unwrap();
    write_fixture(&file, &fixture(3));
    let url = spawn_server(file.path().to_path_buf());
    let source = source(&url);

    let summary = source.fetch_summary().unwrap();
    assert_eq!(summary.len(), 3);
    assert_eq!(summary[2].timestamp, "2024-03-05T08:02:00");
    assert_eq!(summary[2].max_temp, 42.0);

    let detail = source.fetch_detail(1).unwrap();
    assert_eq!(detail.filename, "thermal_data_20240305_080100.h5");
    assert_eq!(detail.stats.hot_spot_coords, Some([2, 1]));
    assert_eq!(detail.matrices.temperature.len(), 3);
}

#[test]
fn missing_detail_is_not_found() {
    let file = NamedTempFile::new().unwrap();
    write_fixture(&file, &fixture(2));
    let url = spawn_server(file.path().to_path_buf());

    let err = source(&url).fetch_detail(5).unwrap_err();
    assert_eq!(err, FetchError::NotFound { index: 5 });
}

#[test]
fn non_get_is_rejected() {
    let file = NamedTempFile::new().unwrap();
    write_fixture(&file, &fixture(1));
    let url = spawn_server(file.path().to_path_buf());

    match ureq::post(&format!("{url}/api/data/summary")).call() {
        Err(ureq::Error::Status(code, _)) => assert_eq!(code, 405),
        other => panic!("expected 405, got {other:?}"),
    }
    match ureq::get(&format!("{url}/api/data/other")).call() {
        Err(ureq::Error::Status(code, _)) => assert_eq!(code, 404),
        other => panic!("expected 404, got {other:?}"),
    }
}

#[test]
fn summary_reflects_fixture_changes() {
    let file = NamedTempFile::new().unwrap();
    write_fixture(&file, &fixture(2));
    let url = spawn_server(file.path().to_path_buf());
    let source = source(&url);
    assert_eq!(source.fetch_summary().unwrap().len(), 2);

    write_fixture(&file, &fixture(5));
    assert_eq!(source.fetch_summary().unwrap().len(), 5);
}

#[test]
fn dashboard_runs_against_replay_server() {
    let file = NamedTempFile::new().unwrap();
    write_fixture(&file, &fixture(4));
    let url = spawn_server(file.path().to_path_buf());

    let sink = TerminalSink::new(Vec::new(), &RenderConfig::default(), false, false);
    let mut dash = Dashboard::new(
        source(&url),
        sink,
        RenderConfig::default(),
        &RefreshConfig::default(),
    );
    dash.start();
    assert_eq!(dash.shown_index(), Some(0));
    assert!(dash.on_next());
    assert_eq!(dash.shown_index(), Some(1));

    assert_eq!(dash.sink().text(TextTarget::Counter), Some("2 / 4"));
    assert_eq!(dash.sink().text(TextTarget::StatMax), Some("41.00"));
    assert_eq!(dash.sink().text(TextTarget::StatAvg), Some("25.10"));

    // Datasets shrink under the dashboard; the selection follows.
    write_fixture(&file, &fixture(1));
    let outcome = dash.refresh_summary();
    assert_eq!(outcome.outcome, Outcome::Applied);
    assert!(outcome.clamped);
    assert_eq!(dash.navigator().index(), 0);
    assert_eq!(dash.sink().text(TextTarget::Counter), Some("1 / 1"));

    let screen = String::from_utf8(dash.into_sink().into_inner()).unwrap();
    assert!(screen.contains("thermal_data_20240305_080100.h5"));
}

#[test]
fn json_sink_emits_one_line_per_update() {
    let file = NamedTempFile::new().unwrap();
    write_fixture(&file, &fixture(2));
    let url = spawn_server(file.path().to_path_buf());

    let mut dash = Dashboard::new(
        source(&url),
        JsonSink::new(Vec::new()),
        RenderConfig::default(),
        &RefreshConfig::default(),
    );
    dash.start();

    let out = String::from_utf8(dash.into_sink().into_inner()).unwrap();
    let lines: Vec<serde_json::Value> = out
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert!(lines.iter().any(|l| l["kind"] == "plot" && l["element"] == "heatmap-chart"));
    assert!(lines.iter().any(|l| l["kind"] == "controls" && l["label"] == "1 / 2"));
    assert!(lines.iter().any(|l| l["kind"] == "text" && l["text"] == "thermal_data_20240305_080000.h5"));
}

#[test]
fn unreachable_backend_leaves_dashboard_empty() {
    let mut dash = Dashboard::new(
        source("http://127.0.0.1:9"),
        JsonSink::new(Vec::new()),
        RenderConfig::default(),
        &RefreshConfig::default(),
    );
    dash.start();
    assert_eq!(dash.navigator().total(), 0);
    assert_eq!(dash.shown_index(), None);
}
