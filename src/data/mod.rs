/// Backend payloads and the data-source seam.
///
/// The dashboard reads two things from its backend:
///
/// - **Summary**: one [`SummaryPoint`] per dataset, chronological.
/// - **Detail**: the full [`DetailRecord`] for a single zero-based index.
///
/// [`DataSource`] abstracts where those come from. Production code uses
/// [`client::HttpDataSource`]; tests substitute in-memory sources.
pub mod client;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use client::HttpDataSource;

// ---------------------------------------------------------------------------
// Payload types
// ---------------------------------------------------------------------------

/// Aggregate temperatures for one dataset, used by the time-series chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryPoint {
    /// Capture time as sent by the backend (ISO-8601 in practice).
    pub timestamp: String,
    pub max_temp: f64,
    pub min_temp: f64,
}

/// Full payload for the selected dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailRecord {
    pub filename: String,
    pub stats: DetailStats,
    pub matrices: DetailMatrices,
}

/// Scalar statistics of the temperature matrix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailStats {
    pub min: f64,
    pub max: f64,
    pub avg: f64,
    /// `[row, col]` of the hottest cell, when the backend reports it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hot_spot_coords: Option<[usize; 2]>,
    /// `[row, col]` of the coldest cell, when the backend reports it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cold_spot_coords: Option<[usize; 2]>,
}

/// Row-major matrices backing the detail views.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailMatrices {
    pub temperature: Vec<Vec<f64>>,
    pub gradient_magnitude: Vec<Vec<f64>>,
    pub hot_roi: Vec<Vec<f64>>,
}

impl DetailMatrices {
    /// All temperature values in row-major order.
    pub fn flattened_temperature(&self) -> Vec<f64> {
        self.temperature.iter().flatten().copied().collect()
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Why a fetch produced no usable payload.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// Transport error, unexpected HTTP status, or an unparseable body.
    #[error("request to {url} failed: {reason}")]
    Failure { url: String, reason: String },
    /// The backend has no dataset at this index.
    #[error("dataset {index} not found")]
    NotFound { index: usize },
}

// ---------------------------------------------------------------------------
// Data source seam
// ---------------------------------------------------------------------------

/// Read-only access to summary and detail data.
///
/// Implementations must be shareable across threads: the interactive loop
/// issues fetches from worker threads.
pub trait DataSource: Send + Sync {
    /// All summary points, chronological.
    fn fetch_summary(&self) -> Result<Vec<SummaryPoint>, FetchError>;

    /// The detail record at a zero-based index.
    fn fetch_detail(&self, index: usize) -> Result<DetailRecord, FetchError>;
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const DETAIL_JSON: &str = r#"{
        "filename": "thermal_data_20240101_120000.h5",
        "stats": {
            "min": 20.5, "max": 31.25, "avg": 24.0,
            "hot_spot_coords": [1, 0], "cold_spot_coords": [0, 1]
        },
        "matrices": {
            "temperature": [[21.0, 20.5], [31.25, 23.25]],
            "gradient_magnitude": [[0.5, 0.5], [8.0, 8.0]],
            "hot_roi": [[0, 0], [1, 0]]
        }
    }"#;

    #[test]
    fn detail_record_deserializes_backend_payload() {
        let detail: DetailRecord = serde_json::from_str(DETAIL_JSON).unwrap();
        assert_eq!(detail.filename, "thermal_data_20240101_120000.h5");
        assert_eq!(detail.stats.hot_spot_coords, Some([1, 0]));
        assert_eq!(detail.matrices.hot_roi[1][0], 1.0);
    }

    #[test]
    fn spot_coords_are_optional() {
        let json = r#"{
            "filename": "a.h5",
            "stats": {"min": 1.0, "max": 2.0, "avg": 1.5},
            "matrices": {"temperature": [], "gradient_magnitude": [], "hot_roi": []}
        }"#;
        let detail: DetailRecord = serde_json::from_str(json).unwrap();
        assert!(detail.stats.hot_spot_coords.is_none());
        assert!(detail.stats.cold_spot_coords.is_none());
    }

    #[test]
    fn flattened_temperature_is_row_major() {
        let detail: DetailRecord = serde_json::from_str(DETAIL_JSON).unwrap();
        assert_eq!(
            detail.matrices.flattened_temperature(),
            vec![21.0, 20.5, 31.25, 23.25]
        );
    }

    #[test]
    fn summary_point_deserializes() {
        let json = r#"[{"timestamp": "2024-01-01T12:00:00", "max_temp": 40.0, "min_temp": 18.5}]"#;
        let points: Vec<SummaryPoint> = serde_json::from_str(json).unwrap();
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].min_temp, 18.5);
    }

    #[test]
    fn fetch_error_messages() {
        let err = FetchError::NotFound { index: 7 };
        assert_eq!(err.to_string(), "dataset 7 not found");

        let err = FetchError::Failure {
            url: "http://x/api/data/summary".to_string(),
            reason: "connection refused".to_string(),
        };
        assert!(err.to_string().contains("connection refused"));
    }
}
