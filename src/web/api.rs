//! JSON API handlers for the replay server.
//!
//! Each handler reads the fixture file fresh and returns a
//! `Response<Cursor<Vec<u8>>>` with JSON content.

use std::fs;
use std::io::Cursor;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tiny_http::{Response, StatusCode};

use crate::data::{DetailRecord, SummaryPoint};

use super::{content_type_json, error_response};

// ---------------------------------------------------------------------------
// Fixture file
// ---------------------------------------------------------------------------

/// Contents of a replay fixture file.
///
/// ```json
/// { "summary": [ {"timestamp": ..., "max_temp": ..., "min_temp": ...} ],
///   "details": [ {"filename": ..., "stats": {...}, "matrices": {...}} ] }
/// ```
///
/// `summary[i]` and `details[i]` describe the same dataset.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Fixture {
    #[serde(default)]
    pub summary: Vec<SummaryPoint>,
    #[serde(default)]
    pub details: Vec<DetailRecord>,
}

impl Fixture {
    /// Read and parse a fixture file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read fixture {}", path.display()))?;
        let fixture: Self = serde_json::from_str(&content)
            .with_context(|| format!("invalid fixture JSON in {}", path.display()))?;

        if fixture.summary.len() != fixture.details.len() {
            tracing::warn!(
                summary = fixture.summary.len(),
                details = fixture.details.len(),
                "fixture summary and details differ in length"
            );
        }
        Ok(fixture)
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Build a JSON success response.
fn json_response<T: Serialize>(data: &T) -> Result<Response<Cursor<Vec<u8>>>> {
    let body = serde_json::to_string(data).context("failed to serialize JSON response")?;
    Ok(Response::from_data(body.into_bytes())
        .with_header(content_type_json())
        .with_status_code(StatusCode(200)))
}

// ---------------------------------------------------------------------------
// API Handlers
// ---------------------------------------------------------------------------

/// `GET /api/data/summary`: every summary point, in fixture order.
pub fn get_summary(fixture: &Path) -> Result<Response<Cursor<Vec<u8>>>> {
    let fixture = Fixture::load(fixture)?;
    json_response(&fixture.summary)
}

/// `GET /api/data/detail/{index}`: one detail record, or 404.
pub fn get_detail(fixture: &Path, index: usize) -> Result<Response<Cursor<Vec<u8>>>> {
    let fixture = Fixture::load(fixture)?;
    match fixture.details.get(index) {
        Some(detail) => json_response(detail),
        None => Ok(error_response(404, &format!("dataset {index} not found"))),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
