//! Fixture replay server for the dashboard API.
//!
//! Provides a lightweight HTTP server (sync, via `tiny_http`) that serves
//! the two read-only endpoints the dashboard polls:
//! - `GET /api/data/summary`
//! - `GET /api/data/detail/{index}`
//!
//! Data comes from a JSON fixture file that is re-read on every request, so
//! appending datasets to the file while the server runs behaves like a live
//! backend picking up new captures.
//!
//! Launched via `thermoview replay --fixture FILE` (default:
//! `http://127.0.0.1:5000`).

mod api;

use std::io::Cursor;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::LazyLock;

use anyhow::Result;
use regex::Regex;
use tiny_http::{Header, Method, Response, Server, StatusCode};

pub use api::Fixture;

/// `/api/data/detail/{index}` with a non-negative integer index.
static DETAIL_PATH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^/api/data/detail/(\d+)/?$").expect("detail path regex must compile")
});

// ---------------------------------------------------------------------------
// Server entry point
// ---------------------------------------------------------------------------

/// Bind a server without starting to serve.
///
/// Bind to port `0` to get an ephemeral port; see [`local_addr`].
pub fn bind(addr: &str) -> Result<Server> {
    Server::http(addr).map_err(|e| anyhow::anyhow!("failed to start HTTP server on {addr}: {e}"))
}

/// The address a bound server actually listens on.
pub fn local_addr(server: &Server) -> Option<SocketAddr> {
    server.server_addr().to_ip()
}

/// Serve `fixture` on `addr`. Blocks the current thread.
pub fn serve(addr: &str, fixture: &Path) -> Result<()> {
    // Fail early on a missing or malformed fixture instead of on first request.
    let initial = Fixture::load(fixture)?;

    let server = bind(addr)?;
    let shown = local_addr(&server).map_or_else(|| addr.to_string(), |a| a.to_string());

    println!("thermoview replay serving {} datasets at http://{shown}", initial.details.len());
    println!("Fixture: {}", fixture.display());
    println!("Press Ctrl+C to stop.\n");

    serve_on(server, fixture);
    Ok(())
}

/// Handle requests on an already-bound server until it shuts down.
///
/// Requests are handled sequentially; errors are answered per request and
/// never stop the server.
pub fn serve_on(server: Server, fixture: &Path) {
    for request in server.incoming_requests() {
        let method = request.method().clone();
        let url = request.url().to_string();

        let resp = match dispatch(&method, &url, fixture) {
            Ok(resp) => resp,
            Err(e) => {
                tracing::warn!(%method, %url, error = %e, "request failed");
                error_response(500, &format!("{e:#}"))
            }
        };
        let status = resp.status_code().0;

        if let Err(e) = request.respond(resp) {
            tracing::debug!(error = %e, "client went away before the response was sent");
        }

        tracing::info!(
            %method,
            %url,
            status,
            at = %chrono::Local::now().format("%H:%M:%S"),
            "served"
        );
    }
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

/// Dispatch an incoming request to the appropriate handler.
fn dispatch(method: &Method, url: &str, fixture: &Path) -> Result<Response<Cursor<Vec<u8>>>> {
    // Strip query string for path matching
    let path = url.split('?').next().unwrap_or(url);

    if method != &Method::Get {
        return Ok(error_response(405, "method not allowed"));
    }

    if path == "/api/data/summary" || path == "/api/data/summary/" {
        return api::get_summary(fixture);
    }

    match parse_detail_index(path) {
        Some(index) => api::get_detail(fixture, index),
        None => Ok(error_response(404, "not found")),
    }
}

/// Extract the dataset index from a detail path.
fn parse_detail_index(path: &str) -> Option<usize> {
    DETAIL_PATH_RE.captures(path)?.get(1)?.as_str().parse().ok()
}

// ---------------------------------------------------------------------------
// Response helpers
// ---------------------------------------------------------------------------

/// JSON error body with the given status.
pub(crate) fn error_response(status: u16, message: &str) -> Response<Cursor<Vec<u8>>> {
    let body = serde_json::json!({ "error": message }).to_string();
    Response::from_data(body.into_bytes())
        .with_header(content_type_json())
        .with_status_code(StatusCode(status))
}

/// JSON content type header.
pub(crate) fn content_type_json() -> Header {
    Header::from_bytes("Content-Type", "application/json; charset=utf-8")
        .expect("static header is valid")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
