/// HTTP data source for the thermal dashboard backend.
///
/// Uses the synchronous `ureq` client against two read-only endpoints:
///
/// - `GET /api/data/summary`
/// - `GET /api/data/detail/{index}`
///
/// A 404 from the detail endpoint maps to [`FetchError::NotFound`]; every
/// other failure (transport, status, body) maps to [`FetchError::Failure`].
use std::time::Duration;

use serde::de::DeserializeOwned;

use super::{DataSource, DetailRecord, FetchError, SummaryPoint};
use crate::config::schema::SourceConfig;

/// Synchronous HTTP client for the dashboard API.
#[derive(Debug, Clone)]
pub struct HttpDataSource {
    base_url: String,
    timeout: Duration,
}

impl HttpDataSource {
    /// Build a source from the resolved config.
    pub fn from_config(config: &SourceConfig) -> Self {
        Self::new(&config.base_url, Duration::from_millis(config.timeout_ms))
    }

    pub fn new(base_url: &str, timeout: Duration) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
        }
    }

    /// Base URL without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn summary_url(&self) -> String {
        format!("{}/api/data/summary", self.base_url)
    }

    fn detail_url(&self, index: usize) -> String {
        format!("{}/api/data/detail/{index}", self.base_url)
    }

    /// GET a URL and decode its JSON body.
    ///
    /// `index` is the dataset the request is about, if any; it turns a 404
    /// into `NotFound` instead of a generic failure.
    fn get_json<T: DeserializeOwned>(&self, url: &str, index: Option<usize>) -> Result<T, FetchError> {
        let failure = |reason: String| FetchError::Failure {
            url: url.to_string(),
            reason,
        };

        let resp = match ureq::get(url).timeout(self.timeout).call() {
            Ok(resp) => resp,
            Err(ureq::Error::Status(code, _)) => {
                return Err(match (code, index) {
                    (404, Some(index)) => FetchError::NotFound { index },
                    _ => failure(format!("HTTP status {code}")),
                });
            }
            Err(ureq::Error::Transport(t)) => return Err(failure(t.to_string())),
        };

        resp.into_json::<T>()
            .map_err(|e| failure(format!("invalid JSON body: {e}")))
    }
}

impl DataSource for HttpDataSource {
    fn fetch_summary(&self) -> Result<Vec<SummaryPoint>, FetchError> {
        self.get_json(&self.summary_url(), None)
    }

    fn fetch_detail(&self, index: usize) -> Result<DetailRecord, FetchError> {
        self.get_json(&self.detail_url(index), Some(index))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_from_default_config() {
        let config = SourceConfig::default();
        let source = HttpDataSource::from_config(&config);
        assert_eq!(source.base_url(), "http://127.0.0.1:5000");
        assert_eq!(source.timeout, Duration::from_millis(10_000));
    }

    #[test]
    fn source_strips_trailing_slash() {
        let source = HttpDataSource::new("http://host:5000/", Duration::from_secs(1));
        assert_eq!(source.summary_url(), "http://host:5000/api/data/summary");
        assert_eq!(source.detail_url(3), "http://host:5000/api/data/detail/3");
    }

    #[test]
    fn unreachable_backend_is_a_failure() {
        // Port 9 (discard) is almost never bound on test machines.
        let source = HttpDataSource::new("http://127.0.0.1:9", Duration::from_millis(200));
        let err = source.fetch_summary().unwrap_err();
        assert!(matches!(err, FetchError::Failure { .. }));
    }
}
