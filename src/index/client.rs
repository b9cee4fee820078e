//! Blocking client for the package index JSON API.

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::{StatusCode, Url};
use tracing::debug;

use super::models::{IndexPackage, PackageDetails, ProjectResponse};
use crate::error::{PipdeskError, Result};

/// Default index base URL.
pub const DEFAULT_INDEX_URL: &str = "https://pypi.org/pypi";

/// Default bound on a single index request.
pub const DEFAULT_INDEX_TIMEOUT: Duration = Duration::from_secs(10);

/// Queries `{index_url}/{name}/json`. One request per call, no retries.
#[derive(Debug, Clone)]
pub struct IndexClient {
    client: Client,
    base: Url,
    timeout: Duration,
}

impl IndexClient {
    /// Create a client for `index_url` with a per-request timeout.
    pub fn new(index_url: &str, timeout: Duration) -> Result<Self> {
        let base = Url::parse(index_url.trim_end_matches('/')).map_err(|e| {
            PipdeskError::invalid_request(format!("invalid index URL '{}': {}", index_url, e))
        })?;
        if base.cannot_be_a_base() {
            return Err(PipdeskError::invalid_request(format!(
                "invalid index URL '{}'",
                index_url
            )));
        }

        let client = Client::builder()
            .user_agent(concat!("pipdesk/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| PipdeskError::IndexUnavailable {
                message: format!("failed to build HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            base,
            timeout,
        })
    }

    /// Client for the public index with the default timeout.
    pub fn pypi() -> Result<Self> {
        Self::new(DEFAULT_INDEX_URL, DEFAULT_INDEX_TIMEOUT)
    }

    /// The configured request timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Look up `query` as a project name.
    ///
    /// An unknown name is an empty result, not an error.
    pub fn search(&self, query: &str) -> Result<Vec<IndexPackage>> {
        let query = non_empty_query(query)?;
        Ok(self
            .fetch_project(query)?
            .map(|project| vec![project.into_search_hit()])
            .unwrap_or_default())
    }

    /// Metadata and release list for one project.
    pub fn package_details(&self, name: &str) -> Result<PackageDetails> {
        let name = non_empty_query(name)?;
        self.fetch_project(name)?
            .map(ProjectResponse::into_details)
            .ok_or_else(|| PipdeskError::IndexUnavailable {
                message: format!("package '{}' not found", name),
            })
    }

    fn project_url(&self, name: &str) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(name).push("json");
        }
        url
    }

    /// `None` on 404.
    fn fetch_project(&self, name: &str) -> Result<Option<ProjectResponse>> {
        let url = self.project_url(name);
        debug!("GET {}", url);

        let unavailable = |message: String| PipdeskError::IndexUnavailable { message };

        let response = self
            .client
            .get(url.clone())
            .send()
            .map_err(|e| unavailable(format!("request to {} failed: {}", url, e)))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(unavailable(format!("HTTP {} from {}", status, url)));
        }

        response
            .json::<ProjectResponse>()
            .map(Some)
            .map_err(|e| unavailable(format!("undecodable response from {}: {}", url, e)))
    }
}

fn non_empty_query(query: &str) -> Result<&str> {
    let query = query.trim();
    if query.is_empty() {
        Err(PipdeskError::invalid_request("search query must not be empty"))
    } else {
        Ok(query)
    }
}
