//! Blocking GitHub REST client.

use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use base64::Engine;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;

use super::types::ContentFile;

/// Public GitHub API endpoint.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

const USER_AGENT: &str = concat!("dsomm/", env!("CARGO_PKG_VERSION"));
const API_VERSION: &str = "2022-11-28";

/// Thin wrapper over the REST API used by the built-in probes.
///
/// Every request is a GET relative to the base URL. A 404 is reported as
/// `None`/`false` by the `_optional` helpers so probes can tell "this file
/// does not exist" apart from "the API failed".
///
/// # Example
///
/// ```no_run
/// use dsomm::github::GitHubClient;
/// use std::time::Duration;
///
/// let client = GitHubClient::new("https://api.github.com", None, Duration::from_secs(30)).unwrap();
/// let has_readme = client.exists("/repos/rust-lang/rust/contents/README.md").unwrap();
/// ```
pub struct GitHubClient {
    base_url: String,
    token: Option<String>,
    timeout: Duration,
    client: reqwest::blocking::Client,
}

impl GitHubClient {
    /// Create a client for `base_url`, authenticating with `token` when given.
    pub fn new(base_url: &str, token: Option<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.filter(|t| !t.trim().is_empty()),
            timeout,
            client,
        })
    }

    /// Whether requests carry a token.
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// Base URL requests are resolved against.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Per-request timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// GET `path` and decode the JSON body. Any non-2xx status is an error.
    pub fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.get_json_optional(path)?
            .ok_or_else(|| anyhow!("HTTP 404 fetching {}", self.url(path)))
    }

    /// GET `path`, returning `None` on 404.
    pub fn get_json_optional<T: DeserializeOwned>(&self, path: &str) -> Result<Option<T>> {
        let url = self.url(path);
        let response = match self.send(&url)? {
            Some(response) => response,
            None => return Ok(None),
        };

        response
            .json::<T>()
            .map(Some)
            .with_context(|| format!("Failed to decode response from {}", url))
    }

    /// Whether `path` answers with a 2xx status.
    pub fn exists(&self, path: &str) -> Result<bool> {
        Ok(self.send(&self.url(path))?.is_some())
    }

    /// Decoded text of a file in `repo`, or `None` when it does not exist.
    pub fn file_content(&self, repo: &str, file: &str) -> Result<Option<String>> {
        let path = format!("/repos/{}/contents/{}", repo, file.trim_start_matches('/'));
        let Some(entry) = self.get_json_optional::<ContentFile>(&path)? else {
            return Ok(None);
        };

        match entry.content {
            Some(encoded) => decode_content(&encoded)
                .with_context(|| format!("Invalid content for {} in {}", file, repo))
                .map(Some),
            None => Ok(Some(String::new())),
        }
    }

    /// Whether `file` exists in `repo`.
    pub fn file_exists(&self, repo: &str, file: &str) -> Result<bool> {
        self.exists(&format!(
            "/repos/{}/contents/{}",
            repo,
            file.trim_start_matches('/')
        ))
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    fn send(&self, url: &str) -> Result<Option<reqwest::blocking::Response>> {
        let mut request = self
            .client
            .get(url)
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", API_VERSION);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .with_context(|| format!("Failed to fetch {}", url))?;

        let status = response.status();
        tracing::debug!(%url, status = status.as_u16(), "GitHub API response");

        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(anyhow!("HTTP {} fetching {}", status, url));
        }
        Ok(Some(response))
    }
}

/// Decode the base64 payload of the contents API.
///
/// GitHub wraps the payload at 60 columns, so whitespace is dropped first.
pub fn decode_content(encoded: &str) -> Result<String> {
    let compact: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(compact.as_bytes())
        .context("Content is not valid base64")?;
    String::from_utf8(bytes).context("Content is not valid UTF-8")
}
