//! CheckMK REST Source
//!
//! Reads host states from the CheckMK REST API host collection.
//!
//! # API
//!
//! ```text
//! GET {base}/check_mk/api/1.0/domain-types/host/collections/all?columns=state
//! Authorization: Bearer {user} {secret}
//!
//! { "value": [ { "id": "web-01", "extensions": { "state": 0 } }, ... ] }
//! ```
//!
//! A missing or non-integer state is reported as UNKNOWN rather than
//! failing the whole poll.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use super::traits::StatusSource;
use crate::config::ConfigError;
use crate::error::TransportError;
use crate::host::{HostObservation, HostState};

const COLLECTION_PATH: &str = "/check_mk/api/1.0/domain-types/host/collections/all";

/// Longest error body kept in [`TransportError::Status`]
const MAX_ERROR_BODY: usize = 512;

/// Connection settings for a CheckMK site
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CheckmkConfig {
    /// Site base URL, e.g. `http://monitor:5000/cmk`
    pub url: String,
    /// Automation user
    pub user: String,
    /// Automation secret
    pub secret: String,
    /// Per-request timeout
    pub request_timeout: Duration,
}

impl Default for CheckmkConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:5000/cmk".to_string(),
            user: "automation".to_string(),
            secret: String::new(),
            request_timeout: Duration::from_secs(10),
        }
    }
}

impl CheckmkConfig {
    /// Check the settings before building a client
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] for an empty or non-HTTP URL,
    /// an empty user, or a zero timeout.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.url.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "checkmk.url must not be empty".to_string(),
            ));
        }
        if !(self.url.starts_with("http://") || self.url.starts_with("https://")) {
            return Err(ConfigError::ValidationError(format!(
                "checkmk.url must start with http:// or https:// (got {})",
                self.url
            )));
        }
        if self.user.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "checkmk.user must not be empty".to_string(),
            ));
        }
        if self.request_timeout.is_zero() {
            return Err(ConfigError::ValidationError(
                "checkmk.request_timeout_ms must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// CheckMK REST client
#[derive(Clone)]
pub struct CheckmkSource {
    url: String,
    auth_header: String,
    http_client: reqwest::Client,
}

impl std::fmt::Debug for CheckmkSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CheckmkSource")
            .field("url", &self.url)
            .finish_non_exhaustive()
    }
}

impl CheckmkSource {
    /// Build a client for the configured site
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the settings are invalid or the HTTP
    /// client cannot be constructed.
    pub fn new(config: &CheckmkConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let http_client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| ConfigError::ValidationError(format!("cannot build HTTP client: {e}")))?;

        Ok(Self {
            url: collection_url(&config.url),
            auth_header: format!("Bearer {} {}", config.user, config.secret),
            http_client,
        })
    }

    /// Full collection URL this client queries
    #[must_use]
    pub fn collection_url(&self) -> &str {
        &self.url
    }
}

fn collection_url(base: &str) -> String {
    format!("{}{COLLECTION_PATH}", base.trim_end_matches('/'))
}

#[derive(Debug, Deserialize)]
struct HostCollection {
    #[serde(default)]
    value: Vec<HostEntry>,
}

#[derive(Debug, Deserialize)]
struct HostEntry {
    id: String,
    #[serde(default)]
    extensions: HostExtensions,
}

#[derive(Debug, Default, Deserialize)]
struct HostExtensions {
    #[serde(default)]
    state: Option<serde_json::Value>,
}

/// Decode a host collection response body
pub(crate) fn parse_collection(body: &str) -> Result<Vec<HostObservation>, TransportError> {
    let collection: HostCollection =
        serde_json::from_str(body).map_err(|e| TransportError::Decode(e.to_string()))?;

    Ok(collection
        .value
        .into_iter()
        .map(|entry| {
            let state = entry
                .extensions
                .state
                .as_ref()
                .and_then(serde_json::Value::as_i64)
                .map_or(HostState::Unknown, HostState::from_code);
            HostObservation::new(entry.id, state)
        })
        .collect())
}

#[async_trait]
impl StatusSource for CheckmkSource {
    fn name(&self) -> &'static str {
        "CheckMK"
    }

    async fn fetch(&self) -> Result<Vec<HostObservation>, TransportError> {
        let response = self
            .http_client
            .get(&self.url)
            .query(&[("columns", "state")])
            .header(reqwest::header::AUTHORIZATION, &self.auth_header)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let mut body = body;
            if body.len() > MAX_ERROR_BODY {
                let mut cut = MAX_ERROR_BODY;
                while !body.is_char_boundary(cut) {
                    cut -= 1;
                }
                body.truncate(cut);
            }
            return Err(TransportError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let hosts = parse_collection(&body)?;
        tracing::debug!(hosts = hosts.len(), "Fetched host states");
        Ok(hosts)
    }
}
