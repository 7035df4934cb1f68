//! Scoring bridge client.
//!
//! One POST per attempt, at-most-once: scoring must reflect exactly one
//! attempt, and a silent retry could double-count or score a stale
//! attempt. Transport failures and server-reported errors surface as
//! distinct error variants so callers can tell them apart.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;

use scaffold_core::{logging, Error, Result};

/// Fixed timeout for one scoring request.
pub const SCORE_TIMEOUT: Duration = Duration::from_secs(30);

/// Environment variable overriding the scoring endpoint.
pub const SCORING_URL_ENV: &str = "SCORING_URL";

/// Default endpoint: the bridge server on the host-loopback alias.
pub const DEFAULT_SCORING_URL: &str = "http://host.docker.internal:8085/score";

/// Body POSTed to the scoring endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreRequest {
    pub attempt: String,
    pub scoring_data: HashMap<String, Value>,
}

/// Body returned by the scoring endpoint: a score, or an explicit error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Mediated access to the domain scoring function for sandboxed code.
pub struct ScoringClient {
    http: reqwest::Client,
    url: String,
    timeout: Duration,
}

impl ScoringClient {
    /// Create a client for the given endpoint.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            url: url.into(),
            timeout: SCORE_TIMEOUT,
        }
    }

    /// Endpoint from process configuration, falling back to the
    /// host-loopback default.
    pub fn from_env() -> Self {
        Self::new(
            std::env::var(SCORING_URL_ENV).unwrap_or_else(|_| DEFAULT_SCORING_URL.to_string()),
        )
    }

    /// Narrow the request timeout (tests).
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Request a score for one attempt.
    ///
    /// - timeout, refused connection, non-2xx status → [`Error::Transport`];
    /// - 2xx body carrying an `error` field → [`Error::Server`] with the
    ///   server's message verbatim;
    /// - otherwise the numeric score.
    pub async fn score(&self, attempt: &str, scoring_data: &HashMap<String, Value>) -> Result<f64> {
        // Keep the HTTP stack's own logging out of the captured run output.
        let _quiet = logging::isolate();

        let request = ScoreRequest {
            attempt: attempt.to_string(),
            scoring_data: scoring_data.clone(),
        };

        tracing::debug!(url = %self.url, attempt_len = attempt.len(), "Scoring request");

        let response = self
            .http
            .post(&self.url)
            .timeout(self.timeout)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::transport(format!("Scoring request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::transport(format!(
                "Scoring server returned {}",
                status
            )));
        }

        let body: ScoreResponse = response
            .json()
            .await
            .map_err(|e| Error::transport(format!("Malformed scoring response: {}", e)))?;

        if let Some(message) = body.error {
            return Err(Error::server(message));
        }

        body.score.ok_or_else(|| {
            Error::server("scoring response carried neither score nor error")
        })
    }
}
