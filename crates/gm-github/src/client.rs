use std::time::Duration;

use thiserror::Error;

pub const DEFAULT_API_BASE: &str = "https://api.github.com";
const USER_AGENT: &str = "gitmaxer-bot";

#[derive(Debug, Error)]
pub enum GitHubError {
    #[error("missing GitHub token on the profile")]
    MissingToken,

    #[error("GitHub API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("request timed out")]
    Timeout,

    #[error("parse error: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for GitHubError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            GitHubError::Timeout
        } else {
            GitHubError::Http(err.to_string())
        }
    }
}

pub type Result<T> = std::result::Result<T, GitHubError>;

/// Thin REST client for the repository host.
///
/// Owns its `reqwest::Client` and token; callers inject it where needed
/// rather than sharing a process-wide singleton.
#[derive(Debug, Clone)]
pub struct GitHubClient {
    pub(crate) http: reqwest::Client,
    pub(crate) token: String,
    pub(crate) base_url: String,
}

impl GitHubClient {
    /// Create a client with an explicit token and per-call timeout.
    pub fn new(token: impl Into<String>, timeout: Duration) -> Result<Self> {
        let token = token.into();
        if token.is_empty() {
            return Err(GitHubError::MissingToken);
        }
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| GitHubError::Http(e.to_string()))?;
        Ok(Self {
            http,
            token,
            base_url: DEFAULT_API_BASE.to_string(),
        })
    }

    /// Override the base URL (useful for testing with a mock server).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub(crate) fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.decorate(self.http.get(self.url(path)))
    }

    pub(crate) fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.decorate(self.http.post(self.url(path)))
    }

    pub(crate) fn put(&self, path: &str) -> reqwest::RequestBuilder {
        self.decorate(self.http.put(self.url(path)))
    }

    fn decorate(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        req.header("Authorization", format!("Bearer {}", self.token))
            .header("Accept", "application/vnd.github+json")
    }

    /// Send an idempotent GET with one bounded retry on transient 5xx.
    ///
    /// POST/PUT are never retried: the contents API has no idempotency key
    /// and a blind retry could double-commit.
    pub(crate) async fn get_with_retry(&self, path: &str) -> Result<reqwest::Response> {
        let resp = self.get(path).send().await?;
        if resp.status().is_server_error() {
            let status = resp.status().as_u16();
            tracing::warn!(path, status, "transient server error, retrying once");
            tokio::time::sleep(Duration::from_millis(500)).await;
            return Ok(self.get(path).send().await?);
        }
        Ok(resp)
    }
}

/// Drain a non-success response into a structured API error.
pub(crate) async fn api_error(resp: reqwest::Response) -> GitHubError {
    let status = resp.status().as_u16();
    let message = match resp.json::<serde_json::Value>().await {
        Ok(body) => body
            .get("message")
            .and_then(|m| m.as_str())
            .unwrap_or("unknown error")
            .to_string(),
        Err(_) => "unknown error".to_string(),
    };
    GitHubError::Api { status, message }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_token_is_rejected() {
        let result = GitHubClient::new("", Duration::from_secs(15));
        assert!(matches!(result, Err(GitHubError::MissingToken)));
    }

    #[test]
    fn base_url_override() {
        let client = GitHubClient::new("ghp_test", Duration::from_secs(15))
            .unwrap()
            .with_base_url("http://127.0.0.1:9999");
        assert_eq!(client.url("/repos/a/b"), "http://127.0.0.1:9999/repos/a/b");
    }
}
