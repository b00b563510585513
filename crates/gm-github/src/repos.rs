//! Repository-level operations: lookup, creation, commit listing, and
//! single-file commits via the contents API.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

use gm_core::types::RepoVisibility;

use super::client::{api_error, GitHubClient, GitHubError, Result};

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepoMetadata {
    pub full_name: String,
    pub private: bool,
    #[serde(default)]
    pub default_branch: Option<String>,
    #[serde(default)]
    pub html_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitMetadata {
    pub sha: String,
    pub commit: CommitDetail,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitDetail {
    pub message: String,
    #[serde(default)]
    pub author: Option<CommitAuthor>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitAuthor {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
}

// ---------------------------------------------------------------------------
// Operations
// ---------------------------------------------------------------------------

/// Look up a repository. `Ok(None)` means 404; any other non-2xx is an error.
pub async fn get_repo(
    client: &GitHubClient,
    owner: &str,
    name: &str,
) -> Result<Option<RepoMetadata>> {
    let path = format!("/repos/{}/{}", owner, name);
    let resp = client.get_with_retry(&path).await?;

    if resp.status().as_u16() == 404 {
        return Ok(None);
    }
    if !resp.status().is_success() {
        return Err(api_error(resp).await);
    }

    let metadata = resp
        .json::<RepoMetadata>()
        .await
        .map_err(|e| GitHubError::Parse(e.to_string()))?;
    Ok(Some(metadata))
}

/// Create a repository for the authenticated user, auto-initialized so the
/// contents API can commit to it immediately.
pub async fn create_repo(
    client: &GitHubClient,
    name: &str,
    description: &str,
    visibility: RepoVisibility,
) -> Result<RepoMetadata> {
    let body = json!({
        "name": name,
        "description": description,
        "private": visibility.is_private(),
        "auto_init": true,
    });

    let resp = client.post("/user/repos").json(&body).send().await?;
    if !resp.status().is_success() {
        return Err(api_error(resp).await);
    }

    resp.json::<RepoMetadata>()
        .await
        .map_err(|e| GitHubError::Parse(e.to_string()))
}

/// List commits on the default branch at or after `since`.
///
/// A 409 means the repository exists but has no commits yet; that counts
/// as an empty list, not an error.
pub async fn list_commits_since(
    client: &GitHubClient,
    owner: &str,
    name: &str,
    since: DateTime<Utc>,
) -> Result<Vec<CommitMetadata>> {
    let path = format!(
        "/repos/{}/{}/commits?since={}",
        owner,
        name,
        since.to_rfc3339()
    );
    let resp = client.get_with_retry(&path).await?;

    if resp.status().as_u16() == 409 {
        return Ok(Vec::new());
    }
    if !resp.status().is_success() {
        return Err(api_error(resp).await);
    }

    resp.json::<Vec<CommitMetadata>>()
        .await
        .map_err(|e| GitHubError::Parse(e.to_string()))
}

/// Commit a single new file via the contents API.
///
/// The API requires the payload base64-encoded on the wire regardless of
/// content type.
pub async fn create_file(
    client: &GitHubClient,
    owner: &str,
    name: &str,
    path: &str,
    content: &str,
    message: &str,
) -> Result<()> {
    let body = json!({
        "message": message,
        "content": BASE64.encode(content.as_bytes()),
    });

    let api_path = format!("/repos/{}/{}/contents/{}", owner, name, path);
    let resp = client.put(&api_path).json(&body).send().await?;
    if !resp.status().is_success() {
        return Err(api_error(resp).await);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
