//! Repository-host capability consumed by the reconciler.
//!
//! The reconciler depends on this trait, never on the concrete client, so
//! tests can substitute an in-memory host and no module-level client
//! state exists anywhere.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use gm_core::types::RepoVisibility;

use super::client::{GitHubClient, Result};
use super::repos::{self, CommitMetadata, RepoMetadata};

#[async_trait]
pub trait RepositoryHost: Send + Sync {
    /// `Ok(None)` means the repository does not exist (404).
    async fn get_repo(&self, owner: &str, name: &str) -> Result<Option<RepoMetadata>>;

    async fn create_repo(
        &self,
        name: &str,
        description: &str,
        visibility: RepoVisibility,
    ) -> Result<RepoMetadata>;

    async fn list_commits_since(
        &self,
        owner: &str,
        name: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<CommitMetadata>>;

    async fn create_file(
        &self,
        owner: &str,
        name: &str,
        path: &str,
        content: &str,
        message: &str,
    ) -> Result<()>;
}

#[async_trait]
impl RepositoryHost for GitHubClient {
    async fn get_repo(&self, owner: &str, name: &str) -> Result<Option<RepoMetadata>> {
        repos::get_repo(self, owner, name).await
    }

    async fn create_repo(
        &self,
        name: &str,
        description: &str,
        visibility: RepoVisibility,
    ) -> Result<RepoMetadata> {
        repos::create_repo(self, name, description, visibility).await
    }

    async fn list_commits_since(
        &self,
        owner: &str,
        name: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<CommitMetadata>> {
        repos::list_commits_since(self, owner, name, since).await
    }

    async fn create_file(
        &self,
        owner: &str,
        name: &str,
        path: &str,
        content: &str,
        message: &str,
    ) -> Result<()> {
        repos::create_file(self, owner, name, path, content, message).await
    }
}
