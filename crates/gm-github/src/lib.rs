pub mod client;
pub mod host;
pub mod repos;

pub use client::{GitHubClient, GitHubError};
pub use host::RepositoryHost;
pub use repos::{CommitMetadata, RepoMetadata};
