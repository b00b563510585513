//! Daily contribution reconciliation.
//!
//! One run tops a user's repository up to their daily minimum. The count
//! of existing commits is re-queried from the host on every run, so a
//! crashed or duplicated run can only narrow the remaining deficit, never
//! overshoot it. Per-file failures are recoverable and reported in the
//! outcome; only pre-flight failures abort the run.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use thiserror::Error;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use gm_content::{ContentGenerator, GeneratedFile};
use gm_core::store::CommitLogSink;
use gm_core::types::{AutomationProfile, CommitRecord, DayBoundary, ReconcileOutcome};
use gm_github::{GitHubError, RepositoryHost};

const REPO_DESCRIPTION: &str = "Auto-generated contributions by GitMaxer";

/// Fatal pre-flight failures. Everything past the commit-count query is
/// recoverable and lands in [`ReconcileOutcome::Completed::errors`].
#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error("profile has no access token")]
    MissingCredential,

    #[error("repository access failed: {0}")]
    RepositoryAccess(#[from] GitHubError),
}

/// Per-run tuning knobs.
#[derive(Debug, Clone)]
pub struct ReconcileOptions {
    pub day_boundary: DayBoundary,
    /// Delay between consecutive file commits.
    pub commit_pacing: Option<Duration>,
    /// Wait after creating a repository before using it.
    pub settle_delay: Duration,
    /// Hard stop; remaining attempts are abandoned, created commits stay.
    pub deadline: Option<Instant>,
}

impl Default for ReconcileOptions {
    fn default() -> Self {
        Self {
            day_boundary: DayBoundary::default(),
            commit_pacing: Some(Duration::from_secs(1)),
            settle_delay: Duration::from_secs(2),
            deadline: None,
        }
    }
}

/// The reconciliation engine. All collaborators are injected, so tests run
/// against in-memory fakes and the daemon wires real clients.
pub struct Reconciler {
    host: Arc<dyn RepositoryHost>,
    generator: Arc<dyn ContentGenerator>,
    log_sink: Arc<dyn CommitLogSink>,
    options: ReconcileOptions,
}

impl Reconciler {
    pub fn new(
        host: Arc<dyn RepositoryHost>,
        generator: Arc<dyn ContentGenerator>,
        log_sink: Arc<dyn CommitLogSink>,
        options: ReconcileOptions,
    ) -> Self {
        Self {
            host,
            generator,
            log_sink,
            options,
        }
    }

    /// Run one reconciliation for `profile`.
    pub async fn reconcile(
        &self,
        profile: &AutomationProfile,
    ) -> Result<ReconcileOutcome, ReconcileError> {
        if profile.paused {
            debug!(user_id = %profile.user_id, "profile paused, skipping");
            return Ok(ReconcileOutcome::Paused);
        }

        if profile.access_token.is_none() {
            return Err(ReconcileError::MissingCredential);
        }

        let owner = profile.github_username.as_str();
        let repo = profile.effective_repo_name();

        self.ensure_repo(profile, owner, repo).await?;

        let since = self.options.day_boundary.start_of_today(Utc::now());
        let commits = self.host.list_commits_since(owner, repo, since).await?;
        let commits_found = commits.len() as u32;

        let deficit = profile.effective_minimum().saturating_sub(commits_found);
        info!(
            user_id = %profile.user_id,
            repo = %profile.full_repo_name(),
            commits_found,
            deficit,
            "reconciling"
        );

        if deficit == 0 {
            return Ok(ReconcileOutcome::Completed {
                commits_found,
                attempted: 0,
                commits_created: 0,
                errors: Vec::new(),
            });
        }

        let mut commits_created = 0u32;
        let mut attempted = 0u32;
        let mut errors = Vec::new();

        for seq in 0..deficit {
            if let Some(deadline) = self.options.deadline {
                if Instant::now() >= deadline {
                    warn!(
                        user_id = %profile.user_id,
                        remaining = deficit - seq,
                        "run deadline reached, abandoning remaining attempts"
                    );
                    break;
                }
            }

            attempted += 1;

            let file = match self.generator.generate(profile.language_hint()).await {
                Ok(file) => file,
                Err(err) => {
                    warn!(user_id = %profile.user_id, error = %err, "content generation failed");
                    errors.push(format!("generate: {err}"));
                    continue;
                }
            };

            let filename = unique_filename(seq, &file.extension);
            let message = format!("Add {filename}");

            match self
                .host
                .create_file(owner, repo, &filename, &file.content, &message)
                .await
            {
                Ok(()) => {
                    debug!(user_id = %profile.user_id, %filename, "created file");
                    commits_created += 1;
                    self.log_commit(profile, &file).await;
                }
                Err(err) => {
                    warn!(user_id = %profile.user_id, %filename, error = %err, "file creation failed");
                    errors.push(format!("create {filename}: {err}"));
                    continue;
                }
            }

            if seq + 1 < deficit {
                if let Some(pacing) = self.options.commit_pacing {
                    tokio::time::sleep(pacing).await;
                }
            }
        }

        Ok(ReconcileOutcome::Completed {
            commits_found,
            attempted,
            commits_created,
            errors,
        })
    }

    async fn ensure_repo(
        &self,
        profile: &AutomationProfile,
        owner: &str,
        repo: &str,
    ) -> Result<(), ReconcileError> {
        if self.host.get_repo(owner, repo).await?.is_some() {
            return Ok(());
        }

        info!(user_id = %profile.user_id, repo = %profile.full_repo_name(), "creating repository");
        self.host
            .create_repo(repo, REPO_DESCRIPTION, profile.repo_visibility)
            .await?;

        // A freshly auto-initialized repo is not immediately writable.
        tokio::time::sleep(self.options.settle_delay).await;
        Ok(())
    }

    /// Observability only; a sink failure never fails the run.
    async fn log_commit(&self, profile: &AutomationProfile, file: &GeneratedFile) {
        let record = CommitRecord::new(
            profile.user_id,
            profile.full_repo_name(),
            profile.language_hint(),
            &file.content,
        );
        if let Err(err) = self.log_sink.append(&record).await {
            warn!(user_id = %profile.user_id, error = %err, "commit log append failed");
        }
    }
}

/// `code_{timestamp}_{seq}.{ext}`: the timestamp separates runs, the
/// per-run sequence separates files within one run.
fn unique_filename(seq: u32, extension: &str) -> String {
    format!("code_{}_{}.{}", Utc::now().timestamp_micros(), seq, extension)
}
