//! Reconciler behavior against in-memory fakes.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::time::Instant;
use uuid::Uuid;

use gm_content::{ContentError, ContentGenerator, GeneratedFile, MockGenerator};
use gm_core::store::{CommitLogSink, StoreError};
use gm_core::types::{AutomationProfile, CommitRecord, ReconcileOutcome, RepoVisibility};
use gm_github::repos::{CommitDetail, CommitMetadata, RepoMetadata};
use gm_github::{GitHubError, RepositoryHost};
use gm_reconciler::{ReconcileError, ReconcileOptions, Reconciler};

// ---------------------------------------------------------------------------
// Fakes
// ---------------------------------------------------------------------------

#[derive(Default)]
struct MockHost {
    repo_exists: Mutex<bool>,
    existing_commits: Mutex<u32>,
    fail_create_repo: bool,
    /// 1-based create_file call numbers that should fail.
    failing_file_calls: HashSet<u32>,

    calls: AtomicU32,
    get_repo_order: Mutex<Option<u32>>,
    create_repo_order: Mutex<Option<u32>>,
    list_commits_order: Mutex<Option<u32>>,
    create_repo_calls: AtomicU32,
    create_file_calls: AtomicU32,
    created_files: Mutex<Vec<(String, String, String)>>,
}

impl MockHost {
    fn with_repo(existing_commits: u32) -> Self {
        let host = MockHost::default();
        *host.repo_exists.lock().unwrap() = true;
        *host.existing_commits.lock().unwrap() = existing_commits;
        host
    }

    fn next_call(&self) -> u32 {
        self.calls.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn created_paths(&self) -> Vec<String> {
        self.created_files
            .lock()
            .unwrap()
            .iter()
            .map(|(path, _, _)| path.clone())
            .collect()
    }
}

fn fake_commit(sha: &str) -> CommitMetadata {
    CommitMetadata {
        sha: sha.to_string(),
        commit: CommitDetail {
            message: format!("Add {sha}.py"),
            author: None,
        },
    }
}

#[async_trait]
impl RepositoryHost for MockHost {
    async fn get_repo(&self, owner: &str, name: &str) -> Result<Option<RepoMetadata>, GitHubError> {
        *self.get_repo_order.lock().unwrap() = Some(self.next_call());
        if *self.repo_exists.lock().unwrap() {
            Ok(Some(RepoMetadata {
                full_name: format!("{owner}/{name}"),
                private: false,
                default_branch: Some("main".to_string()),
                html_url: None,
            }))
        } else {
            Ok(None)
        }
    }

    async fn create_repo(
        &self,
        name: &str,
        _description: &str,
        visibility: RepoVisibility,
    ) -> Result<RepoMetadata, GitHubError> {
        *self.create_repo_order.lock().unwrap() = Some(self.next_call());
        self.create_repo_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_create_repo {
            return Err(GitHubError::Api {
                status: 403,
                message: "repository creation forbidden".to_string(),
            });
        }
        *self.repo_exists.lock().unwrap() = true;
        Ok(RepoMetadata {
            full_name: format!("octocat/{name}"),
            private: visibility.is_private(),
            default_branch: Some("main".to_string()),
            html_url: None,
        })
    }

    async fn list_commits_since(
        &self,
        _owner: &str,
        _name: &str,
        _since: DateTime<Utc>,
    ) -> Result<Vec<CommitMetadata>, GitHubError> {
        *self.list_commits_order.lock().unwrap() = Some(self.next_call());
        let count = *self.existing_commits.lock().unwrap();
        Ok((0..count).map(|i| fake_commit(&format!("sha{i}"))).collect())
    }

    async fn create_file(
        &self,
        _owner: &str,
        _name: &str,
        path: &str,
        content: &str,
        message: &str,
    ) -> Result<(), GitHubError> {
        self.next_call();
        let call = self.create_file_calls.fetch_add(1, Ordering::SeqCst) + 1;
        if self.failing_file_calls.contains(&call) {
            return Err(GitHubError::Api {
                status: 422,
                message: "could not create file".to_string(),
            });
        }
        self.created_files.lock().unwrap().push((
            path.to_string(),
            content.to_string(),
            message.to_string(),
        ));
        Ok(())
    }
}

#[derive(Default)]
struct MockSink {
    records: Mutex<Vec<CommitRecord>>,
    fail: bool,
}

#[async_trait]
impl CommitLogSink for MockSink {
    async fn append(&self, record: &CommitRecord) -> Result<(), StoreError> {
        if self.fail {
            return Err(StoreError::NotFound(record.user_id));
        }
        self.records.lock().unwrap().push(record.clone());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn profile(min: u32) -> AutomationProfile {
    let mut p = AutomationProfile::new(Uuid::new_v4(), "octocat");
    p.access_token = Some("ghp_token".to_string());
    p.min_daily_contributions = min;
    p
}

fn test_options() -> ReconcileOptions {
    ReconcileOptions {
        commit_pacing: None,
        settle_delay: Duration::ZERO,
        ..ReconcileOptions::default()
    }
}

fn reconciler(host: Arc<MockHost>, sink: Arc<MockSink>) -> Reconciler {
    reconciler_with(host, Arc::new(MockGenerator::new()), sink, test_options())
}

fn reconciler_with(
    host: Arc<MockHost>,
    generator: Arc<dyn ContentGenerator>,
    sink: Arc<MockSink>,
    options: ReconcileOptions,
) -> Reconciler {
    Reconciler::new(host, generator, sink, options)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[tokio::test]
async fn paused_profile_is_a_no_op() {
    let host = Arc::new(MockHost::with_repo(0));
    let sink = Arc::new(MockSink::default());
    let mut p = profile(5);
    p.paused = true;

    let outcome = reconciler(host.clone(), sink.clone())
        .reconcile(&p)
        .await
        .unwrap();

    assert_eq!(outcome, ReconcileOutcome::Paused);
    assert_eq!(host.calls.load(Ordering::SeqCst), 0);
    assert!(sink.records.lock().unwrap().is_empty());
}

#[tokio::test]
async fn missing_token_fails_preflight() {
    let host = Arc::new(MockHost::with_repo(0));
    let sink = Arc::new(MockSink::default());
    let mut p = profile(1);
    p.access_token = None;

    let err = reconciler(host.clone(), sink).reconcile(&p).await.unwrap_err();

    assert!(matches!(err, ReconcileError::MissingCredential));
    assert_eq!(host.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn single_deficit_creates_one_commit_and_one_record() {
    let host = Arc::new(MockHost::with_repo(0));
    let sink = Arc::new(MockSink::default());
    let p = profile(1);

    let outcome = reconciler(host.clone(), sink.clone())
        .reconcile(&p)
        .await
        .unwrap();

    assert_eq!(
        outcome,
        ReconcileOutcome::Completed {
            commits_found: 0,
            attempted: 1,
            commits_created: 1,
            errors: Vec::new(),
        }
    );

    let files = host.created_files.lock().unwrap();
    assert_eq!(files.len(), 1);
    let (path, _, message) = &files[0];
    assert_eq!(message, &format!("Add {path}"));

    let records = sink.records.lock().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].repo_full_name, "octocat/auto-contributions");
}

#[tokio::test]
async fn satisfied_minimum_makes_no_writes() {
    let host = Arc::new(MockHost::with_repo(5));
    let sink = Arc::new(MockSink::default());
    let p = profile(5);

    let outcome = reconciler(host.clone(), sink.clone())
        .reconcile(&p)
        .await
        .unwrap();

    assert_eq!(
        outcome,
        ReconcileOutcome::Completed {
            commits_found: 5,
            attempted: 0,
            commits_created: 0,
            errors: Vec::new(),
        }
    );
    assert_eq!(host.create_file_calls.load(Ordering::SeqCst), 0);
    assert_eq!(host.create_repo_calls.load(Ordering::SeqCst), 0);
    assert!(sink.records.lock().unwrap().is_empty());
}

#[tokio::test]
async fn rerun_after_partial_run_fills_only_the_remainder() {
    // A previous run created 2 of 5 and died; the recount sees 2.
    let host = Arc::new(MockHost::with_repo(2));
    let sink = Arc::new(MockSink::default());
    let p = profile(5);

    let outcome = reconciler(host.clone(), sink).reconcile(&p).await.unwrap();

    assert_eq!(
        outcome,
        ReconcileOutcome::Completed {
            commits_found: 2,
            attempted: 3,
            commits_created: 3,
            errors: Vec::new(),
        }
    );
    assert_eq!(host.create_file_calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn missing_repo_is_created_once_before_listing_commits() {
    let host = Arc::new(MockHost::default());
    let sink = Arc::new(MockSink::default());
    let p = profile(1);

    let outcome = reconciler(host.clone(), sink).reconcile(&p).await.unwrap();

    assert_eq!(outcome.commits_created(), 1);
    assert_eq!(host.create_repo_calls.load(Ordering::SeqCst), 1);

    let create_order = host.create_repo_order.lock().unwrap().unwrap();
    let list_order = host.list_commits_order.lock().unwrap().unwrap();
    assert!(create_order < list_order);
}

#[tokio::test]
async fn repo_creation_failure_aborts_with_no_commit_attempts() {
    let host = Arc::new(MockHost {
        fail_create_repo: true,
        ..MockHost::default()
    });
    let sink = Arc::new(MockSink::default());
    let p = profile(3);

    let err = reconciler(host.clone(), sink).reconcile(&p).await.unwrap_err();

    assert!(matches!(err, ReconcileError::RepositoryAccess(_)));
    assert_eq!(host.create_file_calls.load(Ordering::SeqCst), 0);
    assert!(host.list_commits_order.lock().unwrap().is_none());
}

#[tokio::test]
async fn middle_file_failure_skips_that_commit_and_continues() {
    let host = Arc::new(MockHost {
        failing_file_calls: HashSet::from([2]),
        ..MockHost::with_repo(0)
    });
    let sink = Arc::new(MockSink::default());
    let p = profile(3);

    let outcome = reconciler(host.clone(), sink.clone())
        .reconcile(&p)
        .await
        .unwrap();

    match outcome {
        ReconcileOutcome::Completed {
            commits_found,
            attempted,
            commits_created,
            errors,
        } => {
            assert_eq!(commits_found, 0);
            assert_eq!(attempted, 3);
            assert_eq!(commits_created, 2);
            assert_eq!(errors.len(), 1);
            assert!(errors[0].contains("could not create file"));
        }
        other => panic!("expected Completed, got {other:?}"),
    }
    assert_eq!(sink.records.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn generation_failure_counts_the_attempt_without_a_file() {
    let host = Arc::new(MockHost::with_repo(0));
    let sink = Arc::new(MockSink::default());
    let generator = Arc::new(
        MockGenerator::new()
            .with_error(ContentError::Empty)
            .with_file(GeneratedFile::new("print('ok')", "py")),
    );
    let p = profile(2);

    let outcome = reconciler_with(host.clone(), generator, sink, test_options())
        .reconcile(&p)
        .await
        .unwrap();

    match outcome {
        ReconcileOutcome::Completed {
            attempted,
            commits_created,
            errors,
            ..
        } => {
            assert_eq!(attempted, 2);
            assert_eq!(commits_created, 1);
            assert_eq!(errors.len(), 1);
        }
        other => panic!("expected Completed, got {other:?}"),
    }
    assert_eq!(host.create_file_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn sink_failure_does_not_fail_the_run() {
    let host = Arc::new(MockHost::with_repo(0));
    let sink = Arc::new(MockSink {
        fail: true,
        ..MockSink::default()
    });
    let p = profile(2);

    let outcome = reconciler(host.clone(), sink).reconcile(&p).await.unwrap();

    assert_eq!(outcome.commits_created(), 2);
    assert_eq!(host.create_file_calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn file_paths_within_a_run_are_unique() {
    let host = Arc::new(MockHost::with_repo(0));
    let sink = Arc::new(MockSink::default());
    let p = profile(5);

    reconciler(host.clone(), sink).reconcile(&p).await.unwrap();

    let paths = host.created_paths();
    assert_eq!(paths.len(), 5);
    let unique: HashSet<&String> = paths.iter().collect();
    assert_eq!(unique.len(), 5);
}

#[tokio::test(start_paused = true)]
async fn deadline_stops_remaining_attempts_without_rollback() {
    let host = Arc::new(MockHost::with_repo(0));
    let sink = Arc::new(MockSink::default());
    let options = ReconcileOptions {
        commit_pacing: Some(Duration::from_secs(1)),
        settle_delay: Duration::ZERO,
        deadline: Some(Instant::now() + Duration::from_millis(1500)),
        ..ReconcileOptions::default()
    };
    let p = profile(5);

    let outcome = reconciler_with(
        host.clone(),
        Arc::new(MockGenerator::new()),
        sink,
        options,
    )
    .reconcile(&p)
    .await
    .unwrap();

    // Paused-clock pacing: attempts land at t=0s and t=1s, then the clock
    // passes the deadline. Commits already created are kept.
    match outcome {
        ReconcileOutcome::Completed {
            attempted,
            commits_created,
            ..
        } => {
            assert_eq!(attempted, 2);
            assert_eq!(commits_created, 2);
        }
        other => panic!("expected Completed, got {other:?}"),
    }
    assert_eq!(host.created_paths().len(), 2);
}

#[tokio::test]
async fn zero_minimum_is_clamped_to_one() {
    let host = Arc::new(MockHost::with_repo(0));
    let sink = Arc::new(MockSink::default());
    let mut p = profile(0);
    p.min_daily_contributions = 0;

    let outcome = reconciler(host.clone(), sink).reconcile(&p).await.unwrap();

    assert_eq!(outcome.commits_created(), 1);
}
