//! Periodic reconciliation sweeps over all active profiles.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use gm_content::{generator_for_plan, GeminiGenerator};
use gm_core::config::Config;
use gm_core::run_lock::RunRegistry;
use gm_core::store::{ProfileStore, SqliteStore};
use gm_core::types::AutomationProfile;
use gm_github::{GitHubClient, RepositoryHost};
use gm_reconciler::{ReconcileOptions, Reconciler};

/// Result of a single sweep pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepReport {
    /// Profiles whose reconciliation ran to completion (including partial
    /// completions; those report their shortfall in run history).
    pub users_processed: usize,
    /// Total commits created across all users this pass.
    pub commits_created: u32,
    /// Profiles skipped because a previous run for them is still in flight.
    pub skipped_locked: usize,
    /// Profiles whose run failed pre-flight or panicked.
    pub failures: usize,
    /// Timestamp of this sweep.
    pub timestamp: DateTime<Utc>,
}

/// Fans active profiles out to per-user reconciliation tasks, bounded by a
/// concurrency gate and the per-user run registry.
pub struct SweepRunner {
    store: Arc<SqliteStore>,
    config: Arc<Config>,
    gemini: Option<Arc<GeminiGenerator>>,
    registry: RunRegistry,
    gate: Arc<Semaphore>,
}

impl SweepRunner {
    pub fn new(
        store: Arc<SqliteStore>,
        config: Arc<Config>,
        gemini: Option<Arc<GeminiGenerator>>,
    ) -> Self {
        let gate = Arc::new(Semaphore::new(
            config.reconciler.max_concurrent_users as usize,
        ));
        Self {
            store,
            config,
            gemini,
            registry: RunRegistry::new(),
            gate,
        }
    }

    /// Execute one sweep over every active profile.
    pub async fn run_sweep(&self) -> Result<SweepReport> {
        debug!("sweep starting");
        let profiles = self.store.list_active().await?;
        let total = profiles.len();

        let mut tasks = JoinSet::new();
        let mut skipped_locked = 0usize;

        for profile in profiles {
            let Some(guard) = self.registry.try_begin(profile.user_id) else {
                debug!(user_id = %profile.user_id, "run already in flight, skipping");
                skipped_locked += 1;
                continue;
            };

            let permit = self
                .gate
                .clone()
                .acquire_owned()
                .await
                .map_err(|_| anyhow::anyhow!("concurrency gate closed"))?;

            let store = Arc::clone(&self.store);
            let config = Arc::clone(&self.config);
            let gemini = self.gemini.clone();

            tasks.spawn(async move {
                let _permit = permit;
                let _guard = guard;
                run_user(profile, store, config, gemini).await
            });
        }

        let mut users_processed = 0usize;
        let mut commits_created = 0u32;
        let mut failures = 0usize;

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(Ok(created)) => {
                    users_processed += 1;
                    commits_created += created;
                }
                Ok(Err(())) => failures += 1,
                Err(err) => {
                    warn!(error = %err, "reconciliation task panicked");
                    failures += 1;
                }
            }
        }

        let report = SweepReport {
            users_processed,
            commits_created,
            skipped_locked,
            failures,
            timestamp: Utc::now(),
        };
        info!(
            total,
            users_processed = report.users_processed,
            commits_created = report.commits_created,
            skipped_locked = report.skipped_locked,
            failures = report.failures,
            "sweep complete"
        );
        Ok(report)
    }
}

/// Reconcile one profile. Returns the number of commits created, or `Err`
/// when the run failed before producing an outcome. Errors are logged here
/// with the user context attached.
async fn run_user(
    profile: AutomationProfile,
    store: Arc<SqliteStore>,
    config: Arc<Config>,
    gemini: Option<Arc<GeminiGenerator>>,
) -> Result<u32, ()> {
    // list_active only returns token-holding profiles; this guards against
    // a profile edited between the listing and the run.
    let token = match profile.access_token.clone() {
        Some(token) => token,
        None => {
            warn!(user_id = %profile.user_id, "profile has no access token, skipping");
            return Err(());
        }
    };

    let client = match GitHubClient::new(
        token,
        Duration::from_secs(config.github.call_timeout_secs),
    ) {
        Ok(client) => client.with_base_url(config.github.api_base.clone()),
        Err(err) => {
            warn!(user_id = %profile.user_id, error = %err, "failed to build GitHub client");
            return Err(());
        }
    };

    let host: Arc<dyn RepositoryHost> = Arc::new(client);
    let generator = generator_for_plan(profile.plan, gemini);

    let pacing_ms = config.reconciler.commit_pacing_ms;
    let options = ReconcileOptions {
        day_boundary: config.reconciler.day_boundary(),
        commit_pacing: (pacing_ms > 0).then(|| Duration::from_millis(pacing_ms)),
        deadline: Some(Instant::now() + Duration::from_secs(config.reconciler.run_deadline_secs)),
        ..ReconcileOptions::default()
    };

    let reconciler = Reconciler::new(host, generator, store.clone(), options);

    let outcome = match reconciler.reconcile(&profile).await {
        Ok(outcome) => outcome,
        Err(err) => {
            warn!(user_id = %profile.user_id, error = %err, "reconciliation failed");
            return Err(());
        }
    };

    let summary = outcome.summary();
    info!(user_id = %profile.user_id, %summary, "reconciliation done");

    if let Err(err) = store
        .record_run(profile.user_id, Utc::now(), &summary)
        .await
    {
        warn!(user_id = %profile.user_id, error = %err, "failed to record run");
    }

    Ok(outcome.commits_created())
}
