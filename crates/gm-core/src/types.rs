use chrono::{DateTime, Duration, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Repository created for users who never picked a name.
pub const DEFAULT_REPO_NAME: &str = "auto-contributions";

// ---------------------------------------------------------------------------
// Plan
// ---------------------------------------------------------------------------

/// Subscription plan attached to a user.
///
/// Plan checks live here and nowhere else: callers ask
/// [`Plan::permits`] instead of comparing strings at each call site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Plan {
    Free,
    Pro,
    Enterprise,
    #[serde(rename = "leetcode")]
    LeetCode,
    Owner,
}

/// Content capabilities gated by plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// Daily filler snippets from the built-in catalog.
    SnippetContent,
    /// LeetCode solutions (curated or templated).
    LeetCodeContent,
    /// Externally generated content via the AI endpoint.
    AiContent,
}

impl Plan {
    /// The single authorization decision for content capabilities.
    pub fn permits(&self, capability: Capability) -> bool {
        match (self, capability) {
            (Plan::Owner, _) => true,
            (_, Capability::SnippetContent) => true,
            (Plan::LeetCode, Capability::LeetCodeContent) => true,
            (Plan::LeetCode, Capability::AiContent) => true,
            (Plan::Enterprise, Capability::AiContent) => true,
            _ => false,
        }
    }
}

impl Default for Plan {
    fn default() -> Self {
        Plan::Free
    }
}

// ---------------------------------------------------------------------------
// RepoVisibility
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepoVisibility {
    Public,
    Private,
}

impl RepoVisibility {
    pub fn is_private(&self) -> bool {
        matches!(self, RepoVisibility::Private)
    }
}

impl Default for RepoVisibility {
    fn default() -> Self {
        RepoVisibility::Public
    }
}

// ---------------------------------------------------------------------------
// AutomationProfile
// ---------------------------------------------------------------------------

/// Per-user automation settings, read once per reconciliation run.
///
/// The reconciler never mutates a profile beyond recording the run
/// timestamp through the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutomationProfile {
    pub user_id: Uuid,
    pub github_username: String,
    /// Personal access token. Absent means the run fails pre-flight.
    pub access_token: Option<String>,
    /// Target repository name; `None` falls back to [`DEFAULT_REPO_NAME`].
    pub repo_name: Option<String>,
    #[serde(default)]
    pub repo_visibility: RepoVisibility,
    /// Language hint for content generation; `None` means "any".
    pub preferred_language: Option<String>,
    pub min_daily_contributions: u32,
    #[serde(default)]
    pub plan: Plan,
    #[serde(default)]
    pub paused: bool,
    pub last_run_at: Option<DateTime<Utc>>,
}

impl AutomationProfile {
    pub fn new(user_id: Uuid, github_username: impl Into<String>) -> Self {
        Self {
            user_id,
            github_username: github_username.into(),
            access_token: None,
            repo_name: None,
            repo_visibility: RepoVisibility::Public,
            preferred_language: None,
            min_daily_contributions: 1,
            plan: Plan::Free,
            paused: false,
            last_run_at: None,
        }
    }

    /// Effective repository name after applying the default.
    pub fn effective_repo_name(&self) -> &str {
        self.repo_name.as_deref().unwrap_or(DEFAULT_REPO_NAME)
    }

    /// `owner/name` form used by the repository-host API.
    pub fn full_repo_name(&self) -> String {
        format!("{}/{}", self.github_username, self.effective_repo_name())
    }

    /// The minimum is contractually >= 1; stored zeros are clamped up.
    pub fn effective_minimum(&self) -> u32 {
        self.min_daily_contributions.max(1)
    }

    pub fn language_hint(&self) -> &str {
        self.preferred_language.as_deref().unwrap_or("any")
    }
}

// ---------------------------------------------------------------------------
// CommitRecord
// ---------------------------------------------------------------------------

/// Append-only observability row written after each successful file commit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitRecord {
    pub user_id: Uuid,
    pub repo_full_name: String,
    pub language: String,
    /// First 100 characters of the committed content.
    pub content_snippet: String,
    pub created_at: DateTime<Utc>,
}

impl CommitRecord {
    pub fn new(
        user_id: Uuid,
        repo_full_name: impl Into<String>,
        language: impl Into<String>,
        content: &str,
    ) -> Self {
        Self {
            user_id,
            repo_full_name: repo_full_name.into(),
            language: language.into(),
            content_snippet: content.chars().take(100).collect(),
            created_at: Utc::now(),
        }
    }
}

// ---------------------------------------------------------------------------
// ReconcileOutcome
// ---------------------------------------------------------------------------

/// Structured result of one reconciliation run.
///
/// Fatal failures (missing credential, repository access, store read) are
/// errors on the `reconcile` call itself; everything here is a reportable
/// non-fatal outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ReconcileOutcome {
    /// Profile is paused; the run produced zero side effects.
    Paused,
    /// The run executed. `commits_created <= attempted` always holds, and a
    /// shortfall is reported through `errors`, not as a failure.
    Completed {
        /// Commits found on the repository since the day boundary.
        commits_found: u32,
        /// Deficit the run tried to fill.
        attempted: u32,
        commits_created: u32,
        /// Per-attempt recoverable errors (generation or file creation).
        errors: Vec<String>,
    },
}

impl ReconcileOutcome {
    pub fn commits_created(&self) -> u32 {
        match self {
            ReconcileOutcome::Paused => 0,
            ReconcileOutcome::Completed {
                commits_created, ..
            } => *commits_created,
        }
    }

    /// One-line summary for run records and logs.
    pub fn summary(&self) -> String {
        match self {
            ReconcileOutcome::Paused => "paused".to_string(),
            ReconcileOutcome::Completed {
                commits_found,
                attempted,
                commits_created,
                errors,
            } => format!(
                "found={} attempted={} created={} errors={}",
                commits_found,
                attempted,
                commits_created,
                errors.len()
            ),
        }
    }
}

// ---------------------------------------------------------------------------
// DayBoundary
// ---------------------------------------------------------------------------

/// Policy for where "today" starts when counting existing commits.
///
/// The source system used ambient server time; that choice is surfaced
/// here as explicit configuration instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DayBoundary {
    Utc,
    /// Fixed offset east of UTC, in minutes (e.g. 330 for IST).
    FixedOffset { minutes_east: i32 },
}

impl DayBoundary {
    /// Start of the current day under this policy, expressed in UTC.
    pub fn start_of_today(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        match self {
            DayBoundary::Utc => now
                .date_naive()
                .and_hms_opt(0, 0, 0)
                .expect("midnight is valid")
                .and_utc(),
            DayBoundary::FixedOffset { minutes_east } => {
                let offset = FixedOffset::east_opt(minutes_east * 60)
                    .unwrap_or_else(|| FixedOffset::east_opt(0).expect("zero offset"));
                let local = now.with_timezone(&offset);
                let local_midnight = local
                    .date_naive()
                    .and_hms_opt(0, 0, 0)
                    .expect("midnight is valid");
                (local_midnight - Duration::minutes(i64::from(*minutes_east))).and_utc()
            }
        }
    }
}

impl Default for DayBoundary {
    fn default() -> Self {
        DayBoundary::Utc
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
