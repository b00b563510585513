use std::path::Path;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio_rusqlite::Connection;
use uuid::Uuid;

use crate::types::{AutomationProfile, CommitRecord};

// ---------------------------------------------------------------------------
// Errors and traits
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Db(#[from] tokio_rusqlite::Error),
    #[error("profile not found: {0}")]
    NotFound(Uuid),
}

/// Read side of user automation settings.
///
/// A store failure on the initial profile read is fatal for the run; a
/// failure on `record_run` is best-effort and only logged by callers.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn get(&self, user_id: Uuid) -> Result<Option<AutomationProfile>, StoreError>;

    /// Profiles eligible for a sweep: not paused and holding a token.
    async fn list_active(&self) -> Result<Vec<AutomationProfile>, StoreError>;

    async fn record_run(
        &self,
        user_id: Uuid,
        timestamp: DateTime<Utc>,
        summary: &str,
    ) -> Result<(), StoreError>;
}

/// Fire-and-forget sink for per-commit observability records.
#[async_trait]
pub trait CommitLogSink: Send + Sync {
    async fn append(&self, record: &CommitRecord) -> Result<(), StoreError>;
}

// ---------------------------------------------------------------------------
// helpers – enum <-> SQLite string
// ---------------------------------------------------------------------------

fn enum_to_sql<T: serde::Serialize>(val: &T) -> String {
    let s = serde_json::to_string(val).expect("serialize enum");
    s.trim_matches('"').to_string()
}

fn enum_from_sql<T: serde::de::DeserializeOwned>(raw: &str) -> T {
    let quoted = format!("\"{}\"", raw);
    serde_json::from_str(&quoted).expect("deserialize enum")
}

// ---------------------------------------------------------------------------
// SqliteStore
// ---------------------------------------------------------------------------

/// Async SQLite-backed store for profiles, run history, and commit logs.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open (or create) a database at the given file path.
    pub async fn new(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let conn = Connection::open(path.as_ref()).await?;
        let store = Self { conn };
        store.init_schema().await?;
        Ok(store)
    }

    /// Create a purely in-memory database (useful for tests).
    pub async fn new_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory().await?;
        let store = Self { conn };
        store.init_schema().await?;
        Ok(store)
    }

    async fn init_schema(&self) -> Result<(), StoreError> {
        self.conn
            .call(|conn| {
                conn.execute_batch(
                    "
                    PRAGMA journal_mode=WAL;
                    PRAGMA synchronous=NORMAL;
                    PRAGMA busy_timeout=5000;

                    CREATE TABLE IF NOT EXISTS profiles (
                        user_id                 TEXT PRIMARY KEY,
                        github_username         TEXT NOT NULL,
                        access_token            TEXT,
                        repo_name               TEXT,
                        repo_visibility         TEXT NOT NULL,
                        preferred_language      TEXT,
                        min_daily_contributions INTEGER NOT NULL DEFAULT 1,
                        plan                    TEXT NOT NULL,
                        paused                  INTEGER NOT NULL DEFAULT 0,
                        last_run_at             TEXT
                    );

                    CREATE TABLE IF NOT EXISTS run_history (
                        id        INTEGER PRIMARY KEY AUTOINCREMENT,
                        user_id   TEXT NOT NULL,
                        ran_at    TEXT NOT NULL,
                        summary   TEXT NOT NULL
                    );

                    CREATE INDEX IF NOT EXISTS idx_run_history_user ON run_history(user_id);

                    CREATE TABLE IF NOT EXISTS commit_logs (
                        id              INTEGER PRIMARY KEY AUTOINCREMENT,
                        user_id         TEXT NOT NULL,
                        repo_full_name  TEXT NOT NULL,
                        language        TEXT NOT NULL,
                        content_snippet TEXT NOT NULL,
                        created_at      TEXT NOT NULL
                    );

                    CREATE INDEX IF NOT EXISTS idx_commit_logs_user ON commit_logs(user_id);
                    ",
                )?;
                Ok(())
            })
            .await
            .map_err(StoreError::Db)
    }

    /// Insert or update a profile row.
    pub async fn upsert_profile(&self, profile: &AutomationProfile) -> Result<(), StoreError> {
        let user_id = profile.user_id.to_string();
        let github_username = profile.github_username.clone();
        let access_token = profile.access_token.clone();
        let repo_name = profile.repo_name.clone();
        let repo_visibility = enum_to_sql(&profile.repo_visibility);
        let preferred_language = profile.preferred_language.clone();
        let min_daily = profile.min_daily_contributions as i64;
        let plan = enum_to_sql(&profile.plan);
        let paused = profile.paused as i64;
        let last_run_at = profile.last_run_at.map(|d| d.to_rfc3339());

        self.conn
            .call(move |conn| {
                conn.execute(
                    "INSERT INTO profiles (user_id, github_username, access_token, repo_name,
                        repo_visibility, preferred_language, min_daily_contributions, plan,
                        paused, last_run_at)
                     VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10)
                     ON CONFLICT(user_id) DO UPDATE SET
                        github_username=excluded.github_username,
                        access_token=excluded.access_token,
                        repo_name=excluded.repo_name,
                        repo_visibility=excluded.repo_visibility,
                        preferred_language=excluded.preferred_language,
                        min_daily_contributions=excluded.min_daily_contributions,
                        plan=excluded.plan, paused=excluded.paused,
                        last_run_at=excluded.last_run_at",
                    rusqlite::params![
                        user_id,
                        github_username,
                        access_token,
                        repo_name,
                        repo_visibility,
                        preferred_language,
                        min_daily,
                        plan,
                        paused,
                        last_run_at,
                    ],
                )?;
                Ok(())
            })
            .await
            .map_err(StoreError::Db)
    }

    /// Commit-log rows for a user, newest first.
    pub async fn commit_logs_for(&self, user_id: Uuid) -> Result<Vec<CommitRecord>, StoreError> {
        let id_str = user_id.to_string();
        self.conn
            .call(move |conn| {
                let mut stmt = conn.prepare(
                    "SELECT user_id, repo_full_name, language, content_snippet, created_at
                     FROM commit_logs WHERE user_id = ?1 ORDER BY id DESC",
                )?;
                let mut rows = stmt.query(rusqlite::params![id_str])?;
                let mut out = Vec::new();
                while let Some(row) = rows.next()? {
                    out.push(row_to_record(row)?);
                }
                Ok(out)
            })
            .await
            .map_err(StoreError::Db)
    }
}

#[async_trait]
impl ProfileStore for SqliteStore {
    async fn get(&self, user_id: Uuid) -> Result<Option<AutomationProfile>, StoreError> {
        let id_str = user_id.to_string();
        self.conn
            .call(move |conn| {
                let mut stmt = conn.prepare(
                    "SELECT user_id, github_username, access_token, repo_name, repo_visibility,
                            preferred_language, min_daily_contributions, plan, paused, last_run_at
                     FROM profiles WHERE user_id = ?1",
                )?;
                let mut rows = stmt.query(rusqlite::params![id_str])?;
                match rows.next()? {
                    Some(row) => Ok(Some(row_to_profile(row)?)),
                    None => Ok(None),
                }
            })
            .await
            .map_err(StoreError::Db)
    }

    async fn list_active(&self) -> Result<Vec<AutomationProfile>, StoreError> {
        self.conn
            .call(|conn| {
                let mut stmt = conn.prepare(
                    "SELECT user_id, github_username, access_token, repo_name, repo_visibility,
                            preferred_language, min_daily_contributions, plan, paused, last_run_at
                     FROM profiles
                     WHERE paused = 0 AND access_token IS NOT NULL
                     ORDER BY github_username",
                )?;
                let mut rows = stmt.query([])?;
                let mut out = Vec::new();
                while let Some(row) = rows.next()? {
                    out.push(row_to_profile(row)?);
                }
                Ok(out)
            })
            .await
            .map_err(StoreError::Db)
    }

    async fn record_run(
        &self,
        user_id: Uuid,
        timestamp: DateTime<Utc>,
        summary: &str,
    ) -> Result<(), StoreError> {
        let id_str = user_id.to_string();
        let ts = timestamp.to_rfc3339();
        let summary = summary.to_string();
        self.conn
            .call(move |conn| {
                conn.execute(
                    "UPDATE profiles SET last_run_at = ?2 WHERE user_id = ?1",
                    rusqlite::params![id_str, ts],
                )?;
                conn.execute(
                    "INSERT INTO run_history (user_id, ran_at, summary) VALUES (?1,?2,?3)",
                    rusqlite::params![id_str, ts, summary],
                )?;
                Ok(())
            })
            .await
            .map_err(StoreError::Db)
    }
}

#[async_trait]
impl CommitLogSink for SqliteStore {
    async fn append(&self, record: &CommitRecord) -> Result<(), StoreError> {
        let user_id = record.user_id.to_string();
        let repo = record.repo_full_name.clone();
        let language = record.language.clone();
        let snippet = record.content_snippet.clone();
        let created_at = record.created_at.to_rfc3339();
        self.conn
            .call(move |conn| {
                conn.execute(
                    "INSERT INTO commit_logs (user_id, repo_full_name, language,
                        content_snippet, created_at)
                     VALUES (?1,?2,?3,?4,?5)",
                    rusqlite::params![user_id, repo, language, snippet, created_at],
                )?;
                Ok(())
            })
            .await
            .map_err(StoreError::Db)
    }
}

// ---------------------------------------------------------------------------
// Row mapping helpers
// ---------------------------------------------------------------------------

fn row_to_profile(row: &rusqlite::Row<'_>) -> rusqlite::Result<AutomationProfile> {
    let user_id_str: String = row.get(0)?;
    let visibility_str: String = row.get(4)?;
    let min_daily: i64 = row.get(6)?;
    let plan_str: String = row.get(7)?;
    let paused: i64 = row.get(8)?;
    let last_run_str: Option<String> = row.get(9)?;

    Ok(AutomationProfile {
        user_id: Uuid::parse_str(&user_id_str).expect("valid uuid"),
        github_username: row.get(1)?,
        access_token: row.get(2)?,
        repo_name: row.get(3)?,
        repo_visibility: enum_from_sql(&visibility_str),
        preferred_language: row.get(5)?,
        min_daily_contributions: min_daily as u32,
        plan: enum_from_sql(&plan_str),
        paused: paused != 0,
        last_run_at: last_run_str.map(|s| {
            chrono::DateTime::parse_from_rfc3339(&s)
                .expect("valid date")
                .with_timezone(&Utc)
        }),
    })
}

fn row_to_record(row: &rusqlite::Row<'_>) -> rusqlite::Result<CommitRecord> {
    let user_id_str: String = row.get(0)?;
    let created_at_str: String = row.get(4)?;
    Ok(CommitRecord {
        user_id: Uuid::parse_str(&user_id_str).expect("valid uuid"),
        repo_full_name: row.get(1)?,
        language: row.get(2)?,
        content_snippet: row.get(3)?,
        created_at: chrono::DateTime::parse_from_rfc3339(&created_at_str)
            .expect("valid date")
            .with_timezone(&Utc),
    })
}
