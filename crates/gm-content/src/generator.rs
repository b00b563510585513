//! Content-generator capability.
//!
//! A generator produces a textual code artifact plus a filename extension
//! for a language preference. Generators are stateless request/response:
//! randomness across calls is expected, and two identical picks within a
//! run are acceptable, not an error.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ContentError {
    /// The provider returned an empty artifact.
    #[error("generated content was empty")]
    Empty,

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("request timed out")]
    Timeout,

    #[error("parse error: {0}")]
    Parse(String),

    /// Every fallback model was tried and failed.
    #[error("all models failed; last error: {last_error}")]
    Exhausted { last_error: String },
}

impl From<reqwest::Error> for ContentError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ContentError::Timeout
        } else {
            ContentError::Http(err.to_string())
        }
    }
}

/// A generated code artifact.
///
/// `content` and `extension` are never empty on the success path; `note`
/// optionally carries companion human-readable documentation (e.g. a
/// LeetCode problem readme).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    pub content: String,
    pub extension: String,
    pub note: Option<String>,
}

impl GeneratedFile {
    pub fn new(content: impl Into<String>, extension: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            extension: extension.into(),
            note: None,
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}

/// Async capability: produce content for a language hint ("any" accepted).
#[async_trait]
pub trait ContentGenerator: Send + Sync {
    async fn generate(&self, language_hint: &str) -> Result<GeneratedFile, ContentError>;
}

// ---------------------------------------------------------------------------
// MockGenerator
// ---------------------------------------------------------------------------

/// A mock generator for testing.
///
/// Pops pre-queued responses in order; an empty queue yields a default
/// snippet. Captured hints allow call assertions.
pub struct MockGenerator {
    responses: Arc<Mutex<VecDeque<Result<GeneratedFile, ContentError>>>>,
    captured_hints: Arc<Mutex<Vec<String>>>,
}

impl MockGenerator {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(VecDeque::new())),
            captured_hints: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Queue a successful response.
    pub fn with_file(self, file: GeneratedFile) -> Self {
        self.responses.lock().unwrap().push_back(Ok(file));
        self
    }

    /// Queue an error response.
    pub fn with_error(self, error: ContentError) -> Self {
        self.responses.lock().unwrap().push_back(Err(error));
        self
    }

    /// Hints captured across all calls, in order.
    pub fn captured_hints(&self) -> Vec<String> {
        self.captured_hints.lock().unwrap().clone()
    }
}

impl Default for MockGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ContentGenerator for MockGenerator {
    async fn generate(&self, language_hint: &str) -> Result<GeneratedFile, ContentError> {
        self.captured_hints
            .lock()
            .unwrap()
            .push(language_hint.to_string());

        match self.responses.lock().unwrap().pop_front() {
            Some(result) => result,
            None => Ok(GeneratedFile::new("def mock():\n    pass", "py")),
        }
    }
}
