//! AI-backed LeetCode solution generator (Gemini generateContent API).
//!
//! Picks a random problem number, prompts for a complete Python solution,
//! and walks a fixed model fallback list until one answers. Title and
//! difficulty extraction is best-effort: a response that yields code but
//! no recognizable header still succeeds with "Unknown" placeholders.

use async_trait::async_trait;
use rand::Rng;
use regex::Regex;
use serde::Deserialize;
use tracing::{debug, warn};

use super::generator::{ContentError, ContentGenerator, GeneratedFile};

/// Models tried in order until one produces usable output.
pub const DEFAULT_MODELS: &[&str] = &[
    "gemini-2.0-flash",
    "gemini-1.5-flash-latest",
    "gemini-1.5-flash-8b",
    "gemini-1.5-pro-latest",
    "gemini-1.0-pro",
];

const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com";

fn build_prompt(problem_number: u32) -> String {
    format!(
        "You are a LeetCode expert. Solve LeetCode Problem #{problem_number}.\n\n\
         **Instructions:**\n\
         1. First, identify the problem title and difficulty\n\
         2. Generate a COMPLETE, WORKING Python solution\n\
         3. Use the OPTIMAL algorithm (best time/space complexity)\n\
         4. Include detailed docstring explaining the approach\n\
         5. Add inline comments for key steps\n\
         6. Include Time & Space Complexity analysis\n\n\
         **Output Format:**\n\
         ```python\n\
         # Problem Title\n\
         # Difficulty: [Easy/Medium/Hard]\n\
         # Category: [Array/String/DP/etc]\n\n\
         class Solution:\n\
             def methodName(self, params) -> ReturnType:\n\
                 \"\"\"\n\
                 [Clear explanation of approach and algorithm]\n\
                 \"\"\"\n\
                 # Your optimal solution here\n\n\
         # Time Complexity: O(?)\n\
         # Space Complexity: O(?)\n\
         ```\n\n\
         Generate production-ready code that passes all test cases!"
    )
}

/// Strip a ```python fenced block if present; otherwise return the raw text.
fn extract_code(text: &str) -> String {
    if let Some(start) = text.find("```python") {
        let after_fence = start + "```python".len();
        if let Some(end) = text.rfind("```") {
            if end > after_fence {
                return text[after_fence..end].trim().to_string();
            }
        }
    }
    text.trim().to_string()
}

/// Title and difficulty pulled out of a solution header, best-effort.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extracted {
    pub title: String,
    pub difficulty: String,
}

fn extract_metadata(code: &str) -> Extracted {
    let title_re = Regex::new(r"(?m)^#\s*(.+?)(?:\n|$)").expect("valid regex");
    let diff_re = Regex::new(r"(?i)Difficulty:\s*(\w+)").expect("valid regex");

    let title = title_re
        .captures(code)
        .and_then(|c| c.get(1))
        .map(|m| {
            let cleaned = Regex::new(r"(?i)Problem")
                .expect("valid regex")
                .replace_all(m.as_str(), "");
            cleaned.trim().to_string()
        })
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| "Unknown Problem".to_string());

    let difficulty = diff_re
        .captures(code)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| "Unknown".to_string());

    Extracted { title, difficulty }
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    parts: Option<Vec<CandidatePart>>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    error: Option<ApiErrorDetail>,
}

#[derive(Deserialize)]
struct ApiErrorDetail {
    message: Option<String>,
}

// ---------------------------------------------------------------------------
// GeminiGenerator
// ---------------------------------------------------------------------------

/// Content generator backed by the Gemini API.
pub struct GeminiGenerator {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    models: Vec<String>,
}

impl GeminiGenerator {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            base_url: DEFAULT_API_BASE.to_string(),
            models: DEFAULT_MODELS.iter().map(|m| m.to_string()).collect(),
        }
    }

    /// Override the base URL (useful for testing with a mock server).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Replace the model fallback list.
    pub fn with_models(mut self, models: Vec<String>) -> Self {
        self.models = models;
        self
    }

    async fn try_model(&self, model: &str, prompt: &str) -> Result<String, ContentError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.base_url, model, self.api_key
        );
        let body = serde_json::json!({
            "contents": [{ "parts": [{ "text": prompt }] }]
        });

        let resp = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = resp.status().as_u16();
        if !resp.status().is_success() {
            let message = resp
                .json::<ApiErrorBody>()
                .await
                .ok()
                .and_then(|b| b.error.and_then(|e| e.message))
                .unwrap_or_else(|| format!("HTTP {status}"));
            return Err(ContentError::Api { status, message });
        }

        let parsed: GenerateContentResponse = resp
            .json()
            .await
            .map_err(|e| ContentError::Parse(e.to_string()))?;

        let text = parsed
            .candidates
            .and_then(|mut c| if c.is_empty() { None } else { Some(c.remove(0)) })
            .and_then(|c| c.content)
            .and_then(|c| c.parts)
            .and_then(|mut p| if p.is_empty() { None } else { Some(p.remove(0)) })
            .and_then(|p| p.text)
            .unwrap_or_default();

        if text.is_empty() {
            return Err(ContentError::Empty);
        }
        Ok(text)
    }
}

#[async_trait]
impl ContentGenerator for GeminiGenerator {
    async fn generate(&self, _language_hint: &str) -> Result<GeneratedFile, ContentError> {
        let problem_number = rand::rng().random_range(1..=3000);
        let prompt = build_prompt(problem_number);

        let mut last_error = String::from("no models configured");
        for model in &self.models {
            match self.try_model(model, &prompt).await {
                Ok(text) => {
                    let code = extract_code(&text);
                    if code.is_empty() {
                        last_error = "empty code block".to_string();
                        continue;
                    }
                    let meta = extract_metadata(&code);
                    debug!(
                        model,
                        problem_number,
                        title = %meta.title,
                        difficulty = %meta.difficulty,
                        "generated solution"
                    );
                    let note = format!(
                        "LeetCode Problem #{problem_number}: {}\nDifficulty: {}",
                        meta.title, meta.difficulty
                    );
                    return Ok(GeneratedFile::new(code, "py").with_note(note));
                }
                Err(err) => {
                    warn!(model, error = %err, "model failed, trying next");
                    last_error = err.to_string();
                }
            }
        }

        Err(ContentError::Exhausted { last_error })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_names_the_problem_number() {
        let prompt = build_prompt(217);
        assert!(prompt.contains("Problem #217"));
        assert!(prompt.contains("```python"));
    }

    #[test]
    fn extract_code_strips_fenced_block() {
        let text = "Here you go:\n```python\n# Contains Duplicate\nclass Solution:\n    pass\n```\nGood luck!";
        let code = extract_code(text);
        assert!(code.starts_with("# Contains Duplicate"));
        assert!(code.ends_with("pass"));
    }

    #[test]
    fn extract_code_passes_through_unfenced_text() {
        let text = "class Solution:\n    pass";
        assert_eq!(extract_code(text), text);
    }

    #[test]
    fn extract_metadata_reads_header() {
        let code = "# Two Sum Problem\n# Difficulty: Easy\nclass Solution:\n    pass";
        let meta = extract_metadata(code);
        assert_eq!(meta.title, "Two Sum");
        assert_eq!(meta.difficulty, "Easy");
    }

    #[test]
    fn extract_metadata_defaults_when_absent() {
        let meta = extract_metadata("class Solution:\n    pass");
        assert_eq!(meta.title, "Unknown Problem");
        assert_eq!(meta.difficulty, "Unknown");
    }

    #[test]
    fn extract_metadata_difficulty_is_case_insensitive() {
        let meta = extract_metadata("# Jump Game\n# difficulty: medium\n");
        assert_eq!(meta.difficulty, "medium");
    }

    #[test]
    fn candidates_payload_deserializes() {
        let json = r#"{
            "candidates": [{
                "content": {
                    "parts": [{ "text": "```python\n# Ok\npass\n```" }]
                }
            }]
        }"#;
        let resp: GenerateContentResponse = serde_json::from_str(json).unwrap();
        let text = resp.candidates.unwrap().remove(0).content.unwrap().parts.unwrap()
            .remove(0)
            .text
            .unwrap();
        assert!(text.contains("# Ok"));
    }

    #[tokio::test]
    async fn empty_model_list_exhausts_immediately() {
        let gen = GeminiGenerator::new("test-key").with_models(Vec::new());
        let result = gen.generate("any").await;
        assert!(matches!(result, Err(ContentError::Exhausted { .. })));
    }
}
