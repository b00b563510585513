//! Plan-based generator selection.

use std::sync::Arc;

use tracing::debug;

use gm_core::types::{Capability, Plan};

use super::ai::GeminiGenerator;
use super::generator::ContentGenerator;
use super::leetcode::LeetCodeCatalogGenerator;
use super::snippets::GenericSnippetGenerator;

/// Pick the generator for a plan.
///
/// AI content wins when the plan permits it and a key is configured.
/// Without AI, plans permitted LeetCode content get the curated catalog,
/// and everyone else gets snippets.
pub fn generator_for_plan(plan: Plan, gemini: Option<Arc<GeminiGenerator>>) -> Arc<dyn ContentGenerator> {
    if plan.permits(Capability::AiContent) {
        if let Some(ai) = gemini {
            debug!(?plan, "selected AI generator");
            return ai;
        }
    }

    if plan.permits(Capability::LeetCodeContent) {
        debug!(?plan, "selected LeetCode catalog generator");
        return Arc::new(LeetCodeCatalogGenerator::new());
    }

    debug!(?plan, "selected snippet generator");
    Arc::new(GenericSnippetGenerator::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::GeneratedFile;

    #[tokio::test]
    async fn free_plan_gets_snippets() {
        let gen = generator_for_plan(Plan::Free, None);
        let file = gen.generate("python").await.unwrap();
        assert_eq!(file.extension, "py");
        assert!(file.note.is_none());
    }

    #[tokio::test]
    async fn leetcode_plan_without_key_gets_catalog() {
        let gen = generator_for_plan(Plan::LeetCode, None);
        let file = gen.generate("any").await.unwrap();
        // Catalog output always carries a readme note.
        assert!(file.note.is_some());
    }

    #[tokio::test]
    async fn leetcode_plan_with_key_gets_ai() {
        // An empty model list makes the AI generator fail fast, which is
        // how we can tell it was selected without touching the network.
        let ai = Arc::new(GeminiGenerator::new("k").with_models(Vec::new()));
        let gen = generator_for_plan(Plan::LeetCode, Some(ai));
        assert!(gen.generate("any").await.is_err());
    }

    #[tokio::test]
    async fn enterprise_plan_with_key_gets_ai() {
        let ai = Arc::new(GeminiGenerator::new("k").with_models(Vec::new()));
        let gen = generator_for_plan(Plan::Enterprise, Some(ai));
        assert!(gen.generate("any").await.is_err());
    }

    #[tokio::test]
    async fn enterprise_plan_without_key_falls_back_to_snippets() {
        // Enterprise has no LeetCode entitlement, so the fallback is the
        // snippet catalog rather than the curated problems.
        let gen = generator_for_plan(Plan::Enterprise, None);
        let file = gen.generate("python").await.unwrap();
        assert_eq!(file.extension, "py");
        assert!(file.note.is_none());
    }

    #[tokio::test]
    async fn pro_plan_gets_snippets_even_with_key() {
        let ai = Arc::new(GeminiGenerator::new("k").with_models(Vec::new()));
        let gen = generator_for_plan(Plan::Pro, Some(ai));
        let file: GeneratedFile = gen.generate("java").await.unwrap();
        assert_eq!(file.extension, "java");
    }

    #[tokio::test]
    async fn owner_plan_prefers_ai_when_available() {
        let ai = Arc::new(GeminiGenerator::new("k").with_models(Vec::new()));
        let gen = generator_for_plan(Plan::Owner, Some(ai));
        assert!(gen.generate("any").await.is_err());

        // Without a key the owner falls back to the catalog.
        let gen = generator_for_plan(Plan::Owner, None);
        assert!(gen.generate("any").await.unwrap().note.is_some());
    }
}
