pub mod ai;
pub mod dispatch;
pub mod generator;
pub mod leetcode;
pub mod snippets;

pub use ai::GeminiGenerator;
pub use dispatch::generator_for_plan;
pub use generator::{ContentError, ContentGenerator, GeneratedFile, MockGenerator};
pub use leetcode::LeetCodeCatalogGenerator;
pub use snippets::GenericSnippetGenerator;
