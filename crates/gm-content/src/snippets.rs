//! Built-in snippet catalog, the generator every plan is allowed to use.
//!
//! Selection is uniform within a catalog. For an unrecognized or "any"
//! hint the snippet and the extension are picked independently, so a
//! Python snippet can land in a `.cpp` file. That matches the filler
//! nature of the content and keeps "any" trivially total.

use async_trait::async_trait;
use rand::seq::IndexedRandom;

use super::generator::{ContentError, ContentGenerator, GeneratedFile};

const PYTHON_SNIPPETS: &[&str] = &[
    "def calculate_sum(a, b):\n    return a + b",
    "class DataProcessor:\n    def __init__(self):\n        self.data = []",
    "import numpy as np\n\ndef process_array(arr):\n    return np.mean(arr)",
    "def fibonacci(n):\n    if n <= 1:\n        return n\n    return fibonacci(n-1) + fibonacci(n-2)",
];

const JAVASCRIPT_SNIPPETS: &[&str] = &[
    "function greet(name) {\n  return `Hello, ${name}!`;\n}",
    "const fetchData = async (url) => {\n  const response = await fetch(url);\n  return response.json();\n};",
    "class User {\n  constructor(name) {\n    this.name = name;\n  }\n}",
    "const sum = (a, b) => a + b;",
];

const JAVA_SNIPPETS: &[&str] = &[
    "public class HelloWorld {\n    public static void main(String[] args) {\n        System.out.println(\"Hello\");\n    }\n}",
    "public int add(int a, int b) {\n    return a + b;\n}",
    "public class Calculator {\n    private int result;\n}",
];

const CPP_SNIPPETS: &[&str] = &[
    "#include <iostream>\nint main() {\n    std::cout << \"Hello\";\n    return 0;\n}",
    "int add(int a, int b) {\n    return a + b;\n}",
    "class Rectangle {\nprivate:\n    int width, height;\n};",
];

struct Catalog {
    snippets: &'static [&'static str],
    extension: &'static str,
}

/// Catalog for a normalized language hint, if one exists.
fn catalog_for(language: &str) -> Option<Catalog> {
    match language {
        "python" => Some(Catalog {
            snippets: PYTHON_SNIPPETS,
            extension: "py",
        }),
        "javascript" => Some(Catalog {
            snippets: JAVASCRIPT_SNIPPETS,
            extension: "js",
        }),
        "typescript" => Some(Catalog {
            snippets: JAVASCRIPT_SNIPPETS,
            extension: "ts",
        }),
        "java" => Some(Catalog {
            snippets: JAVA_SNIPPETS,
            extension: "java",
        }),
        "cpp" | "c++" => Some(Catalog {
            snippets: CPP_SNIPPETS,
            extension: "cpp",
        }),
        _ => None,
    }
}

const ALL_EXTENSIONS: &[&str] = &["py", "js", "ts", "java", "cpp"];

fn all_snippets() -> Vec<&'static str> {
    PYTHON_SNIPPETS
        .iter()
        .chain(JAVASCRIPT_SNIPPETS)
        .chain(JAVA_SNIPPETS)
        .chain(CPP_SNIPPETS)
        .copied()
        .collect()
}

/// Generator backed by the static snippet catalog. Infallible in practice:
/// every hint resolves to at least one snippet.
#[derive(Debug, Default, Clone, Copy)]
pub struct GenericSnippetGenerator;

impl GenericSnippetGenerator {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ContentGenerator for GenericSnippetGenerator {
    async fn generate(&self, language_hint: &str) -> Result<GeneratedFile, ContentError> {
        let normalized = language_hint.to_lowercase();
        let mut rng = rand::rng();

        let file = match catalog_for(&normalized) {
            Some(catalog) => {
                let snippet = catalog.snippets.choose(&mut rng).ok_or(ContentError::Empty)?;
                GeneratedFile::new(*snippet, catalog.extension)
            }
            None => {
                let snippets = all_snippets();
                let snippet = snippets.choose(&mut rng).ok_or(ContentError::Empty)?;
                let extension = ALL_EXTENSIONS.choose(&mut rng).ok_or(ContentError::Empty)?;
                GeneratedFile::new(*snippet, *extension)
            }
        };

        Ok(file)
    }
}
