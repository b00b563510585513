//! Curated LeetCode catalog generator.
//!
//! Thirty problems split evenly across difficulties, with hand-written
//! solutions for a few well-known ones and a templated stub otherwise.
//! The language hint is ignored: a run pre-flight picks this generator
//! based on plan, and the catalog picks its own language per call.

use std::fmt;

use async_trait::async_trait;
use rand::seq::IndexedRandom;

use super::generator::{ContentError, ContentGenerator, GeneratedFile};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Problem {
    pub id: u32,
    pub title: &'static str,
    pub difficulty: Difficulty,
    pub category: &'static str,
}

use Difficulty::{Easy, Hard, Medium};

pub const PROBLEMS: &[Problem] = &[
    Problem { id: 1, title: "Two Sum", difficulty: Easy, category: "Array" },
    Problem { id: 9, title: "Palindrome Number", difficulty: Easy, category: "Math" },
    Problem { id: 13, title: "Roman to Integer", difficulty: Easy, category: "String" },
    Problem { id: 14, title: "Longest Common Prefix", difficulty: Easy, category: "String" },
    Problem { id: 20, title: "Valid Parentheses", difficulty: Easy, category: "Stack" },
    Problem { id: 21, title: "Merge Two Sorted Lists", difficulty: Easy, category: "Linked List" },
    Problem { id: 26, title: "Remove Duplicates from Sorted Array", difficulty: Easy, category: "Array" },
    Problem { id: 27, title: "Remove Element", difficulty: Easy, category: "Array" },
    Problem { id: 28, title: "Find the Index of the First Occurrence", difficulty: Easy, category: "String" },
    Problem { id: 35, title: "Search Insert Position", difficulty: Easy, category: "Binary Search" },
    Problem { id: 2, title: "Add Two Numbers", difficulty: Medium, category: "Linked List" },
    Problem { id: 3, title: "Longest Substring Without Repeating Characters", difficulty: Medium, category: "Sliding Window" },
    Problem { id: 5, title: "Longest Palindromic Substring", difficulty: Medium, category: "Dynamic Programming" },
    Problem { id: 11, title: "Container With Most Water", difficulty: Medium, category: "Two Pointers" },
    Problem { id: 15, title: "3Sum", difficulty: Medium, category: "Array" },
    Problem { id: 17, title: "Letter Combinations of a Phone Number", difficulty: Medium, category: "Backtracking" },
    Problem { id: 22, title: "Generate Parentheses", difficulty: Medium, category: "Backtracking" },
    Problem { id: 33, title: "Search in Rotated Sorted Array", difficulty: Medium, category: "Binary Search" },
    Problem { id: 39, title: "Combination Sum", difficulty: Medium, category: "Backtracking" },
    Problem { id: 46, title: "Permutations", difficulty: Medium, category: "Backtracking" },
    Problem { id: 4, title: "Median of Two Sorted Arrays", difficulty: Hard, category: "Binary Search" },
    Problem { id: 10, title: "Regular Expression Matching", difficulty: Hard, category: "Dynamic Programming" },
    Problem { id: 23, title: "Merge k Sorted Lists", difficulty: Hard, category: "Heap" },
    Problem { id: 25, title: "Reverse Nodes in k-Group", difficulty: Hard, category: "Linked List" },
    Problem { id: 30, title: "Substring with Concatenation of All Words", difficulty: Hard, category: "Sliding Window" },
    Problem { id: 32, title: "Longest Valid Parentheses", difficulty: Hard, category: "Dynamic Programming" },
    Problem { id: 37, title: "Sudoku Solver", difficulty: Hard, category: "Backtracking" },
    Problem { id: 41, title: "First Missing Positive", difficulty: Hard, category: "Array" },
    Problem { id: 42, title: "Trapping Rain Water", difficulty: Hard, category: "Two Pointers" },
    Problem { id: 44, title: "Wildcard Matching", difficulty: Hard, category: "Dynamic Programming" },
];

const LANGUAGES: &[(&str, &str)] = &[
    ("python", "py"),
    ("javascript", "js"),
    ("java", "java"),
    ("cpp", "cpp"),
];

/// Hand-written solution if we carry one for this title/language pair.
fn curated_solution(title: &str, language: &str) -> Option<&'static str> {
    match (title, language) {
        ("Two Sum", "python") => Some(
            "class Solution:\n    def twoSum(self, nums: List[int], target: int) -> List[int]:\n        \"\"\"\n        Hash Map approach for O(n) time complexity\n        \"\"\"\n        hashmap = {}\n        for i, num in enumerate(nums):\n            complement = target - num\n            if complement in hashmap:\n                return [hashmap[complement], i]\n            hashmap[num] = i\n        return []",
        ),
        ("Two Sum", "javascript") => Some(
            "/**\n * @param {number[]} nums\n * @param {number} target\n * @return {number[]}\n */\nvar twoSum = function(nums, target) {\n    const hashMap = new Map();\n\n    for (let i = 0; i < nums.length; i++) {\n        const complement = target - nums[i];\n\n        if (hashMap.has(complement)) {\n            return [hashMap.get(complement), i];\n        }\n\n        hashMap.set(nums[i], i);\n    }\n\n    return [];\n};",
        ),
        ("Two Sum", "java") => Some(
            "class Solution {\n    public int[] twoSum(int[] nums, int target) {\n        Map<Integer, Integer> hashMap = new HashMap<>();\n\n        for (int i = 0; i < nums.length; i++) {\n            int complement = target - nums[i];\n\n            if (hashMap.containsKey(complement)) {\n                return new int[] { hashMap.get(complement), i };\n            }\n\n            hashMap.put(nums[i], i);\n        }\n\n        return new int[] {};\n    }\n}",
        ),
        ("Palindrome Number", "python") => Some(
            "class Solution:\n    def isPalindrome(self, x: int) -> bool:\n        \"\"\"\n        Check if number is palindrome without converting to string\n        \"\"\"\n        if x < 0:\n            return False\n\n        original = x\n        reversed_num = 0\n\n        while x > 0:\n            reversed_num = reversed_num * 10 + x % 10\n            x //= 10\n\n        return original == reversed_num",
        ),
        ("Palindrome Number", "cpp") => Some(
            "class Solution {\npublic:\n    bool isPalindrome(int x) {\n        if (x < 0) return false;\n\n        long long original = x;\n        long long reversed = 0;\n\n        while (x > 0) {\n            reversed = reversed * 10 + x % 10;\n            x /= 10;\n        }\n\n        return original == reversed;\n    }\n};",
        ),
        ("Valid Parentheses", "python") => Some(
            "class Solution:\n    def isValid(self, s: str) -> bool:\n        \"\"\"\n        Stack-based approach for matching parentheses\n        \"\"\"\n        stack = []\n        mapping = {')': '(', '}': '{', ']': '['}\n\n        for char in s:\n            if char in mapping:\n                top = stack.pop() if stack else '#'\n                if mapping[char] != top:\n                    return False\n            else:\n                stack.append(char)\n\n        return not stack",
        ),
        ("Valid Parentheses", "java") => Some(
            "class Solution {\n    public boolean isValid(String s) {\n        Stack<Character> stack = new Stack<>();\n        Map<Character, Character> mapping = new HashMap<>();\n        mapping.put(')', '(');\n        mapping.put('}', '{');\n        mapping.put(']', '[');\n\n        for (char c : s.toCharArray()) {\n            if (mapping.containsKey(c)) {\n                char top = stack.isEmpty() ? '#' : stack.pop();\n                if (top != mapping.get(c)) {\n                    return false;\n                }\n            } else {\n                stack.push(c);\n            }\n        }\n\n        return stack.isEmpty();\n    }\n}",
        ),
        _ => None,
    }
}

fn template_solution(problem: &Problem, language: &str) -> String {
    let header = format!(
        "Problem: {}\n * Difficulty: {}\n * Category: {}",
        problem.title, problem.difficulty, problem.category
    );
    match language {
        "python" => format!(
            "class Solution:\n    def solve(self):\n        \"\"\"\n        Problem: {}\n        Difficulty: {}\n        Category: {}\n        \"\"\"\n        pass",
            problem.title, problem.difficulty, problem.category
        ),
        "javascript" => format!("/**\n * {header}\n */\nvar solve = function() {{\n}};"),
        "java" => format!("/**\n * {header}\n */\nclass Solution {{\n    public void solve() {{\n    }}\n}}"),
        "cpp" => format!("/**\n * {header}\n */\nclass Solution {{\npublic:\n    void solve() {{\n    }}\n}};"),
        _ => format!(
            "class Solution:\n    def solve(self):\n        \"\"\"\n        Problem: {}\n        \"\"\"\n        pass",
            problem.title
        ),
    }
}

/// Readme accompanying a solution file.
pub fn readme_for(problem: &Problem, extension: &str, solution: &str) -> String {
    format!(
        "# {id}. {title}\n\n\
         **Difficulty:** {difficulty}  \n\
         **Category:** {category}  \n\
         **Language:** {lang}  \n\n\
         ## Problem Description\n\n\
         LeetCode Problem #{id}: {title}\n\n\
         ## Solution\n\n\
         ```{extension}\n{solution}\n```\n\n\
         ## Complexity Analysis\n\n\
         - **Time Complexity:** O(n)\n\
         - **Space Complexity:** O(n)\n\n\
         ## Tags\n\n\
         - {category}\n\
         - {difficulty}\n\
         - LeetCode\n\
         - DSA\n",
        id = problem.id,
        title = problem.title,
        difficulty = problem.difficulty,
        category = problem.category,
        lang = extension.to_uppercase(),
        extension = extension,
    )
}

/// Generator that serves solutions from [`PROBLEMS`]. Infallible: every
/// (problem, language) pair resolves to a curated solution or a stub.
#[derive(Debug, Default, Clone, Copy)]
pub struct LeetCodeCatalogGenerator;

impl LeetCodeCatalogGenerator {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ContentGenerator for LeetCodeCatalogGenerator {
    async fn generate(&self, _language_hint: &str) -> Result<GeneratedFile, ContentError> {
        let (problem, language, extension) = {
            let mut rng = rand::rng();
            let problem = PROBLEMS.choose(&mut rng).ok_or(ContentError::Empty)?;
            let (language, extension) = LANGUAGES.choose(&mut rng).ok_or(ContentError::Empty)?;
            (problem, *language, *extension)
        };

        let solution = match curated_solution(problem.title, language) {
            Some(curated) => curated.to_string(),
            None => template_solution(problem, language),
        };
        let readme = readme_for(problem, extension, &solution);

        Ok(GeneratedFile::new(solution, extension).with_note(readme))
    }
}
