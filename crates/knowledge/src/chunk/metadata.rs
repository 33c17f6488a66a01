//! Metadata enrichment utilities.
//!
//! Tag, priority and category heuristics are plain keyword tables evaluated by
//! [`contains_any`], so every rule can be audited and tested on its own.

use sha2::{Digest, Sha256};
use std::path::Path;

use super::{Category, Priority};

/// Tag label → keywords. A single keyword hit is enough to attach the tag.
pub const TAG_KEYWORDS: &[(&str, &[&str])] = &[
    (
        "backend",
        &["api", "endpoint", "server", "route", "controller", "nestjs", "express"],
    ),
    (
        "frontend",
        &[
            "ui", "component", "jsx", "tsx", "css", "tailwind", "shadcn", "react", "next.js",
            "nextjs",
        ],
    ),
    (
        "api",
        &[
            "rest", "fetch", "axios", "http", "crud", "get", "post", "put", "delete", "endpoint",
        ],
    ),
    (
        "auth",
        &[
            "nextauth", "login", "session", "token", "jwt", "middleware", "auth", "password",
        ],
    ),
    (
        "database",
        &["mongodb", "mongoose", "schema", "collection", "query", "index", "atlas"],
    ),
    (
        "debugging",
        &["debug", "trace", "error", "fix", "bug", "troubleshoot", "log", "issue"],
    ),
    (
        "mvvm",
        &["mvvm", "viewmodel", "model", "view", "presentation", "separation"],
    ),
    (
        "redux",
        &["redux", "slice", "store", "dispatch", "action", "reducer", "toolkit"],
    ),
    (
        "testing",
        &["test", "lint", "build", "verify", "validate", "jest", "vitest"],
    ),
    (
        "security",
        &[
            "security", "pci", "encryption", "xss", "csrf", "cors", "sanitize", "rate limit",
        ],
    ),
    ("admin", &["admin", "dashboard", "sidebar", "table", "manage"]),
    (
        "booking",
        &["booking", "event", "reservation", "schedule", "calendar"],
    ),
    (
        "performance",
        &[
            "performance",
            "lazy",
            "dynamic import",
            "optimization",
            "cache",
            "ssr",
            "server component",
        ],
    ),
    (
        "ui_ux",
        &[
            "glassmorphism",
            "animation",
            "framer",
            "hover",
            "micro-interaction",
            "responsive",
            "premium",
        ],
    ),
    (
        "structure",
        &[
            "folder",
            "directory",
            "structure",
            "organization",
            "architecture",
            "project-structure",
        ],
    ),
    (
        "scalability",
        &["scalability", "scale", "growth", "modular", "barrel", "dry", "3-use"],
    ),
];

/// Checked first; any hit makes the chunk `critical`.
pub const CRITICAL_KEYWORDS: &[&str] = &["critical", "hard rule", "must", "mandatory"];

/// Checked only when no critical keyword matched.
pub const HIGH_KEYWORDS: &[&str] = &["important", "required", "should"];

/// Top-level folder → category. Anything else is `memory`.
pub const CATEGORY_FOLDERS: &[(&str, Category)] = &[
    ("rules", Category::Rule),
    ("workflows", Category::Workflow),
    ("template", Category::Template),
    ("templates", Category::Template),
];

/// True when `haystack` contains at least one of `keywords` (substring match).
///
/// `haystack` is expected to be lower-cased already.
pub fn contains_any(haystack: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|kw| haystack.contains(kw))
}

/// Category from the first component of a knowledge-base relative path.
pub fn detect_category(relative_path: &Path) -> Category {
    let top = relative_path
        .components()
        .next()
        .and_then(|c| c.as_os_str().to_str())
        .unwrap_or("");

    // A bare file at the root has no folder
    if relative_path.components().count() < 2 {
        return Category::Memory;
    }

    CATEGORY_FOLDERS
        .iter()
        .find(|(folder, _)| *folder == top)
        .map(|(_, category)| *category)
        .unwrap_or(Category::Memory)
}

/// Tags in table order, each at most once.
pub fn detect_tags(content: &str) -> Vec<String> {
    let lower = content.to_lowercase();
    TAG_KEYWORDS
        .iter()
        .filter(|(_, keywords)| contains_any(&lower, keywords))
        .map(|(tag, _)| tag.to_string())
        .collect()
}

pub fn detect_priority(content: &str, category: Category) -> Priority {
    let lower = content.to_lowercase();
    if contains_any(&lower, CRITICAL_KEYWORDS) {
        Priority::Critical
    } else if contains_any(&lower, HIGH_KEYWORDS) {
        Priority::High
    } else if category == Category::Template {
        Priority::Medium
    } else {
        Priority::Normal
    }
}

/// Calculate SHA-256 hash of text.
pub fn calculate_hash(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_calculate_hash() {
        let text = "Hello, world!";
        let hash = calculate_hash(text);
        assert_eq!(hash.len(), 64); // SHA-256 produces 64 hex chars
        assert_eq!(hash, calculate_hash(text));
        assert_ne!(hash, calculate_hash("Different text"));
    }

    #[test]
    fn test_detect_category() {
        assert_eq!(detect_category(Path::new("rules/a.md")), Category::Rule);
        assert_eq!(
            detect_category(Path::new("workflows/deep/flow.md")),
            Category::Workflow
        );
        assert_eq!(
            detect_category(Path::new("template/page.md")),
            Category::Template
        );
        assert_eq!(
            detect_category(Path::new("templates/page.md")),
            Category::Template
        );
        assert_eq!(
            detect_category(Path::new("npm-packages/admin-ui-1.md")),
            Category::Memory
        );
        assert_eq!(detect_category(Path::new("rules.md")), Category::Memory);
    }

    #[test]
    fn test_detect_tags_dedup_and_order() {
        let tags = detect_tags("Fix the BUG in the Redux slice, then debug the error log");
        assert_eq!(tags, vec!["debugging".to_string(), "redux".to_string()]);
    }

    #[test]
    fn test_detect_tags_none() {
        assert!(detect_tags("plain words only here").is_empty());
    }

    #[test]
    fn test_priority_order() {
        // Critical keywords dominate over high-priority ones
        assert_eq!(
            detect_priority("You should do this. It is MANDATORY.", Category::Rule),
            Priority::Critical
        );
        assert_eq!(
            detect_priority("This is important", Category::Template),
            Priority::High
        );
        assert_eq!(
            detect_priority("Copy this layout", Category::Template),
            Priority::Medium
        );
        assert_eq!(
            detect_priority("Copy this layout", Category::Memory),
            Priority::Normal
        );
    }

    #[test]
    fn test_contains_any() {
        assert!(contains_any("a hard rule applies", CRITICAL_KEYWORDS));
        assert!(!contains_any("nothing here", CRITICAL_KEYWORDS));
        assert!(!contains_any("anything", &[]));
    }
}
