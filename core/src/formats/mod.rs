/// Text formats read and written by the merge
/// - `record`: plain `key = "text",` tables produced by the extractor
/// - `memory`: the module-qualified translation-memory file
pub mod memory;
pub mod record;

use serde::{Deserialize, Serialize};

/// Prefixes that mark a line as a comment in every format
pub const COMMENT_PREFIXES: [&str; 6] = ["//", "#", "/*", "*", "*/", "--"];

/// Blank, whitespace-only, or starting (after indentation) with a comment prefix.
pub fn is_blank_or_comment(line: &str) -> bool {
    let trimmed = line.trim_start();
    trimmed.is_empty() || COMMENT_PREFIXES.iter().any(|prefix| trimmed.starts_with(prefix))
}

/// Language tags used in module-qualified memory records
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct LanguageTags {
    pub source: String,
    pub target: String,
}

impl Default for LanguageTags {
    fn default() -> Self {
        Self {
            source: "EN".to_string(),
            target: "CN".to_string(),
        }
    }
}
