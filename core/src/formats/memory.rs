/// Line grammar of the merged translation-memory file
///
/// ```text
/// ------ <moduleId> :: <moduleName> ------
/// // free comment
/// <moduleId>::EN::<key> = "<original>",
/// <moduleId>::CN::<key> = "<translation>",
/// ```
///
/// Entries that still need attention are written with a leading
/// [`INDENT_MARKER`]. The marker is accepted (and ignored) on read.
use super::{is_blank_or_comment, LanguageTags};
use once_cell::sync::Lazy;
use regex::Regex;

pub const INDENT_MARKER: &str = "\t\t";
pub const HEADER_PREFIX: &str = "------";

static MEMORY_RECORD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"^(?P<marker>\t\t)?(?P<module>[^:]+)::(?P<tag>[^:]+)::(?P<key>[^=]+)=\s*"(?P<text>.*)"\s*,?\S*"#,
    )
    .expect("valid memory record regex")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordSide {
    /// Source-language text (`EN`)
    Original,
    /// Target-language text (`CN`)
    Translation,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryRecord {
    pub module_id: String,
    pub side: RecordSide,
    pub key: String,
    pub text: String,
    /// Whether the line carried the needs-attention marker
    pub marked: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemoryLine {
    Blank,
    Header,
    /// Comment text with any needs-attention marker removed
    Comment(String),
    Record(MemoryRecord),
    /// Anything else; ignored on replay
    Unrecognized,
}

/// Classify one line of the memory file.
pub fn classify_line(line: &str, tags: &LanguageTags) -> MemoryLine {
    if line.trim().is_empty() {
        return MemoryLine::Blank;
    }
    if line.starts_with(HEADER_PREFIX) {
        return MemoryLine::Header;
    }
    if is_blank_or_comment(line) {
        let comment = line.strip_prefix(INDENT_MARKER).unwrap_or(line);
        return MemoryLine::Comment(comment.to_string());
    }

    match parse_memory_record(line, tags) {
        Some(record) => MemoryLine::Record(record),
        None => MemoryLine::Unrecognized,
    }
}

/// Parse a module-qualified record line.
pub fn parse_memory_record(line: &str, tags: &LanguageTags) -> Option<MemoryRecord> {
    let caps = MEMORY_RECORD.captures(line)?;
    let tag = caps.name("tag")?.as_str().trim();
    let side = if tag == tags.source {
        RecordSide::Original
    } else if tag == tags.target {
        RecordSide::Translation
    } else {
        return None;
    };

    Some(MemoryRecord {
        module_id: caps.name("module")?.as_str().trim().to_string(),
        side,
        key: caps.name("key")?.as_str().trim().to_string(),
        text: caps.name("text")?.as_str().to_string(),
        marked: caps.name("marker").is_some(),
    })
}

pub fn render_header(module_id: &str, module_name: &str) -> String {
    format!("{HEADER_PREFIX} {module_id} :: {module_name} {HEADER_PREFIX}")
}

pub fn render_record(module_id: &str, tag: &str, key: &str, text: &str) -> String {
    format!("{module_id}::{tag}::{key} = \"{text}\",")
}
