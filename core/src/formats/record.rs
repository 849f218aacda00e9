/// Plain `key = "text",` translation tables
///
/// This is the shape of the per-module extraction files (`EN_output.txt`,
/// `CN_output.txt`, `en_completed.txt`). Lua-style string concatenation
/// (`"first" ..` followed by `"second"`) is folded into one logical line
/// before matching.
use super::is_blank_or_comment;
use crate::diagnostics::Diagnostic;
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;

static CONTINUATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#""\s*\.\.\s*""#).expect("valid continuation regex"));

static RECORD_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^(?P<key>[^=]+)=\s*"(?P<text>.*)"\s*,?\S*"#).expect("valid record line regex")
});

/// Result of parsing one record file
#[derive(Debug, Clone, Default)]
pub struct ParsedRecords {
    /// key -> raw text, in first-seen order
    pub records: IndexMap<String, String>,
    pub diagnostics: Vec<Diagnostic>,
}

impl ParsedRecords {
    pub fn error_count(&self) -> usize {
        self.diagnostics.len()
    }
}

/// Parse a single line. `None` when the line does not match the grammar.
pub fn parse_record_line(line: &str) -> Option<(String, String)> {
    let caps = RECORD_LINE.captures(line)?;
    let key = caps.name("key")?.as_str().trim().to_string();
    let text = caps.name("text")?.as_str().to_string();
    Some((key, text))
}

/// Parse a record file. `source_name` is only used in diagnostics.
pub fn parse_records(content: &str, source_name: &str) -> ParsedRecords {
    let mut parsed = ParsedRecords::default();

    for (line_number, line) in logical_lines(content) {
        if is_blank_or_comment(&line) {
            continue;
        }

        match parse_record_line(&line) {
            Some((key, text)) => {
                parsed.records.insert(key, text);
            }
            None => {
                log::warn!("{}:{}: format error: {}", source_name, line_number, line);
                parsed
                    .diagnostics
                    .push(Diagnostic::format_error(source_name, line_number, &line));
            }
        }
    }

    parsed
}

/// Collapse continuation markers and split into lines, keeping the physical
/// line number each logical line starts on.
pub fn logical_lines(content: &str) -> Vec<(usize, String)> {
    let mut splitter = LineSplitter::default();
    let mut cursor = 0;

    for m in CONTINUATION.find_iter(content) {
        splitter.push_str(&content[cursor..m.start()]);
        splitter.skip(m.as_str());
        cursor = m.end();
    }
    splitter.push_str(&content[cursor..]);

    splitter.finish()
}

struct LineSplitter {
    lines: Vec<(usize, String)>,
    current: String,
    start_line: usize,
    physical_line: usize,
}

impl Default for LineSplitter {
    fn default() -> Self {
        Self {
            lines: Vec::new(),
            current: String::new(),
            start_line: 1,
            physical_line: 1,
        }
    }
}

impl LineSplitter {
    fn push_str(&mut self, text: &str) {
        for ch in text.chars() {
            if ch == '\n' {
                let line = std::mem::take(&mut self.current);
                self.lines.push((self.start_line, line));
                self.physical_line += 1;
                self.start_line = self.physical_line;
            } else if ch != '\r' {
                self.current.push(ch);
            }
        }
    }

    /// Consume removed text; only its line breaks advance the counter.
    fn skip(&mut self, removed: &str) {
        self.physical_line += removed.matches('\n').count();
    }

    fn finish(mut self) -> Vec<(usize, String)> {
        if !self.current.is_empty() {
            self.lines.push((self.start_line, self.current));
        }
        self.lines
    }
}
