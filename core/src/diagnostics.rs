/// Recoverable problems found during a merge pass
///
/// None of these stop the pass. They are collected, logged, and decide the
/// exit status once the memory file has been written.
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// A line matched neither the record grammar nor a comment/blank line
    Format,
    /// An expected per-module input file does not exist
    MissingCompanionFile,
    /// A module directory name lacks the `<name>_<id>` separator
    MalformedModuleDir,
}

impl DiagnosticKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Format => "Format Error",
            Self::MissingCompanionFile => "Missing file",
            Self::MalformedModuleDir => "Wrong directory format",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub file: String,
    /// 1-based physical line, when the problem is tied to one
    pub line: Option<usize>,
    pub message: String,
}

impl Diagnostic {
    pub fn format_error(file: impl Into<String>, line: usize, content: &str) -> Self {
        Self {
            kind: DiagnosticKind::Format,
            file: file.into(),
            line: Some(line),
            message: content.to_string(),
        }
    }

    pub fn missing_file(file: impl Into<String>) -> Self {
        Self {
            kind: DiagnosticKind::MissingCompanionFile,
            file: file.into(),
            line: None,
            message: String::new(),
        }
    }

    pub fn malformed_module_dir(dir_name: impl Into<String>) -> Self {
        Self {
            kind: DiagnosticKind::MalformedModuleDir,
            file: dir_name.into(),
            line: None,
            message: String::new(),
        }
    }

    /// Render as a GitHub Actions workflow command so CI marks the location.
    pub fn to_annotation(&self) -> String {
        let location = match self.line {
            Some(line) => format!("file={},line={}", self.file, line),
            None => format!("file={}", self.file),
        };
        if self.message.is_empty() {
            format!("::error {}::{}", location, self.kind.label())
        } else {
            format!("::error {}::{}: {}", location, self.kind.label(), self.message)
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line {
            Some(line) => write!(f, "{}:{}: {}", self.file, line, self.kind.label())?,
            None => write!(f, "{}: {}", self.file, self.kind.label())?,
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        Ok(())
    }
}
