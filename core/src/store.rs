/// In-memory translation memory: module id -> (key -> [`Entry`])
///
/// Both levels keep insertion order so the rewritten file is stable
/// between runs. Entry updates are pure: they consume an entry and return
/// the updated one, and the store swaps it in place.
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Placeholder original text for keys never seen in the current extraction
pub const DEFAULT_MISSING_ORIGINAL: &str = "======Original Text Missing====";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    pub original_text: String,
    pub translated_text: String,
    pub is_translated: bool,
    pub comments: Vec<String>,
}

impl Entry {
    /// Freshly observed source text, nothing translated yet.
    pub fn from_original(original: impl Into<String>) -> Self {
        Self {
            original_text: original.into(),
            ..Self::default()
        }
    }

    /// Known translation for a key the extraction never produced.
    pub fn orphan(
        missing_marker: &str,
        translation: impl Into<String>,
        is_translated: bool,
    ) -> Self {
        Self {
            original_text: missing_marker.to_string(),
            translated_text: translation.into(),
            is_translated,
            comments: Vec::new(),
        }
    }

    pub fn with_translation(self, translation: impl Into<String>, is_translated: bool) -> Self {
        Self {
            translated_text: translation.into(),
            is_translated,
            ..self
        }
    }

    pub fn with_comments(mut self, comments: Vec<String>) -> Self {
        self.comments.extend(comments);
        self
    }

    /// Compare the original text recorded in the previous memory file with
    /// the current one. Equal means the recorded translation still applies.
    pub fn confirm_original(self, recorded: &str) -> Self {
        if self.original_text == recorded {
            return Self {
                is_translated: true,
                ..self
            };
        }

        let original_text = if self.original_text.is_empty() {
            recorded.to_string()
        } else {
            self.original_text
        };
        Self {
            original_text,
            is_translated: false,
            ..self
        }
    }
}

pub type ModuleEntries = IndexMap<String, Entry>;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranslationStore {
    modules: IndexMap<String, ModuleEntries>,
}

impl TranslationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace a module's entries wholesale.
    pub fn set_module(&mut self, module_id: &str, entries: ModuleEntries) {
        self.modules.insert(module_id.to_string(), entries);
    }

    pub fn module_mut(&mut self, module_id: &str) -> &mut ModuleEntries {
        self.modules.entry(module_id.to_string()).or_default()
    }

    pub fn module(&self, module_id: &str) -> Option<&ModuleEntries> {
        self.modules.get(module_id)
    }

    pub fn get(&self, module_id: &str, key: &str) -> Option<&Entry> {
        self.modules.get(module_id)?.get(key)
    }

    pub fn contains(&self, module_id: &str, key: &str) -> bool {
        self.get(module_id, key).is_some()
    }

    /// Replace the entry at (module, key) with `update(entry)`.
    /// Returns false when there is no such entry.
    pub fn update<F>(&mut self, module_id: &str, key: &str, update: F) -> bool
    where
        F: FnOnce(Entry) -> Entry,
    {
        let Some(slot) = self
            .modules
            .get_mut(module_id)
            .and_then(|entries| entries.get_mut(key))
        else {
            return false;
        };
        let current = std::mem::take(slot);
        *slot = update(current);
        true
    }

    pub fn modules(&self) -> impl Iterator<Item = (&String, &ModuleEntries)> {
        self.modules.iter()
    }

    pub fn module_count(&self) -> usize {
        self.modules.len()
    }

    pub fn entry_count(&self) -> usize {
        self.modules.values().map(IndexMap::len).sum()
    }
}
