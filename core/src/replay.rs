/// Replay of the previous memory file onto a freshly ingested store
///
/// The previous file is the only place comments and hand-edited
/// translations live, and the only record of which original text a
/// translation was made against. Replay walks it once and produces
/// [`ReplayPatch`]es keyed by (module, key); applying them is a separate
/// step so planning never mutates the store it reads.
use crate::formats::memory::{classify_line, MemoryLine, MemoryRecord, RecordSide};
use crate::formats::LanguageTags;
use crate::store::{Entry, TranslationStore};
use serde::Serialize;

/// Comment lines waiting for the next surviving entry
///
/// Blank and header lines neither add to nor clear the buffer. Records for
/// keys that no longer exist leave it untouched, so their comments move on
/// to the next entry that does.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommentBuffer {
    pending: Vec<String>,
}

impl CommentBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, comment: impl Into<String>) {
        self.pending.push(comment.into());
    }

    /// Hand over everything buffered and go back to idle.
    pub fn flush(&mut self) -> Vec<String> {
        std::mem::take(&mut self.pending)
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatchAction {
    /// Previous run recorded this original text for the key
    ConfirmOriginal { recorded: String },
    /// Previous run recorded this translation for the key
    RestoreTranslation { text: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplayPatch {
    pub module_id: String,
    pub key: String,
    pub comments: Vec<String>,
    pub action: PatchAction,
}

impl ReplayPatch {
    pub fn apply_to(self, entry: Entry) -> Entry {
        let entry = entry.with_comments(self.comments);
        match self.action {
            PatchAction::ConfirmOriginal { recorded } => entry.confirm_original(&recorded),
            PatchAction::RestoreTranslation { text } => {
                let is_translated = entry.is_translated;
                entry.with_translation(text, is_translated)
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplayPlan {
    pub patches: Vec<ReplayPatch>,
    /// Records whose key is gone from the fresh store
    pub stale_records: usize,
    pub unrecognized_lines: usize,
    /// Comments with no entry after them
    pub trailing_comments: Vec<String>,
}

/// Walk the previous memory file and plan the patches for `store`.
pub fn plan_replay(previous: &str, store: &TranslationStore, tags: &LanguageTags) -> ReplayPlan {
    let mut plan = ReplayPlan::default();
    let mut comments = CommentBuffer::new();

    for (index, line) in previous.lines().enumerate() {
        match classify_line(line, tags) {
            MemoryLine::Blank | MemoryLine::Header => {}
            MemoryLine::Comment(comment) => comments.push(comment),
            MemoryLine::Record(record) => {
                if !store.contains(&record.module_id, &record.key) {
                    plan.stale_records += 1;
                    continue;
                }
                plan.patches.push(patch_for(record, comments.flush()));
            }
            MemoryLine::Unrecognized => {
                log::debug!("memory line {} ignored: {}", index + 1, line);
                plan.unrecognized_lines += 1;
            }
        }
    }

    plan.trailing_comments = comments.flush();
    plan
}

fn patch_for(record: MemoryRecord, comments: Vec<String>) -> ReplayPatch {
    let action = match record.side {
        RecordSide::Original => PatchAction::ConfirmOriginal {
            recorded: record.text,
        },
        RecordSide::Translation => PatchAction::RestoreTranslation { text: record.text },
    };
    ReplayPatch {
        module_id: record.module_id,
        key: record.key,
        comments,
        action,
    }
}

/// Apply planned patches in order. Returns how many landed.
pub fn apply_patches(store: &mut TranslationStore, patches: Vec<ReplayPatch>) -> usize {
    let mut applied = 0;
    for patch in patches {
        let module_id = patch.module_id.clone();
        let key = patch.key.clone();
        if store.update(&module_id, &key, |entry| patch.apply_to(entry)) {
            applied += 1;
        }
    }
    applied
}

#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ReplaySummary {
    pub applied: usize,
    pub stale_records: usize,
    pub unrecognized_lines: usize,
    pub dropped_comments: usize,
}

/// Plan and apply in one go.
pub fn replay_memory(
    store: &mut TranslationStore,
    previous: &str,
    tags: &LanguageTags,
) -> ReplaySummary {
    let plan = plan_replay(previous, store, tags);
    if !plan.trailing_comments.is_empty() {
        log::debug!(
            "{} trailing comment line(s) in memory file have no entry to attach to",
            plan.trailing_comments.len()
        );
    }
    ReplaySummary {
        stale_records: plan.stale_records,
        unrecognized_lines: plan.unrecognized_lines,
        dropped_comments: plan.trailing_comments.len(),
        applied: apply_patches(store, plan.patches),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reconcile::{IngestSource, Reconciler};
    use indexmap::IndexMap;

    fn store_with(module: &str, pairs: &[(&str, &str)]) -> TranslationStore {
        let mut store = TranslationStore::new();
        let records: IndexMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Reconciler::default().ingest(&mut store, module, IngestSource::Current, &records);
        store
    }

    #[test]
    fn comment_buffer_flush_empties() {
        let mut buffer = CommentBuffer::new();
        buffer.push("// a");
        buffer.push("// b");
        assert_eq!(buffer.len(), 2);
        assert_eq!(buffer.flush(), vec!["// a", "// b"]);
        assert!(buffer.is_empty());
        assert!(buffer.flush().is_empty());
    }

    #[test]
    fn unchanged_original_confirms_translation() {
        let mut store = store_with("k1", &[("k1", "Hello")]);
        let previous = "k1::EN::k1 = \"Hello\",\nk1::CN::k1 = \"你好\",\n";

        let summary = replay_memory(&mut store, previous, &LanguageTags::default());

        assert_eq!(summary.applied, 2);
        let entry = store.get("k1", "k1").unwrap();
        assert_eq!(entry.original_text, "Hello");
        assert_eq!(entry.translated_text, "你好");
        assert!(entry.is_translated);
    }

    #[test]
    fn changed_original_needs_retranslation() {
        let mut store = store_with("1", &[("k", "Hello world")]);
        let previous = "1::EN::k = \"Hello\",\n1::CN::k = \"你好\",\n";

        replay_memory(&mut store, previous, &LanguageTags::default());

        let entry = store.get("1", "k").unwrap();
        assert_eq!(entry.original_text, "Hello world");
        assert_eq!(entry.translated_text, "你好");
        assert!(!entry.is_translated);
    }

    #[test]
    fn comments_attach_to_following_entry() {
        let mut store = store_with("1", &[("a", "A"), ("b", "B")]);
        let previous = "\n------ 1 :: Mod ------\n\n// about a\n1::EN::a = \"A\",\n1::CN::a = \"甲\",\n\t\t# about b\n\t\t-- more\n\t\t1::EN::b = \"B\",\n\t\t1::CN::b = \"乙\",\n";

        replay_memory(&mut store, previous, &LanguageTags::default());

        assert_eq!(store.get("1", "a").unwrap().comments, vec!["// about a"]);
        assert_eq!(store.get("1", "b").unwrap().comments, vec!["# about b", "-- more"]);
    }

    #[test]
    fn comments_of_removed_keys_carry_forward() {
        let mut store = store_with("1", &[("kept", "K")]);
        let previous = "// for gone\n1::EN::gone = \"G\",\n1::CN::gone = \"去\",\n1::EN::kept = \"K\",\n";

        let summary = replay_memory(&mut store, previous, &LanguageTags::default());

        assert_eq!(summary.stale_records, 2);
        assert_eq!(store.get("1", "kept").unwrap().comments, vec!["// for gone"]);
    }

    #[test]
    fn target_record_flushes_comments_too() {
        let mut store = store_with("1", &[("a", "A")]);
        let previous = "1::EN::a = \"A\",\n// between\n1::CN::a = \"甲\",\n";

        replay_memory(&mut store, previous, &LanguageTags::default());

        assert_eq!(store.get("1", "a").unwrap().comments, vec!["// between"]);
    }

    #[test]
    fn indented_target_record_uses_its_own_key() {
        let mut store = store_with("1", &[("a", "A"), ("b", "B")]);
        let previous = "\t\t1::CN::b = \"乙\",\n";

        replay_memory(&mut store, previous, &LanguageTags::default());

        assert_eq!(store.get("1", "b").unwrap().translated_text, "乙");
        assert_eq!(store.get("1", "a").unwrap().translated_text, "");
    }

    #[test]
    fn unknown_modules_and_garbage_are_ignored() {
        let mut store = store_with("1", &[("a", "A")]);
        let previous = "9::EN::a = \"A\",\nnot a record at all\n// dangling\n";

        let summary = replay_memory(&mut store, previous, &LanguageTags::default());

        assert_eq!(summary.applied, 0);
        assert_eq!(summary.stale_records, 1);
        assert_eq!(summary.unrecognized_lines, 1);
        assert_eq!(summary.dropped_comments, 1);
        assert!(!store.get("1", "a").unwrap().is_translated);
    }

    #[test]
    fn planning_does_not_touch_the_store() {
        let store = store_with("1", &[("a", "A")]);
        let before = store.clone();
        let plan = plan_replay("1::EN::a = \"A\",\n", &store, &LanguageTags::default());

        assert_eq!(plan.patches.len(), 1);
        assert_eq!(store, before);
    }
}
