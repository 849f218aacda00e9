/// Rendering of the store back into the translation-memory file
use crate::formats::memory::{render_header, render_record, INDENT_MARKER};
use crate::formats::LanguageTags;
use crate::scanner::ModuleRegistry;
use crate::store::{Entry, TranslationStore};
use serde::Serialize;

#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RenderStats {
    pub modules: usize,
    pub skipped_modules: usize,
    pub entries: usize,
    pub pending: usize,
}

/// Render the whole memory file.
///
/// Modules without a registry name are left out. Every line of an entry
/// that still needs attention is prefixed with [`INDENT_MARKER`]; the
/// marker is derived from `is_translated` on every write.
pub fn render_memory(
    store: &TranslationStore,
    registry: &ModuleRegistry,
    tags: &LanguageTags,
) -> (String, RenderStats) {
    let mut out = String::new();
    let mut stats = RenderStats::default();

    for (module_id, entries) in store.modules() {
        let Some(module_name) = registry.name_of(module_id) else {
            log::debug!("module {} has no registered name, not written", module_id);
            stats.skipped_modules += 1;
            continue;
        };
        stats.modules += 1;

        out.push('\n');
        out.push_str(&render_header(module_id, module_name));
        out.push_str("\n\n");

        for (key, entry) in entries {
            render_entry(&mut out, module_id, key, entry, tags);
            stats.entries += 1;
            if !entry.is_translated {
                stats.pending += 1;
            }
        }

        out.push('\n');
    }

    (out, stats)
}

fn render_entry(out: &mut String, module_id: &str, key: &str, entry: &Entry, tags: &LanguageTags) {
    let prefix = if entry.is_translated { "" } else { INDENT_MARKER };

    for comment in &entry.comments {
        push_line(out, prefix, comment);
    }
    push_line(
        out,
        prefix,
        &render_record(module_id, &tags.source, key, &entry.original_text),
    );
    push_line(
        out,
        prefix,
        &render_record(module_id, &tags.target, key, &entry.translated_text),
    );
}

fn push_line(out: &mut String, prefix: &str, line: &str) {
    out.push_str(prefix);
    out.push_str(line);
    out.push('\n');
}
