/// Ingestion passes that build a fresh [`TranslationStore`]
///
/// Per module the passes run in a fixed order: current extraction, then the
/// previously recorded translation, then vetted candidates. Only the
/// candidate pass can promote an entry to translated; a recorded
/// translation stays provisional until the memory replay confirms it
/// against the original text.
use crate::store::{Entry, ModuleEntries, TranslationStore, DEFAULT_MISSING_ORIGINAL};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum IngestSource {
    /// Live source-language extraction (`EN_output.txt`)
    Current,
    /// Translation extracted in the previous cycle (`CN_output.txt`)
    Recorded,
    /// Externally vetted translations (`en_completed.txt`)
    Candidate,
}

impl IngestSource {
    /// Status given to entries this source touches.
    fn confirms(self) -> bool {
        matches!(self, Self::Candidate)
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct IngestStats {
    pub updated: usize,
    pub created: usize,
}

#[derive(Debug, Clone)]
pub struct Reconciler {
    missing_original: String,
}

impl Default for Reconciler {
    fn default() -> Self {
        Self::new(DEFAULT_MISSING_ORIGINAL)
    }
}

impl Reconciler {
    pub fn new(missing_original: impl Into<String>) -> Self {
        Self {
            missing_original: missing_original.into(),
        }
    }

    /// Apply one source's records to a module.
    pub fn ingest(
        &self,
        store: &mut TranslationStore,
        module_id: &str,
        source: IngestSource,
        records: &IndexMap<String, String>,
    ) -> IngestStats {
        match source {
            IngestSource::Current => self.ingest_current(store, module_id, records),
            IngestSource::Recorded | IngestSource::Candidate => {
                self.ingest_translations(store, module_id, source, records)
            }
        }
    }

    /// The module is rebuilt from the extraction alone.
    fn ingest_current(
        &self,
        store: &mut TranslationStore,
        module_id: &str,
        records: &IndexMap<String, String>,
    ) -> IngestStats {
        let entries: ModuleEntries = records
            .iter()
            .map(|(key, text)| (key.clone(), Entry::from_original(text.clone())))
            .collect();
        let stats = IngestStats {
            updated: 0,
            created: entries.len(),
        };
        store.set_module(module_id, entries);
        stats
    }

    fn ingest_translations(
        &self,
        store: &mut TranslationStore,
        module_id: &str,
        source: IngestSource,
        records: &IndexMap<String, String>,
    ) -> IngestStats {
        let confirmed = source.confirms();
        let mut stats = IngestStats::default();
        let entries = store.module_mut(module_id);

        for (key, text) in records {
            match entries.get_mut(key) {
                Some(slot) => {
                    let current = std::mem::take(slot);
                    *slot = current.with_translation(text.clone(), confirmed);
                    stats.updated += 1;
                }
                None => {
                    entries.insert(
                        key.clone(),
                        Entry::orphan(&self.missing_original, text.clone(), confirmed),
                    );
                    stats.created += 1;
                }
            }
        }

        log::debug!(
            "module {}: {:?} pass updated {} and created {} entries",
            module_id,
            source,
            stats.updated,
            stats.created
        );
        stats
    }
}
