/// One full merge pass
///
/// discover modules -> ingest extraction, recorded and candidate files ->
/// replay the previous memory -> render -> replace the memory file.
///
/// Only filesystem failures abort the pass. Malformed lines, badly named
/// module directories and missing per-module files are collected as
/// [`Diagnostic`]s; the memory file is still written and the caller decides
/// what a non-empty list means.
use crate::backup::{replace_file, BackupError, WriteOutcome};
use crate::config::{ConfigError, MergeConfig};
use crate::diagnostics::Diagnostic;
use crate::encoding::read_text;
use crate::formats::record::parse_records;
use crate::locator::RepoLocator;
use crate::reconcile::{IngestSource, IngestStats, Reconciler};
use crate::replay::{replay_memory, ReplaySummary};
use crate::scanner::{ModuleDir, ModuleRegistry, ModuleScanner};
use crate::serializer::{render_memory, RenderStats};
use crate::store::TranslationStore;
use serde::Serialize;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MergeError {
    #[error("repository root not found: no ancestor contains a `{marker}` directory")]
    RootNotFound { marker: String },

    #[error("directory not found: {0}")]
    MissingDirectory(PathBuf),

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to write translation memory: {0}")]
    Write(#[from] BackupError),
}

impl MergeError {
    fn io(path: &Path, source: io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ModuleReport {
    pub id: String,
    pub name: String,
    pub current: Option<IngestStats>,
    pub recorded: Option<IngestStats>,
    pub candidate: Option<IngestStats>,
    pub diagnostics: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeReport {
    pub root: PathBuf,
    pub memory_path: PathBuf,
    pub modules: Vec<ModuleReport>,
    pub diagnostics: Vec<Diagnostic>,
    pub replay: ReplaySummary,
    pub rendered: RenderStats,
    pub written: Option<WriteOutcome>,
    /// The merged memory text
    #[serde(skip)]
    pub output: String,
}

impl MergeReport {
    pub fn error_count(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

/// Store and registry after ingestion, before replay
#[derive(Debug, Clone, Default)]
pub struct Ingested {
    pub store: TranslationStore,
    pub registry: ModuleRegistry,
    pub modules: Vec<ModuleReport>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Load the YAML config at `path`, or the defaults when there is none.
pub fn load_config(path: Option<&Path>) -> Result<MergeConfig, MergeError> {
    match path {
        Some(path) => Ok(MergeConfig::from_yaml_file(path)?),
        None => Ok(MergeConfig::default()),
    }
}

/// Resolve the repository root the way the CLI does.
pub fn resolve_root(config: &MergeConfig, explicit: Option<&Path>) -> Result<PathBuf, MergeError> {
    RepoLocator::new(&config.layout.root_marker)
        .discover(explicit)
        .ok_or_else(|| MergeError::RootNotFound {
            marker: config.layout.root_marker.clone(),
        })
}

#[derive(Debug, Clone)]
pub struct MergePipeline {
    root: PathBuf,
    config: MergeConfig,
    reconciler: Reconciler,
}

impl MergePipeline {
    pub fn new(root: impl Into<PathBuf>, config: MergeConfig) -> Self {
        let reconciler = Reconciler::new(config.memory.missing_original.clone());
        Self {
            root: root.into(),
            config,
            reconciler,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &MergeConfig {
        &self.config
    }

    /// Run the whole pass and write the memory file.
    pub fn run(&self) -> Result<MergeReport, MergeError> {
        self.execute(true)
    }

    /// Run the whole pass but leave the memory file untouched.
    pub fn dry_run(&self) -> Result<MergeReport, MergeError> {
        self.execute(false)
    }

    fn execute(&self, write: bool) -> Result<MergeReport, MergeError> {
        let Ingested {
            mut store,
            registry,
            modules,
            diagnostics,
        } = self.ingest()?;

        let memory_path = self.config.memory_path(&self.root);
        let previous = if memory_path.exists() {
            read_text(&memory_path).map_err(|err| MergeError::io(&memory_path, err))?
        } else {
            log::info!("{} does not exist yet, starting empty", memory_path.display());
            String::new()
        };

        let tags = &self.config.memory.tags;
        let replay = replay_memory(&mut store, &previous, tags);
        log::info!(
            "replayed previous memory: {} patches applied, {} stale records",
            replay.applied,
            replay.stale_records
        );

        let (output, rendered) = render_memory(&store, &registry, tags);
        log::info!(
            "rendered {} modules, {} entries ({} need attention)",
            rendered.modules,
            rendered.entries,
            rendered.pending
        );

        let written = if write {
            let outcome = replace_file(&memory_path, output.as_bytes(), self.config.memory.backup)?;
            log::info!("wrote {}", outcome.final_path.display());
            Some(outcome)
        } else {
            None
        };

        Ok(MergeReport {
            root: self.root.clone(),
            memory_path,
            modules,
            diagnostics,
            replay,
            rendered,
            written,
            output,
        })
    }

    /// Discovery plus the three ingestion passes for every module.
    pub fn ingest(&self) -> Result<Ingested, MergeError> {
        let output_dir = self.config.output_files_dir(&self.root);
        if !output_dir.is_dir() {
            return Err(MergeError::MissingDirectory(output_dir));
        }

        let scan = ModuleScanner::new()
            .scan(&output_dir)
            .map_err(|err| MergeError::io(&output_dir, err))?;
        log::info!("found {} module directories", scan.modules.len());

        let mut ingested = Ingested {
            registry: scan.registry(),
            diagnostics: scan.diagnostics,
            ..Ingested::default()
        };

        for module in &scan.modules {
            let report = self.ingest_module(module, &mut ingested.store, &mut ingested.diagnostics)?;
            ingested.modules.push(report);
        }
        log::info!(
            "ingested {} entries across {} modules",
            ingested.store.entry_count(),
            ingested.store.module_count()
        );

        Ok(ingested)
    }

    fn ingest_module(
        &self,
        module: &ModuleDir,
        store: &mut TranslationStore,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Result<ModuleReport, MergeError> {
        let layout = &self.config.layout;
        let before = diagnostics.len();

        let sources = [
            (IngestSource::Current, module.path.join(&layout.source_file)),
            (IngestSource::Recorded, module.path.join(&layout.recorded_file)),
            (
                IngestSource::Candidate,
                self.config.candidate_path(&self.root, &module.id),
            ),
        ];

        let mut report = ModuleReport {
            id: module.id.clone(),
            name: module.name.clone(),
            current: None,
            recorded: None,
            candidate: None,
            diagnostics: 0,
        };

        for (source, path) in sources {
            let stats = self.ingest_file(store, &module.id, source, &path, diagnostics)?;
            match source {
                IngestSource::Current => report.current = stats,
                IngestSource::Recorded => report.recorded = stats,
                IngestSource::Candidate => report.candidate = stats,
            }
        }

        report.diagnostics = diagnostics.len() - before;
        Ok(report)
    }

    /// A missing file is recorded and that step skipped.
    fn ingest_file(
        &self,
        store: &mut TranslationStore,
        module_id: &str,
        source: IngestSource,
        path: &Path,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Result<Option<IngestStats>, MergeError> {
        let display = path.display().to_string();
        if !path.is_file() {
            log::warn!("{}: missing file", display);
            diagnostics.push(Diagnostic::missing_file(display));
            return Ok(None);
        }

        let content = read_text(path).map_err(|err| MergeError::io(path, err))?;
        let parsed = parse_records(&content, &display);
        diagnostics.extend(parsed.diagnostics);

        Ok(Some(self.reconciler.ingest(
            store,
            module_id,
            source,
            &parsed.records,
        )))
    }
}
