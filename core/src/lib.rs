pub mod backup;
pub mod config;
pub mod diagnostics;
pub mod encoding;
pub mod formats;
pub mod locator;
pub mod pipeline;
pub mod reconcile;
pub mod replay;
pub mod scanner;
pub mod serializer;
pub mod store;


pub use backup::{replace_file, BackupError, WriteOutcome};
pub use config::{ConfigError, LayoutOptions, MemoryOptions, MergeConfig};
pub use diagnostics::{Diagnostic, DiagnosticKind};
pub use formats::LanguageTags;
pub use locator::{RepoLocator, ROOT_ENV_VAR};
pub use pipeline::{load_config, resolve_root, MergeError, MergePipeline, MergeReport, ModuleReport};
pub use reconcile::{IngestSource, IngestStats, Reconciler};
pub use replay::{replay_memory, CommentBuffer, ReplayPatch, ReplaySummary};
pub use scanner::{ModuleDir, ModuleRegistry, ModuleScanner};
pub use serializer::{render_memory, RenderStats};
pub use store::{Entry, TranslationStore, DEFAULT_MISSING_ORIGINAL};
