/// Repository root discovery
///
/// The merge is usually run from a build output directory somewhere below
/// the repository, so the root is found by walking upward until a
/// directory containing the marker directory shows up.
use std::env;
use std::path::{Path, PathBuf};

/// Environment variable that short-circuits discovery
pub const ROOT_ENV_VAR: &str = "TM_MERGE_ROOT";

#[derive(Debug, Clone)]
pub struct RepoLocator {
    marker: String,
}

impl RepoLocator {
    pub fn new(marker: impl Into<String>) -> Self {
        Self {
            marker: marker.into(),
        }
    }

    /// Explicit path, then `TM_MERGE_ROOT`, then the executable's
    /// ancestors, then the working directory's ancestors.
    pub fn discover(&self, explicit: Option<&Path>) -> Option<PathBuf> {
        if let Some(path) = explicit {
            return Some(canonical(path));
        }

        if let Some(path) = self.env_override() {
            return Some(path);
        }

        if let Some(found) = env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(Path::to_path_buf))
            .and_then(|dir| self.search_upward(&dir))
        {
            log::debug!("repository root found from executable: {}", found.display());
            return Some(found);
        }

        let cwd = env::current_dir().ok()?;
        log::debug!("searching for repository root from {}", cwd.display());
        self.search_upward(&cwd)
    }

    fn env_override(&self) -> Option<PathBuf> {
        env::var_os(ROOT_ENV_VAR)
            .filter(|value| !value.is_empty())
            .map(|value| canonical(Path::new(&value)))
    }

    /// First ancestor of `start` (inclusive) that contains the marker directory.
    pub fn search_upward(&self, start: &Path) -> Option<PathBuf> {
        start
            .ancestors()
            .find(|candidate| candidate.join(&self.marker).is_dir())
            .map(canonical)
    }
}

fn canonical(path: &Path) -> PathBuf {
    dunce::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}
