/// Module discovery and the id -> display name registry
///
/// Every subdirectory of the extraction output is one module, named
/// `<moduleName>_<moduleId>`. The id is whatever follows the last
/// underscore, so names may themselves contain underscores.
use crate::diagnostics::Diagnostic;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ModuleDir {
    pub id: String,
    pub name: String,
    pub path: PathBuf,
}

/// Module id -> human-readable name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModuleRegistry {
    names: IndexMap<String, String>,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Later registrations for the same id replace the name.
    pub fn register(&mut self, id: impl Into<String>, name: impl Into<String>) {
        self.names.insert(id.into(), name.into());
    }

    pub fn name_of(&self, id: &str) -> Option<&str> {
        self.names.get(id).map(String::as_str)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.names.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl<'a> FromIterator<&'a ModuleDir> for ModuleRegistry {
    fn from_iter<T: IntoIterator<Item = &'a ModuleDir>>(iter: T) -> Self {
        let mut registry = Self::new();
        for module in iter {
            registry.register(module.id.clone(), module.name.clone());
        }
        registry
    }
}

/// Split `<name>_<id>` at the last underscore.
pub fn split_module_dir_name(dir_name: &str) -> Option<(&str, &str)> {
    dir_name.rsplit_once('_')
}

#[derive(Debug, Clone, Default)]
pub struct ModuleScan {
    pub modules: Vec<ModuleDir>,
    pub diagnostics: Vec<Diagnostic>,
}

impl ModuleScan {
    pub fn registry(&self) -> ModuleRegistry {
        self.modules.iter().collect()
    }
}

#[derive(Debug, Default)]
pub struct ModuleScanner;

impl ModuleScanner {
    pub fn new() -> Self {
        Self
    }

    /// List module directories under `root`, sorted by directory name.
    /// Plain files are ignored; badly named directories are reported and skipped.
    pub fn scan(&self, root: &Path) -> Result<ModuleScan, io::Error> {
        let mut dirs = Vec::new();
        for entry in fs::read_dir(root)? {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                dirs.push(entry.path());
            }
        }
        dirs.sort();

        let mut scan = ModuleScan::default();
        for path in dirs {
            let dir_name = path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();

            match split_module_dir_name(&dir_name) {
                Some((name, id)) => {
                    log::debug!("discovered module {} ({})", id, name);
                    scan.modules.push(ModuleDir {
                        id: id.to_string(),
                        name: name.to_string(),
                        path: path.clone(),
                    });
                }
                None => {
                    log::warn!("{}: directory name is not <name>_<id>", dir_name);
                    scan.diagnostics.push(Diagnostic::malformed_module_dir(dir_name));
                }
            }
        }

        Ok(scan)
    }
}
