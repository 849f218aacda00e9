/// Configuration for a merge run
///
/// Every default matches the repository layout the extraction scripts
/// produce, so an empty (or absent) config file is a valid one.
use crate::formats::LanguageTags;
use crate::store::DEFAULT_MISSING_ORIGINAL;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write config file {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse YAML config: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON config: {0}")]
    Json(#[from] serde_json::Error),
}

/// Where the inputs and the memory file live, relative to the repository root
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct LayoutOptions {
    pub data_dir: String,
    /// One `<name>_<id>` subdirectory per module
    pub output_files_dir: String,
    /// One `<id>` subdirectory per module
    pub completed_files_dir: String,
    pub source_file: String,
    pub recorded_file: String,
    pub candidate_file: String,
    pub memory_file: String,
    /// Directory whose presence marks the repository root
    pub root_marker: String,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            data_dir: "data".to_string(),
            output_files_dir: "output_files".to_string(),
            completed_files_dir: "completed_files".to_string(),
            source_file: "EN_output.txt".to_string(),
            recorded_file: "CN_output.txt".to_string(),
            candidate_file: "en_completed.txt".to_string(),
            memory_file: "translations_CN.txt".to_string(),
            root_marker: "translation_utils".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct MemoryOptions {
    pub tags: LanguageTags,
    /// Original text written for keys the extraction did not produce
    pub missing_original: String,
    /// Keep a timestamped copy of the previous memory file
    pub backup: bool,
}

impl Default for MemoryOptions {
    fn default() -> Self {
        Self {
            tags: LanguageTags::default(),
            missing_original: DEFAULT_MISSING_ORIGINAL.to_string(),
            backup: false,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct MergeConfig {
    pub layout: LayoutOptions,
    pub memory: MemoryOptions,
}

impl MergeConfig {
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn to_yaml_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let content = serde_yaml::to_string(self)?;
        fs::write(path, content).map_err(|source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn data_dir(&self, root: &Path) -> PathBuf {
        root.join(&self.layout.data_dir)
    }

    pub fn output_files_dir(&self, root: &Path) -> PathBuf {
        self.data_dir(root).join(&self.layout.output_files_dir)
    }

    pub fn candidate_path(&self, root: &Path, module_id: &str) -> PathBuf {
        self.data_dir(root)
            .join(&self.layout.completed_files_dir)
            .join(module_id)
            .join(&self.layout.candidate_file)
    }

    pub fn memory_path(&self, root: &Path) -> PathBuf {
        self.data_dir(root).join(&self.layout.memory_file)
    }
}
