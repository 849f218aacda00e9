/// Replacing the memory file in place
///
/// The new contents go to a sibling temp file first and are renamed over
/// the target, so an interrupted run never leaves a half-written memory.
use chrono::Local;
use serde::Serialize;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WriteOutcome {
    pub backup_path: Option<PathBuf>,
    pub final_path: PathBuf,
    pub bytes_written: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum BackupError {
    #[error("{0}")]
    Io(#[from] io::Error),
    #[error("could not create backup of {path}: {reason}")]
    BackupCreate { path: PathBuf, reason: String },
    #[error("target path has no parent directory: {0}")]
    NoParent(PathBuf),
}

/// Write `contents` to `target`, optionally copying the previous file to
/// `<name>.bak.<timestamp>` first.
pub fn replace_file(
    target: &Path,
    contents: &[u8],
    keep_backup: bool,
) -> Result<WriteOutcome, BackupError> {
    let parent = target
        .parent()
        .ok_or_else(|| BackupError::NoParent(target.to_path_buf()))?;
    fs::create_dir_all(parent)?;

    let backup_path = if keep_backup && target.exists() {
        let candidate = backup_path_for(target, &Local::now().format("%Y%m%d%H%M%S").to_string());
        fs::copy(target, &candidate).map_err(|err| BackupError::BackupCreate {
            path: target.to_path_buf(),
            reason: err.to_string(),
        })?;
        log::info!("previous memory saved to {}", candidate.display());
        Some(candidate)
    } else {
        None
    };

    let temp_path = build_temp_path(target);
    let mut file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(&temp_path)?;
    file.write_all(contents)?;
    file.sync_all()?;
    drop(file);

    #[cfg(target_os = "windows")]
    {
        if let Err(err) = fs::rename(&temp_path, target) {
            if err.kind() == io::ErrorKind::AlreadyExists || err.kind() == io::ErrorKind::PermissionDenied {
                fs::remove_file(target)?;
                fs::rename(&temp_path, target)?;
            } else {
                let _ = fs::remove_file(&temp_path);
                return Err(BackupError::Io(err));
            }
        }
    }

    #[cfg(not(target_os = "windows"))]
    {
        if let Err(err) = fs::rename(&temp_path, target) {
            let _ = fs::remove_file(&temp_path);
            return Err(BackupError::Io(err));
        }
    }

    Ok(WriteOutcome {
        backup_path,
        final_path: target.to_path_buf(),
        bytes_written: contents.len(),
    })
}

fn backup_path_for(target: &Path, timestamp: &str) -> PathBuf {
    let mut name = target
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_else(|| "memory".into());
    name.push(format!(".bak.{timestamp}"));
    target.with_file_name(name)
}

fn build_temp_path(target: &Path) -> PathBuf {
    let mut temp = target.to_path_buf();
    let suffix = format!("__tmp__pid_{}", std::process::id());
    match temp.file_name() {
        Some(name) => {
            let mut os_string = name.to_os_string();
            os_string.push(suffix);
            temp.set_file_name(os_string);
        }
        None => temp.push(format!("temp_{}", std::process::id())),
    }
    temp
}
