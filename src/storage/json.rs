//! JSON file helpers shared by the stores

use crate::storage::{StorageError, StorageResult};
use serde::Serialize;
use serde_json::Value;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Reads a JSON document, returning `None` when the file does not exist
pub(crate) fn read_json_value(path: &Path) -> StorageResult<Option<Value>> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(StorageError::io(path, e)),
    };

    let value = serde_json::from_str(&content).map_err(|e| StorageError::json(path, e))?;
    Ok(Some(value))
}

/// Writes `data` as pretty JSON through a temporary file and a rename
///
/// Readers either see the previous document or the complete new one, never a partial
/// write. The temporary file is removed if any step fails.
pub(crate) fn write_json_atomic<T: Serialize + ?Sized>(path: &Path, data: &T) -> StorageResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| StorageError::io(parent, e))?;
    }

    let temp = temp_path(path);
    let result = write_then_rename(&temp, path, data);
    if result.is_err() {
        let _ = fs::remove_file(&temp);
    }
    result
}

fn write_then_rename<T: Serialize + ?Sized>(temp: &Path, target: &Path, data: &T) -> StorageResult<()> {
    let bytes = serde_json::to_vec_pretty(data).map_err(|e| StorageError::json(target, e))?;

    let mut file = fs::File::create(temp).map_err(|e| StorageError::io(temp, e))?;
    file.write_all(&bytes)
        .and_then(|_| file.sync_all())
        .map_err(|e| StorageError::io(temp, e))?;
    drop(file);

    fs::rename(temp, target).map_err(|e| StorageError::io(target, e))?;
    tracing::debug!("Wrote {} bytes to {}", bytes.len(), target.display());
    Ok(())
}

/// Sibling path used while writing `path`
pub(crate) fn temp_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "data".to_string());
    path.with_file_name(format!(".{}.tmp", name))
}
