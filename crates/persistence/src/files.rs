//! JSON file helpers shared by the file-backed stores

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::PersistenceError;

/// Keys become file names; anything outside `[A-Za-z0-9+_-]` is rejected
pub(crate) fn file_stem(key: &str) -> Result<&str, PersistenceError> {
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '_' | '-'));
    if valid {
        Ok(key)
    } else {
        Err(PersistenceError::InvalidKey(key.to_string()))
    }
}

/// `<dir>/<key>.json` for a validated key
pub(crate) fn json_path(dir: &Path, key: &str) -> Result<PathBuf, PersistenceError> {
    Ok(dir.join(format!("{}.json", file_stem(key)?)))
}

pub(crate) async fn read_json<T: DeserializeOwned>(
    path: &Path,
) -> Result<Option<T>, PersistenceError> {
    match tokio::fs::read(path).await {
        Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Write then rename so readers never see a partial file
pub(crate) async fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), PersistenceError> {
    let tmp = path.with_extension(format!("json.{}.tmp", uuid::Uuid::new_v4()));
    tokio::fs::write(&tmp, serde_json::to_vec_pretty(value)?).await?;
    if let Err(e) = tokio::fs::rename(&tmp, path).await {
        let _ = tokio::fs::remove_file(&tmp).await;
        return Err(e.into());
    }
    Ok(())
}

/// Remove a file; a missing one is fine
pub(crate) async fn remove(path: &Path) -> Result<(), PersistenceError> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

/// Stems of the `*.json` files directly under `dir`
pub(crate) async fn json_stems(dir: &Path) -> Result<Vec<String>, PersistenceError> {
    let mut stems = Vec::new();
    let mut entries = tokio::fs::read_dir(dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) == Some("json") {
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                stems.push(stem.to_string());
            }
        }
    }
    Ok(stems)
}
