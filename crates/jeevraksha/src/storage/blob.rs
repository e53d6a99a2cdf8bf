//! Whole-list serialization for the profile store.
//!
//! The store keeps every profile under one key as a single JSON array. Writes
//! go to a sibling temporary file that is then renamed over the blob, so a
//! reader sees either the old list or the new one.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{trace, warn};

use crate::error::{Error, Result};
use crate::profile::Profile;

/// Read the profile list stored at `path`.
///
/// Returns `Ok(None)` when nothing has been stored yet. Records that are not
/// complete profiles are skipped with a warning.
///
/// # Errors
///
/// Returns [`Error::StorageParse`] when the blob is not a JSON array, or an
/// I/O error when it exists but cannot be read.
pub fn read(path: &Path) -> Result<Option<Vec<Profile>>> {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    if raw.trim().is_empty() {
        return Ok(None);
    }

    let records: Vec<Value> = serde_json::from_str(&raw).map_err(|source| Error::StorageParse {
        path: path.to_path_buf(),
        source,
    })?;

    let profiles = records
        .into_iter()
        .enumerate()
        .filter_map(|(index, record)| match serde_json::from_value::<Profile>(record) {
            Ok(profile) => Some(profile),
            Err(e) => {
                warn!("skipping stored record {index} in {}: {e}", path.display());
                None
            }
        })
        .collect();
    Ok(Some(profiles))
}

/// Replace the blob at `path` with `profiles`.
///
/// # Errors
///
/// Returns an error if the parent directory cannot be created or the blob
/// cannot be written.
pub fn write(path: &Path, profiles: &[Profile]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                path: parent.to_path_buf(),
                source,
            })?;
        }
    }

    let json = serde_json::to_string(profiles)?;
    let tmp = temp_path(path);
    let write_err = |source| Error::StorageWrite {
        path: path.to_path_buf(),
        source,
    };
    std::fs::write(&tmp, json).map_err(write_err)?;
    if let Err(e) = std::fs::rename(&tmp, path) {
        // Best effort; the rename error is the one worth reporting.
        let _ = std::fs::remove_file(&tmp);
        return Err(write_err(e));
    }

    trace!("wrote {} profiles to {}", profiles.len(), path.display());
    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}
