use crate::notes::NoteRecord;
use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("failed to write {}: {source}", path.display())]
    Write { path: PathBuf, source: io::Error },

    #[error("failed to serialize notes: {0}")]
    Serialize(#[from] serde_json::Error),
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(OsString::from)
        .unwrap_or_else(|| OsString::from("notes.json"));
    name.push(".tmp");
    path.with_file_name(name)
}

/// Reads the notes document. A missing file is an empty catalog, not an error.
pub fn load(path: &Path) -> Result<Vec<NoteRecord>, StoreError> {
    let data = match fs::read(path) {
        Ok(data) => data,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            log::info!("no notes file at {}, starting empty", path.display());
            return Ok(Vec::new());
        }
        Err(source) => {
            return Err(StoreError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    let records: Vec<NoteRecord> =
        serde_json::from_slice(&data).map_err(|source| StoreError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
    log::debug!("loaded {} notes from {}", records.len(), path.display());
    Ok(records)
}

/// Writes the whole catalog through a sibling temp file and a rename, so an
/// interrupted write leaves the previous document intact.
pub fn save(path: &Path, records: &[NoteRecord]) -> Result<(), StoreError> {
    let mut bytes = serde_json::to_vec_pretty(records)?;
    bytes.push(b'\n');

    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| StoreError::Write {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let tmp = tmp_path(path);
    let write_err = |source| StoreError::Write {
        path: path.to_path_buf(),
        source,
    };
    fs::write(&tmp, bytes).map_err(write_err)?;
    match fs::rename(&tmp, path) {
        Ok(()) => {}
        Err(rename_err) => {
            if path.exists() {
                fs::remove_file(path).map_err(write_err)?;
                fs::rename(&tmp, path).map_err(write_err)?;
            } else {
                return Err(write_err(rename_err));
            }
        }
    }
    log::debug!("saved {} notes to {}", records.len(), path.display());
    Ok(())
}
