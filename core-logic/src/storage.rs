//! # JSON Document Store
//!
//! Load/save helpers for the small JSON documents the tools keep next to the
//! binary (user lists, target lists, settings). Reads never fail: a missing or
//! unreadable document yields the caller's default. Writes go to a sibling
//! temp file first and are renamed into place, so a crash mid-write leaves the
//! previous content intact.

use crate::error::StorageError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub struct JsonStore;

impl JsonStore {
    /// Returns `None` when the file does not exist or cannot be decoded.
    pub fn load<T: DeserializeOwned>(path: &Path) -> Option<T> {
        if !path.exists() {
            debug!("{} not found", path.display());
            return None;
        }

        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                warn!("Failed to read {}: {}", path.display(), e);
                return None;
            }
        };

        match serde_json::from_str(&content) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("Ignoring corrupt JSON in {}: {}", path.display(), e);
                None
            }
        }
    }

    pub fn load_or_default<T: DeserializeOwned + Default>(path: &Path) -> T {
        Self::load(path).unwrap_or_default()
    }

    /// Pretty-prints `value` with 4-space indentation and atomically replaces `path`.
    pub fn save<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), StorageError> {
        let display = path.display().to_string();

        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        value
            .serialize(&mut ser)
            .map_err(|source| StorageError::Encode {
                path: display.clone(),
                source,
            })?;

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|source| StorageError::Io {
                    path: display.clone(),
                    source,
                })?;
            }
        }

        let tmp = temp_path(path);
        let io_err = |source| StorageError::Io {
            path: display.clone(),
            source,
        };

        let mut file = fs::File::create(&tmp).map_err(io_err)?;
        file.write_all(&buf).map_err(io_err)?;
        file.sync_all().map_err(io_err)?;
        drop(file);

        fs::rename(&tmp, path).map_err(|source| {
            let _ = fs::remove_file(&tmp);
            StorageError::Io {
                path: display.clone(),
                source,
            }
        })?;

        debug!("Saved {}", path.display());
        Ok(())
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
