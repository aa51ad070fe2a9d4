//! JSON persistence helpers for files under ~/.parakeet/.
//!
//! Shared by the local best-score file and the backend data file.

use crate::constants::DATA_DIR_NAME;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Get the ~/.parakeet/ directory path, creating it if needed.
pub fn parakeet_dir() -> io::Result<PathBuf> {
    let home_dir = dirs::home_dir().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::NotFound,
            "Could not determine home directory",
        )
    })?;
    let dir = home_dir.join(DATA_DIR_NAME);
    fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Get the full path for a file in ~/.parakeet/.
pub fn save_path(filename: &str) -> io::Result<PathBuf> {
    Ok(parakeet_dir()?.join(filename))
}

/// Load JSON from `path`, returning `T::default()` if the file is missing or
/// unreadable. Corrupt files are logged and treated as empty.
pub fn load_json_or_default<T: Default + DeserializeOwned>(path: &Path) -> T {
    let json = match fs::read_to_string(path) {
        Ok(json) => json,
        Err(e) => {
            if e.kind() != io::ErrorKind::NotFound {
                log::warn!("could not read {}: {}", path.display(), e);
            }
            return T::default();
        }
    };
    match serde_json::from_str(&json) {
        Ok(value) => value,
        Err(e) => {
            log::warn!("ignoring invalid JSON in {}: {}", path.display(), e);
            T::default()
        }
    }
}

/// Save a value as pretty-printed JSON, creating parent directories.
///
/// Writes to a sibling temp file first and renames it into place so a crash
/// mid-write never leaves a truncated file behind.
pub fn save_json<T: Serialize>(path: &Path, data: &T) -> io::Result<()> {
    let json = serde_json::to_string_pretty(data)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let tmp_path = path.with_extension("json.tmp");
    fs::write(&tmp_path, json)?;
    fs::rename(&tmp_path, path)?;
    Ok(())
}
