// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! File-backed slot storage.
//!
//! Each slot is one `<slot>.json` file under the data directory. Writes go to
//! a temp file first and are renamed into place, so a crash mid-write never
//! leaves a truncated slot behind.

use crate::db::{SlotStorage, StorageError};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Slot storage rooted at a directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    root: PathBuf,
}

impl FileStorage {
    /// Open (and create if needed) the data directory.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|source| StorageError::Io {
            slot: root.display().to_string(),
            source,
        })?;
        tracing::info!(path = %root.display(), "Opened file storage");
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn slot_path(&self, slot: &str) -> Result<PathBuf, StorageError> {
        let valid = !slot.is_empty()
            && slot
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(StorageError::InvalidSlot(slot.to_string()));
        }
        Ok(self.root.join(format!("{slot}.json")))
    }
}

impl SlotStorage for FileStorage {
    fn read(&self, slot: &str) -> Result<Option<String>, StorageError> {
        let path = self.slot_path(slot)?;
        match fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StorageError::Io {
                slot: slot.to_string(),
                source,
            }),
        }
    }

    fn write(&self, slot: &str, value: &str) -> Result<(), StorageError> {
        let path = self.slot_path(slot)?;
        let tmp_path = path.with_extension("json.tmp");
        let io_err = |source| StorageError::Io {
            slot: slot.to_string(),
            source,
        };

        let written = fs::File::create(&tmp_path)
            .and_then(|mut file| {
                file.write_all(value.as_bytes())?;
                file.sync_all()
            })
            .and_then(|()| fs::rename(&tmp_path, &path));
        if let Err(source) = written {
            // Never leave a partial temp file next to the slot
            if let Err(e) = fs::remove_file(&tmp_path) {
                if e.kind() != io::ErrorKind::NotFound {
                    tracing::warn!(slot, error = %e, "Failed to remove temp file");
                }
            }
            return Err(io_err(source));
        }

        tracing::debug!(slot, bytes = value.len(), "Slot written");
        Ok(())
    }

    fn remove(&self, slot: &str) -> Result<(), StorageError> {
        let path = self.slot_path(slot)?;
        match fs::remove_file(&path) {
            Ok(()) => {
                tracing::debug!(slot, "Slot removed");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StorageError::Io {
                slot: slot.to_string(),
                source,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_read_remove() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::open(dir.path()).unwrap();

        assert_eq!(storage.read("workouts").unwrap(), None);

        storage.write("workouts", "[1]").unwrap();
        storage.write("workouts", "[2]").unwrap();
        assert_eq!(storage.read("workouts").unwrap().as_deref(), Some("[2]"));
        assert!(dir.path().join("workouts.json").exists());
        assert!(!dir.path().join("workouts.json.tmp").exists());

        storage.remove("workouts").unwrap();
        assert_eq!(storage.read("workouts").unwrap(), None);

        // Removing again is fine
        storage.remove("workouts").unwrap();
    }

    #[test]
    fn test_failed_write_cleans_up_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::open(dir.path()).unwrap();
        // A directory in the slot's place makes the final rename fail
        fs::create_dir(dir.path().join("workouts.json")).unwrap();

        let err = storage.write("workouts", "[1]").unwrap_err();
        assert!(matches!(err, StorageError::Io { .. }));
        assert!(!dir.path().join("workouts.json.tmp").exists());
    }

    #[test]
    fn test_rejects_path_like_slot_names() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::open(dir.path()).unwrap();

        for slot in ["", "../escape", "a/b", "dot.json"] {
            let err = storage.write(slot, "x").unwrap_err();
            assert!(matches!(err, StorageError::InvalidSlot(_)), "slot {slot:?}");
        }
    }

    #[test]
    fn test_open_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("nested").join("data");
        let storage = FileStorage::open(&nested).unwrap();
        assert!(nested.is_dir());
        assert_eq!(storage.root(), nested.as_path());
    }
}
