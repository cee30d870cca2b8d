//! Durable load/save of the reference store.
//!
//! The write path stages the new document in a temp file, syncs it, and
//! atomically replaces the live file, so a crash at any point leaves either
//! the old or the new store on disk, never a mixture.
use crate::errors::AllocError;
use crate::paths::StorePaths;
use crate::store::{ReferenceStore, StoreFile, StoredValue, STORE_SCHEMA_VERSION};
use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Storage seam for the allocator.
///
/// The backing medium stays an implementation choice behind these two
/// calls; only the allocator may invoke `save`.
pub trait ReferenceRepository {
    /// Read the last committed store; an absent file is an empty mapping.
    fn load(&self) -> Result<ReferenceStore, AllocError>;

    /// Durably replace the store with `store`, all or nothing.
    fn save(&self, store: &ReferenceStore) -> Result<(), AllocError>;
}

/// File-backed repository over a single JSON document.
#[derive(Debug, Clone)]
pub struct FileRepository {
    paths: StorePaths,
}

impl FileRepository {
    pub fn new(paths: StorePaths) -> Self {
        Self { paths }
    }

    pub fn store_path(&self) -> &Path {
        self.paths.store_path()
    }

    fn persistence_err(&self, source: io::Error) -> AllocError {
        AllocError::Persistence {
            path: self.store_path().to_path_buf(),
            source,
        }
    }
}

impl ReferenceRepository for FileRepository {
    fn load(&self) -> Result<ReferenceStore, AllocError> {
        let path = self.store_path();
        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "store file absent; starting empty");
                return Ok(ReferenceStore::default());
            }
            Err(err) => return Err(self.persistence_err(err)),
        };
        decode_store(path, &bytes)
    }

    fn save(&self, store: &ReferenceStore) -> Result<(), AllocError> {
        let path = self.store_path();
        let parent = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&parent).map_err(|err| self.persistence_err(err))?;

        let document = StoreFile {
            schema_version: STORE_SCHEMA_VERSION,
            references: store
                .entries()
                .iter()
                .map(|(key, entry)| (key.clone(), StoredValue::Entry(entry.clone())))
                .collect(),
        };
        let bytes = serde_json::to_vec_pretty(&document)
            .map_err(|err| self.persistence_err(err.into()))?;

        let mut staged =
            NamedTempFile::new_in(&parent).map_err(|err| self.persistence_err(err))?;
        staged
            .write_all(&bytes)
            .map_err(|err| self.persistence_err(err))?;
        // The rename only publishes what has already reached the disk.
        staged
            .as_file()
            .sync_all()
            .map_err(|err| self.persistence_err(err))?;
        staged
            .persist(path)
            .map_err(|err| self.persistence_err(err.error))?;
        tracing::debug!(path = %path.display(), "store committed");
        Ok(())
    }
}

/// Decode a store document, accepting the legacy bare-map layout.
fn decode_store(path: &Path, bytes: &[u8]) -> Result<ReferenceStore, AllocError> {
    match serde_json::from_slice::<StoreFile>(bytes) {
        Ok(document) => {
            if document.schema_version != STORE_SCHEMA_VERSION {
                return Err(AllocError::CorruptStore {
                    path: path.to_path_buf(),
                    reason: format!("unsupported schema version {}", document.schema_version),
                });
            }
            let entries = document
                .references
                .into_iter()
                .map(|(key, value)| (key, value.into_entry()))
                .collect();
            Ok(ReferenceStore::from_entries(entries))
        }
        Err(primary) => {
            // First deployment format: a bare mapping of category name to
            // the last issued number.
            if let Ok(legacy) = serde_json::from_slice::<BTreeMap<String, u64>>(bytes) {
                let entries = legacy
                    .into_iter()
                    .map(|(key, number)| (key, StoredValue::Legacy(number).into_entry()))
                    .collect();
                return Ok(ReferenceStore::from_entries(entries));
            }
            Err(AllocError::CorruptStore {
                path: path.to_path_buf(),
                reason: primary.to_string(),
            })
        }
    }
}

#[cfg(test)]
#[path = "repository_tests.rs"]
mod repository_tests;
