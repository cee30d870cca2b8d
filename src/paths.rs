//! Typed paths derived from the store location.
use std::path::{Path, PathBuf};

/// Locates the store file and its sibling artifacts.
#[derive(Debug, Clone)]
pub struct StorePaths {
    store: PathBuf,
}

impl StorePaths {
    pub fn new(store: PathBuf) -> Self {
        Self { store }
    }

    /// The durable store file itself.
    pub fn store_path(&self) -> &Path {
        &self.store
    }

    /// Append-only audit trail next to the store file, e.g.
    /// `references.json` -> `references.history.jsonl`.
    pub fn audit_path(&self) -> PathBuf {
        let stem = self
            .store
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or("references");
        self.store.with_file_name(format!("{stem}.history.jsonl"))
    }
}
