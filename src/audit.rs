//! Append-only audit trail of reference mutations.
//!
//! One JSON line per committed mutation. The allocator writes under its
//! lock, so lines from concurrent callers never interleave.
use crate::category::Category;
use crate::errors::AllocError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

/// Current schema version for audit entries.
pub const AUDIT_SCHEMA_VERSION: u32 = 1;

/// What kind of mutation an audit line records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    Allocated,
    Overridden,
    Raised,
}

impl AuditAction {
    /// Return the stable string identifier used in audit lines.
    pub fn as_str(self) -> &'static str {
        match self {
            AuditAction::Allocated => "allocated",
            AuditAction::Overridden => "overridden",
            AuditAction::Raised => "raised",
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One committed mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub schema_version: u32,
    pub at_epoch_ms: u64,
    pub category: Category,
    pub action: AuditAction,
    pub number: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous: Option<u64>,
}

/// Append-only JSONL log kept next to the store file.
#[derive(Debug, Clone)]
pub struct AuditLog {
    path: PathBuf,
}

impl AuditLog {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    fn persistence_err(&self, source: io::Error) -> AllocError {
        AllocError::Persistence {
            path: self.path.clone(),
            source,
        }
    }

    /// Append one entry as a JSON line.
    pub fn append(&self, entry: &AuditEntry) -> Result<(), AllocError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|err| self.persistence_err(err))?;
        }
        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|err| self.persistence_err(err))?;
        let line = serde_json::to_string(entry)
            .map_err(|err| self.persistence_err(err.into()))?;
        file.write_all(line.as_bytes())
            .map_err(|err| self.persistence_err(err))?;
        file.write_all(b"\n")
            .map_err(|err| self.persistence_err(err))?;
        Ok(())
    }

    /// Read the whole trail in order; an absent file is an empty history.
    pub fn read_all(&self) -> Result<Vec<AuditEntry>, AllocError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(self.persistence_err(err)),
        };
        let mut entries = Vec::new();
        for line in text.lines() {
            if line.trim().is_empty() {
                continue;
            }
            let entry = serde_json::from_str(line).map_err(|err| AllocError::CorruptStore {
                path: self.path.clone(),
                reason: format!("bad audit line: {err}"),
            })?;
            entries.push(entry);
        }
        Ok(entries)
    }
}
