//! Typed failure taxonomy for the allocator core.
//!
//! Callers match on these variants to decide between rejecting input,
//! retrying, and stopping for operator intervention.
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Failures surfaced by the allocator, repository, and audit log.
#[derive(Debug, Error)]
pub enum AllocError {
    /// Category not in the recognized set; nothing was mutated.
    #[error("unknown category \"{0}\"")]
    InvalidCategory(String),

    /// The store exists but cannot be trusted. Allocation refuses to
    /// proceed on a corrupt store rather than restart numbering from an
    /// empty mapping.
    #[error("reference store {} is corrupt: {}", .path.display(), .reason)]
    CorruptStore { path: PathBuf, reason: String },

    /// Transient I/O failure; the counter is unchanged and the caller may
    /// retry.
    #[error("persisting reference store {} failed", .path.display())]
    Persistence {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A writer panicked while holding the allocator lock; transient, same
    /// retry contract as `Persistence`.
    #[error("allocator lock poisoned; retry the request")]
    LockPoisoned,
}
