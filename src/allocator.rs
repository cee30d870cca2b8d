//! The sole authority for issuing and overriding reference numbers.
//!
//! One writer lock serializes every mutation; reads go straight to the
//! last committed snapshot, so they never wait behind a save.
use crate::audit::{AuditAction, AuditEntry, AuditLog, AUDIT_SCHEMA_VERSION};
use crate::category::Category;
use crate::errors::AllocError;
use crate::paths::StorePaths;
use crate::repository::{FileRepository, ReferenceRepository};
use crate::store::{now_epoch_ms, ReferenceRecord};
use std::sync::Mutex;

/// Issues gap-free reference numbers per category over a repository.
///
/// The allocator is an owned instance, not a process-wide singleton; pass
/// it by reference to anything that needs to issue numbers. All mutating
/// operations share one writer lock, and no number is reported as issued
/// until the updated store has been durably committed.
#[derive(Debug)]
pub struct ReferenceAllocator<R = FileRepository> {
    repo: R,
    audit: Option<AuditLog>,
    write_lock: Mutex<()>,
}

impl ReferenceAllocator<FileRepository> {
    /// Open the production allocator over a store location, with the audit
    /// trail alongside the store file.
    pub fn open(paths: StorePaths) -> Self {
        let audit = AuditLog::new(paths.audit_path());
        Self::new(FileRepository::new(paths)).with_audit(audit)
    }
}

impl<R: ReferenceRepository> ReferenceAllocator<R> {
    /// Build an allocator over any repository, without an audit trail.
    pub fn new(repo: R) -> Self {
        Self {
            repo,
            audit: None,
            write_lock: Mutex::new(()),
        }
    }

    /// Attach an append-only audit trail.
    pub fn with_audit(mut self, audit: AuditLog) -> Self {
        self.audit = Some(audit);
        self
    }

    /// Issue the next number for `category`.
    ///
    /// A failed save propagates as an error and leaves the counter exactly
    /// where it was for later callers; successful calls on one category
    /// yield consecutive numbers with no duplicates and no gaps.
    pub fn allocate(&self, category: Category) -> Result<ReferenceRecord, AllocError> {
        let _guard = self.write_lock.lock().map_err(|_| AllocError::LockPoisoned)?;
        let mut store = self.repo.load()?;
        let current = store.current_number(category);
        let next = current + 1;
        let now = now_epoch_ms();
        let record = store.set_number(category, next, now);
        self.repo.save(&store)?;
        self.record_audit(
            AuditAction::Allocated,
            category,
            next,
            (current > 0).then_some(current),
            now,
        );
        tracing::info!(category = %category, number = next, "allocated reference");
        Ok(record)
    }

    /// Administrative reset; may move the counter in either direction.
    ///
    /// Exempt from the monotonicity guarantee. The previous value lands in
    /// the audit trail; the business consequences of renumbering belong to
    /// the caller.
    pub fn override_number(
        &self,
        category: Category,
        number: u64,
    ) -> Result<ReferenceRecord, AllocError> {
        let _guard = self.write_lock.lock().map_err(|_| AllocError::LockPoisoned)?;
        let mut store = self.repo.load()?;
        let previous = store.current_number(category);
        let now = now_epoch_ms();
        let record = store.set_number(category, number, now);
        self.repo.save(&store)?;
        self.record_audit(AuditAction::Overridden, category, number, Some(previous), now);
        tracing::info!(category = %category, number, previous, "override applied");
        Ok(record)
    }

    /// Raise the counter to at least `number`; never moves it backward.
    pub fn raise_floor(
        &self,
        category: Category,
        number: u64,
    ) -> Result<ReferenceRecord, AllocError> {
        let _guard = self.write_lock.lock().map_err(|_| AllocError::LockPoisoned)?;
        let mut store = self.repo.load()?;
        let current = store.current_number(category);
        let target = number.max(current);
        let now = now_epoch_ms();
        let record = store.set_number(category, target, now);
        self.repo.save(&store)?;
        if target > current {
            self.record_audit(AuditAction::Raised, category, target, Some(current), now);
            tracing::info!(category = %category, number = target, previous = current, "floor raised");
        }
        Ok(record)
    }

    /// Read the last committed record without taking the writer lock.
    pub fn query(&self, category: Category) -> Result<Option<ReferenceRecord>, AllocError> {
        Ok(self.repo.load()?.record(category))
    }

    /// All known-category records from the last committed snapshot.
    pub fn list(&self) -> Result<Vec<ReferenceRecord>, AllocError> {
        Ok(self.repo.load()?.records())
    }

    fn record_audit(
        &self,
        action: AuditAction,
        category: Category,
        number: u64,
        previous: Option<u64>,
        at_epoch_ms: u64,
    ) {
        let Some(audit) = &self.audit else {
            return;
        };
        let entry = AuditEntry {
            schema_version: AUDIT_SCHEMA_VERSION,
            at_epoch_ms,
            category,
            action,
            number,
            previous,
        };
        // The number is already durably committed; a history write failure
        // must not unissue it.
        if let Err(err) = audit.append(&entry) {
            tracing::warn!(category = %category, %err, "failed to append audit entry");
        }
    }
}

#[cfg(test)]
#[path = "allocator_tests.rs"]
mod allocator_tests;
