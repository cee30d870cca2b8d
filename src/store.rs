//! Typed schema for the persisted reference store.
//!
//! These types mirror the on-disk JSON document so the repository stays a
//! thin load/save layer and the allocator works against a validated view.
use crate::category::Category;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::{SystemTime, UNIX_EPOCH};

/// Current schema version for the store document.
pub const STORE_SCHEMA_VERSION: u32 = 1;

/// Current time in epoch milliseconds for record timestamps.
pub fn now_epoch_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| elapsed.as_millis() as u64)
}

/// One issued-reference record as seen by callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReferenceRecord {
    pub category: Category,
    pub number: u64,
    pub created_at_epoch_ms: u64,
    pub updated_at_epoch_ms: u64,
}

impl ReferenceRecord {
    /// Render the reference the way it is handed to users, e.g. "HR 123".
    pub fn reference(&self) -> String {
        format!("{} {}", self.category.label(), self.number)
    }
}

/// Per-category value persisted under the `references` mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredEntry {
    pub reference_number: u64,
    pub created_at_epoch_ms: u64,
    pub updated_at_epoch_ms: u64,
}

/// Persisted mapping value: the current layout or a legacy bare integer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StoredValue {
    Entry(StoredEntry),
    Legacy(u64),
}

impl StoredValue {
    /// Normalize to the current layout; legacy values carry zero timestamps
    /// because their provenance was never recorded.
    pub fn into_entry(self) -> StoredEntry {
        match self {
            StoredValue::Entry(entry) => entry,
            StoredValue::Legacy(number) => StoredEntry {
                reference_number: number,
                created_at_epoch_ms: 0,
                updated_at_epoch_ms: 0,
            },
        }
    }
}

/// On-disk document wrapper.
#[derive(Debug, Serialize, Deserialize)]
pub struct StoreFile {
    pub schema_version: u32,
    #[serde(default)]
    pub references: BTreeMap<String, StoredValue>,
}

/// In-memory view of the persisted store.
///
/// Keys are the raw mapping keys. Entries under keys outside the current
/// enumeration are kept across load/save cycles so a file written by a
/// newer build survives a round trip, but they stay invisible to queries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferenceStore {
    entries: BTreeMap<String, StoredEntry>,
}

impl ReferenceStore {
    pub fn from_entries(entries: BTreeMap<String, StoredEntry>) -> Self {
        Self { entries }
    }

    /// Raw mapping view used by the repository when serializing.
    pub fn entries(&self) -> &BTreeMap<String, StoredEntry> {
        &self.entries
    }

    /// Last issued number for `category`; 0 before the first allocation.
    pub fn current_number(&self, category: Category) -> u64 {
        self.entries
            .get(category.as_str())
            .map_or(0, |entry| entry.reference_number)
    }

    /// Joined record for `category`, if one exists.
    pub fn record(&self, category: Category) -> Option<ReferenceRecord> {
        self.entries.get(category.as_str()).map(|entry| ReferenceRecord {
            category,
            number: entry.reference_number,
            created_at_epoch_ms: entry.created_at_epoch_ms,
            updated_at_epoch_ms: entry.updated_at_epoch_ms,
        })
    }

    /// Upsert `category` to `number` and return the resulting record.
    ///
    /// A fresh record is stamped with `now_ms` as its creation time; an
    /// existing record keeps its creation time and advances `updated_at`.
    pub fn set_number(&mut self, category: Category, number: u64, now_ms: u64) -> ReferenceRecord {
        let entry = self
            .entries
            .entry(category.as_str().to_string())
            .or_insert_with(|| StoredEntry {
                reference_number: number,
                created_at_epoch_ms: now_ms,
                updated_at_epoch_ms: now_ms,
            });
        entry.reference_number = number;
        entry.updated_at_epoch_ms = now_ms;
        ReferenceRecord {
            category,
            number,
            created_at_epoch_ms: entry.created_at_epoch_ms,
            updated_at_epoch_ms: now_ms,
        }
    }

    /// Records for every known category in the store, in category order.
    pub fn records(&self) -> Vec<ReferenceRecord> {
        let mut records: Vec<ReferenceRecord> = self
            .entries
            .iter()
            .filter_map(|(key, entry)| {
                Category::parse(key).ok().map(|category| ReferenceRecord {
                    category,
                    number: entry.reference_number,
                    created_at_epoch_ms: entry.created_at_epoch_ms,
                    updated_at_epoch_ms: entry.updated_at_epoch_ms,
                })
            })
            .collect();
        records.sort_by_key(|record| record.category);
        records
    }
}
