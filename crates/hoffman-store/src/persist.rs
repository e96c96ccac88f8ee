//! # Draft Persistence
//!
//! Durable key/value storage for the serialized draft.
//!
//! ## Persisted Envelope
//! ```text
//! key: "ab-booking-storage"
//! ┌───────────────────────────────────────────────────────────┐
//! │ {                                                         │
//! │   "state": { "selectedServices": [...],                   │
//! │              "contactInfo": {...}, "arrivalWindow": {...},│
//! │              ..., "version": 2 },                         │
//! │   "version": 1          ◄── envelope format, not draft    │
//! │ }                                                         │
//! └───────────────────────────────────────────────────────────┘
//! ```
//!
//! Writes happen after every mutation; reads happen once, at rehydration.
//! There is a single writer per key, so no locking across processes.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::draft::BookingDraft;
use crate::error::{StoreError, StoreResult};

/// Envelope format this build writes and accepts.
pub const PERSIST_FORMAT_VERSION: u32 = 1;

// =============================================================================
// Storage Trait
// =============================================================================

/// A string key/value store the draft is saved into.
pub trait DraftStorage: Send + Sync {
    fn load(&self, key: &str) -> StoreResult<Option<String>>;
    fn save(&self, key: &str, value: &str) -> StoreResult<()>;
    fn remove(&self, key: &str) -> StoreResult<()>;
}

// =============================================================================
// Envelope
// =============================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct PersistedDraft<T> {
    pub state: T,
    pub version: u32,
}

/// Serializes a draft into its envelope.
pub fn encode_draft(draft: &BookingDraft) -> StoreResult<String> {
    Ok(serde_json::to_string(&PersistedDraft {
        state: draft,
        version: PERSIST_FORMAT_VERSION,
    })?)
}

/// Parses a stored envelope.
///
/// Returns `None`, with a warning, for an unknown envelope version or a
/// blob that does not parse.
pub fn decode_draft(raw: &str) -> Option<BookingDraft> {
    let envelope: PersistedDraft<serde_json::Value> = match serde_json::from_str(raw) {
        Ok(envelope) => envelope,
        Err(e) => {
            warn!(error = %e, "Discarding unreadable persisted draft");
            return None;
        }
    };

    if envelope.version != PERSIST_FORMAT_VERSION {
        warn!(
            found = envelope.version,
            expected = PERSIST_FORMAT_VERSION,
            "Discarding persisted draft with unknown format version"
        );
        return None;
    }

    match serde_json::from_value(envelope.state) {
        Ok(draft) => Some(draft),
        Err(e) => {
            warn!(error = %e, "Discarding persisted draft with invalid state");
            None
        }
    }
}

// =============================================================================
// In-memory storage
// =============================================================================

/// Process-local storage, for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DraftStorage for MemoryStorage {
    fn load(&self, key: &str) -> StoreResult<Option<String>> {
        let entries = self.entries.lock().expect("Storage mutex poisoned");
        Ok(entries.get(key).cloned())
    }

    fn save(&self, key: &str, value: &str) -> StoreResult<()> {
        let mut entries = self.entries.lock().expect("Storage mutex poisoned");
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        let mut entries = self.entries.lock().expect("Storage mutex poisoned");
        entries.remove(key);
        Ok(())
    }
}

// =============================================================================
// JSON file storage
// =============================================================================

/// One `<key>.json` file per key under a directory.
///
/// Saves write a sibling temp file and rename it over the target, so a
/// crash mid-write leaves the previous snapshot intact.
#[derive(Debug, Clone)]
pub struct JsonFileStorage {
    dir: PathBuf,
}

impl JsonFileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        JsonFileStorage { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> StoreResult<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.')
            && !key.starts_with('.');
        if !valid {
            return Err(StoreError::Storage(format!("invalid storage key '{}'", key)));
        }
        Ok(self.dir.join(format!("{}.json", key)))
    }
}

impl DraftStorage for JsonFileStorage {
    fn load(&self, key: &str) -> StoreResult<Option<String>> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, key: &str, value: &str) -> StoreResult<()> {
        let path = self.path_for(key)?;
        fs::create_dir_all(&self.dir)?;
        let tmp = self.dir.join(format!(".{}.json.tmp", key));
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use hoffman_core::catalog;

    #[test]
    fn test_envelope_round_trip() {
        let mut draft = BookingDraft::new();
        draft.add_service(catalog::find_service("tile").unwrap());

        let raw = encode_draft(&draft).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["version"], 1);
        assert_eq!(value["state"]["selectedServices"][0]["id"], "tile");
        assert!(value["state"].get("rehydrated").is_none());

        let back = decode_draft(&raw).unwrap();
        assert_eq!(back.selected_services, draft.selected_services);
    }

    #[test]
    fn test_unknown_or_broken_envelope_is_discarded() {
        assert!(decode_draft("{not json").is_none());
        assert!(decode_draft(r#"{"state":{},"version":99}"#).is_none());
        assert!(decode_draft(r#"{"state":{"photos":"nope"},"version":1}"#).is_none());
        assert!(decode_draft(r#"{"state":{},"version":1}"#).is_some());
    }

    #[test]
    fn test_memory_storage() {
        let storage = MemoryStorage::new();
        assert_eq!(storage.load("k").unwrap(), None);
        storage.save("k", "v").unwrap();
        assert_eq!(storage.load("k").unwrap().as_deref(), Some("v"));
        storage.remove("k").unwrap();
        assert_eq!(storage.load("k").unwrap(), None);
    }

    #[test]
    fn test_json_file_storage() {
        let dir = tempfile::tempdir().unwrap();
        let storage = JsonFileStorage::new(dir.path().join("drafts"));

        assert_eq!(storage.load("ab-booking-storage").unwrap(), None);
        storage.save("ab-booking-storage", "{}").unwrap();
        storage.save("ab-booking-storage", "[1]").unwrap();
        assert_eq!(
            storage.load("ab-booking-storage").unwrap().as_deref(),
            Some("[1]")
        );
        assert!(dir.path().join("drafts/ab-booking-storage.json").exists());

        storage.remove("ab-booking-storage").unwrap();
        storage.remove("ab-booking-storage").unwrap();
        assert_eq!(storage.load("ab-booking-storage").unwrap(), None);
    }

    #[test]
    fn test_json_file_storage_rejects_path_keys() {
        let dir = tempfile::tempdir().unwrap();
        let storage = JsonFileStorage::new(dir.path());
        assert!(matches!(
            storage.save("../escape", "{}"),
            Err(StoreError::Storage(_))
        ));
    }
}
