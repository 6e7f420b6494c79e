//! The history store: an in-memory, newest-first list of records mirrored to one storage key.
//!
//! # Quota recovery
//!
//! When a write fails because storage is full the store degrades in three steps, each tried
//! only if the previous one also hit the quota:
//!
//! 1. keep the newest `ceil(trim_ratio * len)` records
//! 2. keep only the newest record
//! 3. drop the storage key and empty the list
//!
//! After each step the in-memory list equals what was written. A non-quota failure on the
//! first write is logged and reported with a generic notification, and the change is kept for
//! the session only. A non-quota failure inside the ladder leaves the in-memory list as it was
//! before the mutation, which is what storage still holds.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error, info, warn};

use super::backend::{KeyValueStore, StoreError};
use crate::models::HistoryRecord;
use crate::notify::{NotificationLevel, Notifier};

pub const DEFAULT_STORAGE_KEY: &str = "qr-history";

/// Persisted format version for the `{"version", "records"}` envelope
pub const SCHEMA_VERSION: u32 = 1;

pub const MSG_SAVED: &str = "Saved to history.";
pub const MSG_REMOVED: &str = "Removed from history.";
pub const MSG_TRIMMED: &str = "Storage full: trimmed older history items.";
pub const MSG_KEPT_LATEST: &str = "Storage very full: kept latest item only.";
pub const MSG_DISABLED: &str = "Could not persist history (storage disabled or full).";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecoveryPolicy {
    trim_ratio: f64,
}

impl RecoveryPolicy {
    pub const DEFAULT_TRIM_RATIO: f64 = 0.7;

    /// `trim_ratio` must be in (0, 1]; anything else falls back to the default
    pub fn new(trim_ratio: f64) -> Self {
        if trim_ratio > 0.0 && trim_ratio <= 1.0 {
            Self { trim_ratio }
        } else {
            warn!(trim_ratio, default = Self::DEFAULT_TRIM_RATIO, "invalid trim ratio, using default");
            Self::default()
        }
    }

    pub fn trim_ratio(&self) -> f64 {
        self.trim_ratio
    }

    /// How many of `len` records survive the first recovery step
    pub fn trimmed_len(&self, len: usize) -> usize {
        let kept = (len as f64 * self.trim_ratio).ceil() as usize;
        kept.min(len)
    }
}

impl Default for RecoveryPolicy {
    fn default() -> Self {
        Self { trim_ratio: Self::DEFAULT_TRIM_RATIO }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StoreOptions {
    pub storage_key: String,
    pub recovery: RecoveryPolicy,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self { storage_key: DEFAULT_STORAGE_KEY.to_string(), recovery: RecoveryPolicy::default() }
    }
}

/// What happened to a mutation once persistence settled
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistOutcome {
    Saved,
    Trimmed { kept: usize, dropped: usize },
    KeptLatest,
    Cleared,
    /// Non-quota failure; the in-memory change is kept but not persisted
    Failed { error: String },
}

#[derive(Serialize)]
struct EnvelopeRef<'a> {
    version: u32,
    records: &'a [HistoryRecord],
}

/// Read the persisted history under `key`.
///
/// Never fails: a missing key, malformed JSON, an unexpected shape or an unknown schema
/// version all give an empty list. Records that fail to parse individually are skipped.
pub fn load_history<B: KeyValueStore + ?Sized>(backend: &B, key: &str) -> Vec<HistoryRecord> {
    match backend.get(key) {
        Ok(Some(raw)) => parse_history(&raw),
        Ok(None) => Vec::new(),
        Err(e) => {
            warn!(error = %e, key, "failed to read history, starting empty");
            Vec::new()
        }
    }
}

/// Write `records` under `key` in the versioned envelope format
pub fn save_history<B: KeyValueStore + ?Sized>(
    backend: &mut B,
    key: &str,
    records: &[HistoryRecord],
) -> Result<(), StoreError> {
    let json = serde_json::to_string(&EnvelopeRef { version: SCHEMA_VERSION, records })?;
    backend.set(key, &json)
}

pub(crate) fn parse_history(raw: &str) -> Vec<HistoryRecord> {
    let value: Value = match serde_json::from_str(raw) {
        Ok(value) => value,
        Err(e) => {
            warn!(error = %e, "persisted history is not valid JSON, starting empty");
            return Vec::new();
        }
    };

    let items = match value {
        // Bare array written before the envelope existed
        Value::Array(items) => items,
        Value::Object(mut map) => {
            let version = map.get("version").and_then(Value::as_u64);
            match (version, map.remove("records")) {
                (Some(v), Some(Value::Array(items))) if v == u64::from(SCHEMA_VERSION) => items,
                (Some(v), _) if v != u64::from(SCHEMA_VERSION) => {
                    warn!(found = v, expected = SCHEMA_VERSION, "unsupported history version, starting empty");
                    return Vec::new();
                }
                _ => {
                    warn!("persisted history object has no records array, starting empty");
                    return Vec::new();
                }
            }
        }
        _ => {
            warn!("persisted history has an unexpected shape, starting empty");
            return Vec::new();
        }
    };

    let total = items.len();
    let mut seen = HashSet::new();
    let mut records = Vec::with_capacity(total);

    for (index, mut item) in items.into_iter().enumerate() {
        // Records from before business-card mode carry no mode tag
        if let Value::Object(map) = &mut item {
            map.entry("mode").or_insert_with(|| Value::String("qr".to_string()));
        }

        match serde_json::from_value::<HistoryRecord>(item) {
            Ok(record) => {
                if seen.insert(record.id.clone()) {
                    records.push(record);
                } else {
                    warn!(index, id = %record.id, "skipping duplicate history record");
                }
            }
            Err(e) => warn!(index, error = %e, "skipping malformed history record"),
        }
    }

    if records.len() < total {
        info!(loaded = records.len(), skipped = total - records.len(), "loaded history with skipped records");
    }

    records
}

pub struct HistoryStore<B: KeyValueStore> {
    backend: B,
    options: StoreOptions,
    records: Vec<HistoryRecord>,
    notifier: Notifier,
}

/// A store shared across threads; the lock serializes read-modify-write of the list
pub type SharedHistoryStore<B> = Arc<Mutex<HistoryStore<B>>>;

impl<B: KeyValueStore> HistoryStore<B> {
    pub fn open(backend: B) -> Self {
        Self::open_with(backend, StoreOptions::default())
    }

    /// Load the persisted history once, synchronously, before anything can write over it
    pub fn open_with(backend: B, options: StoreOptions) -> Self {
        let records = load_history(&backend, &options.storage_key);
        debug!(key = %options.storage_key, count = records.len(), "opened history store");
        Self { backend, options, records, notifier: Notifier::new() }
    }

    pub fn into_shared(self) -> SharedHistoryStore<B> {
        Arc::new(Mutex::new(self))
    }

    /// Newest first
    pub fn records(&self) -> &[HistoryRecord] {
        &self.records
    }

    pub fn get(&self, id: &str) -> Option<&HistoryRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn options(&self) -> &StoreOptions {
        &self.options
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    pub fn notifier_mut(&mut self) -> &mut Notifier {
        &mut self.notifier
    }

    /// Prepend `record` and persist. A record with the same id is replaced.
    pub fn append(&mut self, record: HistoryRecord) -> PersistOutcome {
        debug!(id = %record.id, count = self.records.len() + 1, "appending history record");

        let mut candidate = Vec::with_capacity(self.records.len() + 1);
        candidate.extend(self.records.iter().filter(|r| r.id != record.id).cloned());
        candidate.insert(0, record);

        self.commit(candidate, MSG_SAVED)
    }

    /// Remove the record with `id` and persist. Returns `None` if no such record exists.
    pub fn remove(&mut self, id: &str) -> Option<PersistOutcome> {
        if !self.records.iter().any(|r| r.id == id) {
            debug!(id, "remove ignored, no such record");
            return None;
        }

        let candidate: Vec<HistoryRecord> = self.records.iter().filter(|r| r.id != id).cloned().collect();
        Some(self.commit(candidate, MSG_REMOVED))
    }

    fn write(&mut self, records: &[HistoryRecord]) -> Result<(), StoreError> {
        save_history(&mut self.backend, &self.options.storage_key, records)
    }

    fn commit(&mut self, candidate: Vec<HistoryRecord>, success: &str) -> PersistOutcome {
        match self.write(&candidate) {
            Ok(()) => {
                self.records = candidate;
                self.notifier.notify(NotificationLevel::Success, success);
                PersistOutcome::Saved
            }
            Err(e) if e.is_quota_exceeded() => {
                warn!(error = %e, count = candidate.len(), "history write hit storage quota");
                self.recover(candidate)
            }
            Err(e) => self.fail(candidate, e),
        }
    }

    fn recover(&mut self, candidate: Vec<HistoryRecord>) -> PersistOutcome {
        let total = candidate.len();

        let kept = self.options.recovery.trimmed_len(total);
        let trimmed = candidate[..kept].to_vec();
        match self.write(&trimmed) {
            Ok(()) => {
                warn!(kept, dropped = total - kept, "trimmed history to fit storage");
                self.records = trimmed;
                self.notifier.notify(NotificationLevel::Warning, MSG_TRIMMED);
                return PersistOutcome::Trimmed { kept, dropped: total - kept };
            }
            Err(e) if e.is_quota_exceeded() => {
                warn!(error = %e, kept, "trimmed history still exceeds quota");
            }
            Err(e) => return self.abandon(e),
        }

        let latest: Vec<HistoryRecord> = candidate.into_iter().take(1).collect();
        match self.write(&latest) {
            Ok(()) => {
                warn!(dropped = total - latest.len(), "kept only the latest history record");
                self.records = latest;
                self.notifier.notify(NotificationLevel::Warning, MSG_KEPT_LATEST);
                return PersistOutcome::KeptLatest;
            }
            Err(e) if e.is_quota_exceeded() => {
                warn!(error = %e, "latest history record alone exceeds quota");
            }
            Err(e) => return self.abandon(e),
        }

        if let Err(e) = self.backend.remove(&self.options.storage_key) {
            error!(error = %e, key = %self.options.storage_key, "failed to clear history key");
        }
        warn!(dropped = total, "history storage cleared");
        self.records.clear();
        self.notifier.notify(NotificationLevel::Error, MSG_DISABLED);
        PersistOutcome::Cleared
    }

    fn fail(&mut self, candidate: Vec<HistoryRecord>, error: StoreError) -> PersistOutcome {
        error!(error = %error, "failed to persist history, keeping change for this session only");
        self.records = candidate;
        self.notifier.notify(NotificationLevel::Error, format!("Could not save history: {}", error));
        PersistOutcome::Failed { error: error.to_string() }
    }

    /// A non-quota error during recovery: no tier was written, so memory keeps the last
    /// successfully persisted list
    fn abandon(&mut self, error: StoreError) -> PersistOutcome {
        error!(error = %error, count = self.records.len(), "history recovery failed, keeping persisted list");
        self.notifier.notify(NotificationLevel::Error, format!("Could not save history: {}", error));
        PersistOutcome::Failed { error: error.to_string() }
    }
}

#[cfg(test)]
mod tests {
    use chrono::DateTime;

    use super::*;
    use crate::history::backend::MemoryStore;
    use crate::models::{RecordOrigin, RenderFormat};

    fn record(id: &str) -> HistoryRecord {
        HistoryRecord {
            id: id.to_string(),
            text: format!("text {}", id),
            file_name: "qr-code".to_string(),
            format: RenderFormat::Svg,
            size: 200,
            preview_url: "data:image/svg+xml;charset=utf-8,%3Csvg%2F%3E".to_string(),
            origin: RecordOrigin::Qr,
            saved_at: DateTime::from_timestamp_millis(1_700_000_000_000).unwrap(),
        }
    }

    fn ids(records: &[HistoryRecord]) -> Vec<&str> {
        records.iter().map(|r| r.id.as_str()).collect()
    }

    #[test]
    fn test_trimmed_len() {
        let policy = RecoveryPolicy::default();
        assert_eq!(policy.trimmed_len(0), 0);
        assert_eq!(policy.trimmed_len(1), 1);
        assert_eq!(policy.trimmed_len(10), 7);
        assert_eq!(policy.trimmed_len(11), 8);
        assert_eq!(RecoveryPolicy::new(1.0).trimmed_len(5), 5);
    }

    #[test]
    fn test_invalid_trim_ratio_falls_back() {
        assert_eq!(RecoveryPolicy::new(0.0), RecoveryPolicy::default());
        assert_eq!(RecoveryPolicy::new(1.5), RecoveryPolicy::default());
        assert_eq!(RecoveryPolicy::new(f64::NAN), RecoveryPolicy::default());
        assert_eq!(RecoveryPolicy::new(0.5).trim_ratio(), 0.5);
    }

    #[test]
    fn test_parse_not_json() {
        assert!(parse_history("{not valid json").is_empty());
    }

    #[test]
    fn test_parse_wrong_shapes() {
        assert!(parse_history("42").is_empty());
        assert!(parse_history(r#""text""#).is_empty());
        assert!(parse_history(r#"{"records":"nope","version":1}"#).is_empty());
        assert!(parse_history(r#"{"version":99,"records":[]}"#).is_empty());
    }

    #[test]
    fn test_parse_legacy_array_without_mode() {
        let raw = r#"[{"id":"a","text":"t","fileName":"f","format":"canvas","size":200,
            "previewUrl":"data:image/png;base64,AA==","savedAt":"2024-06-10T06:13:20.000Z"}]"#;
        let records = parse_history(raw);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].origin, RecordOrigin::Qr);
    }

    #[test]
    fn test_parse_skips_record_with_impossible_size() {
        let mut oversized = serde_json::to_value(record("big")).unwrap();
        oversized["size"] = serde_json::json!(9999);
        let kept = serde_json::to_value(record("ok")).unwrap();
        let raw = serde_json::json!({"version": SCHEMA_VERSION, "records": [oversized, kept]}).to_string();

        assert_eq!(ids(&parse_history(&raw)), ["ok"]);
    }

    #[test]
    fn test_parse_skips_bad_and_duplicate_records() {
        let good = serde_json::to_value(record("a")).unwrap();
        let dup = serde_json::to_value(record("a")).unwrap();
        let other = serde_json::to_value(record("b")).unwrap();
        let raw = serde_json::json!({
            "version": SCHEMA_VERSION,
            "records": [good, {"id": "broken"}, 7, dup, other],
        })
        .to_string();

        assert_eq!(ids(&parse_history(&raw)), ["a", "b"]);
    }

    #[test]
    fn test_append_prepends_and_persists() {
        let mut store = HistoryStore::open(MemoryStore::new());
        assert_eq!(store.append(record("a")), PersistOutcome::Saved);
        assert_eq!(store.append(record("b")), PersistOutcome::Saved);

        assert_eq!(ids(store.records()), ["b", "a"]);
        assert_eq!(load_history(store.backend(), DEFAULT_STORAGE_KEY), store.records());
        assert_eq!(store.notifier().last().map(|n| n.message.as_str()), Some(MSG_SAVED));
    }

    #[test]
    fn test_append_same_id_replaces() {
        let mut store = HistoryStore::open(MemoryStore::new());
        store.append(record("a"));
        store.append(record("b"));
        store.append(record("a"));
        assert_eq!(ids(store.records()), ["a", "b"]);
    }

    #[test]
    fn test_remove_missing_id_is_noop() {
        let mut store = HistoryStore::open(MemoryStore::new());
        store.append(record("a"));
        let writes = store.backend().writes();

        assert_eq!(store.remove("zzz"), None);
        assert_eq!(store.backend().writes(), writes);
    }

    #[test]
    fn test_custom_storage_key() {
        let options = StoreOptions { storage_key: "custom".to_string(), ..StoreOptions::default() };
        let mut store = HistoryStore::open_with(MemoryStore::new(), options);
        store.append(record("a"));

        assert!(store.backend().raw("custom").is_some());
        assert!(store.backend().raw(DEFAULT_STORAGE_KEY).is_none());
    }

    #[test]
    fn test_non_quota_failure_reported() {
        let mut store = HistoryStore::open(MemoryStore::with_failure("read-only"));
        let outcome = store.append(record("a"));

        assert!(matches!(outcome, PersistOutcome::Failed { ref error } if error.contains("read-only")));
        assert_eq!(ids(store.records()), ["a"]);
        let last = store.notifier().last().unwrap();
        assert_eq!(last.level, NotificationLevel::Error);
        assert!(last.message.starts_with("Could not save history"));
    }
}
