//! Saved-generation history: record creation, the store and its storage backends.

pub mod backend;
pub mod factory;
pub mod store;

pub use backend::{FileStore, KeyValueStore, MemoryStore, StoreError, StoreErrorKind};
pub use factory::{create_record, generate_id};
pub use store::{
    DEFAULT_STORAGE_KEY, HistoryStore, MSG_DISABLED, MSG_KEPT_LATEST, MSG_REMOVED, MSG_SAVED, MSG_TRIMMED,
    PersistOutcome, RecoveryPolicy, SCHEMA_VERSION, SharedHistoryStore, StoreOptions, load_history,
    save_history,
};
