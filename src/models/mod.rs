//! Data models for saved QR generations.
//!
//! - [`HistoryRecord`] - One persisted generation with its preview data URL
//! - [`RecordOrigin`] - Whether a record came from plain QR mode or business-card mode
//! - [`QrConfig`] - Snapshot of the generator inputs at save/export time
//! - [`CardData`] - Contact details used in business-card mode
//!
//! Records use serde with camelCase field names (`fileName`, `previewUrl`, `savedAt`), the
//! shape every reader of the history key expects. Timestamp handling lives in `deserializers`.

pub mod card;
pub mod config;
pub mod deserializers;
pub mod record;

pub use card::CardData;
pub use config::{ConfigError, DEFAULT_SIZE, Generation, MAX_SIZE, MIN_SIZE, QrConfig};
pub use record::{GenerationMode, HistoryRecord, RecordOrigin, RenderFormat};
