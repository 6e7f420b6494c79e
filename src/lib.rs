//! QR Keeper - persisted history and export for generated QR codes
//!
//! This library keeps a bounded, newest-first history of generated QR codes (plain or
//! business-card) in a single key of local key-value storage, and turns rendered QR surfaces
//! into portable data. It supports:
//!
//! - Serializing bitmap surfaces to PNG data URLs and vector surfaces to SVG data URLs
//! - Building immutable history records with unique ids and timestamps
//! - Persisting history with graceful degradation when storage runs out of quota
//! - Exporting PNG/SVG downloads and re-downloading saved records
//! - Sanitizing user-supplied file names
//!
//! QR symbol encoding itself is left to whatever renders the surfaces.
//!
//! # Example
//!
//! ```
//! use qr_keeper::export::{MountedSurfaces, Surface};
//! use qr_keeper::history::{HistoryStore, MemoryStore};
//! use qr_keeper::models::{QrConfig, RenderFormat};
//! use qr_keeper::session::Session;
//!
//! let mut surfaces = MountedSurfaces::new();
//! surfaces.mount_preview(Surface::Vector("<svg/>".to_string()));
//!
//! let mut session = Session::new(HistoryStore::open(MemoryStore::new()));
//! let config = QrConfig::new("hello", RenderFormat::Svg, 200)?.with_file_name("My File!");
//! session.save_to_history(&config, &surfaces)?;
//!
//! assert_eq!(session.store().records()[0].file_name, "My_File");
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod card;
pub mod cli;
pub mod export;
pub mod history;
pub mod models;
pub mod notify;
pub mod session;
pub mod utils;

// Re-export commonly used types
pub use export::{ExportError, capture_preview};
pub use history::{HistoryStore, PersistOutcome, create_record, load_history};
pub use models::{HistoryRecord, QrConfig, RenderFormat};
pub use utils::sanitize_file_name;
