//! The save/export flow tying surfaces, the record factory and the history store together.

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::card::{CARD_QR_SURFACE_ID, card_base_name};
use crate::export::{self, Download, ExportError, SurfaceProvider, capture_preview, capture_surface};
use crate::history::{HistoryStore, KeyValueStore, PersistOutcome, create_record};
use crate::models::{Generation, QrConfig, RenderFormat};

/// Result of a successful "save to history"
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveReport {
    pub id: String,
    pub outcome: PersistOutcome,
}

pub struct Session<B: KeyValueStore> {
    store: HistoryStore<B>,
}

impl<B: KeyValueStore> Session<B> {
    pub fn new(store: HistoryStore<B>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &HistoryStore<B> {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut HistoryStore<B> {
        &mut self.store
    }

    pub fn into_store(self) -> HistoryStore<B> {
        self.store
    }

    /// Capture the current preview and prepend it to history.
    ///
    /// Returns `Ok(None)` when there is nothing to encode. A missing surface aborts the save
    /// with [`ExportError::SurfaceNotFound`] and leaves the history untouched.
    pub fn save_to_history(
        &mut self,
        config: &QrConfig,
        surfaces: &dyn SurfaceProvider,
    ) -> Result<Option<SaveReport>, ExportError> {
        if config.qr_text().is_empty() {
            debug!("save ignored, nothing to encode");
            return Ok(None);
        }

        let preview_url = match config.generation {
            Generation::Qr => capture_preview(surfaces, config.format)?,
            Generation::Card(_) => capture_surface(surfaces, CARD_QR_SURFACE_ID, RenderFormat::Canvas)?,
        };

        let Some(record) = create_record(config, preview_url) else {
            return Ok(None);
        };

        let id = record.id.clone();
        let outcome = self.store.append(record);
        info!(id = %id, ?outcome, "saved to history");
        Ok(Some(SaveReport { id, outcome }))
    }

    /// Export the current preview in the configured format
    pub fn export_current(
        &self,
        config: &QrConfig,
        surfaces: &dyn SurfaceProvider,
    ) -> Result<Download, ExportError> {
        match config.format {
            RenderFormat::Canvas => export::download_png(surfaces, &config.file_name),
            RenderFormat::Svg => export::download_svg(surfaces, &config.file_name),
        }
    }

    /// Export both sides of the business card. Outside card mode there is no card to export.
    pub fn export_card(
        &self,
        config: &QrConfig,
        surfaces: &dyn SurfaceProvider,
    ) -> Result<Vec<Download>, ExportError> {
        match &config.generation {
            Generation::Card(card) => export::download_card(surfaces, &card_base_name(&config.file_name, card)),
            Generation::Qr => Ok(Vec::new()),
        }
    }

    /// Rebuild the download for a saved record
    pub fn redownload(&self, id: &str) -> Result<Download> {
        let record = self.store.get(id).with_context(|| format!("No history record with id {}", id))?;
        export::redownload(record).with_context(|| format!("Stored preview for {} is unreadable", id))
    }

    pub fn delete(&mut self, id: &str) -> Option<PersistOutcome> {
        self.store.remove(id)
    }
}
