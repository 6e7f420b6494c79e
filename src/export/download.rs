use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::debug;

use super::ExportError;
use super::serializer::{bitmap_surface, decode_data_url, encode_png, vector_surface};
use super::surface::{CANVAS_SURFACE_ID, SVG_SURFACE_ID, SurfaceProvider};
use crate::card::CardSide;
use crate::models::HistoryRecord;
use crate::utils::sanitize_file_name;

/// A file ready to hand to the host for saving
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Download {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl Download {
    /// Write the artifact into `dir`, creating it if needed
    pub fn write_to(&self, dir: &Path) -> Result<PathBuf> {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create output directory: {}", dir.display()))?;

        let path = dir.join(&self.file_name);
        fs::write(&path, &self.bytes).with_context(|| format!("Failed to write {}", path.display()))?;
        debug!(path = %path.display(), bytes = self.bytes.len(), "wrote download");
        Ok(path)
    }
}

/// Export the canvas preview as `<name>.png`
pub fn download_png(provider: &dyn SurfaceProvider, file_name: &str) -> Result<Download, ExportError> {
    let bytes = encode_png(bitmap_surface(provider, CANVAS_SURFACE_ID)?)?;
    Ok(Download {
        file_name: format!("{}.png", sanitize_file_name(file_name)),
        mime_type: "image/png".to_string(),
        bytes,
    })
}

/// Export the vector preview as `<name>.svg` holding the raw markup
pub fn download_svg(provider: &dyn SurfaceProvider, file_name: &str) -> Result<Download, ExportError> {
    let markup = vector_surface(provider, SVG_SURFACE_ID)?;
    Ok(Download {
        file_name: format!("{}.svg", sanitize_file_name(file_name)),
        mime_type: "image/svg+xml".to_string(),
        bytes: markup.as_bytes().to_vec(),
    })
}

/// Rebuild the file for a saved record from its stored preview
pub fn redownload(record: &HistoryRecord) -> Result<Download, ExportError> {
    let (mime_type, bytes) = decode_data_url(&record.preview_url)?;
    Ok(Download {
        file_name: format!("{}.{}", sanitize_file_name(&record.file_name), record.format.extension()),
        mime_type,
        bytes,
    })
}

/// Export one side of the business card from its captured bitmap
pub fn download_card_side(
    provider: &dyn SurfaceProvider,
    side: CardSide,
    base_name: &str,
) -> Result<Download, ExportError> {
    let bytes = encode_png(bitmap_surface(provider, side.surface_id())?)?;
    Ok(Download { file_name: side.export_name(base_name), mime_type: "image/png".to_string(), bytes })
}

/// Export front then back. Fails without producing anything if either side is missing.
pub fn download_card(provider: &dyn SurfaceProvider, base_name: &str) -> Result<Vec<Download>, ExportError> {
    CardSide::BOTH.iter().map(|side| download_card_side(provider, *side, base_name)).collect()
}
