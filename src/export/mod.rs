//! Turning rendered surfaces into portable data.
//!
//! The QR renderer mounts its output as a [`Surface`] under a stable id. This module reads
//! those surfaces (never mutating them) and produces either preview data URLs for history
//! records or [`Download`] artifacts for the host to save.

pub mod download;
pub mod serializer;
pub mod surface;

pub use download::{Download, download_card, download_card_side, download_png, download_svg, redownload};
pub use serializer::{
    PNG_DATA_URL_PREFIX, SVG_DATA_URL_PREFIX, capture_preview, capture_surface, decode_data_url,
};
pub use surface::{
    CANVAS_SURFACE_ID, MountedSurfaces, SVG_SURFACE_ID, Surface, SurfaceProvider, load_surface_file,
    surface_id,
};

use thiserror::Error;

use crate::models::RenderFormat;

#[derive(Debug, Error)]
pub enum ExportError {
    /// The expected rendering surface is not mounted; the action must be aborted
    #[error("{format} export needs a {format} surface mounted at '{surface_id}'; switch the render mode to {format}")]
    SurfaceNotFound { format: RenderFormat, surface_id: String },

    #[error("Failed to encode image: {0}")]
    Encode(#[from] image::ImageError),

    #[error("Invalid data URL: {0}")]
    InvalidDataUrl(String),

    #[error("Invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),
}
