use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use image::RgbaImage;

use crate::models::RenderFormat;

/// Surface id of the bitmap-backed QR preview
pub const CANVAS_SURFACE_ID: &str = "qr-canvas";
/// Surface id of the vector-backed QR preview
pub const SVG_SURFACE_ID: &str = "qr-svg";

/// A live rendered graphic handed over by the QR renderer
#[derive(Debug, Clone, PartialEq)]
pub enum Surface {
    Bitmap(RgbaImage),
    /// Serialized SVG markup
    Vector(String),
}

impl Surface {
    pub fn format(&self) -> RenderFormat {
        match self {
            Surface::Bitmap(_) => RenderFormat::Canvas,
            Surface::Vector(_) => RenderFormat::Svg,
        }
    }
}

/// Where the serializer looks up mounted surfaces by stable id
pub trait SurfaceProvider {
    fn surface(&self, id: &str) -> Option<&Surface>;
}

/// Stable id under which the preview for `format` is mounted
pub fn surface_id(format: RenderFormat) -> &'static str {
    match format {
        RenderFormat::Canvas => CANVAS_SURFACE_ID,
        RenderFormat::Svg => SVG_SURFACE_ID,
    }
}

/// Simple id -> surface registry
#[derive(Debug, Default, Clone)]
pub struct MountedSurfaces {
    surfaces: HashMap<String, Surface>,
}

impl MountedSurfaces {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mount `surface` under `id`, returning whatever was mounted there before
    pub fn mount(&mut self, id: impl Into<String>, surface: Surface) -> Option<Surface> {
        self.surfaces.insert(id.into(), surface)
    }

    /// Mount a QR preview under the id matching its own format
    pub fn mount_preview(&mut self, surface: Surface) -> Option<Surface> {
        let id = surface_id(surface.format());
        self.mount(id, surface)
    }

    pub fn unmount(&mut self, id: &str) -> Option<Surface> {
        self.surfaces.remove(id)
    }

    pub fn is_empty(&self) -> bool {
        self.surfaces.is_empty()
    }
}

impl SurfaceProvider for MountedSurfaces {
    fn surface(&self, id: &str) -> Option<&Surface> {
        self.surfaces.get(id)
    }
}

/// Load a pre-rendered surface from disk: `.png` as a bitmap, `.svg` as vector markup
pub fn load_surface_file(path: &Path) -> Result<Surface> {
    let extension =
        path.extension().and_then(|e| e.to_str()).map(|e| e.to_ascii_lowercase()).unwrap_or_default();

    match extension.as_str() {
        "png" => {
            let image = image::open(path)
                .with_context(|| format!("Failed to decode PNG surface: {}", path.display()))?;
            Ok(Surface::Bitmap(image.to_rgba8()))
        }
        "svg" => {
            let markup = fs::read_to_string(path)
                .with_context(|| format!("Failed to read SVG surface: {}", path.display()))?;
            if !markup.contains("<svg") {
                bail!("File does not contain SVG markup: {}", path.display());
            }
            Ok(Surface::Vector(markup))
        }
        _ => bail!("Unsupported surface file (expected .png or .svg): {}", path.display()),
    }
}
