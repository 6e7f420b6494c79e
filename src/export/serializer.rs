use std::io::Cursor;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::{ImageFormat, RgbaImage};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};

use super::ExportError;
use super::surface::{Surface, SurfaceProvider, surface_id};
use crate::models::RenderFormat;

pub const PNG_DATA_URL_PREFIX: &str = "data:image/png;base64,";
pub const SVG_DATA_URL_PREFIX: &str = "data:image/svg+xml;charset=utf-8,";

// Same set `encodeURIComponent` leaves alone: alphanumerics and - _ . ! ~ * ' ( )
const COMPONENT_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Serialize the mounted preview for `format` into a self-contained data URL.
///
/// # Errors
///
/// Returns [`ExportError::SurfaceNotFound`] when no surface of the requested kind is mounted,
/// and [`ExportError::Encode`] if PNG encoding fails.
pub fn capture_preview(provider: &dyn SurfaceProvider, format: RenderFormat) -> Result<String, ExportError> {
    capture_surface(provider, surface_id(format), format)
}

/// Serialize the surface mounted at `id`, which must be of kind `format`
pub fn capture_surface(
    provider: &dyn SurfaceProvider,
    id: &str,
    format: RenderFormat,
) -> Result<String, ExportError> {
    match format {
        RenderFormat::Canvas => {
            let bytes = encode_png(bitmap_surface(provider, id)?)?;
            Ok(png_data_url(&bytes))
        }
        RenderFormat::Svg => Ok(svg_data_url(vector_surface(provider, id)?)),
    }
}

pub(crate) fn bitmap_surface<'a>(
    provider: &'a dyn SurfaceProvider,
    id: &str,
) -> Result<&'a RgbaImage, ExportError> {
    match provider.surface(id) {
        Some(Surface::Bitmap(image)) => Ok(image),
        _ => Err(ExportError::SurfaceNotFound { format: RenderFormat::Canvas, surface_id: id.to_string() }),
    }
}

pub(crate) fn vector_surface<'a>(provider: &'a dyn SurfaceProvider, id: &str) -> Result<&'a str, ExportError> {
    match provider.surface(id) {
        Some(Surface::Vector(markup)) => Ok(markup),
        _ => Err(ExportError::SurfaceNotFound { format: RenderFormat::Svg, surface_id: id.to_string() }),
    }
}

/// Encode a bitmap as PNG at its native resolution
pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>, ExportError> {
    let mut cursor = Cursor::new(Vec::new());
    image.write_to(&mut cursor, ImageFormat::Png)?;
    Ok(cursor.into_inner())
}

pub fn png_data_url(png: &[u8]) -> String {
    format!("{}{}", PNG_DATA_URL_PREFIX, STANDARD.encode(png))
}

pub fn svg_data_url(markup: &str) -> String {
    format!("{}{}", SVG_DATA_URL_PREFIX, utf8_percent_encode(markup, COMPONENT_ENCODE_SET))
}

/// Split a data URL into its media type and decoded payload
pub fn decode_data_url(url: &str) -> Result<(String, Vec<u8>), ExportError> {
    let rest = url
        .strip_prefix("data:")
        .ok_or_else(|| ExportError::InvalidDataUrl("missing data: scheme".to_string()))?;
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| ExportError::InvalidDataUrl("missing ',' separator".to_string()))?;

    let mut params = header.split(';');
    let mime_type = params.next().filter(|m| !m.is_empty()).unwrap_or("text/plain").to_string();
    let is_base64 = params.any(|p| p.eq_ignore_ascii_case("base64"));

    let bytes = if is_base64 {
        STANDARD.decode(payload)?
    } else {
        percent_decode_str(payload).collect()
    };

    Ok((mime_type, bytes))
}
