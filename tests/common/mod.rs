//! Shared test utilities for integration tests
#![allow(dead_code)]

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::DateTime;
use image::{Rgba, RgbaImage};
use qr_keeper::export::{MountedSurfaces, Surface};
use qr_keeper::history::{DEFAULT_STORAGE_KEY, KeyValueStore, StoreError};
use qr_keeper::models::{HistoryRecord, RecordOrigin, RenderFormat};
use tempfile::TempDir;

pub const SAMPLE_SVG: &str =
    r##"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 21 21"><path fill="#000" d="M0 0h7v7H0z"/></svg>"##;

/// Builder for a data directory holding a persisted history file
pub struct HistoryDirBuilder {
    temp_dir: TempDir,
}

impl HistoryDirBuilder {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        Self { temp_dir }
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Write raw contents to the history key file
    pub fn with_history(self, content: &str) -> Self {
        let path = self.temp_dir.path().join(format!("{}.json", DEFAULT_STORAGE_KEY));
        fs::write(path, content).expect("Failed to write history file");
        self
    }

    /// Write records as a legacy bare JSON array
    pub fn with_records(self, records: &[RecordBuilder]) -> Self {
        let records: Vec<HistoryRecord> = records.iter().map(RecordBuilder::build).collect();
        let content = serde_json::to_string(&records).expect("Failed to serialize records");
        self.with_history(&content)
    }

    /// Drop a rendered surface file next to the store
    pub fn with_svg_surface(self, name: &str) -> Self {
        fs::write(self.temp_dir.path().join(name), SAMPLE_SVG).expect("Failed to write svg");
        self
    }

    pub fn with_png_surface(self, name: &str, size: u32) -> Self {
        checker(size).save(self.temp_dir.path().join(name)).expect("Failed to write png");
        self
    }

    pub fn file(&self, name: &str) -> PathBuf {
        self.temp_dir.path().join(name)
    }

    pub fn build(self) -> TempDir {
        self.temp_dir
    }
}

impl Default for HistoryDirBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for history records
pub struct RecordBuilder {
    id: String,
    text: String,
    file_name: String,
    format: RenderFormat,
    size: u32,
    preview_url: String,
    saved_at_millis: i64,
}

impl RecordBuilder {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            text: format!("https://example.com/{}", id),
            file_name: "qr-code".to_string(),
            format: RenderFormat::Svg,
            size: 200,
            preview_url: qr_keeper::export::serializer::svg_data_url(SAMPLE_SVG),
            saved_at_millis: 1_718_000_000_000,
        }
    }

    pub fn text(mut self, text: &str) -> Self {
        self.text = text.to_string();
        self
    }

    pub fn file_name(mut self, file_name: &str) -> Self {
        self.file_name = file_name.to_string();
        self
    }

    /// Pad the preview so the record takes roughly `bytes` of storage
    pub fn padded_to(mut self, bytes: usize) -> Self {
        let padding = bytes.saturating_sub(self.preview_url.len());
        self.preview_url.push_str(&"A".repeat(padding));
        self
    }

    pub fn build(&self) -> HistoryRecord {
        HistoryRecord {
            id: self.id.clone(),
            text: self.text.clone(),
            file_name: self.file_name.clone(),
            format: self.format,
            size: self.size,
            preview_url: self.preview_url.clone(),
            origin: RecordOrigin::Qr,
            saved_at: DateTime::from_timestamp_millis(self.saved_at_millis).expect("valid timestamp"),
        }
    }
}

/// Store that reports quota exhaustion whenever a write holds more than `max_records` records.
/// With `backend_error` set, writes that fit the limit fail with that backend error instead.
#[derive(Debug, Default)]
pub struct RecordLimitStore {
    pub entries: HashMap<String, String>,
    pub max_records: usize,
    pub attempts: Vec<usize>,
    pub backend_error: Option<String>,
}

impl RecordLimitStore {
    pub fn new(max_records: usize) -> Self {
        Self { max_records, ..Self::default() }
    }

    pub fn persisted_len(&self) -> Option<usize> {
        self.entries.get(DEFAULT_STORAGE_KEY).map(|raw| record_count(raw))
    }
}

impl KeyValueStore for RecordLimitStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        let count = record_count(value);
        self.attempts.push(count);
        if count > self.max_records {
            return Err(StoreError::QuotaExceeded { needed: count as u64, quota: self.max_records as u64 });
        }
        if let Some(message) = &self.backend_error {
            return Err(StoreError::Backend(message.clone()));
        }
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.entries.remove(key);
        Ok(())
    }
}

fn record_count(raw: &str) -> usize {
    let value: serde_json::Value = serde_json::from_str(raw).expect("store only sees valid JSON");
    value["records"].as_array().map(Vec::len).unwrap_or(0)
}

pub fn checker(size: u32) -> RgbaImage {
    RgbaImage::from_fn(size, size, |x, y| {
        if (x / 7 + y / 7) % 2 == 0 { Rgba([0, 0, 0, 255]) } else { Rgba([255, 255, 255, 255]) }
    })
}

pub fn svg_surfaces() -> MountedSurfaces {
    let mut surfaces = MountedSurfaces::new();
    surfaces.mount_preview(Surface::Vector(SAMPLE_SVG.to_string()));
    surfaces
}

pub fn canvas_surfaces(size: u32) -> MountedSurfaces {
    let mut surfaces = MountedSurfaces::new();
    surfaces.mount_preview(Surface::Bitmap(checker(size)));
    surfaces
}
