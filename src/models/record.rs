use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::card::CardData;

/// Which rendering surface produced a preview
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderFormat {
    /// Bitmap-backed surface, exported as PNG
    Canvas,
    /// Vector-backed surface, exported as SVG markup
    Svg,
}

impl RenderFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            RenderFormat::Canvas => "canvas",
            RenderFormat::Svg => "svg",
        }
    }

    /// File extension used for downloads
    pub fn extension(&self) -> &'static str {
        match self {
            RenderFormat::Canvas => "png",
            RenderFormat::Svg => "svg",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            RenderFormat::Canvas => "image/png",
            RenderFormat::Svg => "image/svg+xml",
        }
    }
}

impl fmt::Display for RenderFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RenderFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "canvas" | "png" => Ok(RenderFormat::Canvas),
            "svg" => Ok(RenderFormat::Svg),
            other => Err(format!("unknown render format {:?} (expected canvas or svg)", other)),
        }
    }
}

/// Generation mode tag, as shown in listings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationMode {
    Qr,
    Card,
}

impl fmt::Display for GenerationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenerationMode::Qr => f.write_str("qr"),
            GenerationMode::Card => f.write_str("card"),
        }
    }
}

/// How a record was produced. Card records carry the contact details they were built from.
///
/// Persisted inline with the record as `"mode": "qr"` or `"mode": "card", "cardData": {..}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum RecordOrigin {
    Qr,
    Card {
        #[serde(rename = "cardData")]
        card_data: CardData,
    },
}

/// One saved generation. Never mutated after the factory builds it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryRecord {
    #[serde(deserialize_with = "crate::models::deserializers::deserialize_record_id")]
    pub id: String,
    pub text: String,
    pub file_name: String,
    pub format: RenderFormat,
    #[serde(deserialize_with = "crate::models::deserializers::deserialize_record_size")]
    pub size: u32,
    pub preview_url: String,
    #[serde(flatten)]
    pub origin: RecordOrigin,
    #[serde(
        serialize_with = "crate::models::deserializers::serialize_timestamp",
        deserialize_with = "crate::models::deserializers::deserialize_timestamp"
    )]
    pub saved_at: DateTime<Utc>,
}

impl HistoryRecord {
    pub fn mode(&self) -> GenerationMode {
        match self.origin {
            RecordOrigin::Qr => GenerationMode::Qr,
            RecordOrigin::Card { .. } => GenerationMode::Card,
        }
    }

    pub fn card_data(&self) -> Option<&CardData> {
        match &self.origin {
            RecordOrigin::Qr => None,
            RecordOrigin::Card { card_data } => Some(card_data),
        }
    }

    /// File name used when re-downloading the stored preview
    pub fn download_name(&self) -> String {
        format!("{}.{}", self.file_name, self.format.extension())
    }
}
