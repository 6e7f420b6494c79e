use thiserror::Error;

use super::card::CardData;
use super::record::RenderFormat;
use crate::card::build_mecard;
use crate::utils::DEFAULT_FILE_NAME;

pub const MIN_SIZE: u32 = 120;
pub const MAX_SIZE: u32 = 512;
pub const DEFAULT_SIZE: u32 = 200;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("QR size must be between {min} and {max} px, got {size}")]
    SizeOutOfRange { size: u32, min: u32, max: u32 },
}

/// What the user is generating
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Generation {
    #[default]
    Qr,
    Card(CardData),
}

/// Snapshot of the generator form at the moment a save or export is triggered
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QrConfig {
    pub text: String,
    pub format: RenderFormat,
    size: u32,
    pub file_name: String,
    pub generation: Generation,
}

impl QrConfig {
    pub fn new(text: impl Into<String>, format: RenderFormat, size: u32) -> Result<Self, ConfigError> {
        if !(MIN_SIZE..=MAX_SIZE).contains(&size) {
            return Err(ConfigError::SizeOutOfRange { size, min: MIN_SIZE, max: MAX_SIZE });
        }

        Ok(Self {
            text: text.into(),
            format,
            size,
            file_name: DEFAULT_FILE_NAME.to_string(),
            generation: Generation::Qr,
        })
    }

    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = file_name.into();
        self
    }

    pub fn with_card(mut self, card: CardData) -> Self {
        self.generation = Generation::Card(card);
        self
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    /// Content that ends up encoded in the symbol.
    ///
    /// In card mode explicit text wins when it is non-blank, otherwise the contact details are
    /// encoded as a MECARD payload.
    pub fn qr_text(&self) -> String {
        match &self.generation {
            Generation::Qr => self.text.clone(),
            Generation::Card(card) => {
                let explicit = self.text.trim();
                if explicit.is_empty() { build_mecard(card) } else { explicit.to_string() }
            }
        }
    }

    /// Format of the surface a history save captures. The card's QR is always a canvas.
    pub fn capture_format(&self) -> RenderFormat {
        match self.generation {
            Generation::Qr => self.format,
            Generation::Card(_) => RenderFormat::Canvas,
        }
    }
}
