//! Business-card mode: MECARD payloads and export naming for the two card sides.

pub mod mecard;

pub use mecard::build_mecard;

use crate::models::CardData;
use crate::utils::sanitize_file_name;

pub const DEFAULT_CARD_NAME: &str = "business-card";

/// Surface id of the QR rendered on the back of the card
pub const CARD_QR_SURFACE_ID: &str = "card-qr-canvas";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardSide {
    Front,
    Back,
}

impl CardSide {
    pub const BOTH: [CardSide; 2] = [CardSide::Front, CardSide::Back];

    /// Id of the bitmap surface holding a capture of this side
    pub fn surface_id(&self) -> &'static str {
        match self {
            CardSide::Front => "card-front",
            CardSide::Back => "card-back",
        }
    }

    pub fn suffix(&self) -> &'static str {
        match self {
            CardSide::Front => "front",
            CardSide::Back => "back",
        }
    }

    pub fn export_name(&self, base: &str) -> String {
        format!("{}-{}.png", base, self.suffix())
    }
}

/// Base download name for card exports: the file name if given, else the person's name
pub fn card_base_name(file_name: &str, card: &CardData) -> String {
    if !file_name.trim().is_empty() {
        return sanitize_file_name(file_name);
    }
    if !card.name.trim().is_empty() {
        return sanitize_file_name(&card.name);
    }
    DEFAULT_CARD_NAME.to_string()
}
