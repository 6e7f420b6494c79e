use serde::{Deserialize, Serialize};

/// Contact details captured in business-card mode
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CardData {
    pub name: String,
    pub role: String,
    pub email: String,
    pub phone: String,
    pub website: String,
}

impl CardData {
    pub fn is_blank(&self) -> bool {
        [&self.name, &self.role, &self.email, &self.phone, &self.website]
            .iter()
            .all(|field| field.trim().is_empty())
    }
}
