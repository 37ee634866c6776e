use serde::{Deserialize, Serialize};

/// Safety band an ingredient (or a whole product score) falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IngredientCategory {
    Beneficial,
    Neutral,
    Concerning,
    Avoid,
}

impl IngredientCategory {
    /// Score bands: 76 and up, 51 and up, 26 and up, everything below.
    pub fn from_score(score: u8) -> Self {
        match score {
            76..=u8::MAX => Self::Beneficial,
            51..=75 => Self::Neutral,
            26..=50 => Self::Concerning,
            _ => Self::Avoid,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Beneficial => "beneficial",
            Self::Neutral => "neutral",
            Self::Concerning => "concerning",
            Self::Avoid => "avoid",
        }
    }

    /// Shopper-facing reading of a product-level score in this band.
    pub fn interpretation(&self) -> &'static str {
        match self {
            Self::Beneficial => "Healthy / Preferred",
            Self::Neutral => "Generally Okay",
            Self::Concerning => "Use with Caution",
            Self::Avoid => "Avoid",
        }
    }

    pub(crate) fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "beneficial" => Some(Self::Beneficial),
            "neutral" => Some(Self::Neutral),
            "concerning" => Some(Self::Concerning),
            "avoid" => Some(Self::Avoid),
            _ => None,
        }
    }
}
