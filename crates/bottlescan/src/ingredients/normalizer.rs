use super::database::HealthScoreDatabase;
use std::sync::Arc;

/// Lower-cases, trims, and strips trailing punctuation from an OCR token.
/// Byte-order marks and zero-width spaces that survive OCR are dropped and
/// inner whitespace runs collapse to a single space.
pub(crate) fn normalize_token(value: &str) -> String {
    let cleaned = value.replace(['\u{feff}', '\u{200b}'], "");
    let collapsed = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");
    let stripped = collapsed.trim_end_matches(|c: char| {
        c.is_whitespace() || (c.is_ascii_punctuation() && !matches!(c, ')' | ']' | '%'))
    });
    stripped.to_lowercase()
}

/// Maps raw ingredient tokens to canonical INCI-style names.
#[derive(Debug, Clone)]
pub struct IngredientNormalizer {
    database: Arc<HealthScoreDatabase>,
}

impl IngredientNormalizer {
    pub fn new(database: Arc<HealthScoreDatabase>) -> Self {
        Self { database }
    }

    /// Never fails: a token that matches no alias is its own canonical name.
    pub fn normalize(&self, raw: &str) -> String {
        let token = normalize_token(raw);
        match self.database.canonical_for_alias(&token) {
            Some(canonical) => canonical.to_string(),
            None => token,
        }
    }
}
