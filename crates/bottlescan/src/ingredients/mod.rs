mod category;
mod database;
mod label;
mod normalizer;

pub use category::IngredientCategory;
pub use database::{HealthScoreDatabase, IngredientRecord};
pub use label::parse_label_text;
pub use normalizer::IngredientNormalizer;
