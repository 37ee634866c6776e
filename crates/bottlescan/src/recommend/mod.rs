//! Whole-product alternatives for a scanned product.
//!
//! The catalog is an external data source reached through [`ProductCatalog`];
//! the bundled [`InMemoryCatalog`] serves the seed dataset.

mod catalog;
mod profile;
mod ranking;
mod recommender;

pub use catalog::{InMemoryCatalog, ProductCatalog, ProductRecord};
pub use profile::{ProfileError, SkinProfile};
pub use recommender::{ProductCandidate, ProductRecommender, RecommendError};
