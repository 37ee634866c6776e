//! Ingredient health analysis for scanned cosmetic labels.
//!
//! Raw ingredient strings are normalized against a reference database, scored,
//! and the concerning ones are paired with healthier substitute ingredients and
//! whole-product alternatives that suit the shopper's skin profile.

pub mod config;
pub mod error;
pub mod ingredients;
pub mod recommend;
pub mod reference;
pub mod scan;
pub mod scoring;
pub mod source;
pub mod substitutes;
pub mod telemetry;
