//! End-to-end scan pipeline: scoring, then substitute lookups and product
//! recommendations run concurrently under a shared deadline.
//!
//! Lookup stages degrade instead of failing. A timed-out or unreachable data
//! source yields an empty sub-result tagged with its [`SourceStatus`], while
//! the ingredient analysis is always returned.
//!
//! [`SourceStatus`]: crate::source::SourceStatus

pub mod report;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use report::{
    AlternativeIngredient, FlaggedSubstitutes, IngredientAlternatives, ProductRecommendations,
    ScanReport, SuggestedSubstitutes,
};
pub use router::scan_router;
pub use service::{ScanError, ScanRequest, ScanService};
