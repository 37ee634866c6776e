//! Shared vocabulary for the external data sources (substitute table, product
//! catalog) that back the lookup stages of a scan.

use serde::Serialize;
use std::time::Duration;

/// Failure to reach a reference data source.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    #[error("data source unavailable: {0}")]
    Unavailable(String),
    #[error("data source did not answer within {}ms", .0.as_millis())]
    TimedOut(Duration),
}

/// Annotation attached to every degradable sub-result so callers can tell an
/// empty match list apart from a data source that could not be consulted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SourceStatus {
    Available,
    Unavailable { reason: String },
    Skipped { reason: String },
}

impl SourceStatus {
    pub fn is_available(&self) -> bool {
        matches!(self, SourceStatus::Available)
    }

    pub(crate) fn unavailable(error: &CatalogError) -> Self {
        SourceStatus::Unavailable {
            reason: error.to_string(),
        }
    }

    pub(crate) fn skipped(reason: &str) -> Self {
        SourceStatus::Skipped {
            reason: reason.to_string(),
        }
    }
}
