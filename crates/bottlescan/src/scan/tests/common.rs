use std::sync::Arc;
use std::thread;
use std::time::Duration;

use axum::http::StatusCode;
use axum::response::Response;
use serde_json::Value;

use crate::config::ScanConfig;
use crate::recommend::{InMemoryCatalog, ProductCatalog, ProductRecord};
use crate::reference::ReferenceData;
use crate::scan::ScanService;
use crate::source::CatalogError;
use crate::substitutes::{SubstituteEntry, SubstituteSource, SubstituteTable};

pub(super) const SEED_PRODUCT: [&str; 7] = [
    "Aqua",
    "Glycerin",
    "Niacinamide",
    "Butylene Glycol",
    "Phenoxyethanol",
    "Parfum",
    "Methylparaben",
];

pub(super) fn reference() -> ReferenceData {
    ReferenceData::bundled().expect("seed datasets load")
}

pub(super) fn scan_config(lookup_timeout: Duration) -> ScanConfig {
    ScanConfig {
        lookup_timeout,
        ..ScanConfig::default()
    }
}

pub(super) fn bundled_service() -> Arc<ScanService<SubstituteTable, InMemoryCatalog>> {
    Arc::new(ScanService::from_reference(
        &reference(),
        scan_config(Duration::from_secs(2)),
    ))
}

pub(super) fn service_with<S, C>(
    substitutes: Arc<S>,
    catalog: Arc<C>,
    lookup_timeout: Duration,
) -> Arc<ScanService<S, C>>
where
    S: SubstituteSource,
    C: ProductCatalog,
{
    let reference = reference();
    Arc::new(ScanService::new(
        reference.version(),
        reference.database(),
        substitutes,
        catalog,
        scan_config(lookup_timeout),
    ))
}

/// Delegates to the seed table after sleeping, to trip the lookup deadline.
pub(super) struct SlowSubstitutes {
    pub(super) delay: Duration,
    pub(super) inner: Arc<SubstituteTable>,
}

impl SlowSubstitutes {
    pub(super) fn new(delay: Duration) -> Self {
        Self {
            delay,
            inner: reference().substitutes(),
        }
    }
}

impl SubstituteSource for SlowSubstitutes {
    fn candidates(&self, canonical_name: &str) -> Result<Vec<SubstituteEntry>, CatalogError> {
        thread::sleep(self.delay);
        self.inner.candidates(canonical_name)
    }
}

pub(super) struct OfflineSubstitutes;

impl SubstituteSource for OfflineSubstitutes {
    fn candidates(&self, _canonical_name: &str) -> Result<Vec<SubstituteEntry>, CatalogError> {
        Err(CatalogError::Unavailable("substitute store offline".to_string()))
    }
}

pub(super) struct SlowCatalog {
    pub(super) delay: Duration,
    pub(super) inner: Arc<InMemoryCatalog>,
}

impl SlowCatalog {
    pub(super) fn new(delay: Duration) -> Self {
        Self {
            delay,
            inner: reference().catalog(),
        }
    }
}

impl ProductCatalog for SlowCatalog {
    fn products(&self) -> Result<Arc<[ProductRecord]>, CatalogError> {
        thread::sleep(self.delay);
        self.inner.products()
    }
}

pub(super) struct OfflineCatalog;

impl ProductCatalog for OfflineCatalog {
    fn products(&self) -> Result<Arc<[ProductRecord]>, CatalogError> {
        Err(CatalogError::Unavailable("catalog offline".to_string()))
    }
}

pub(super) async fn json_body(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&bytes).expect("json body")
}

pub(super) async fn assert_error(response: Response, status: StatusCode) -> Value {
    assert_eq!(response.status(), status);
    let body = json_body(response).await;
    assert!(body["error"].is_string(), "missing error message: {body}");
    body
}
