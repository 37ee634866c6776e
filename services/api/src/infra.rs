use bottlescan::config::ScanConfig;
use bottlescan::recommend::InMemoryCatalog;
use bottlescan::reference::ReferenceData;
use bottlescan::scan::ScanService;
use bottlescan::substitutes::SubstituteTable;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

pub(crate) type BundledScanService = ScanService<SubstituteTable, InMemoryCatalog>;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
    pub(crate) dataset_version: Arc<str>,
}

pub(crate) fn scan_service(reference: &ReferenceData, config: ScanConfig) -> Arc<BundledScanService> {
    Arc::new(ScanService::from_reference(reference, config))
}
