use crate::cli::ServeArgs;
use crate::infra::{scan_service, AppState};
use crate::routes::with_service_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use bottlescan::config::AppConfig;
use bottlescan::error::AppError;
use bottlescan::reference::ReferenceData;
use bottlescan::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }
    if let Some(dir) = args.data_dir.take() {
        config.datasets.data_dir = Some(dir);
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));

    let reference = ReferenceData::load(&config.datasets)?;
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
        dataset_version: Arc::from(reference.version()),
    };
    let service = scan_service(&reference, config.scan);

    let app = with_service_routes(service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        lookup_timeout_ms = config.scan.lookup_timeout.as_millis() as u64,
        "bottlescan service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
