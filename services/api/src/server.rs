use crate::cli::ServeArgs;
use crate::infra::{load_catalog, AppState};
use crate::routes::with_service_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use lender_match::config::AppConfig;
use lender_match::error::AppError;
use lender_match::matching::{
    InMemoryApplications, InMemoryMatchResults, LenderCatalog, MatchingEngine,
    UnderwritingError, UnderwritingService,
};
use lender_match::telemetry;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let catalog = Arc::new(load_catalog(config.matching.catalog_path.as_deref())?);
    let engine = MatchingEngine::standard().with_parallel_lenders(config.matching.parallel_lenders);

    let lenders = catalog.lenders().map_err(UnderwritingError::from)?;
    let unknown = engine.registry().unknown_rule_types(&lenders);
    if !unknown.is_empty() {
        warn!(rule_types = ?unknown, "catalog uses rule types without evaluators; they will be skipped");
    }

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
        engine: Arc::new(engine.clone()),
        catalog: catalog.clone(),
    };

    let service = Arc::new(UnderwritingService::new(
        Arc::new(InMemoryApplications::default()),
        catalog,
        Arc::new(InMemoryMatchResults::default()),
        engine,
    ));

    let app = with_service_routes(service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        lenders = lenders.len(),
        parallel = config.matching.parallel_lenders,
        "lender matching service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
