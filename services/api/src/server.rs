use crate::cli::ServeArgs;
use crate::infra::{seed_demo_directory, AppState};
use crate::routes::with_service_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tell_matching::config::AppConfig;
use tell_matching::error::AppError;
use tell_matching::matching::{
    matching_router, BatchCoordinator, InMemoryMatchStore, MatchingDirectory, MatchingService,
};
use tell_matching::telemetry;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let directory = Arc::new(seed_demo_directory(None));
    let store = Arc::new(InMemoryMatchStore::default());
    let matching_service = Arc::new(MatchingService::new(
        directory.clone(),
        store,
        &config.matching,
    ));
    let batches = BatchCoordinator::new(matching_service.clone(), config.matching.batch_workers);

    let app = with_service_routes(matching_router(matching_service, batches))
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        mentors = directory.mentor_count(),
        users = directory.user_ids().map(|ids| ids.len()).unwrap_or_default(),
        workers = config.matching.batch_workers,
        "mentor matching service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
