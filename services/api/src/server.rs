use crate::cli::ServeArgs;
use crate::infra::{build_control, AppState, InMemoryPropertyStore};
use crate::routes::with_operational_routes;
use assessor_ai::config::AppConfig;
use assessor_ai::error::AppError;
use assessor_ai::service::AssessmentService;
use assessor_ai::telemetry;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
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

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let store = Arc::new(InMemoryPropertyStore::default());
    let control = Arc::new(build_control(&config.assessment, store.clone()));
    let service = Arc::new(AssessmentService::new(control.clone(), store));

    let app = with_operational_routes(control, service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        reference_year = config.assessment.reference_year,
        "assessment control program ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
