use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemoryAuthGateway, InMemoryWillRepository};
use crate::routes::with_will_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use milegado::config::{AppConfig, GatewayConfig};
use milegado::error::AppError;
use milegado::telemetry;
use milegado::workflows::testament::service::WillService;
use milegado::workflows::testament::supabase::{
    SupabaseAuthClient, SupabaseClient, SupabaseWillRepository,
};
use std::sync::atomic::Ordering;
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

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let routes = match &config.gateway {
        GatewayConfig::InMemory => {
            warn!("no hosted database configured; wills and accounts live in memory only");
            let service = Arc::new(WillService::new(Arc::new(
                InMemoryWillRepository::default(),
            )));
            with_will_routes(service, Arc::new(InMemoryAuthGateway::default()))
        }
        GatewayConfig::Supabase(gateway) => {
            info!(url = %gateway.url, "using hosted will store");
            let client = SupabaseClient::new(gateway);
            let service = Arc::new(WillService::new(Arc::new(SupabaseWillRepository::new(
                client.clone(),
            ))));
            with_will_routes(service, Arc::new(SupabaseAuthClient::new(client)))
        }
    };

    let app = routes
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "will drafting service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
