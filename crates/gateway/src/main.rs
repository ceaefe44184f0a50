//! Wayfarer API Gateway
//!
//! HTTP surface over the query parser and the booking desk.
//! Handles:
//! - Query parsing (single, batch, language-model output)
//! - Flight and hotel bookings
//! - Observability (logging, metrics, request ids)

mod handlers;
mod middleware;

use axum::{middleware::from_fn, routing::{get, post}, Router};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::EnvFilter;
use wayfarer_common::{
    config::{AppConfig, ObservabilityConfig},
    metrics, BookingDesk, QueryParser,
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub parser: Arc<QueryParser>,
    pub desk: Arc<BookingDesk>,
}

impl AppState {
    pub fn from_config(config: AppConfig) -> wayfarer_common::Result<Self> {
        let parser = QueryParser::from_app_config(&config)?;
        let desk = BookingDesk::new(config.booking.clone());

        Ok(Self {
            config: Arc::new(config),
            parser: Arc::new(parser),
            desk: Arc::new(desk),
        })
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Load configuration
    let config = AppConfig::load()?;

    init_tracing(&config.observability);
    info!(
        service = %config.observability.service_name,
        "Starting Wayfarer API Gateway v{}",
        wayfarer_common::VERSION
    );

    // Initialize metrics
    if config.observability.metrics_port != 0 {
        let addr = SocketAddr::from(([0, 0, 0, 0], config.observability.metrics_port));
        PrometheusBuilder::new()
            .set_buckets(metrics::LATENCY_BUCKETS)?
            .with_http_listener(addr)
            .install()?;
        info!(%addr, "Prometheus exporter listening");
    }
    metrics::register_metrics();

    let state = AppState::from_config(config).map_err(|e| {
        tracing::error!(error = %e, "Failed to build query parser");
        e
    })?;

    info!(
        strategy = state.parser.strategy().as_str(),
        entities = state.parser.recognizer_backend(),
        dates = state.parser.date_search_backend(),
        gazetteer_entries = state.parser.config().gazetteer.len(),
        "Query parser ready"
    );

    let addr: SocketAddr = format!("{}:{}", state.config.server.host, state.config.server.port).parse()?;

    // Build the router
    let app = create_router(state);

    // Start the server
    info!("Listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

fn init_tracing(config: &ObservabilityConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(true);
    if config.json_logging {
        builder.json().init();
    } else {
        builder.pretty().init();
    }
}

/// Create the main application router
fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Request ID propagation
    let request_id = SetRequestIdLayer::x_request_id(MakeRequestUuid);
    let propagate_id = PropagateRequestIdLayer::x_request_id();

    let timeout = TimeoutLayer::new(state.config.request_timeout());

    // API routes
    let api_routes = Router::new()
        // Parsing
        .route("/parse", post(handlers::parse::parse))
        .route("/parse/batch", post(handlers::parse::parse_batch))
        .route("/parse/structured", post(handlers::parse::parse_structured))

        // Bookings
        .route("/bookings/flight", post(handlers::bookings::book_flight))
        .route("/bookings/hotel", post(handlers::bookings::book_hotel))
        .route_layer(from_fn(middleware::metrics::track_requests));

    // Compose the app
    Router::new()
        // Health endpoints
        .route("/health", get(handlers::health::health))
        .route("/ready", get(handlers::health::ready))
        .nest("/v1", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(timeout)
        .layer(cors)
        .layer(request_id)
        .layer(propagate_id)
        .with_state(state)
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, starting shutdown..."),
        _ = terminate => info!("Received SIGTERM, starting shutdown..."),
    }
}
