use std::net::SocketAddr;
use std::sync::Arc;
use dotenv::dotenv;
use tokio::net::TcpListener;
use tower_http::cors::{CorsLayer, Any};
use tower_http::trace::{self, TraceLayer};
use tracing::{Level, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod router;

use booking_cell::{LogNotifier, SweeperService};
use shared_config::AppConfig;
use shared_store::AppState;

#[tokio::main]
async fn main() {
    // Loading Env Vars
    dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Carebook API server");

    // Load configuration
    let config = AppConfig::from_env();
    if !config.is_configured() {
        warn!("CAREBOOK_JWT_SECRET is not set; authenticated requests will be rejected");
    }
    let port = config.port;

    // Create shared state
    let state = Arc::new(AppState::new(config));

    // The reconciliation sweeper lives and dies with this process.
    let sweeper = SweeperService::new(state.clone(), Arc::new(LogNotifier));
    let _sweeper_handle = sweeper.spawn();

    // Set up CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build the application router
    let app = router::create_router(state)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(trace::DefaultMakeSpan::new()
                    .level(Level::INFO))
                .on_response(trace::DefaultOnResponse::new()
                    .level(Level::INFO)),
        )
        .layer(cors);

    // Run the server
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await.expect("failed to bind port");
    axum::serve(listener, app)
        .await
        .expect("server error");
}
