use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use medibook::api::booking_api_router;
use medibook::config::{self, Config};
use medibook::state::AppState;

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let config = Config::from_env();
    let bind_addr = config.bind_addr;

    let state = match AppState::new(config) {
        Ok(state) => Arc::new(state),
        Err(e) => {
            tracing::error!("Failed to initialize application state: {e}");
            std::process::exit(1);
        }
    };

    let app = booking_api_router(state);

    let listener = match tokio::net::TcpListener::bind(bind_addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!("Failed to bind {bind_addr}: {e}");
            std::process::exit(1);
        }
    };
    tracing::info!("Listening on {bind_addr}");

    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!("Server error: {e}");
        std::process::exit(1);
    }
}
