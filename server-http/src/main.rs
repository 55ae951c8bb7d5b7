use server_http::{build_router, AppState};
use shared::config::Config;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // Load environment variables from .env file (if exists)
    let dotenv_loaded = dotenvy::dotenv().is_ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Starting Compass HTTP Server...");
    if dotenv_loaded {
        info!("Loaded environment variables from .env file");
    } else {
        info!("No .env file found, using system environment variables");
    }

    let config = Config::from_env();

    let state = match AppState::from_config(&config).await {
        Ok(state) => state,
        Err(e) => {
            error!("Failed to initialize server: {}", e);
            std::process::exit(1);
        }
    };

    let router = build_router(state.clone());

    let address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .expect("Failed to bind HTTP listener");

    info!("HTTP Server listening on http://{}", address);
    info!("Try: curl http://localhost:{}/health", config.http_port);

    // Graceful shutdown handler
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("HTTP server error");

    state.search.cache().shutdown().await;
    info!("Server shutdown complete");
}

async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            info!("Received terminate signal");
        },
    }

    info!("Shutting down gracefully...");
}
