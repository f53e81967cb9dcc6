use axum::{
    http::HeaderValue,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use super::handlers;
use crate::manager::DappManager;

/// CORS from `ALLOWED_ORIGINS`; any origin when unset
///
/// Set ALLOWED_ORIGINS="https://your-app.example,https://preview.example" for production.
fn cors_layer() -> CorsLayer {
    match std::env::var("ALLOWED_ORIGINS") {
        Ok(origins) if !origins.is_empty() => {
            log::info!("CORS configured for origins: {}", origins);
            let origin_list: Vec<HeaderValue> = origins
                .split(',')
                .filter_map(|s| match s.trim().parse() {
                    Ok(origin) => Some(origin),
                    Err(_) => {
                        log::warn!("Ignoring invalid CORS origin: {}", s);
                        None
                    }
                })
                .collect();
            CorsLayer::new()
                .allow_origin(origin_list)
                .allow_methods(Any)
                .allow_headers(Any)
        }
        _ => {
            log::warn!("CORS: Allowing all origins (development mode). Set ALLOWED_ORIGINS env var for production.");
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        }
    }
}

pub fn create_router(manager: Arc<DappManager>) -> Router {
    Router::new()
        .route("/health", get(handlers::health_handler))
        // Session routes
        .route("/api/session", get(handlers::get_session_handler))
        .route("/api/session/connect", post(handlers::connect_handler))
        .route("/api/session/disconnect", post(handlers::disconnect_handler))
        // Balance routes
        .route("/api/balances", get(handlers::get_balances_handler))
        .route(
            "/api/balances/refresh",
            post(handlers::refresh_balances_handler),
        )
        // Transaction routes
        .route("/api/validate", post(handlers::validate_handler))
        .route("/api/tx/send", post(handlers::send_handler))
        .route("/api/tx/mint", post(handlers::mint_handler))
        .route("/api/tx/whitelist", post(handlers::whitelist_handler))
        .route(
            "/api/tx/latest",
            get(handlers::latest_transaction_handler),
        )
        .layer(cors_layer())
        .with_state(manager)
}

pub async fn start_server(addr: &str) -> anyhow::Result<()> {
    let manager = Arc::new(DappManager::new());
    manager.start().await;

    let app = create_router(manager.clone());

    let listener = tokio::net::TcpListener::bind(addr).await?;
    log::info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Handle graceful shutdown signals (Ctrl+C, SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                log::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            log::info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            log::info!("Received SIGTERM signal");
        },
    }

    log::info!("Shutdown signal received, exiting gracefully...");
}
