/// Axum HTTP server setup and routing

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::chain::SharedChain;
use crate::handlers::*;

pub fn create_router(chain: SharedChain) -> Router {
    // Browser dApps call the node directly
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // JSON-RPC
        .route("/", post(json_rpc))

        // Health check
        .route("/health", get(health_check))

        // Mock controls
        .route("/mock/revoke", post(revoke_access))
        .route("/mock/chain", post(switch_chain))
        .route("/mock/reject-next", post(reject_next))

        // Shared state
        .with_state(chain)

        // Middleware
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

pub async fn run_server(chain: SharedChain, host: String, port: u16) -> anyhow::Result<()> {
    let app = create_router(chain);

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    log::info!("🚀 EVM mock node listening on http://{}", addr);
    log::info!("🔧 Controls: POST /mock/revoke, /mock/chain, /mock/reject-next");

    axum::serve(listener, app).await?;

    Ok(())
}
