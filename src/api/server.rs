// src/api/server.rs
//! Router assembly and the serving loop.

use super::handlers;
use crate::core::query::QueryEngine;
use axum::routing::{get, post};
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

/// Builds the router with every route mounted under `prefix`, which is
/// either empty or starts with `/` and has no trailing slash.
pub fn router(engine: Arc<QueryEngine>, prefix: &str) -> Router {
    let mut app = Router::new();
    for (name, route) in [
        ("get.similar.keywords", get(handlers::similar_keywords)),
        ("get.similar.keywords.from.vector", post(handlers::similar_keywords_from_vector)),
        ("get.word.vector", get(handlers::word_vector)),
        ("get.similarity.score", get(handlers::similarity_score)),
    ] {
        app = app
            .route(&format!("{prefix}/{name}"), route.clone())
            .route(&format!("{prefix}/{name}/"), route);
    }
    app.layer(CorsLayer::permissive()).with_state(engine)
}

/// Serves `engine` on `addr` until Ctrl-C.
pub async fn serve(engine: Arc<QueryEngine>, addr: SocketAddr, prefix: &str) -> crate::Result<()> {
    let app = router(engine, prefix);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(addr = %listener.local_addr()?, prefix, "listening");
    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;
    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "cannot listen for Ctrl-C; shutdown only by termination");
        std::future::pending::<()>().await;
    }
    info!("shutdown requested");
}
