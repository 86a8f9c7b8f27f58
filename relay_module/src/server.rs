use std::net::{IpAddr, SocketAddr};

use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use tracing::info;

use crate::BoxError;

/// Liveness routes. Stateless, so it never coordinates with the gateway client.
pub fn health_router() -> Router {
    Router::new()
        .route("/", get(health))
        .route("/health", get(health))
}

pub async fn run_health_server(
    host: &str,
    port: u16,
    shutdown: impl std::future::Future<Output = ()> + Send + 'static,
) -> Result<(), BoxError> {
    let host: IpAddr = host
        .parse()
        .map_err(|_| format!("invalid host: {}", host))?;
    let addr = SocketAddr::new(host, port);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("health server listening on {}", addr);

    axum::serve(listener, health_router())
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}

async fn health() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}
