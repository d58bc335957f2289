use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::{extract::Request, middleware::Next, response::Response, Extension, Router};
use tower::ServiceBuilder;

use crate::core::disabler::ScriptTiming;
use crate::core::StockEngine;
use crate::utils::error::Result;

pub mod errors;
pub mod routes;

#[derive(Debug, Clone)]
pub struct AppState {
    pub engine: StockEngine,
    pub timing: ScriptTiming,
}

pub fn build_app(engine: StockEngine, timing: ScriptTiming) -> Router {
    let state = Arc::new(AppState { engine, timing });

    Router::new()
        .nest("/admin", routes::admin_router())
        .merge(routes::storefront_router())
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn(log_request))
                .layer(Extension(state)),
        )
}

async fn log_request(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let started = Instant::now();

    let response = next.run(request).await;
    tracing::info!(
        "{} {} -> {} ({:?})",
        method,
        path,
        response.status().as_u16(),
        started.elapsed()
    );
    response
}

pub async fn serve(addr: SocketAddr, app: Router) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("🌐 Listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}
