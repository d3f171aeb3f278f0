//! API server implementation

use axum::{
    routing::{get, post},
    Router,
};
use parapet_core::{ParapetConfig, Result};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, TraceLayer},
};
use tracing::info;

use crate::routes;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ParapetConfig>,
}

/// Policy analyzer HTTP server
pub struct ApiServer {
    config: ParapetConfig,
}

impl ApiServer {
    pub fn new(config: ParapetConfig) -> Self {
        Self { config }
    }

    pub async fn run(self) -> Result<()> {
        let addr = format!(
            "{}:{}",
            self.config.server.bind_address, self.config.server.port
        );

        let state = AppState {
            config: Arc::new(self.config),
        };
        let app = create_router(state);

        let listener = TcpListener::bind(&addr).await?;

        info!("Parapet API server listening on http://{}", addr);
        info!("POST /analyze to inspect a policy, POST /apply to rewrite one");

        axum::serve(listener, app).await?;
        Ok(())
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(routes::healthz))
        .route("/analyze", post(routes::analyze))
        .route("/apply", post(routes::apply))
        .layer(TraceLayer::new_for_http().make_span_with(DefaultMakeSpan::default()))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
