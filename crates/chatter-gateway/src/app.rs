use axum::{routing::get, Router};
use chatter_core::ChatterConfig;
use chatter_hub::Hub;
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Central shared state — passed as Arc<AppState> to all Axum handlers.
pub struct AppState {
    pub config: ChatterConfig,
    /// Live connections and the broadcast engine.
    pub hub: Hub,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(config: ChatterConfig) -> Self {
        let hub = Hub::new(&config.hub);
        Self {
            config,
            hub,
            started_at: Utc::now(),
        }
    }
}

/// Assemble the full Axum router.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(crate::http::ui::ui_handler))
        .route("/health", get(crate::http::health::health_handler))
        .route("/websocket", get(crate::ws::connection::ws_handler))
        .with_state(state)
        .layer(tower_http::trace::TraceLayer::new_for_http())
}
