// Presentation layer - HTTP surface over page pollers
pub mod app_state;
pub mod handlers;

use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use app_state::AppState;
use handlers::{get_page, health_check, list_pages};

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(health_check))
        .route("/pages", get(list_pages))
        .route("/pages/:name", get(get_page))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
