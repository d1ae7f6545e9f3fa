pub mod search;

use axum::response::Html;
use axum::routing::{get, post};
use axum::Router;

use crate::state::AppState;

/// Routes without transport layers; `main` adds CORS on top.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health))
        .route("/ui", get(serve_ui))
        .route("/search", post(search::search))
        .with_state(state)
}

/// GET / - liveness probe
async fn health() -> &'static str {
    "Game search backend is running"
}

async fn serve_ui() -> Html<&'static str> {
    Html(include_str!("../../static/index.html"))
}
