//! HTTP route definitions.

use std::sync::Arc;

use axum::{
    routing::{get, patch, post},
    Router,
};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::http::{messages, monitoring, tasks, users};
use crate::state::AppState;

/// Build the router. CORS is layered on by the server.
pub fn create_router(state: Arc<AppState>) -> Router {
    let user_routes = Router::new()
        .route("/", post(users::create_user))
        .route("/{id}", get(users::get_user))
        .with_state(state.clone());

    let message_routes = Router::new()
        .route("/", post(messages::create_message))
        .route("/withMetadata", post(messages::create_message_with_metadata))
        .route("/{id}/status", patch(messages::update_message_status))
        .with_state(state.clone());

    let task_routes = Router::new()
        .route("/", post(tasks::run_task))
        .route("/{id}", get(tasks::get_task))
        .with_state(state.clone());

    Router::new()
        .route("/", get(monitoring::banner))
        .route("/livez", get(monitoring::liveness_probe))
        .nest("/users", user_routes)
        .nest("/messages", message_routes)
        .nest("/tasks", task_routes)
        .nest_service("/files", ServeDir::new(&state.snapshot_dir))
        .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
#[path = "routes_tests.rs"]
mod tests;
