// Route table
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{
    create_user, delete_user, get_dashboard, health_check, list_licenses, list_users,
    stream_dashboard, user_workspace,
};
use axum::{
    routing::{delete, get},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(health_check))
        .route("/dashboard", get(get_dashboard))
        .route("/dashboard/stream", get(stream_dashboard))
        .route("/users", get(list_users).post(create_user))
        .route("/users/:id", delete(delete_user))
        .route("/users/:id/workspace", get(user_workspace))
        .route("/licenses", get(list_licenses))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
