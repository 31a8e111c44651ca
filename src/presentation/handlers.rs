// HTTP request handlers
use crate::application::user_directory::UserDirectory;
use crate::domain::error::FetchError;
use crate::domain::license::{NewUserForm, UserId, UserRow};
use crate::domain::notification::{ActionError, Notification};
use crate::infrastructure::chunked_json::stream_from_receiver;
use crate::infrastructure::http_response::{accepts_brotli, json_response};
use crate::presentation::app_state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Deserialize)]
pub struct DeleteQuery {
    pub confirm: Option<bool>,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a FetchError,
    message: String,
}

#[derive(Serialize)]
struct ActionBody<'a> {
    notification: &'a Notification,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'a FetchError>,
    users: Vec<UserRow>,
}

async fn respond<T: Serialize>(status: StatusCode, data: &T, compress: bool) -> Response {
    match json_response(status, data, compress).await {
        Ok(response) => response,
        Err(status) => status.into_response(),
    }
}

fn error_status(err: &FetchError) -> StatusCode {
    match err {
        FetchError::ValidationFailure { .. } => StatusCode::BAD_REQUEST,
        _ => StatusCode::BAD_GATEWAY,
    }
}

async fn respond_error(err: &FetchError, compress: bool) -> Response {
    let body = ErrorBody {
        error: err,
        message: err.to_string(),
    };
    respond(error_status(err), &body, compress).await
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// All four dashboard metrics once each has settled; failures stay per-metric
pub async fn get_dashboard(headers: HeaderMap, State(state): State<Arc<AppState>>) -> Response {
    let snapshot = state.dashboard_service.snapshot().await;
    respond(StatusCode::OK, &snapshot, accepts_brotli(&headers)).await
}

/// Progressive dashboard: skeleton, per-metric updates, completion
pub async fn stream_dashboard(
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let rx = state.dashboard_service.stream_dashboard();
    stream_from_receiver(rx, accepts_brotli(&headers))
}

pub async fn list_users(headers: HeaderMap, State(state): State<Arc<AppState>>) -> Response {
    let compress = accepts_brotli(&headers);
    let mut directory = state.user_directory();

    if let Some(err) = directory.load().await.error() {
        return respond_error(err, compress).await;
    }
    respond(StatusCode::OK, &directory.rows(), compress).await
}

/// Loads the current list, then applies the action to it. A failed load only
/// leaves the returned list empty.
async fn loaded_directory(state: &AppState) -> UserDirectory {
    let mut directory = state.user_directory();
    directory.load().await;
    directory
}

pub async fn create_user(
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
    Json(form): Json<NewUserForm>,
) -> Response {
    let compress = accepts_brotli(&headers);
    let mut directory = loaded_directory(&state).await;

    match directory.create_user(form).await {
        Ok(notification) => {
            let body = ActionBody {
                notification: &notification,
                error: None,
                users: directory.rows(),
            };
            respond(StatusCode::CREATED, &body, compress).await
        }
        Err(err) => action_failed(&err, directory.rows(), compress).await,
    }
}

pub async fn delete_user(
    Path(id): Path<UserId>,
    Query(query): Query<DeleteQuery>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Response {
    let compress = accepts_brotli(&headers);
    let confirmation = query.confirm.unwrap_or(false).into();
    let mut directory = loaded_directory(&state).await;

    match directory.delete_user(id, confirmation).await {
        Ok(notification) => {
            let body = ActionBody {
                notification: &notification,
                error: None,
                users: directory.rows(),
            };
            respond(StatusCode::OK, &body, compress).await
        }
        Err(err) => action_failed(&err, directory.rows(), compress).await,
    }
}

async fn action_failed(err: &ActionError, users: Vec<UserRow>, compress: bool) -> Response {
    let body = ActionBody {
        notification: &err.notification,
        error: Some(&err.cause),
        users,
    };
    respond(error_status(&err.cause), &body, compress).await
}

pub async fn user_workspace(
    Path(id): Path<UserId>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Response {
    let compress = accepts_brotli(&headers);
    match state.license_service.user_workspace(id).await {
        Ok(rows) => respond(StatusCode::OK, &rows, compress).await,
        Err(err) => {
            let body = ActionBody {
                notification: &err.notification,
                error: Some(&err.cause),
                users: Vec::new(),
            };
            respond(error_status(&err.cause), &body, compress).await
        }
    }
}

pub async fn list_licenses(headers: HeaderMap, State(state): State<Arc<AppState>>) -> Response {
    let compress = accepts_brotli(&headers);
    match state.license_service.list_licenses().await {
        Ok(rows) => respond(StatusCode::OK, &rows, compress).await,
        Err(err) => {
            tracing::error!("Error fetching licenses: {}", err);
            respond_error(&err, compress).await
        }
    }
}
