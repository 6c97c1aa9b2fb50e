use crate::api::errors::{api_error, ApiError};
use crate::core::{TaskStatus, TaskStore};
use crate::errors::Error;
use axum::extract::{ConnectInfo, Extension, Path};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::{Map, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::debug;

/// Represents the response payload after successfully submitting a task
#[derive(Serialize)]
pub struct CreateTaskResponse {
    pub task_id: String,
}

/// Represents the service status reported by the status endpoint
#[derive(Serialize)]
pub struct ServiceStatus {
    pub status: String,
    #[serde(rename = "restVersion")]
    pub rest_version: String,
}

/// Submits a new task
///
/// The JSON body becomes the task's parameter document; the caller's
/// address becomes the owner segment of the task path. On success the
/// response carries the task id in both the body and the Location header.
///
/// # Arguments
/// * `store` - Shared task store
/// * `addr` - Address of the submitting client
/// * `params` - JSON object holding the task parameters
#[axum::debug_handler]
pub async fn create_task(
    Extension(store): Extension<Arc<TaskStore>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Json(params): Json<Map<String, Value>>,
) -> Result<Response, ApiError> {
    debug!("Post received");
    let task_id = store.create_task(&addr.ip().to_string(), params).map_err(|e| {
        api_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Error creating task",
            &e.to_string(),
        )
    })?;

    let body = Json(CreateTaskResponse {
        task_id: task_id.clone(),
    });
    Ok((StatusCode::ACCEPTED, [(header::LOCATION, task_id)], body).into_response())
}

/// Retrieves the status of a task by its id
///
/// # Arguments
/// * `id` - Task id to look up
/// * `store` - Shared task store
#[axum::debug_handler]
pub async fn get_task(
    Path(id): Path<String>,
    Extension(store): Extension<Arc<TaskStore>>,
) -> Response {
    match store.get_task_status(&id) {
        Ok(status) => (StatusCode::OK, Json(status)).into_response(),
        Err(Error::NotFound(_)) => {
            (StatusCode::GONE, Json(TaskStatus::not_found())).into_response()
        }
        Err(e) => api_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Error getting task status",
            &e.to_string(),
        )
        .into_response(),
    }
}

/// Requests deletion of the task with the given id
///
/// Acceptance of the request only means a token was recorded; the task
/// runner performs the actual removal later.
///
/// # Arguments
/// * `id` - Task id to delete
/// * `store` - Shared task store
/// * `addr` - Address of the requesting client
#[axum::debug_handler]
pub async fn delete_task(
    Path(id): Path<String>,
    Extension(store): Extension<Arc<TaskStore>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
) -> Result<StatusCode, ApiError> {
    match store.request_delete(&id, &addr.ip().to_string()) {
        Ok(()) => Ok(StatusCode::OK),
        Err(Error::InvalidId(description)) => {
            Err(api_error(StatusCode::BAD_REQUEST, "Invalid id", &description))
        }
        Err(e) => Err(api_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Caught exception",
            &e.to_string(),
        )),
    }
}

/// Gets the status of the service itself
#[axum::debug_handler]
pub async fn service_status() -> Json<ServiceStatus> {
    Json(ServiceStatus {
        status: "ok".to_string(),
        rest_version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
