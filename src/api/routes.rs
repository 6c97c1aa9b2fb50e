//! API routes configuration module

use crate::api::handlers::{create_task, delete_task, get_task, service_status};
use crate::core::TaskStore;
use axum::{
    routing::{get, post},
    Extension, Router,
};
use std::sync::Arc;

/// Creates and configures the API router with all routes
///
/// # Arguments
/// * `store` - Task store to be shared across handlers
///
/// # Returns
/// * `Router` - Configured router with all API endpoints
pub fn app(store: Arc<TaskStore>) -> Router {
    Router::new()
        .route("/tasks", post(create_task))
        .route("/tasks/:id", get(get_task).delete(delete_task))
        .route("/status", get(service_status))
        .layer(Extension(store))
}
