use crate::api::routes;
use crate::core::TaskStore;
use std::net::SocketAddr;
use std::sync::Arc;

/// Starts and runs the HTTP server using Axum web framework
///
/// # Arguments
/// * `port` - Port number to listen on for incoming HTTP connections
/// * `store` - Task store shared with the handlers
///
/// # Returns
/// * `Result<(), Box<dyn std::error::Error>>` - Ok if server runs to completion, Error if it fails
pub async fn launch_server(
    port: u16,
    store: Arc<TaskStore>,
) -> Result<(), Box<dyn std::error::Error>> {
    let app = routes::app(store);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;
    Ok(())
}
