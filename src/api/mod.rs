/// API error types and handling
pub mod errors;
/// API module containing HTTP handlers for task submission, status and deletion
pub mod handlers;
/// Routes configuration and setup
pub mod routes;
/// HTTP server implementation
pub mod server;
