//! HTTP API for Grove.
//!
//! Exposes the folder hierarchy and file operations as a JSON REST API
//! under `/api`, with OpenAPI documentation served at `/swagger-ui`.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod server;

pub use error::ApiError;
pub use handlers::AppState;
pub use router::create_router;
pub use server::WebServer;
