//! Browser-facing presentation: server-rendered pages plus a JSON
//! state endpoint, served by axum on loopback.

pub mod error;
pub mod handlers;
pub mod render;
pub mod router;
pub mod server;

pub use error::WebError;
pub use router::build_router;
pub use server::{start_server, ServerError, WebServer};
