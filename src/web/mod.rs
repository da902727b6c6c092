//! Web API module for fileshare.
//!
//! HTTP routes for uploading, downloading and listing shared files, plus
//! static serving of the browser frontend.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod openapi;
pub mod origin;
pub mod router;
pub mod server;

pub use error::ApiError;
pub use handlers::AppState;
pub use router::{create_app, create_router};
pub use server::WebServer;
