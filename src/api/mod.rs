//! HTTP API surface

pub mod context;
pub mod handlers;
pub mod routes;

pub use context::ApiContext;
pub use handlers::{AppError, OpsState, ServerState};
pub use routes::create_router;
