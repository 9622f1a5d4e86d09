//! HTTP front end for the forecast service.

pub mod error;
pub mod routes;
pub mod server;
pub mod state;

pub use error::{ApiError, ApiResult, ErrorCode};
pub use routes::create_router;
pub use server::serve;
pub use state::AppState;
