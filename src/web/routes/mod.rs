//! Contains all the routes that this application can handle.

mod signup;

// re-export errors
pub use signup::SubscribeError;

use std::path::Path;

use axum::{
    http::StatusCode,
    routing::get,
    Router,
};
use tower_http::services::ServeDir;

use crate::AppState;
use signup::{signup_get, signup_post};

async fn health_check() -> StatusCode {
    StatusCode::OK
}

/// All the routes of the server.
/// Paths that don't match a route are looked up in `static_dir`.
pub fn routes(app_state: AppState, static_dir: impl AsRef<Path>) -> Router {
    Router::new()
        .route("/signup", get(signup_get).post(signup_post))
        .with_state(app_state)
        .route("/health-check", get(health_check))
        .fallback_service(ServeDir::new(static_dir))
}
