use std::sync::Arc;

use axum::{routing::post, Router};

use shared_config::AppConfig;

use crate::handlers;

/// Both routes are public. `/validate` authenticates through the token it is
/// asked to check, not through the middleware stack.
pub fn auth_routes(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/login", post(handlers::login))
        .route("/validate", post(handlers::validate))
        .with_state(state)
}
