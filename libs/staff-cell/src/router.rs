use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, patch, post, put},
    Router,
};

use shared_config::AppConfig;
use shared_utils::extractor::{auth_middleware, require_admin};

use crate::handlers;

/// Staff account management is restricted to Admin users.
pub fn staff_routes(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/", get(handlers::list_users))
        .route("/", post(handlers::create_user))
        .route("/{user_id}", get(handlers::get_user))
        .route("/{user_id}", put(handlers::update_user))
        .route("/{user_id}/deactivate", patch(handlers::deactivate_user))
        .layer(middleware::from_fn(require_admin))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        .with_state(state)
}
