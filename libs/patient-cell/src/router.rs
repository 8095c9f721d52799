use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers;

pub fn patient_routes(config: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/", get(handlers::list_patients))
        .route("/", post(handlers::create_patient))
        .route("/{patient_id}", get(handlers::get_patient))
        .route("/{patient_id}", put(handlers::update_patient))
        .route("/{patient_id}/notes", post(handlers::add_patient_note))
        .route("/{patient_id}/notes", get(handlers::list_patient_notes))
        .layer(middleware::from_fn_with_state(config.clone(), auth_middleware))
        .with_state(config)
}
