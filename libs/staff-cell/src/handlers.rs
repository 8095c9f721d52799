use std::sync::Arc;

use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    Json,
};
use axum_extra::TypedHeader;
use headers::{authorization::Bearer, Authorization};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::auth::AuthUser;
use shared_models::error::AppError;

use crate::models::{CreateStaffUserRequest, StaffError, UpdateStaffUserRequest};
use crate::services::StaffService;

fn map_error(error: StaffError) -> AppError {
    match error {
        StaffError::NotFound => AppError::NotFound(error.to_string()),
        StaffError::UsernameTaken | StaffError::EmailTaken => AppError::Conflict(error.to_string()),
        StaffError::ValidationError(msg) => AppError::ValidationError(msg),
        StaffError::DatabaseError(ref msg) => AppError::Database(msg.clone()),
    }
}

#[axum::debug_handler]
pub async fn list_users(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(_user): Extension<AuthUser>,
) -> Result<Json<Value>, AppError> {
    let service = StaffService::new(&config);

    let users = service.list_users(auth.token()).await.map_err(map_error)?;

    Ok(Json(json!({
        "users": users,
        "total": users.len()
    })))
}

#[axum::debug_handler]
pub async fn get_user(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(_user): Extension<AuthUser>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let service = StaffService::new(&config);

    let user = service
        .get_user(user_id, auth.token())
        .await
        .map_err(map_error)?;

    Ok(Json(json!(user)))
}

#[axum::debug_handler]
pub async fn create_user(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(_user): Extension<AuthUser>,
    Json(request): Json<CreateStaffUserRequest>,
) -> Result<Json<Value>, AppError> {
    let service = StaffService::new(&config);

    let user = service
        .create_user(request, auth.token())
        .await
        .map_err(map_error)?;

    Ok(Json(json!(user)))
}

#[axum::debug_handler]
pub async fn update_user(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(_user): Extension<AuthUser>,
    Path(user_id): Path<Uuid>,
    Json(request): Json<UpdateStaffUserRequest>,
) -> Result<Json<Value>, AppError> {
    let service = StaffService::new(&config);

    let user = service
        .update_user(user_id, request, auth.token())
        .await
        .map_err(map_error)?;

    Ok(Json(json!(user)))
}

#[axum::debug_handler]
pub async fn deactivate_user(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(_user): Extension<AuthUser>,
    Path(user_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let service = StaffService::new(&config);

    service
        .deactivate_user(user_id, auth.token())
        .await
        .map_err(map_error)?;

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_message_passes_through_unprefixed() {
        let mapped = map_error(StaffError::ValidationError(
            "Username and password are required".to_string(),
        ));

        assert!(matches!(
            mapped,
            AppError::ValidationError(ref msg) if msg == "Username and password are required"
        ));
    }

    #[test]
    fn uniqueness_violations_map_to_conflict() {
        assert!(matches!(map_error(StaffError::UsernameTaken), AppError::Conflict(_)));
        assert!(matches!(map_error(StaffError::EmailTaken), AppError::Conflict(_)));
    }
}
