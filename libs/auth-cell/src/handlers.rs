use std::sync::Arc;

use axum::{
    extract::{Json, State},
    http::HeaderMap,
};
use reqwest::Method;
use serde_json::Value;
use tracing::{debug, warn};

use shared_config::AppConfig;
use shared_database::store::StoreClient;
use shared_models::auth::TokenResponse;
use shared_models::error::AppError;
use shared_utils::jwt::{issue_token, validate_token};
use staff_cell::models::StaffUser;
use staff_cell::services::password::verify_password;

use crate::models::{LoginRequest, LoginResponse};

// Helper function to extract token
fn extract_bearer_token(headers: &HeaderMap) -> Result<String, AppError> {
    let auth_header = headers
        .get("Authorization")
        .ok_or_else(|| AppError::Auth("Missing authorization header".to_string()))?;

    let auth_value = auth_header
        .to_str()
        .map_err(|_| AppError::Auth("Invalid authorization header format".to_string()))?;

    if !auth_value.starts_with("Bearer ") {
        return Err(AppError::Auth("Invalid authorization header format".to_string()));
    }

    Ok(auth_value[7..].to_string())
}

/// Login with username + password. Returns a signed session token if the
/// credentials belong to an active staff account.
#[axum::debug_handler]
pub async fn login(
    State(config): State<Arc<AppConfig>>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    debug!("Login attempt for username {}", request.username);

    let store = StoreClient::new(&config);
    let path = format!(
        "/rest/v1/staff_users?username=eq.{}&is_active=eq.true",
        request.username
    );

    let result: Vec<Value> = store
        .request(Method::GET, &path, None, None)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

    // Unknown user and bad password get the same response.
    let Some(record) = result.into_iter().next() else {
        warn!("Login rejected for unknown or inactive user");
        return Err(AppError::Auth("Invalid credentials".to_string()));
    };

    let user: StaffUser = serde_json::from_value(record)
        .map_err(|e| AppError::Database(format!("Failed to parse staff user: {}", e)))?;

    let verified = verify_password(&request.password, &user.password_hash)
        .map_err(|e| AppError::Internal(format!("Password verification failed: {}", e)))?;

    if !verified {
        warn!("Login rejected for user {}: bad password", user.id);
        return Err(AppError::Auth("Invalid credentials".to_string()));
    }

    let role = user.role.to_string();
    let token = issue_token(user.id, &user.full_name, &role, &config.jwt_secret)
        .map_err(AppError::Internal)?;

    debug!("Login succeeded for user {}", user.id);

    Ok(Json(LoginResponse {
        token,
        full_name: user.full_name,
        role,
    }))
}

#[axum::debug_handler]
pub async fn validate(
    State(config): State<Arc<AppConfig>>,
    headers: HeaderMap,
) -> Result<Json<TokenResponse>, AppError> {
    debug!("Validating token");

    let token = extract_bearer_token(&headers)?;

    match validate_token(&token, &config.jwt_secret) {
        Ok(user) => Ok(Json(TokenResponse {
            valid: true,
            user_id: user.id,
            name: user.name,
            role: user.role,
        })),
        Err(err) => Err(AppError::Auth(err)),
    }
}
