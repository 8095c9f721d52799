use chrono::Utc;
use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, info};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::store::StoreClient;

use crate::models::{
    CreateStaffUserRequest, StaffError, StaffUser, StaffUserResponse, UpdateStaffUserRequest,
};
use crate::services::password::hash_password;

pub struct StaffService {
    store: StoreClient,
}

impl StaffService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            store: StoreClient::new(config),
        }
    }

    pub async fn list_users(&self, auth_token: &str) -> Result<Vec<StaffUserResponse>, StaffError> {
        debug!("Listing staff users");

        let result: Vec<Value> = self
            .store
            .request(
                Method::GET,
                "/rest/v1/staff_users?order=full_name.asc",
                Some(auth_token),
                None,
            )
            .await
            .map_err(|e| StaffError::DatabaseError(e.to_string()))?;

        let users = result
            .into_iter()
            .map(serde_json::from_value::<StaffUser>)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| StaffError::DatabaseError(format!("Failed to parse staff users: {}", e)))?;

        Ok(users.into_iter().map(StaffUserResponse::from).collect())
    }

    pub async fn get_user(
        &self,
        user_id: Uuid,
        auth_token: &str,
    ) -> Result<StaffUserResponse, StaffError> {
        Ok(self.fetch_user(user_id, auth_token).await?.into())
    }

    pub async fn create_user(
        &self,
        request: CreateStaffUserRequest,
        auth_token: &str,
    ) -> Result<StaffUserResponse, StaffError> {
        info!("Creating staff user {}", request.username);

        if request.username.trim().is_empty() || request.password.trim().is_empty() {
            return Err(StaffError::ValidationError(
                "Username and password are required".to_string(),
            ));
        }

        if self.username_exists(&request.username, None, auth_token).await? {
            return Err(StaffError::UsernameTaken);
        }
        if self.email_exists(&request.email, None, auth_token).await? {
            return Err(StaffError::EmailTaken);
        }

        let password_hash = hash_password(&request.password)
            .map_err(|e| StaffError::ValidationError(format!("Failed to hash password: {}", e)))?;

        let now = Utc::now();
        let user_data = json!({
            "full_name": request.full_name,
            "email": request.email,
            "username": request.username,
            "password_hash": password_hash,
            "role": request.role.to_string(),
            "is_active": true,
            "created_at": now.to_rfc3339(),
            "updated_at": now.to_rfc3339()
        });

        let created = self
            .write_returning(Method::POST, "/rest/v1/staff_users", user_data, auth_token)
            .await?
            .ok_or_else(|| StaffError::DatabaseError("Store returned no row".to_string()))?;

        let user: StaffUser = serde_json::from_value(created)
            .map_err(|e| StaffError::DatabaseError(format!("Failed to parse staff user: {}", e)))?;

        info!("Staff user {} created with ID {}", user.username, user.id);
        Ok(user.into())
    }

    pub async fn update_user(
        &self,
        user_id: Uuid,
        request: UpdateStaffUserRequest,
        auth_token: &str,
    ) -> Result<StaffUserResponse, StaffError> {
        info!("Updating staff user {}", user_id);

        let current = self.fetch_user(user_id, auth_token).await?;

        // Uniqueness is only re-checked when the field actually changes.
        if !current.username.eq_ignore_ascii_case(&request.username)
            && self.username_exists(&request.username, Some(user_id), auth_token).await?
        {
            return Err(StaffError::UsernameTaken);
        }
        if !current.email.eq_ignore_ascii_case(&request.email)
            && self.email_exists(&request.email, Some(user_id), auth_token).await?
        {
            return Err(StaffError::EmailTaken);
        }

        let mut update_data = serde_json::Map::new();
        update_data.insert("full_name".to_string(), json!(request.full_name));
        update_data.insert("email".to_string(), json!(request.email));
        update_data.insert("username".to_string(), json!(request.username));
        update_data.insert("role".to_string(), json!(request.role.to_string()));
        update_data.insert("is_active".to_string(), json!(request.is_active));

        if let Some(password) = request.password.filter(|p| !p.trim().is_empty()) {
            let password_hash = hash_password(&password).map_err(|e| {
                StaffError::ValidationError(format!("Failed to hash password: {}", e))
            })?;
            update_data.insert("password_hash".to_string(), json!(password_hash));
        }

        update_data.insert("updated_at".to_string(), json!(Utc::now().to_rfc3339()));

        let path = format!("/rest/v1/staff_users?id=eq.{}", user_id);
        let updated = self
            .write_returning(Method::PATCH, &path, Value::Object(update_data), auth_token)
            .await?
            .ok_or(StaffError::NotFound)?;

        let user: StaffUser = serde_json::from_value(updated)
            .map_err(|e| StaffError::DatabaseError(format!("Failed to parse staff user: {}", e)))?;

        Ok(user.into())
    }

    /// Soft-disable. A deactivated account keeps its history but can no
    /// longer log in; repeating the call is a no-op.
    pub async fn deactivate_user(&self, user_id: Uuid, auth_token: &str) -> Result<(), StaffError> {
        info!("Deactivating staff user {}", user_id);

        let current = self.fetch_user(user_id, auth_token).await?;
        if !current.is_active {
            return Ok(());
        }

        let update_data = json!({
            "is_active": false,
            "updated_at": Utc::now().to_rfc3339()
        });

        let path = format!("/rest/v1/staff_users?id=eq.{}", user_id);
        self.write_returning(Method::PATCH, &path, update_data, auth_token)
            .await?
            .ok_or(StaffError::NotFound)?;

        Ok(())
    }

    // ==============================================================================
    // PRIVATE HELPER METHODS
    // ==============================================================================

    async fn fetch_user(&self, user_id: Uuid, auth_token: &str) -> Result<StaffUser, StaffError> {
        let path = format!("/rest/v1/staff_users?id=eq.{}", user_id);
        let result: Vec<Value> = self
            .store
            .request(Method::GET, &path, Some(auth_token), None)
            .await
            .map_err(|e| StaffError::DatabaseError(e.to_string()))?;

        let first = result.into_iter().next().ok_or(StaffError::NotFound)?;

        serde_json::from_value(first)
            .map_err(|e| StaffError::DatabaseError(format!("Failed to parse staff user: {}", e)))
    }

    async fn username_exists(
        &self,
        username: &str,
        exclude_id: Option<Uuid>,
        auth_token: &str,
    ) -> Result<bool, StaffError> {
        let mut path = format!("/rest/v1/staff_users?username=eq.{}", username);
        if let Some(id) = exclude_id {
            path.push_str(&format!("&id=neq.{}", id));
        }

        let result: Vec<Value> = self
            .store
            .request(Method::GET, &path, Some(auth_token), None)
            .await
            .map_err(|e| StaffError::DatabaseError(e.to_string()))?;

        Ok(!result.is_empty())
    }

    async fn email_exists(
        &self,
        email: &str,
        exclude_id: Option<Uuid>,
        auth_token: &str,
    ) -> Result<bool, StaffError> {
        let mut path = format!("/rest/v1/staff_users?email=eq.{}", email);
        if let Some(id) = exclude_id {
            path.push_str(&format!("&id=neq.{}", id));
        }

        let result: Vec<Value> = self
            .store
            .request(Method::GET, &path, Some(auth_token), None)
            .await
            .map_err(|e| StaffError::DatabaseError(e.to_string()))?;

        Ok(!result.is_empty())
    }

    async fn write_returning(
        &self,
        method: Method,
        path: &str,
        body: Value,
        auth_token: &str,
    ) -> Result<Option<Value>, StaffError> {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            "Prefer",
            reqwest::header::HeaderValue::from_static("return=representation"),
        );

        let result: Vec<Value> = self
            .store
            .request_with_headers(method, path, Some(auth_token), Some(body), Some(headers))
            .await
            .map_err(|e| StaffError::DatabaseError(e.to_string()))?;

        Ok(result.into_iter().next())
    }
}
