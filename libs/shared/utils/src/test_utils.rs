use std::sync::Arc;

use chrono::{Duration, Utc};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::auth::AuthUser;

use crate::jwt::issue_token;

pub struct TestConfig {
    pub jwt_secret: String,
    pub store_url: String,
    pub store_api_key: String,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "test-secret-key-for-jwt-validation-must-be-long-enough".to_string(),
            store_url: "http://localhost:54321".to_string(),
            store_api_key: "test-api-key".to_string(),
        }
    }
}

impl TestConfig {
    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            store_url: self.store_url.clone(),
            store_api_key: self.store_api_key.clone(),
            jwt_secret: self.jwt_secret.clone(),
        }
    }

    pub fn to_arc(&self) -> Arc<AppConfig> {
        Arc::new(self.to_app_config())
    }

    pub fn with_store_url(url: &str) -> Self {
        Self {
            store_url: url.to_string(),
            ..Self::default()
        }
    }
}

pub struct TestStaffUser {
    pub id: Uuid,
    pub full_name: String,
    pub role: String,
}

impl Default for TestStaffUser {
    fn default() -> Self {
        Self {
            id: Uuid::new_v4(),
            full_name: "Test User".to_string(),
            role: "Doctor".to_string(),
        }
    }
}

impl TestStaffUser {
    pub fn new(full_name: &str, role: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            full_name: full_name.to_string(),
            role: role.to_string(),
        }
    }

    pub fn doctor(full_name: &str) -> Self {
        Self::new(full_name, "Doctor")
    }

    pub fn nurse(full_name: &str) -> Self {
        Self::new(full_name, "Nurse")
    }

    pub fn admin(full_name: &str) -> Self {
        Self::new(full_name, "Admin")
    }

    pub fn to_auth_user(&self) -> AuthUser {
        AuthUser {
            id: self.id,
            name: Some(self.full_name.clone()),
            role: Some(self.role.clone()),
            authenticated_at: Some(Utc::now()),
        }
    }

    pub fn bearer_token(&self, secret: &str) -> String {
        issue_token(self.id, &self.full_name, &self.role, secret)
            .expect("issuing a test token should not fail")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jwt::validate_token;

    #[test]
    fn test_config_creation() {
        let config = TestConfig::default();
        let app_config = config.to_app_config();

        assert_eq!(app_config.store_url, "http://localhost:54321");
        assert_eq!(app_config.store_api_key, "test-api-key");
        assert!(!app_config.jwt_secret.is_empty());
    }

    #[test]
    fn test_token_round_trip() {
        let config = TestConfig::default();
        let user = TestStaffUser::doctor("Jane Smith");

        let token = user.bearer_token(&config.jwt_secret);
        assert_eq!(token.split('.').count(), 3);

        let validated = validate_token(&token, &config.jwt_secret)
            .expect("freshly issued token should validate");
        assert_eq!(validated.id, user.id);
        assert_eq!(validated.role.as_deref(), Some("Doctor"));
    }

    #[test]
    fn test_token_header_is_hs256() {
        use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
        use shared_models::auth::JwtHeader;

        let token = TestStaffUser::default().bearer_token("header-test-secret");
        let header_b64 = token.split('.').next().unwrap();
        let header: JwtHeader =
            serde_json::from_slice(&URL_SAFE_NO_PAD.decode(header_b64).unwrap()).unwrap();

        assert_eq!(header.alg, "HS256");
        assert_eq!(header.typ, "JWT");
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let user = TestStaffUser::default();
        let token = user.bearer_token("one-secret");

        assert!(validate_token(&token, "another-secret").is_err());
    }

    #[test]
    fn test_expired_token_rejected() {
        // Issue with a negative validity by building claims directly through
        // issue_token is not possible, so fabricate an old iat/exp pair.
        let secret = "expiry-test-secret";
        let user = TestStaffUser::default();
        let token = {
            use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
            use hmac::{Hmac, Mac};
            use sha2::Sha256;

            let past = Utc::now() - Duration::hours(3);
            let header = serde_json::json!({"alg": "HS256", "typ": "JWT"});
            let claims = serde_json::json!({
                "sub": user.id.to_string(),
                "name": user.full_name,
                "role": user.role,
                "iat": past.timestamp(),
                "exp": (past + Duration::hours(1)).timestamp()
            });
            let signing_input = format!(
                "{}.{}",
                URL_SAFE_NO_PAD.encode(header.to_string()),
                URL_SAFE_NO_PAD.encode(claims.to_string())
            );
            let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes()).unwrap();
            mac.update(signing_input.as_bytes());
            let sig = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());
            format!("{}.{}", signing_input, sig)
        };

        let err = validate_token(&token, secret).unwrap_err();
        assert_eq!(err, "Token expired");
    }
}
