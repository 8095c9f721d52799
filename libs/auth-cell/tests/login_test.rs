// libs/auth-cell/tests/login_test.rs
use std::sync::Arc;

use assert_matches::assert_matches;
use axum::extract::{Json, State};
use axum::http::HeaderMap;
use serde_json::json;
use uuid::Uuid;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use auth_cell::handlers;
use auth_cell::models::LoginRequest;
use shared_models::error::AppError;
use shared_utils::test_utils::TestConfig;
use staff_cell::services::password::hash_password;

fn stored_user(id: Uuid, username: &str, password: &str) -> serde_json::Value {
    json!({
        "id": id,
        "full_name": "Jane Smith",
        "email": format!("{}@clinic.example", username),
        "username": username,
        "password_hash": hash_password(password).unwrap(),
        "role": "Doctor",
        "is_active": true,
        "created_at": "2025-06-01T00:00:00Z",
        "updated_at": "2025-06-01T00:00:00Z"
    })
}

fn login_request(username: &str, password: &str) -> Json<LoginRequest> {
    Json(LoginRequest {
        username: username.to_string(),
        password: password.to_string(),
    })
}

#[tokio::test]
async fn valid_credentials_produce_a_working_token() {
    let mock_server = MockServer::start().await;
    let user_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/rest/v1/staff_users"))
        .and(query_param("username", "eq.jsmith"))
        .and(query_param("is_active", "eq.true"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(vec![stored_user(user_id, "jsmith", "correct horse battery staple")]),
        )
        .mount(&mock_server)
        .await;

    let config = Arc::new(TestConfig::with_store_url(&mock_server.uri()).to_app_config());

    let Json(response) = handlers::login(
        State(config.clone()),
        login_request("jsmith", "correct horse battery staple"),
    )
    .await
    .expect("login should succeed");

    assert_eq!(response.full_name, "Jane Smith");
    assert_eq!(response.role, "Doctor");

    // The issued token is accepted by the validate endpoint.
    let mut headers = HeaderMap::new();
    headers.insert(
        "Authorization",
        format!("Bearer {}", response.token).parse().unwrap(),
    );
    let Json(validated) = handlers::validate(State(config), headers)
        .await
        .expect("fresh token should validate");

    assert!(validated.valid);
    assert_eq!(validated.user_id, user_id);
    assert_eq!(validated.role.as_deref(), Some("Doctor"));
}

#[tokio::test]
async fn wrong_password_is_rejected() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/staff_users"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(vec![stored_user(Uuid::new_v4(), "jsmith", "the real password")]),
        )
        .mount(&mock_server)
        .await;

    let config = Arc::new(TestConfig::with_store_url(&mock_server.uri()).to_app_config());
    let result = handlers::login(State(config), login_request("jsmith", "a guess")).await;

    assert_matches!(result, Err(AppError::Auth(_)));
}

#[tokio::test]
async fn unknown_user_gets_the_same_rejection_as_bad_password() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/staff_users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(Vec::<serde_json::Value>::new()))
        .mount(&mock_server)
        .await;

    let config = Arc::new(TestConfig::with_store_url(&mock_server.uri()).to_app_config());
    let result = handlers::login(State(config), login_request("nobody", "whatever")).await;

    assert_matches!(result, Err(AppError::Auth(msg)) if msg == "Invalid credentials");
}

#[tokio::test]
async fn validate_rejects_garbage_tokens() {
    let config = TestConfig::default().to_arc();

    let mut headers = HeaderMap::new();
    headers.insert("Authorization", "Bearer not.a.token".parse().unwrap());

    let result = handlers::validate(State(config), headers).await;
    assert_matches!(result, Err(AppError::Auth(_)));
}
