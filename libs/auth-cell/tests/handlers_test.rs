use axum::extract::{Extension, Json, State};
use chrono::Utc;
use serde_json::json;
use uuid::Uuid;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use auth_cell::handlers::{login, me, register};
use auth_cell::models::{LoginRequest, RegisterRequest, UserRole};
use auth_cell::services::password::hash_password;
use shared_models::error::AppError;
use shared_utils::jwt::validate_token;
use shared_utils::test_utils::{TestConfig, TestUser};

fn user_row(id: Uuid, email: &str, password: &str) -> serde_json::Value {
    json!({
        "id": id,
        "email": email,
        "hashed_password": hash_password(password).unwrap(),
        "full_name": "Test Doctor",
        "role": "doctor",
        "is_active": true,
        "created_at": Utc::now().to_rfc3339(),
        "updated_at": Utc::now().to_rfc3339(),
    })
}

fn register_request(email: &str) -> RegisterRequest {
    RegisterRequest {
        email: email.to_string(),
        password: "long-enough-password".to_string(),
        full_name: Some("Test Doctor".to_string()),
        role: UserRole::Doctor,
        workspace_name: "Test Clinic".to_string(),
    }
}

#[tokio::test]
async fn register_creates_a_user() {
    let server = MockServer::start().await;
    let user_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/rest/v1/users"))
        .and(query_param("email", "eq.doc@example.com"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/users"))
        .respond_with(
            ResponseTemplate::new(201)
                .set_body_json(json!([user_row(user_id, "doc@example.com", "irrelevant")])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let config = TestConfig::default().with_database_url(&server.uri()).to_arc();

    let result = register(State(config), Json(register_request("doc@example.com"))).await;

    let (status, Json(user)) = result.unwrap();
    assert_eq!(status, axum::http::StatusCode::CREATED);
    assert_eq!(user.id, user_id);
    assert_eq!(user.email, "doc@example.com");
}

#[tokio::test]
async fn register_rejects_duplicate_email() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/users"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([{ "id": Uuid::new_v4() }])),
        )
        .mount(&server)
        .await;

    let config = TestConfig::default().with_database_url(&server.uri()).to_arc();

    let result = register(State(config), Json(register_request("doc@example.com"))).await;

    match result.unwrap_err() {
        AppError::BadRequest(msg) => assert_eq!(msg, "Email already registered"),
        other => panic!("Expected BadRequest, got {:?}", other),
    }
}

#[tokio::test]
async fn register_rejects_malformed_email() {
    let config = TestConfig::default().to_arc();

    let result = register(State(config), Json(register_request("not-an-email"))).await;

    match result.unwrap_err() {
        AppError::ValidationError(msg) => assert_eq!(msg, "Invalid email address"),
        other => panic!("Expected ValidationError, got {:?}", other),
    }
}

#[tokio::test]
async fn register_rejects_short_password() {
    let config = TestConfig::default().to_arc();

    let mut request = register_request("doc@example.com");
    request.password = "short".to_string();

    let result = register(State(config), Json(request)).await;

    assert!(matches!(result.unwrap_err(), AppError::ValidationError(_)));
}

#[tokio::test]
async fn login_issues_a_verifiable_token() {
    let server = MockServer::start().await;
    let user_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/rest/v1/users"))
        .and(query_param("email", "eq.doc@example.com"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([user_row(user_id, "doc@example.com", "secret-password")])),
        )
        .mount(&server)
        .await;

    let config = TestConfig::default().with_database_url(&server.uri()).to_arc();

    let result = login(
        State(config.clone()),
        Json(LoginRequest {
            email: "doc@example.com".to_string(),
            password: "secret-password".to_string(),
        }),
    )
    .await;

    let Json(token_response) = result.unwrap();
    assert_eq!(token_response.token_type, "bearer");

    let auth_user = validate_token(&token_response.access_token, &config.jwt_secret).unwrap();
    assert_eq!(auth_user.id, user_id.to_string());
    assert_eq!(auth_user.email.as_deref(), Some("doc@example.com"));
    assert_eq!(auth_user.role.as_deref(), Some("doctor"));
}

#[tokio::test]
async fn login_rejects_wrong_password() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([user_row(
            Uuid::new_v4(),
            "doc@example.com",
            "secret-password"
        )])))
        .mount(&server)
        .await;

    let config = TestConfig::default().with_database_url(&server.uri()).to_arc();

    let result = login(
        State(config),
        Json(LoginRequest {
            email: "doc@example.com".to_string(),
            password: "wrong-password".to_string(),
        }),
    )
    .await;

    match result.unwrap_err() {
        AppError::Auth(msg) => assert_eq!(msg, "Incorrect email or password"),
        other => panic!("Expected Auth error, got {:?}", other),
    }
}

#[tokio::test]
async fn login_rejects_unknown_email() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let config = TestConfig::default().with_database_url(&server.uri()).to_arc();

    let result = login(
        State(config),
        Json(LoginRequest {
            email: "ghost@example.com".to_string(),
            password: "whatever-password".to_string(),
        }),
    )
    .await;

    assert!(matches!(result.unwrap_err(), AppError::Auth(_)));
}

#[tokio::test]
async fn login_rejects_inactive_user() {
    let server = MockServer::start().await;
    let mut row = user_row(Uuid::new_v4(), "doc@example.com", "secret-password");
    row["is_active"] = json!(false);

    Mock::given(method("GET"))
        .and(path("/rest/v1/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([row])))
        .mount(&server)
        .await;

    let config = TestConfig::default().with_database_url(&server.uri()).to_arc();

    let result = login(
        State(config),
        Json(LoginRequest {
            email: "doc@example.com".to_string(),
            password: "secret-password".to_string(),
        }),
    )
    .await;

    assert!(matches!(result.unwrap_err(), AppError::Auth(_)));
}

#[tokio::test]
async fn me_returns_the_token_subject() {
    let server = MockServer::start().await;
    let user = TestUser::doctor("doc@example.com");

    Mock::given(method("GET"))
        .and(path("/rest/v1/users"))
        .and(query_param("id", format!("eq.{}", user.id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([user_row(
            Uuid::parse_str(&user.id).unwrap(),
            "doc@example.com",
            "irrelevant"
        )])))
        .mount(&server)
        .await;

    let config = TestConfig::default().with_database_url(&server.uri()).to_arc();

    let result = me(State(config), Extension(user.to_auth_user())).await;

    let Json(profile) = result.unwrap();
    assert_eq!(profile.id.to_string(), user.id);
}

#[tokio::test]
async fn me_rejects_non_uuid_subject() {
    let config = TestConfig::default().to_arc();

    let mut user = TestUser::doctor("doc@example.com");
    user.id = "definitely-not-a-uuid".to_string();

    let result = me(State(config), Extension(user.to_auth_user())).await;

    match result.unwrap_err() {
        AppError::Auth(msg) => assert_eq!(msg, "Invalid token subject"),
        other => panic!("Expected Auth error, got {:?}", other),
    }
}
