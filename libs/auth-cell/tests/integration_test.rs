use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use chrono::Utc;
use serde_json::json;
use tower::ServiceExt;
use uuid::Uuid;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use auth_cell::router::auth_routes;
use auth_cell::services::password::hash_password;
use shared_config::AppConfig;
use shared_utils::test_utils::{JwtTestUtils, TestConfig, TestUser};

fn create_test_app(config: AppConfig) -> Router {
    auth_routes(Arc::new(config))
}

#[tokio::test]
async fn register_endpoint_returns_created_user() {
    let server = MockServer::start().await;
    let user_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/rest/v1/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/users"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([{
            "id": user_id,
            "email": "doc@example.com",
            "hashed_password": hash_password("long-enough-password").unwrap(),
            "full_name": null,
            "role": "doctor",
            "is_active": true,
            "created_at": Utc::now().to_rfc3339(),
            "updated_at": Utc::now().to_rfc3339(),
        }])))
        .mount(&server)
        .await;

    let config = TestConfig::default()
        .with_database_url(&server.uri())
        .to_app_config();
    let app = create_test_app(config);

    let request = Request::builder()
        .method("POST")
        .uri("/register")
        .header("content-type", "application/json")
        .body(Body::from(
            json!({
                "email": "doc@example.com",
                "password": "long-enough-password",
                "workspace_name": "Test Clinic",
            })
            .to_string(),
        ))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let user: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(user["email"], "doc@example.com");
    assert_eq!(user["role"], "doctor");
    // The password hash never leaves the service.
    assert!(user.get("hashed_password").is_none());
}

#[tokio::test]
async fn login_endpoint_rejects_bad_credentials() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let config = TestConfig::default()
        .with_database_url(&server.uri())
        .to_app_config();
    let app = create_test_app(config);

    let request = Request::builder()
        .method("POST")
        .uri("/login")
        .header("content-type", "application/json")
        .body(Body::from(
            json!({
                "email": "ghost@example.com",
                "password": "whatever-password",
            })
            .to_string(),
        ))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn me_endpoint_requires_a_token() {
    let config = TestConfig::default().to_app_config();
    let app = create_test_app(config);

    let request = Request::builder()
        .method("GET")
        .uri("/me")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn me_endpoint_rejects_expired_token() {
    let config = TestConfig::default().to_app_config();
    let user = TestUser::doctor("doc@example.com");
    let token = JwtTestUtils::create_expired_token(&user, &config.jwt_secret);
    let app = create_test_app(config);

    let request = Request::builder()
        .method("GET")
        .uri("/me")
        .header("authorization", format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
