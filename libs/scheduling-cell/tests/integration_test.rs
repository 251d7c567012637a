use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use chrono::{TimeZone, Utc};
use serde_json::json;
use tower::ServiceExt;
use uuid::Uuid;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use scheduling_cell::router::scheduling_routes;
use shared_config::AppConfig;
use shared_utils::test_utils::{JwtTestUtils, TestConfig, TestUser};

fn create_test_app(config: AppConfig) -> Router {
    scheduling_routes(Arc::new(config))
}

#[tokio::test]
async fn get_availability_is_public() {
    let server = MockServer::start().await;
    let doctor_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/rest/v1/doctor_availability"))
        .and(query_param("doctor_id", format!("eq.{}", doctor_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "id": Uuid::new_v4(),
            "doctor_id": doctor_id,
            "day_of_week": 1,
            "start_time": "09:00:00",
            "end_time": "17:00:00",
        }])))
        .mount(&server)
        .await;

    let config = TestConfig::default()
        .with_database_url(&server.uri())
        .to_app_config();
    let app = create_test_app(config);

    let request = Request::builder()
        .method("GET")
        .uri(format!("/availability/doctors/{}", doctor_id))
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let rules: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(rules.as_array().unwrap().len(), 1);
    assert_eq!(rules[0]["day_of_week"], 1);
}

#[tokio::test]
async fn set_availability_requires_a_token() {
    let config = TestConfig::default().to_app_config();
    let app = create_test_app(config);

    let request = Request::builder()
        .method("POST")
        .uri("/availability")
        .header("content-type", "application/json")
        .body(Body::from(json!({ "rules": [] }).to_string()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn set_availability_replaces_rules_for_the_caller() {
    let server = MockServer::start().await;
    let user = TestUser::doctor("doc@example.com");

    Mock::given(method("DELETE"))
        .and(path("/rest/v1/doctor_availability"))
        .and(query_param("doctor_id", format!("eq.{}", user.id)))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/doctor_availability"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([{
            "id": Uuid::new_v4(),
            "doctor_id": user.id,
            "day_of_week": 1,
            "start_time": "09:00:00",
            "end_time": "17:00:00",
        }])))
        .expect(1)
        .mount(&server)
        .await;

    let config = TestConfig::default()
        .with_database_url(&server.uri())
        .to_app_config();
    let token = JwtTestUtils::create_test_token(&user, &config.jwt_secret, Some(24));
    let app = create_test_app(config);

    let request = Request::builder()
        .method("POST")
        .uri("/availability")
        .header("authorization", format!("Bearer {}", token))
        .header("content-type", "application/json")
        .body(Body::from(
            json!({
                "rules": [
                    { "day_of_week": 1, "start_time": "09:00:00", "end_time": "17:00:00" }
                ]
            })
            .to_string(),
        ))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn set_availability_rejects_inverted_rule() {
    let user = TestUser::doctor("doc@example.com");
    let config = TestConfig::default().to_app_config();
    let token = JwtTestUtils::create_test_token(&user, &config.jwt_secret, Some(24));
    let app = create_test_app(config);

    let request = Request::builder()
        .method("POST")
        .uri("/availability")
        .header("authorization", format!("Bearer {}", token))
        .header("content-type", "application/json")
        .body(Body::from(
            json!({
                "rules": [
                    { "day_of_week": 1, "start_time": "17:00:00", "end_time": "09:00:00" }
                ]
            })
            .to_string(),
        ))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn set_availability_rejects_day_out_of_range() {
    let user = TestUser::doctor("doc@example.com");
    let config = TestConfig::default().to_app_config();
    let token = JwtTestUtils::create_test_token(&user, &config.jwt_secret, Some(24));
    let app = create_test_app(config);

    let request = Request::builder()
        .method("POST")
        .uri("/availability")
        .header("authorization", format!("Bearer {}", token))
        .header("content-type", "application/json")
        .body(Body::from(
            json!({
                "rules": [
                    { "day_of_week": 7, "start_time": "09:00:00", "end_time": "17:00:00" }
                ]
            })
            .to_string(),
        ))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn booking_conflict_surfaces_as_409() {
    let server = MockServer::start().await;
    let user = TestUser::doctor("doc@example.com");
    let doctor_id = Uuid::new_v4();
    // 2025-06-02 is a Monday
    let start = Utc.with_ymd_and_hms(2025, 6, 2, 10, 0, 0).unwrap();
    let end = Utc.with_ymd_and_hms(2025, 6, 2, 10, 30, 0).unwrap();

    Mock::given(method("GET"))
        .and(path("/rest/v1/doctor_availability"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "id": Uuid::new_v4(),
            "doctor_id": doctor_id,
            "day_of_week": 1,
            "start_time": "09:00:00",
            "end_time": "17:00:00",
        }])))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "id": Uuid::new_v4(),
            "patient_name": "Existing Patient",
            "patient_contact_details": "+353870000000",
            "doctor_id": doctor_id,
            "clinic_id": Uuid::new_v4(),
            "start_time": start.to_rfc3339(),
            "end_time": end.to_rfc3339(),
            "status": "SCHEDULED",
            "notes": null,
            "created_at": Utc::now().to_rfc3339(),
        }])))
        .mount(&server)
        .await;

    let config = TestConfig::default()
        .with_database_url(&server.uri())
        .to_app_config();
    let token = JwtTestUtils::create_test_token(&user, &config.jwt_secret, Some(24));
    let app = create_test_app(config);

    let request = Request::builder()
        .method("POST")
        .uri("/appointments")
        .header("authorization", format!("Bearer {}", token))
        .header("content-type", "application/json")
        .body(Body::from(
            json!({
                "patient_name": "Jane Doe",
                "patient_contact_details": "+353871234567",
                "doctor_id": doctor_id,
                "clinic_id": Uuid::new_v4(),
                "start_time": start.to_rfc3339(),
                "end_time": end.to_rfc3339(),
            })
            .to_string(),
        ))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let error: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(error["error"], "The requested time slot is already booked.");
}
