use std::sync::Arc;

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{Duration, Utc};
use hmac::{Hmac, Mac};
use serde_json::json;
use sha2::Sha256;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::auth::AuthUser;

pub struct TestConfig {
    pub jwt_secret: String,
    pub database_rest_url: String,
    pub database_service_key: String,
    pub sms_gateway_url: String,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "test-secret-key-for-jwt-validation-must-be-long-enough".to_string(),
            database_rest_url: "http://localhost:54321".to_string(),
            database_service_key: "test-service-key".to_string(),
            sms_gateway_url: String::new(),
        }
    }
}

impl TestConfig {
    pub fn with_database_url(mut self, url: &str) -> Self {
        self.database_rest_url = url.to_string();
        self
    }

    pub fn with_sms_gateway(mut self, url: &str) -> Self {
        self.sms_gateway_url = url.to_string();
        self
    }

    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            database_rest_url: self.database_rest_url.clone(),
            database_service_key: self.database_service_key.clone(),
            jwt_secret: self.jwt_secret.clone(),
            access_token_ttl_minutes: 60,
            redis_url: "redis://127.0.0.1:6379/0".to_string(),
            sms_gateway_url: self.sms_gateway_url.clone(),
            my_domain: "localhost".to_string(),
            environment: "test".to_string(),
        }
    }

    pub fn to_arc(&self) -> Arc<AppConfig> {
        Arc::new(self.to_app_config())
    }
}

pub struct TestUser {
    pub id: String,
    pub email: String,
    pub role: String,
}

impl Default for TestUser {
    fn default() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            email: "test@example.com".to_string(),
            role: "doctor".to_string(),
        }
    }
}

impl TestUser {
    pub fn new(email: &str, role: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            email: email.to_string(),
            role: role.to_string(),
        }
    }

    pub fn doctor(email: &str) -> Self {
        Self::new(email, "doctor")
    }

    pub fn clinic_admin(email: &str) -> Self {
        Self::new(email, "clinic_admin")
    }

    pub fn to_auth_user(&self) -> AuthUser {
        AuthUser {
            id: self.id.clone(),
            email: Some(self.email.clone()),
            role: Some(self.role.clone()),
            issued_at: Some(Utc::now()),
        }
    }
}

pub struct JwtTestUtils;

impl JwtTestUtils {
    /// Hand-built token so tests stay independent of the production
    /// signer.
    pub fn create_test_token(user: &TestUser, secret: &str, hours_valid: Option<i64>) -> String {
        let exp = Utc::now() + Duration::hours(hours_valid.unwrap_or(24));
        Self::create_token_with_exp(user, secret, exp.timestamp())
    }

    pub fn create_expired_token(user: &TestUser, secret: &str) -> String {
        let exp = Utc::now() - Duration::hours(1);
        Self::create_token_with_exp(user, secret, exp.timestamp())
    }

    fn create_token_with_exp(user: &TestUser, secret: &str, exp: i64) -> String {
        let header = json!({ "alg": "HS256", "typ": "JWT" });
        let claims = json!({
            "sub": user.id,
            "exp": exp,
            "iat": Utc::now().timestamp(),
            "email": user.email,
            "role": user.role,
        });

        let header_b64 = URL_SAFE_NO_PAD.encode(header.to_string().as_bytes());
        let claims_b64 = URL_SAFE_NO_PAD.encode(claims.to_string().as_bytes());
        let signing_input = format!("{}.{}", header_b64, claims_b64);

        let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes())
            .expect("HMAC accepts any key length");
        mac.update(signing_input.as_bytes());
        let signature = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());

        format!("{}.{}", signing_input, signature)
    }
}
