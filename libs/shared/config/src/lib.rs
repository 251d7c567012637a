use std::env;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_rest_url: String,
    pub database_service_key: String,
    pub jwt_secret: String,
    pub access_token_ttl_minutes: i64,
    pub redis_url: String,
    pub sms_gateway_url: String,
    pub my_domain: String,
    pub environment: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let config = Self {
            database_rest_url: env::var("DATABASE_REST_URL")
                .unwrap_or_else(|_| {
                    warn!("DATABASE_REST_URL not set, using empty value");
                    String::new()
                }),
            database_service_key: env::var("DATABASE_SERVICE_KEY")
                .unwrap_or_else(|_| {
                    warn!("DATABASE_SERVICE_KEY not set, using empty value");
                    String::new()
                }),
            jwt_secret: env::var("JWT_SECRET")
                .unwrap_or_else(|_| {
                    warn!("JWT_SECRET not set, using empty value");
                    String::new()
                }),
            access_token_ttl_minutes: env::var("ACCESS_TOKEN_TTL_MINUTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(60),
            redis_url: env::var("REDIS_URL")
                .unwrap_or_else(|_| {
                    warn!("REDIS_URL not set, using default");
                    "redis://127.0.0.1:6379/0".to_string()
                }),
            sms_gateway_url: env::var("SMS_GATEWAY_URL")
                .unwrap_or_else(|_| {
                    warn!("SMS_GATEWAY_URL not set, using empty value");
                    String::new()
                }),
            my_domain: env::var("MY_DOMAIN")
                .unwrap_or_else(|_| "localhost".to_string()),
            environment: env::var("ENVIRONMENT")
                .unwrap_or_else(|_| "local".to_string()),
        };

        if !config.is_configured() {
            warn!("Application not fully configured - missing environment variables");
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        !self.database_rest_url.is_empty()
            && !self.database_service_key.is_empty()
            && !self.jwt_secret.is_empty()
    }

    pub fn is_sms_configured(&self) -> bool {
        !self.sms_gateway_url.is_empty()
    }

    /// Origins allowed to call the API from a browser.
    pub fn cors_origins(&self) -> Vec<String> {
        let mut origins = vec!["http://localhost:3000".to_string()];
        if self.my_domain != "localhost" {
            origins.push(format!("https://frontend.{}", self.my_domain));
        }
        origins
    }
}
