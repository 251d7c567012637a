use std::sync::Arc;
use std::sync::OnceLock;

use axum::{
    extract::{Extension, Json, State},
    http::StatusCode,
};
use regex::Regex;
use tracing::debug;

use shared_config::AppConfig;
use shared_models::auth::{AuthUser, TokenResponse};
use shared_models::error::AppError;

use crate::models::{AuthError, LoginRequest, RegisterRequest, UserPublic};
use crate::services::account::AccountService;

const MIN_PASSWORD_LEN: usize = 8;

fn email_regex() -> &'static Regex {
    static EMAIL_RE: OnceLock<Regex> = OnceLock::new();
    EMAIL_RE.get_or_init(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid regex"))
}

fn map_auth_error(err: AuthError) -> AppError {
    match err {
        AuthError::EmailTaken => AppError::BadRequest("Email already registered".to_string()),
        AuthError::InvalidCredentials => {
            AppError::Auth("Incorrect email or password".to_string())
        }
        AuthError::UserNotFound => AppError::Auth("User not found".to_string()),
        AuthError::InvalidSubject => AppError::Auth("Invalid token subject".to_string()),
        AuthError::ValidationError(msg) => AppError::ValidationError(msg),
        AuthError::HashingError(msg) => AppError::Internal(msg),
        AuthError::TokenError(msg) => AppError::Internal(msg),
        AuthError::DatabaseError(msg) => AppError::Database(msg),
    }
}

fn validate_registration(request: &RegisterRequest) -> Result<(), AppError> {
    if !email_regex().is_match(request.email.trim()) {
        return Err(AppError::ValidationError("Invalid email address".to_string()));
    }
    if request.password.len() < MIN_PASSWORD_LEN {
        return Err(AppError::ValidationError(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }
    if request.workspace_name.trim().is_empty() {
        return Err(AppError::ValidationError("workspace_name cannot be empty".to_string()));
    }
    Ok(())
}

pub async fn register(
    State(config): State<Arc<AppConfig>>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<UserPublic>), AppError> {
    debug!("Handling registration for {}", request.email);

    validate_registration(&request)?;

    let service = AccountService::new(&config);
    let workspace_name = request.workspace_name.clone();

    let user = service.register(request).await.map_err(map_auth_error)?;

    service.announce_registration(&user, &workspace_name).await;

    Ok((StatusCode::CREATED, Json(user.into())))
}

pub async fn login(
    State(config): State<Arc<AppConfig>>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    debug!("Handling login for {}", request.email);

    let service = AccountService::new(&config);
    let access_token = service.authenticate(request).await.map_err(map_auth_error)?;

    Ok(Json(TokenResponse::bearer(access_token)))
}

pub async fn me(
    State(config): State<Arc<AppConfig>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<UserPublic>, AppError> {
    debug!("Fetching profile for user {}", user.id);

    let service = AccountService::new(&config);
    let record = service.get_user(&user.id).await.map_err(map_auth_error)?;

    Ok(Json(record.into()))
}
