use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Doctor,
    ClinicAdmin,
}

impl Default for UserRole {
    fn default() -> Self {
        UserRole::Doctor
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserRole::Doctor => write!(f, "doctor"),
            UserRole::ClinicAdmin => write!(f, "clinic_admin"),
        }
    }
}

/// Row shape of the `users` table. Never serialized back to callers;
/// `UserPublic` is the outward view.
#[derive(Debug, Clone, Deserialize)]
pub struct UserRecord {
    pub id: Uuid,
    pub email: String,
    pub hashed_password: String,
    pub full_name: Option<String>,
    pub role: UserRole,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserPublic {
    pub id: Uuid,
    pub email: String,
    pub full_name: Option<String>,
    pub role: UserRole,
    pub is_active: bool,
}

impl From<UserRecord> for UserPublic {
    fn from(user: UserRecord) -> Self {
        Self {
            id: user.id,
            email: user.email,
            full_name: user.full_name,
            role: user.role,
            is_active: user.is_active,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub full_name: Option<String>,
    #[serde(default)]
    pub role: UserRole,
    pub workspace_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Email already registered")]
    EmailTaken,

    #[error("Incorrect email or password")]
    InvalidCredentials,

    #[error("User not found")]
    UserNotFound,

    #[error("Invalid token subject")]
    InvalidSubject,

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Password hashing error: {0}")]
    HashingError(String),

    #[error("Token error: {0}")]
    TokenError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}
