use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, warn};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::postgrest::PostgrestClient;
use shared_events::{ClinicEvent, EventPublisher};
use shared_utils::jwt::issue_token;

use crate::models::{AuthError, LoginRequest, RegisterRequest, UserRecord};
use crate::services::password::{hash_password, verify_password};

pub struct AccountService {
    db: PostgrestClient,
    config: AppConfig,
}

impl AccountService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            db: PostgrestClient::new(config),
            config: config.clone(),
        }
    }

    pub async fn register(&self, request: RegisterRequest) -> Result<UserRecord, AuthError> {
        let email = request.email.trim().to_lowercase();
        debug!("Registering new user: {}", email);

        let existing: Vec<Value> = self
            .db
            .request(
                Method::GET,
                &format!("/rest/v1/users?email=eq.{}&select=id", email),
                None,
                None,
            )
            .await
            .map_err(|e| AuthError::DatabaseError(e.to_string()))?;

        if !existing.is_empty() {
            return Err(AuthError::EmailTaken);
        }

        let hashed_password =
            hash_password(&request.password).map_err(|e| AuthError::HashingError(e.to_string()))?;

        let user_data = json!({
            "email": email,
            "hashed_password": hashed_password,
            "full_name": request.full_name,
            "role": request.role,
            "is_active": true,
        });

        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            "Prefer",
            reqwest::header::HeaderValue::from_static("return=representation"),
        );

        let created: Vec<Value> = self
            .db
            .request_with_headers(
                Method::POST,
                "/rest/v1/users",
                None,
                Some(user_data),
                Some(headers),
            )
            .await
            .map_err(|e| AuthError::DatabaseError(e.to_string()))?;

        let row = created
            .into_iter()
            .next()
            .ok_or_else(|| AuthError::DatabaseError("Insert returned no row".to_string()))?;

        let user: UserRecord = serde_json::from_value(row)
            .map_err(|e| AuthError::DatabaseError(format!("Failed to parse user row: {}", e)))?;

        debug!("User registered with ID: {}", user.id);
        Ok(user)
    }

    /// Tell the rest of the platform about the new account. Best-effort:
    /// registration already committed, so a bus failure only logs.
    pub async fn announce_registration(&self, user: &UserRecord, workspace_name: &str) {
        let event = ClinicEvent::UserCreated {
            user_id: user.id,
            user_email: user.email.clone(),
            workspace_name: workspace_name.to_string(),
        };

        match EventPublisher::connect(&self.config).await {
            Ok(publisher) => {
                if let Err(e) = publisher.publish(&event).await {
                    warn!("Failed to publish USER_CREATED for {}: {}", user.id, e);
                }
            }
            Err(e) => {
                warn!("Event bus unavailable, USER_CREATED for {} dropped: {}", user.id, e);
            }
        }
    }

    pub async fn authenticate(&self, request: LoginRequest) -> Result<String, AuthError> {
        let email = request.email.trim().to_lowercase();
        debug!("Authenticating user: {}", email);

        let user = match self.find_by_email(&email).await? {
            Some(user) => user,
            None => return Err(AuthError::InvalidCredentials),
        };

        let password_ok = verify_password(&request.password, &user.hashed_password)
            .map_err(|e| AuthError::HashingError(e.to_string()))?;
        if !password_ok || !user.is_active {
            return Err(AuthError::InvalidCredentials);
        }

        issue_token(
            &user.id.to_string(),
            Some(&user.email),
            Some(&user.role.to_string()),
            &self.config.jwt_secret,
            self.config.access_token_ttl_minutes,
        )
        .map_err(AuthError::TokenError)
    }

    pub async fn get_user(&self, user_id: &str) -> Result<UserRecord, AuthError> {
        let user_uuid = Uuid::parse_str(user_id).map_err(|_| AuthError::InvalidSubject)?;

        let result: Vec<Value> = self
            .db
            .request(
                Method::GET,
                &format!("/rest/v1/users?id=eq.{}", user_uuid),
                None,
                None,
            )
            .await
            .map_err(|e| AuthError::DatabaseError(e.to_string()))?;

        let row = result.into_iter().next().ok_or(AuthError::UserNotFound)?;

        serde_json::from_value(row)
            .map_err(|e| AuthError::DatabaseError(format!("Failed to parse user row: {}", e)))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, AuthError> {
        let result: Vec<Value> = self
            .db
            .request(
                Method::GET,
                &format!("/rest/v1/users?email=eq.{}", email),
                None,
                None,
            )
            .await
            .map_err(|e| AuthError::DatabaseError(e.to_string()))?;

        match result.into_iter().next() {
            Some(row) => {
                let user = serde_json::from_value(row).map_err(|e| {
                    AuthError::DatabaseError(format!("Failed to parse user row: {}", e))
                })?;
                Ok(Some(user))
            }
            None => Ok(None),
        }
    }
}
