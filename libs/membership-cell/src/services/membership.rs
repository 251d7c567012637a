use reqwest::Method;
use serde_json::{json, Value};
use tracing::debug;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::postgrest::PostgrestClient;

use crate::models::{ClinicMember, MemberRole, MembershipError};

pub struct MembershipService {
    db: PostgrestClient,
}

impl MembershipService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            db: PostgrestClient::new(config),
        }
    }

    pub async fn create_member(
        &self,
        clinic_id: Uuid,
        user_id: Uuid,
        role: MemberRole,
    ) -> Result<ClinicMember, MembershipError> {
        debug!("Creating {} membership for user {} in clinic {}", role, user_id, clinic_id);

        let member_data = json!({
            "clinic_id": clinic_id,
            "user_id": user_id,
            "role": role,
        });

        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            "Prefer",
            reqwest::header::HeaderValue::from_static("return=representation"),
        );

        let result: Vec<Value> = self
            .db
            .request_with_headers(
                Method::POST,
                "/rest/v1/clinic_members",
                None,
                Some(member_data),
                Some(headers),
            )
            .await
            .map_err(|e| MembershipError::DatabaseError(e.to_string()))?;

        let row = result
            .into_iter()
            .next()
            .ok_or_else(|| MembershipError::DatabaseError("Insert returned no row".to_string()))?;

        serde_json::from_value(row)
            .map_err(|e| MembershipError::DatabaseError(format!("Failed to parse member row: {}", e)))
    }

    pub async fn list_clinic_members(
        &self,
        clinic_id: Uuid,
    ) -> Result<Vec<ClinicMember>, MembershipError> {
        let path = format!(
            "/rest/v1/clinic_members?clinic_id=eq.{}&order=created_at.asc",
            clinic_id
        );

        let result: Vec<Value> = self
            .db
            .request(Method::GET, &path, None, None)
            .await
            .map_err(|e| MembershipError::DatabaseError(e.to_string()))?;

        result
            .into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<ClinicMember>, _>>()
            .map_err(|e| MembershipError::DatabaseError(format!("Failed to parse member rows: {}", e)))
    }

    pub async fn list_user_memberships(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<ClinicMember>, MembershipError> {
        let path = format!(
            "/rest/v1/clinic_members?user_id=eq.{}&order=created_at.asc",
            user_id
        );

        let result: Vec<Value> = self
            .db
            .request(Method::GET, &path, None, None)
            .await
            .map_err(|e| MembershipError::DatabaseError(e.to_string()))?;

        result
            .into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<ClinicMember>, _>>()
            .map_err(|e| MembershipError::DatabaseError(format!("Failed to parse member rows: {}", e)))
    }
}
