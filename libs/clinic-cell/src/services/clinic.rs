use reqwest::Method;
use serde_json::{json, Value};
use tracing::debug;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::postgrest::PostgrestClient;

use crate::models::{Clinic, ClinicError, CreateClinicRequest, UpdateClinicRequest};

pub struct ClinicService {
    db: PostgrestClient,
}

impl ClinicService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            db: PostgrestClient::new(config),
        }
    }

    pub async fn create_clinic(
        &self,
        owner_id: Uuid,
        request: CreateClinicRequest,
    ) -> Result<Clinic, ClinicError> {
        if request.name.trim().is_empty() {
            return Err(ClinicError::ValidationError("Clinic name cannot be empty".to_string()));
        }

        debug!("Creating clinic '{}' for owner {}", request.name, owner_id);

        let clinic_data = json!({
            "name": request.name,
            "address": request.address,
            "owner_id": owner_id,
            "subscription_status": request.subscription_status,
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
                "/rest/v1/clinics",
                None,
                Some(clinic_data),
                Some(headers),
            )
            .await
            .map_err(|e| ClinicError::DatabaseError(e.to_string()))?;

        let row = result
            .into_iter()
            .next()
            .ok_or_else(|| ClinicError::DatabaseError("Insert returned no row".to_string()))?;

        serde_json::from_value(row)
            .map_err(|e| ClinicError::DatabaseError(format!("Failed to parse clinic row: {}", e)))
    }

    pub async fn get_clinic(&self, clinic_id: Uuid) -> Result<Clinic, ClinicError> {
        debug!("Fetching clinic {}", clinic_id);

        let result: Vec<Value> = self
            .db
            .request(
                Method::GET,
                &format!("/rest/v1/clinics?id=eq.{}", clinic_id),
                None,
                None,
            )
            .await
            .map_err(|e| ClinicError::DatabaseError(e.to_string()))?;

        let row = result.into_iter().next().ok_or(ClinicError::NotFound)?;

        serde_json::from_value(row)
            .map_err(|e| ClinicError::DatabaseError(format!("Failed to parse clinic row: {}", e)))
    }

    pub async fn list_clinics(&self) -> Result<Vec<Clinic>, ClinicError> {
        let result: Vec<Value> = self
            .db
            .request(Method::GET, "/rest/v1/clinics?order=name.asc", None, None)
            .await
            .map_err(|e| ClinicError::DatabaseError(e.to_string()))?;

        result
            .into_iter()
            .map(|row| serde_json::from_value(row))
            .collect::<Result<Vec<Clinic>, _>>()
            .map_err(|e| ClinicError::DatabaseError(format!("Failed to parse clinic rows: {}", e)))
    }

    pub async fn update_clinic(
        &self,
        clinic_id: Uuid,
        request: UpdateClinicRequest,
    ) -> Result<Clinic, ClinicError> {
        debug!("Updating clinic {}", clinic_id);

        let mut update_data = serde_json::Map::new();
        if let Some(name) = request.name {
            if name.trim().is_empty() {
                return Err(ClinicError::ValidationError("Clinic name cannot be empty".to_string()));
            }
            update_data.insert("name".to_string(), json!(name));
        }
        if let Some(address) = request.address {
            update_data.insert("address".to_string(), json!(address));
        }
        if let Some(status) = request.subscription_status {
            update_data.insert("subscription_status".to_string(), json!(status));
        }

        if update_data.is_empty() {
            return self.get_clinic(clinic_id).await;
        }

        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            "Prefer",
            reqwest::header::HeaderValue::from_static("return=representation"),
        );

        let result: Vec<Value> = self
            .db
            .request_with_headers(
                Method::PATCH,
                &format!("/rest/v1/clinics?id=eq.{}", clinic_id),
                None,
                Some(Value::Object(update_data)),
                Some(headers),
            )
            .await
            .map_err(|e| ClinicError::DatabaseError(e.to_string()))?;

        let row = result.into_iter().next().ok_or(ClinicError::NotFound)?;

        serde_json::from_value(row)
            .map_err(|e| ClinicError::DatabaseError(format!("Failed to parse clinic row: {}", e)))
    }

    pub async fn delete_clinic(&self, clinic_id: Uuid) -> Result<(), ClinicError> {
        debug!("Deleting clinic {}", clinic_id);

        // Missing rows make the delete a no-op; callers asked for the
        // row to be gone either way.
        self.db
            .request_no_content(
                Method::DELETE,
                &format!("/rest/v1/clinics?id=eq.{}", clinic_id),
                None,
                None,
            )
            .await
            .map_err(|e| ClinicError::DatabaseError(e.to_string()))
    }
}
