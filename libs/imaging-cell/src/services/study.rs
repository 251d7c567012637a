use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use chrono::Utc;
use reqwest::Method;
use serde_json::{json, Value};
use tracing::debug;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::postgrest::PostgrestClient;

use crate::models::{
    ImagingError, ImagingPatient, Study, StudyImage, StudyWithImages, UploadStudyRequest,
    UploadStudyResponse,
};
use crate::PACS_BUCKET;

pub struct StudyService {
    db: PostgrestClient,
}

impl StudyService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            db: PostgrestClient::new(config),
        }
    }

    pub async fn upload_study(
        &self,
        request: UploadStudyRequest,
    ) -> Result<UploadStudyResponse, ImagingError> {
        if request.patient_national_id.trim().is_empty() {
            return Err(ImagingError::ValidationError(
                "patient_national_id cannot be empty".to_string(),
            ));
        }
        if request.image_filename.trim().is_empty() {
            return Err(ImagingError::ValidationError(
                "image_filename cannot be empty".to_string(),
            ));
        }

        // Accept both a raw base64 body and a data URL.
        let base64_data = if request.image_base64.contains(";base64,") {
            request
                .image_base64
                .split(";base64,")
                .nth(1)
                .unwrap_or(&request.image_base64)
        } else {
            &request.image_base64
        };

        let file_data = BASE64
            .decode(base64_data)
            .map_err(|e| ImagingError::ValidationError(format!("Invalid base64 payload: {}", e)))?;

        let patient = self.find_or_create_patient(&request).await?;

        let study = self
            .create_study(patient.id, request.clinic_id, &request.study_description)
            .await?;

        let object_name = format!("{}_{}", Uuid::new_v4(), request.image_filename);
        let content_type = request
            .content_type
            .as_deref()
            .unwrap_or("application/octet-stream");

        debug!("Uploading study image as {}/{}", PACS_BUCKET, object_name);
        self.db
            .upload_object(PACS_BUCKET, &object_name, content_type, file_data, None)
            .await
            .map_err(|e| ImagingError::StorageError(e.to_string()))?;

        let image = self
            .create_image_record(study.id, &object_name, content_type)
            .await?;

        Ok(UploadStudyResponse {
            patient_id: patient.id,
            study_id: study.id,
            image_id: image.id,
            object_name,
        })
    }

    pub async fn get_study_with_images(
        &self,
        study_id: Uuid,
    ) -> Result<StudyWithImages, ImagingError> {
        let study = self.get_study(study_id).await?;
        let patient = self.get_patient(study.patient_id).await?;
        let images = self.list_images(study_id).await?;

        Ok(StudyWithImages {
            study,
            patient,
            images,
        })
    }

    pub async fn get_study(&self, study_id: Uuid) -> Result<Study, ImagingError> {
        let result: Vec<Value> = self
            .db
            .request(
                Method::GET,
                &format!("/rest/v1/studies?id=eq.{}", study_id),
                None,
                None,
            )
            .await
            .map_err(|e| ImagingError::DatabaseError(e.to_string()))?;

        let row = result.into_iter().next().ok_or(ImagingError::StudyNotFound)?;

        serde_json::from_value(row)
            .map_err(|e| ImagingError::DatabaseError(format!("Failed to parse study row: {}", e)))
    }

    pub async fn get_patient(&self, patient_id: Uuid) -> Result<ImagingPatient, ImagingError> {
        let result: Vec<Value> = self
            .db
            .request(
                Method::GET,
                &format!("/rest/v1/patients?id=eq.{}", patient_id),
                None,
                None,
            )
            .await
            .map_err(|e| ImagingError::DatabaseError(e.to_string()))?;

        let row = result.into_iter().next().ok_or(ImagingError::PatientNotFound)?;

        serde_json::from_value(row)
            .map_err(|e| ImagingError::DatabaseError(format!("Failed to parse patient row: {}", e)))
    }

    pub async fn list_images(&self, study_id: Uuid) -> Result<Vec<StudyImage>, ImagingError> {
        let result: Vec<Value> = self
            .db
            .request(
                Method::GET,
                &format!(
                    "/rest/v1/images?study_id=eq.{}&order=upload_timestamp.asc",
                    study_id
                ),
                None,
                None,
            )
            .await
            .map_err(|e| ImagingError::DatabaseError(e.to_string()))?;

        result
            .into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<StudyImage>, _>>()
            .map_err(|e| ImagingError::DatabaseError(format!("Failed to parse image rows: {}", e)))
    }

    async fn find_or_create_patient(
        &self,
        request: &UploadStudyRequest,
    ) -> Result<ImagingPatient, ImagingError> {
        let existing: Vec<Value> = self
            .db
            .request(
                Method::GET,
                &format!(
                    "/rest/v1/patients?national_id=eq.{}",
                    request.patient_national_id
                ),
                None,
                None,
            )
            .await
            .map_err(|e| ImagingError::DatabaseError(e.to_string()))?;

        if let Some(row) = existing.into_iter().next() {
            return serde_json::from_value(row).map_err(|e| {
                ImagingError::DatabaseError(format!("Failed to parse patient row: {}", e))
            });
        }

        debug!("Creating imaging patient {}", request.patient_national_id);

        let patient_data = json!({
            "full_name": request.patient_full_name,
            "national_id": request.patient_national_id,
            "phone_number": request.patient_phone_number,
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
                "/rest/v1/patients",
                None,
                Some(patient_data),
                Some(headers),
            )
            .await
            .map_err(|e| ImagingError::DatabaseError(e.to_string()))?;

        let row = created
            .into_iter()
            .next()
            .ok_or_else(|| ImagingError::DatabaseError("Insert returned no row".to_string()))?;

        serde_json::from_value(row)
            .map_err(|e| ImagingError::DatabaseError(format!("Failed to parse patient row: {}", e)))
    }

    async fn create_study(
        &self,
        patient_id: Uuid,
        clinic_id: Uuid,
        description: &str,
    ) -> Result<Study, ImagingError> {
        let study_data = json!({
            "patient_id": patient_id,
            "clinic_id": clinic_id,
            "description": description,
            "study_date": Utc::now().to_rfc3339(),
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
                "/rest/v1/studies",
                None,
                Some(study_data),
                Some(headers),
            )
            .await
            .map_err(|e| ImagingError::DatabaseError(e.to_string()))?;

        let row = created
            .into_iter()
            .next()
            .ok_or_else(|| ImagingError::DatabaseError("Insert returned no row".to_string()))?;

        serde_json::from_value(row)
            .map_err(|e| ImagingError::DatabaseError(format!("Failed to parse study row: {}", e)))
    }

    async fn create_image_record(
        &self,
        study_id: Uuid,
        object_name: &str,
        file_format: &str,
    ) -> Result<StudyImage, ImagingError> {
        let image_data = json!({
            "study_id": study_id,
            "object_name": object_name,
            "file_format": file_format,
            "upload_timestamp": Utc::now().to_rfc3339(),
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
                "/rest/v1/images",
                None,
                Some(image_data),
                Some(headers),
            )
            .await
            .map_err(|e| ImagingError::DatabaseError(e.to_string()))?;

        let row = created
            .into_iter()
            .next()
            .ok_or_else(|| ImagingError::DatabaseError("Insert returned no row".to_string()))?;

        serde_json::from_value(row)
            .map_err(|e| ImagingError::DatabaseError(format!("Failed to parse image row: {}", e)))
    }
}
