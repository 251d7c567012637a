use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImagingPatient {
    pub id: Uuid,
    pub full_name: String,
    pub national_id: String,
    pub phone_number: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Study {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub clinic_id: Uuid,
    pub description: String,
    pub study_date: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudyImage {
    pub id: Uuid,
    pub study_id: Uuid,
    pub object_name: String,
    pub file_format: String,
    pub upload_timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UploadStudyRequest {
    pub patient_full_name: String,
    pub patient_national_id: String,
    pub patient_phone_number: String,
    pub study_description: String,
    pub clinic_id: Uuid,
    pub image_base64: String,
    pub image_filename: String,
    pub content_type: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadStudyResponse {
    pub patient_id: Uuid,
    pub study_id: Uuid,
    pub image_id: Uuid,
    pub object_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudyWithImages {
    pub study: Study,
    pub patient: ImagingPatient,
    pub images: Vec<StudyImage>,
}

#[derive(Debug, thiserror::Error)]
pub enum ImagingError {
    #[error("Study not found")]
    StudyNotFound,

    #[error("Patient not found")]
    PatientNotFound,

    #[error("No images found for this study")]
    NoImages,

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("SMS gateway error: {0}")]
    SmsGatewayError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}
