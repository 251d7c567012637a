use std::sync::Arc;

use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
};
use serde_json::{json, Value};
use tracing::debug;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::error::AppError;

use crate::models::{ImagingError, StudyWithImages, UploadStudyRequest, UploadStudyResponse};
use crate::services::{delivery::DeliveryService, study::StudyService};

fn map_imaging_error(err: ImagingError) -> AppError {
    match err {
        ImagingError::StudyNotFound => AppError::NotFound("Study not found".to_string()),
        ImagingError::PatientNotFound => AppError::NotFound("Patient not found".to_string()),
        ImagingError::NoImages => {
            AppError::NotFound("No images found for this study".to_string())
        }
        ImagingError::ValidationError(msg) => AppError::ValidationError(msg),
        ImagingError::StorageError(msg) => AppError::Internal(format!("Failed to upload image: {}", msg)),
        ImagingError::SmsGatewayError(msg) => AppError::ExternalService(msg),
        ImagingError::DatabaseError(msg) => AppError::Database(msg),
    }
}

pub async fn upload_study(
    State(config): State<Arc<AppConfig>>,
    Json(request): Json<UploadStudyRequest>,
) -> Result<(StatusCode, Json<UploadStudyResponse>), AppError> {
    debug!("Uploading study for patient {}", request.patient_national_id);

    let service = StudyService::new(&config);
    let response = service.upload_study(request).await.map_err(map_imaging_error)?;

    Ok((StatusCode::CREATED, Json(response)))
}

pub async fn get_study(
    State(config): State<Arc<AppConfig>>,
    Path(study_id): Path<Uuid>,
) -> Result<Json<StudyWithImages>, AppError> {
    let service = StudyService::new(&config);
    let bundle = service
        .get_study_with_images(study_id)
        .await
        .map_err(map_imaging_error)?;

    Ok(Json(bundle))
}

pub async fn send_study_link(
    State(config): State<Arc<AppConfig>>,
    Path(study_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    debug!("Sharing study {}", study_id);

    let service = DeliveryService::new(&config);
    service.send_study_link(study_id).await.map_err(map_imaging_error)?;

    Ok(Json(json!({ "status": "sms_sent_successfully" })))
}
