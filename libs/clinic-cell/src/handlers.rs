use std::sync::Arc;

use axum::{
    extract::{Extension, Json, Path, State},
    http::StatusCode,
};
use tracing::debug;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::auth::AuthUser;
use shared_models::error::AppError;

use crate::models::{Clinic, ClinicError, CreateClinicRequest, UpdateClinicRequest};
use crate::services::clinic::ClinicService;

fn map_clinic_error(err: ClinicError) -> AppError {
    match err {
        ClinicError::NotFound => AppError::NotFound("Clinic not found".to_string()),
        ClinicError::ValidationError(msg) => AppError::ValidationError(msg),
        ClinicError::DatabaseError(msg) => AppError::Database(msg),
    }
}

fn parse_owner_id(user: &AuthUser) -> Result<Uuid, AppError> {
    Uuid::parse_str(&user.id).map_err(|_| AppError::Auth("Invalid token subject".to_string()))
}

pub async fn create_clinic(
    State(config): State<Arc<AppConfig>>,
    Extension(user): Extension<AuthUser>,
    Json(request): Json<CreateClinicRequest>,
) -> Result<(StatusCode, Json<Clinic>), AppError> {
    let owner_id = parse_owner_id(&user)?;
    debug!("Creating clinic for owner {}", owner_id);

    let service = ClinicService::new(&config);
    let clinic = service
        .create_clinic(owner_id, request)
        .await
        .map_err(map_clinic_error)?;

    Ok((StatusCode::CREATED, Json(clinic)))
}

pub async fn list_clinics(
    State(config): State<Arc<AppConfig>>,
) -> Result<Json<Vec<Clinic>>, AppError> {
    let service = ClinicService::new(&config);
    let clinics = service.list_clinics().await.map_err(map_clinic_error)?;

    Ok(Json(clinics))
}

pub async fn get_clinic(
    State(config): State<Arc<AppConfig>>,
    Path(clinic_id): Path<Uuid>,
) -> Result<Json<Clinic>, AppError> {
    let service = ClinicService::new(&config);
    let clinic = service.get_clinic(clinic_id).await.map_err(map_clinic_error)?;

    Ok(Json(clinic))
}

pub async fn update_clinic(
    State(config): State<Arc<AppConfig>>,
    Path(clinic_id): Path<Uuid>,
    Json(request): Json<UpdateClinicRequest>,
) -> Result<Json<Clinic>, AppError> {
    let service = ClinicService::new(&config);
    let clinic = service
        .update_clinic(clinic_id, request)
        .await
        .map_err(map_clinic_error)?;

    Ok(Json(clinic))
}

pub async fn delete_clinic(
    State(config): State<Arc<AppConfig>>,
    Path(clinic_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let service = ClinicService::new(&config);
    service.delete_clinic(clinic_id).await.map_err(map_clinic_error)?;

    Ok(StatusCode::NO_CONTENT)
}
