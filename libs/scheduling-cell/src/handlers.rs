use std::sync::Arc;

use axum::{
    extract::{Extension, Json, Path, Query, State},
    http::StatusCode,
};
use tracing::debug;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::auth::AuthUser;
use shared_models::error::AppError;

use crate::models::{
    Appointment, AppointmentSearchQuery, CreateAppointmentRequest, DoctorAvailability,
    SchedulingError, SetAvailabilityRequest,
};
use crate::services::{availability::AvailabilityService, booking::BookingService};

fn map_scheduling_error(err: SchedulingError) -> AppError {
    match err {
        SchedulingError::InvalidTimeRange => AppError::BadRequest(err.to_string()),
        SchedulingError::CrossDayAppointment
        | SchedulingError::OutsideWorkingHours
        | SchedulingError::SlotTaken => AppError::Conflict(err.to_string()),
        SchedulingError::NotFound => AppError::NotFound(err.to_string()),
        SchedulingError::ValidationError(msg) => AppError::ValidationError(msg),
        SchedulingError::DatabaseError(msg) => AppError::Database(msg),
    }
}

fn validate_rules(request: &SetAvailabilityRequest) -> Result<(), AppError> {
    for rule in &request.rules {
        if rule.start_time >= rule.end_time {
            return Err(AppError::BadRequest(
                "start_time must be earlier than end_time".to_string(),
            ));
        }
        if !(0..=6).contains(&rule.day_of_week) {
            return Err(AppError::BadRequest("day_of_week must be in 0..6".to_string()));
        }
    }
    Ok(())
}

pub async fn set_my_availability(
    State(config): State<Arc<AppConfig>>,
    Extension(user): Extension<AuthUser>,
    Json(request): Json<SetAvailabilityRequest>,
) -> Result<Json<Vec<DoctorAvailability>>, AppError> {
    validate_rules(&request)?;

    // Doctors manage their own schedule only.
    let doctor_id = Uuid::parse_str(&user.id)
        .map_err(|_| AppError::Auth("Invalid token subject".to_string()))?;

    debug!("Setting availability for doctor {}", doctor_id);

    let service = AvailabilityService::new(&config);
    let rules = service
        .replace_doctor_availability(doctor_id, &request.rules)
        .await
        .map_err(map_scheduling_error)?;

    Ok(Json(rules))
}

pub async fn get_availability(
    State(config): State<Arc<AppConfig>>,
    Path(doctor_id): Path<Uuid>,
) -> Result<Json<Vec<DoctorAvailability>>, AppError> {
    let service = AvailabilityService::new(&config);
    let rules = service
        .get_doctor_availability(doctor_id)
        .await
        .map_err(map_scheduling_error)?;

    Ok(Json(rules))
}

pub async fn create_appointment(
    State(config): State<Arc<AppConfig>>,
    Json(request): Json<CreateAppointmentRequest>,
) -> Result<(StatusCode, Json<Appointment>), AppError> {
    debug!(
        "Booking request for doctor {} from {} to {}",
        request.doctor_id, request.start_time, request.end_time
    );

    let service = BookingService::new(&config);
    let appointment = service
        .create_appointment(request)
        .await
        .map_err(map_scheduling_error)?;

    Ok((StatusCode::CREATED, Json(appointment)))
}

pub async fn list_appointments(
    State(config): State<Arc<AppConfig>>,
    Query(query): Query<AppointmentSearchQuery>,
) -> Result<Json<Vec<Appointment>>, AppError> {
    let service = BookingService::new(&config);
    let appointments = service
        .list_appointments(&query)
        .await
        .map_err(map_scheduling_error)?;

    Ok(Json(appointments))
}

pub async fn cancel_appointment(
    State(config): State<Arc<AppConfig>>,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<Appointment>, AppError> {
    let service = BookingService::new(&config);
    let appointment = service
        .cancel_appointment(appointment_id)
        .await
        .map_err(map_scheduling_error)?;

    Ok(Json(appointment))
}
