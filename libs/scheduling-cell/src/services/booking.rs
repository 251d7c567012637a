use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, warn};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::postgrest::PostgrestClient;

use crate::models::{
    Appointment, AppointmentSearchQuery, AppointmentStatus, CreateAppointmentRequest,
    SchedulingError,
};
use crate::services::availability::AvailabilityService;
use crate::services::slots::{blocks_slot, intervals_overlap, weekday_index, within_any_rule};

pub struct BookingService {
    db: PostgrestClient,
    availability: AvailabilityService,
}

impl BookingService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            db: PostgrestClient::new(config),
            availability: AvailabilityService::new(config),
        }
    }

    /// Book a slot. The request must sit inside the doctor's weekly
    /// working hours and stay clear of every live appointment.
    pub async fn create_appointment(
        &self,
        request: CreateAppointmentRequest,
    ) -> Result<Appointment, SchedulingError> {
        if request.start_time >= request.end_time {
            return Err(SchedulingError::InvalidTimeRange);
        }
        if request.start_time.date_naive() != request.end_time.date_naive() {
            return Err(SchedulingError::CrossDayAppointment);
        }

        let day_of_week = weekday_index(request.start_time);
        let rules = self
            .availability
            .get_availability_for_day(request.doctor_id, day_of_week)
            .await?;

        if !within_any_rule(&rules, request.start_time.time(), request.end_time.time()) {
            warn!(
                "Booking for doctor {} at {} rejected: outside working hours",
                request.doctor_id, request.start_time
            );
            return Err(SchedulingError::OutsideWorkingHours);
        }

        let existing = self
            .get_doctor_appointments_in_range(
                request.doctor_id,
                request.start_time,
                request.end_time,
            )
            .await?;

        let conflict = existing.iter().any(|appointment| {
            blocks_slot(appointment.status)
                && intervals_overlap(
                    request.start_time,
                    request.end_time,
                    appointment.start_time,
                    appointment.end_time,
                )
        });

        if conflict {
            warn!(
                "Booking for doctor {} at {} rejected: slot already booked",
                request.doctor_id, request.start_time
            );
            return Err(SchedulingError::SlotTaken);
        }

        self.insert_appointment(&request).await
    }

    pub async fn list_appointments(
        &self,
        query: &AppointmentSearchQuery,
    ) -> Result<Vec<Appointment>, SchedulingError> {
        let mut query_parts = vec![format!("doctor_id=eq.{}", query.doctor_id)];

        if let Some(from) = query.from {
            query_parts.push(format!("start_time=gte.{}", from.to_rfc3339()));
        }
        if let Some(to) = query.to {
            query_parts.push(format!("start_time=lte.{}", to.to_rfc3339()));
        }

        let path = format!(
            "/rest/v1/appointments?{}&order=start_time.asc",
            query_parts.join("&")
        );

        let result: Vec<Value> = self
            .db
            .request(Method::GET, &path, None, None)
            .await
            .map_err(|e| SchedulingError::DatabaseError(e.to_string()))?;

        result
            .into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<Appointment>, _>>()
            .map_err(|e| {
                SchedulingError::DatabaseError(format!("Failed to parse appointment rows: {}", e))
            })
    }

    pub async fn cancel_appointment(
        &self,
        appointment_id: Uuid,
    ) -> Result<Appointment, SchedulingError> {
        debug!("Cancelling appointment {}", appointment_id);

        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            "Prefer",
            reqwest::header::HeaderValue::from_static("return=representation"),
        );

        let result: Vec<Value> = self
            .db
            .request_with_headers(
                Method::PATCH,
                &format!("/rest/v1/appointments?id=eq.{}", appointment_id),
                None,
                Some(json!({ "status": AppointmentStatus::Cancelled })),
                Some(headers),
            )
            .await
            .map_err(|e| SchedulingError::DatabaseError(e.to_string()))?;

        let row = result.into_iter().next().ok_or(SchedulingError::NotFound)?;

        serde_json::from_value(row).map_err(|e| {
            SchedulingError::DatabaseError(format!("Failed to parse appointment row: {}", e))
        })
    }

    async fn get_doctor_appointments_in_range(
        &self,
        doctor_id: Uuid,
        start_time: chrono::DateTime<chrono::Utc>,
        end_time: chrono::DateTime<chrono::Utc>,
    ) -> Result<Vec<Appointment>, SchedulingError> {
        let query_parts = [
            format!("doctor_id=eq.{}", doctor_id),
            format!("start_time=lt.{}", end_time.to_rfc3339()),
            format!("end_time=gt.{}", start_time.to_rfc3339()),
        ];

        let path = format!(
            "/rest/v1/appointments?{}&order=start_time.asc",
            query_parts.join("&")
        );

        let result: Vec<Value> = self
            .db
            .request(Method::GET, &path, None, None)
            .await
            .map_err(|e| SchedulingError::DatabaseError(e.to_string()))?;

        result
            .into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<Appointment>, _>>()
            .map_err(|e| {
                SchedulingError::DatabaseError(format!("Failed to parse appointment rows: {}", e))
            })
    }

    async fn insert_appointment(
        &self,
        request: &CreateAppointmentRequest,
    ) -> Result<Appointment, SchedulingError> {
        let appointment_data = json!({
            "patient_name": request.patient_name,
            "patient_contact_details": request.patient_contact_details,
            "doctor_id": request.doctor_id,
            "clinic_id": request.clinic_id,
            "start_time": request.start_time.to_rfc3339(),
            "end_time": request.end_time.to_rfc3339(),
            "status": AppointmentStatus::Scheduled,
            "notes": request.notes,
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
                "/rest/v1/appointments",
                None,
                Some(appointment_data),
                Some(headers),
            )
            .await
            .map_err(|e| SchedulingError::DatabaseError(e.to_string()))?;

        let row = created
            .into_iter()
            .next()
            .ok_or_else(|| SchedulingError::DatabaseError("Insert returned no row".to_string()))?;

        serde_json::from_value(row).map_err(|e| {
            SchedulingError::DatabaseError(format!("Failed to parse appointment row: {}", e))
        })
    }
}
