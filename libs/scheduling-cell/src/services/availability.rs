use reqwest::Method;
use serde_json::{json, Value};
use tracing::debug;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::postgrest::PostgrestClient;

use crate::models::{AvailabilityRule, DoctorAvailability, SchedulingError};

pub struct AvailabilityService {
    db: PostgrestClient,
}

impl AvailabilityService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            db: PostgrestClient::new(config),
        }
    }

    /// Replace-all semantics: the submitted rule set becomes the
    /// doctor's entire weekly schedule.
    pub async fn replace_doctor_availability(
        &self,
        doctor_id: Uuid,
        rules: &[AvailabilityRule],
    ) -> Result<Vec<DoctorAvailability>, SchedulingError> {
        debug!("Replacing availability for doctor {} ({} rules)", doctor_id, rules.len());

        self.db
            .request_no_content(
                Method::DELETE,
                &format!("/rest/v1/doctor_availability?doctor_id=eq.{}", doctor_id),
                None,
                None,
            )
            .await
            .map_err(|e| SchedulingError::DatabaseError(e.to_string()))?;

        if rules.is_empty() {
            return Ok(vec![]);
        }

        let rows: Vec<Value> = rules
            .iter()
            .map(|rule| {
                json!({
                    "doctor_id": doctor_id,
                    "day_of_week": rule.day_of_week,
                    "start_time": rule.start_time,
                    "end_time": rule.end_time,
                })
            })
            .collect();

        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            "Prefer",
            reqwest::header::HeaderValue::from_static("return=representation"),
        );

        let created: Vec<Value> = self
            .db
            .request_with_headers(
                Method::POST,
                "/rest/v1/doctor_availability",
                None,
                Some(Value::Array(rows)),
                Some(headers),
            )
            .await
            .map_err(|e| SchedulingError::DatabaseError(e.to_string()))?;

        created
            .into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<DoctorAvailability>, _>>()
            .map_err(|e| {
                SchedulingError::DatabaseError(format!("Failed to parse availability rows: {}", e))
            })
    }

    pub async fn get_doctor_availability(
        &self,
        doctor_id: Uuid,
    ) -> Result<Vec<DoctorAvailability>, SchedulingError> {
        let path = format!(
            "/rest/v1/doctor_availability?doctor_id=eq.{}&order=day_of_week.asc,start_time.asc",
            doctor_id
        );

        let result: Vec<Value> = self
            .db
            .request(Method::GET, &path, None, None)
            .await
            .map_err(|e| SchedulingError::DatabaseError(e.to_string()))?;

        result
            .into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<DoctorAvailability>, _>>()
            .map_err(|e| {
                SchedulingError::DatabaseError(format!("Failed to parse availability rows: {}", e))
            })
    }

    pub async fn get_availability_for_day(
        &self,
        doctor_id: Uuid,
        day_of_week: i32,
    ) -> Result<Vec<DoctorAvailability>, SchedulingError> {
        let path = format!(
            "/rest/v1/doctor_availability?doctor_id=eq.{}&day_of_week=eq.{}",
            doctor_id, day_of_week
        );

        let result: Vec<Value> = self
            .db
            .request(Method::GET, &path, None, None)
            .await
            .map_err(|e| SchedulingError::DatabaseError(e.to_string()))?;

        result
            .into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<DoctorAvailability>, _>>()
            .map_err(|e| {
                SchedulingError::DatabaseError(format!("Failed to parse availability rows: {}", e))
            })
    }
}
