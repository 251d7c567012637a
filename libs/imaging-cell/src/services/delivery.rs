use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, info, warn};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::postgrest::PostgrestClient;

use crate::models::ImagingError;
use crate::services::study::StudyService;
use crate::PACS_BUCKET;

/// How long a shared image link stays valid.
const LINK_TTL_SECONDS: i64 = 604_800;

pub struct DeliveryService {
    db: PostgrestClient,
    studies: StudyService,
    http: reqwest::Client,
    config: AppConfig,
}

impl DeliveryService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            db: PostgrestClient::new(config),
            studies: StudyService::new(config),
            http: reqwest::Client::new(),
            config: config.clone(),
        }
    }

    /// Send the patient one SMS carrying signed links to every image in
    /// the study.
    pub async fn send_study_link(&self, study_id: Uuid) -> Result<(), ImagingError> {
        let bundle = self.studies.get_study_with_images(study_id).await?;

        if bundle.images.is_empty() {
            return Err(ImagingError::NoImages);
        }

        let mut links = Vec::with_capacity(bundle.images.len());
        for image in &bundle.images {
            links.push(self.sign_object_url(&image.object_name).await?);
        }

        let message = format!(
            "Dear {}, your medical images are available:\n{}",
            bundle.patient.full_name,
            links.join("\n")
        );

        self.send_sms(&bundle.patient.phone_number, &message).await
    }

    async fn sign_object_url(&self, object_name: &str) -> Result<String, ImagingError> {
        let path = format!("/storage/v1/object/sign/{}/{}", PACS_BUCKET, object_name);

        let result: Value = self
            .db
            .request(
                Method::POST,
                &path,
                None,
                Some(json!({ "expiresIn": LINK_TTL_SECONDS })),
            )
            .await
            .map_err(|e| ImagingError::StorageError(e.to_string()))?;

        let signed_path = result
            .get("signedURL")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                ImagingError::StorageError("Sign response missing signedURL".to_string())
            })?;

        Ok(format!(
            "{}/storage/v1{}",
            self.db.get_base_url(),
            signed_path
        ))
    }

    async fn send_sms(&self, phone_number: &str, message: &str) -> Result<(), ImagingError> {
        if !self.config.is_sms_configured() {
            // Local stacks run without a gateway; the share flow still
            // has to complete.
            warn!("SMS gateway not configured, skipping delivery to {}", phone_number);
            return Ok(());
        }

        debug!("Sending study link SMS to {}", phone_number);

        let response = self
            .http
            .post(&self.config.sms_gateway_url)
            .json(&json!({
                "to": phone_number,
                "message": message,
            }))
            .send()
            .await
            .map_err(|e| ImagingError::SmsGatewayError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(ImagingError::SmsGatewayError(format!(
                "Gateway returned {}: {}",
                status, error_text
            )));
        }

        info!("Study link SMS delivered to {}", phone_number);
        Ok(())
    }
}
