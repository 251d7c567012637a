use async_trait::async_trait;
use tracing::{error, info};

use shared_config::AppConfig;
use shared_events::{ClinicEvent, EventHandler};

use crate::models::MemberRole;
use crate::services::membership::MembershipService;

/// Completes the registration chain: once a workspace exists, its
/// owner becomes the first (admin) member.
pub struct MembershipWorker {
    config: AppConfig,
}

impl MembershipWorker {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }
}

#[async_trait]
impl EventHandler for MembershipWorker {
    fn name(&self) -> &'static str {
        "membership-worker"
    }

    async fn handle(&self, event: ClinicEvent) {
        let (clinic_id, user_id) = match event {
            ClinicEvent::WorkspaceCreated { clinic_id, user_id } => (clinic_id, user_id),
            _ => return,
        };

        let service = MembershipService::new(&self.config);
        match service.create_member(clinic_id, user_id, MemberRole::Admin).await {
            Ok(member) => {
                info!(
                    "Enrolled user {} as admin of clinic {} (membership {})",
                    user_id, clinic_id, member.id
                );
            }
            Err(e) => {
                error!(
                    "Failed to enroll user {} in clinic {}: {}",
                    user_id, clinic_id, e
                );
            }
        }
    }
}
