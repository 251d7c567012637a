use async_trait::async_trait;
use tracing::{error, info};

use shared_config::AppConfig;
use shared_events::{ClinicEvent, EventHandler, EventPublisher};

use crate::models::CreateClinicRequest;
use crate::services::clinic::ClinicService;

/// Turns USER_CREATED events into workspaces: one clinic per fresh
/// registration, owned by the new user.
pub struct WorkspaceProvisioner {
    config: AppConfig,
}

impl WorkspaceProvisioner {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }
}

#[async_trait]
impl EventHandler for WorkspaceProvisioner {
    fn name(&self) -> &'static str {
        "clinic-provisioner"
    }

    async fn handle(&self, event: ClinicEvent) {
        let (user_id, workspace_name) = match event {
            ClinicEvent::UserCreated {
                user_id,
                workspace_name,
                ..
            } => (user_id, workspace_name),
            _ => return,
        };

        let service = ClinicService::new(&self.config);
        let request = CreateClinicRequest {
            name: workspace_name,
            address: None,
            subscription_status: Default::default(),
        };

        let clinic = match service.create_clinic(user_id, request).await {
            Ok(clinic) => clinic,
            Err(e) => {
                error!("Failed to provision workspace for user {}: {}", user_id, e);
                return;
            }
        };

        info!("Provisioned clinic {} for user {}", clinic.id, user_id);

        let follow_up = ClinicEvent::WorkspaceCreated {
            clinic_id: clinic.id,
            user_id,
        };

        match EventPublisher::connect(&self.config).await {
            Ok(publisher) => {
                if let Err(e) = publisher.publish(&follow_up).await {
                    error!("Failed to publish WORKSPACE_CREATED for clinic {}: {}", clinic.id, e);
                }
            }
            Err(e) => {
                error!(
                    "Event bus unavailable, WORKSPACE_CREATED for clinic {} dropped: {}",
                    clinic.id, e
                );
            }
        }
    }
}
