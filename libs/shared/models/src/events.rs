use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Redis channel every cell publishes to and subscribes on.
pub const EVENT_CHANNEL: &str = "tessera_events";

/// Cross-cell notifications. The wire format is flat JSON with an
/// `event_type` tag so non-Rust consumers can dispatch on it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event_type")]
pub enum ClinicEvent {
    #[serde(rename = "USER_CREATED")]
    UserCreated {
        user_id: Uuid,
        user_email: String,
        workspace_name: String,
    },

    #[serde(rename = "WORKSPACE_CREATED")]
    WorkspaceCreated {
        clinic_id: Uuid,
        user_id: Uuid,
    },
}

impl ClinicEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            ClinicEvent::UserCreated { .. } => "USER_CREATED",
            ClinicEvent::WorkspaceCreated { .. } => "WORKSPACE_CREATED",
        }
    }
}
