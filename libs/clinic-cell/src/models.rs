use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    Free,
    Premium,
    Expired,
}

impl Default for SubscriptionStatus {
    fn default() -> Self {
        SubscriptionStatus::Free
    }
}

impl fmt::Display for SubscriptionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubscriptionStatus::Free => write!(f, "free"),
            SubscriptionStatus::Premium => write!(f, "premium"),
            SubscriptionStatus::Expired => write!(f, "expired"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Clinic {
    pub id: Uuid,
    pub name: String,
    pub address: Option<String>,
    pub owner_id: Uuid,
    pub subscription_status: SubscriptionStatus,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateClinicRequest {
    pub name: String,
    pub address: Option<String>,
    #[serde(default)]
    pub subscription_status: SubscriptionStatus,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateClinicRequest {
    pub name: Option<String>,
    pub address: Option<String>,
    pub subscription_status: Option<SubscriptionStatus>,
}

#[derive(Debug, thiserror::Error)]
pub enum ClinicError {
    #[error("Clinic not found")]
    NotFound,

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}
