use std::sync::Arc;

use axum::extract::{Extension, Json, Path, State};
use tracing::debug;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::auth::AuthUser;
use shared_models::error::AppError;

use crate::models::{ClinicMember, MembershipError};
use crate::services::membership::MembershipService;

fn map_membership_error(err: MembershipError) -> AppError {
    match err {
        MembershipError::DatabaseError(msg) => AppError::Database(msg),
    }
}

pub async fn list_clinic_members(
    State(config): State<Arc<AppConfig>>,
    Path(clinic_id): Path<Uuid>,
) -> Result<Json<Vec<ClinicMember>>, AppError> {
    debug!("Listing members of clinic {}", clinic_id);

    let service = MembershipService::new(&config);
    let members = service
        .list_clinic_members(clinic_id)
        .await
        .map_err(map_membership_error)?;

    Ok(Json(members))
}

pub async fn my_memberships(
    State(config): State<Arc<AppConfig>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<ClinicMember>>, AppError> {
    let user_id = Uuid::parse_str(&user.id)
        .map_err(|_| AppError::Auth("Invalid token subject".to_string()))?;

    let service = MembershipService::new(&config);
    let memberships = service
        .list_user_memberships(user_id)
        .await
        .map_err(map_membership_error)?;

    Ok(Json(memberships))
}
