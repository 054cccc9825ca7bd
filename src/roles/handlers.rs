use axum::{extract::State, Json};
use tracing::instrument;

use crate::authz::{require, SessionUser};
use crate::error::ApiError;
use crate::roles::dto::RoleListResponse;
use crate::roles::repo::RoleRecord;
use crate::state::AppState;

/// All roles with live per-role user counts. Requires read:roles.
#[instrument(skip(state, principal))]
pub async fn list_roles(
    State(state): State<AppState>,
    SessionUser(principal): SessionUser,
) -> Result<Json<RoleListResponse>, ApiError> {
    require(principal.as_ref(), "roles", "read")?;

    let roles = RoleRecord::list_with_user_counts(&state.db)
        .await
        .map_err(ApiError::Internal)?;
    Ok(Json(RoleListResponse { roles }))
}
