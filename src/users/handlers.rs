use axum::{extract::State, http::StatusCode, Json};
use time::OffsetDateTime;
use tracing::{info, instrument, warn};

use crate::auth::password::hash_password;
use crate::authz::{require, SessionUser};
use crate::error::{is_unique_violation, ApiError};
use crate::roles::repo::RoleRecord;
use crate::state::AppState;
use crate::users::dto::{
    AddUserRequest, DeleteUserRequest, MessageResponse, RegisterRequest, UpdateUserRequest,
    UserListResponse,
};
use crate::users::repo::{NewUser, UserRecord, UserStatus};
use crate::users::service::age_at;

const EMAIL_TAKEN: &str = "an account is already registered with this email";

/// Public self-registration. No gate check; the account gets the configured
/// default role and starts active.
#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let data = payload.validate()?;

    // Friendly fast path; the unique index below is what actually closes
    // the race, before any hash is computed for the duplicate.
    if UserRecord::find_by_email(&state.db, &data.email)
        .await
        .map_err(ApiError::Internal)?
        .is_some()
    {
        warn!(email = %data.email, "registration with taken email");
        return Err(ApiError::Conflict(EMAIL_TAKEN.into()));
    }

    let password_hash = hash_password(&data.password).map_err(ApiError::Internal)?;

    // The default role is deployment data; its absence is an operator
    // problem, not the caller's.
    let role = RoleRecord::find_by_name(&state.db, &state.config.default_role)
        .await
        .map_err(ApiError::Internal)?
        .ok_or_else(|| {
            ApiError::Internal(anyhow::anyhow!(
                "default role `{}` is not present in the store",
                state.config.default_role
            ))
        })?;

    let age = age_at(data.birthdate, OffsetDateTime::now_utc());

    let new_user = NewUser {
        name: data.name,
        email: data.email,
        password_hash,
        role_id: role.id,
        gender: data.gender,
        age,
        birthdate: data.birthdate,
        hobby: data.hobby,
        status: UserStatus::Active,
    };

    match UserRecord::insert(&state.db, &new_user).await {
        Ok(user) => {
            info!(user_id = %user.id, email = %user.email, "account registered");
            Ok(Json(MessageResponse {
                message: "account registered",
            }))
        }
        Err(e) if is_unique_violation(&e) => Err(ApiError::Conflict(EMAIL_TAKEN.into())),
        Err(e) => Err(e.into()),
    }
}

/// Admin create. Requires create:users; the named role must exist.
#[instrument(skip(state, principal, payload))]
pub async fn add_user(
    State(state): State<AppState>,
    SessionUser(principal): SessionUser,
    Json(payload): Json<AddUserRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let data = payload.validate()?;

    require(principal.as_ref(), "users", "create")?;

    let role = RoleRecord::find_by_name(&state.db, &data.role)
        .await
        .map_err(ApiError::Internal)?
        .ok_or_else(|| ApiError::Conflict(format!("role `{}` not found", data.role)))?;

    let password_hash = hash_password(&data.password).map_err(ApiError::Internal)?;

    let new_user = NewUser {
        name: data.name,
        email: data.email,
        password_hash,
        role_id: role.id,
        gender: data.gender,
        age: data.age,
        birthdate: data.birthdate,
        hobby: data.hobby,
        status: data.status,
    };

    match UserRecord::insert(&state.db, &new_user).await {
        Ok(user) => {
            info!(user_id = %user.id, email = %user.email, "user created");
            Ok(Json(MessageResponse {
                message: "user created",
            }))
        }
        Err(e) if is_unique_violation(&e) => Err(ApiError::Conflict(EMAIL_TAKEN.into())),
        Err(e) => Err(e.into()),
    }
}

/// Partial update. Requires update:users; only provided fields overwrite.
#[instrument(skip(state, principal, payload))]
pub async fn update_user(
    State(state): State<AppState>,
    SessionUser(principal): SessionUser,
    Json(payload): Json<UpdateUserRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let (id, mut patch, role_name) = payload.validate()?;

    require(principal.as_ref(), "users", "update")?;

    let mut user = UserRecord::find_by_id(&state.db, id)
        .await
        .map_err(ApiError::Internal)?
        .ok_or_else(|| ApiError::NotFound("user not found".into()))?;

    if let Some(role_name) = role_name {
        match RoleRecord::find_by_name(&state.db, &role_name)
            .await
            .map_err(ApiError::Internal)?
        {
            Some(role) => patch.role_id = Some(role.id),
            // Unknown role names leave the current role untouched.
            None => warn!(user_id = %id, role = %role_name, "unknown role on update, keeping current"),
        }
    }

    patch.apply(&mut user);
    UserRecord::update_profile(&state.db, &user)
        .await
        .map_err(ApiError::Internal)?;

    info!(user_id = %id, "user updated");
    Ok(Json(MessageResponse {
        message: "user updated",
    }))
}

/// Physical delete. Requires delete:users.
#[instrument(skip(state, principal, payload))]
pub async fn delete_user(
    State(state): State<AppState>,
    SessionUser(principal): SessionUser,
    Json(payload): Json<DeleteUserRequest>,
) -> Result<StatusCode, ApiError> {
    let id = payload
        .id
        .ok_or_else(|| ApiError::Validation("required parameter `id` is missing".into()))?;

    require(principal.as_ref(), "users", "delete")?;

    let user = UserRecord::find_by_id(&state.db, id)
        .await
        .map_err(ApiError::Internal)?
        .ok_or_else(|| ApiError::NotFound("user not found".into()))?;

    UserRecord::delete(&state.db, user.id)
        .await
        .map_err(ApiError::Internal)?;

    info!(user_id = %id, "user deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// All accounts, password stripped, role expanded to its display name.
/// Requires read:users.
#[instrument(skip(state, principal))]
pub async fn list_users(
    State(state): State<AppState>,
    SessionUser(principal): SessionUser,
) -> Result<Json<UserListResponse>, ApiError> {
    require(principal.as_ref(), "users", "read")?;

    let results = UserRecord::list_with_role(&state.db)
        .await
        .map_err(ApiError::Internal)?;
    Ok(Json(UserListResponse { results }))
}
