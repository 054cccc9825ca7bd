use axum::{
    extract::{FromRef, State},
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::auth::dto::{AuthResponse, LoginRequest, PublicUser, RefreshRequest};
use crate::auth::jwt::JwtKeys;
use crate::auth::password::verify_password;
use crate::authz::{Principal, SessionUser};
use crate::error::ApiError;
use crate::state::AppState;
use crate::users::repo::UserRecord;

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth", post(login))
        .route("/auth/refresh", post(refresh))
        .route("/me", get(me))
}

/// Credentials login. Unknown email and wrong password are indistinguishable
/// to the caller.
#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let user = UserRecord::find_by_email(&state.db, &payload.email)
        .await
        .map_err(ApiError::Internal)?
        .ok_or_else(|| {
            warn!(email = %payload.email, "login unknown email");
            ApiError::InvalidCredentials
        })?;

    let ok = verify_password(&payload.password, &user.password_hash).map_err(ApiError::Internal)?;
    if !ok {
        warn!(email = %payload.email, user_id = %user.id, "login invalid password");
        return Err(ApiError::InvalidCredentials);
    }

    let keys = JwtKeys::from_ref(&state);
    let access_token = keys
        .sign_access(user.id, &user.email)
        .map_err(ApiError::Internal)?;
    let refresh_token = keys
        .sign_refresh(user.id, &user.email)
        .map_err(ApiError::Internal)?;

    info!(user_id = %user.id, email = %user.email, "user logged in");
    Ok(Json(AuthResponse {
        access_token,
        refresh_token,
        user: PublicUser {
            id: user.id,
            name: user.name,
            email: user.email,
        },
    }))
}

#[instrument(skip(state, payload))]
pub async fn refresh(
    State(state): State<AppState>,
    Json(payload): Json<RefreshRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let keys = JwtKeys::from_ref(&state);
    let claims = keys
        .verify_refresh(&payload.refresh_token)
        .map_err(|_| ApiError::Unauthenticated)?;

    let user = UserRecord::find_by_email(&state.db, &claims.email)
        .await
        .map_err(ApiError::Internal)?
        .ok_or(ApiError::Unauthenticated)?;

    let access_token = keys
        .sign_access(user.id, &user.email)
        .map_err(ApiError::Internal)?;
    let refresh_token = keys
        .sign_refresh(user.id, &user.email)
        .map_err(ApiError::Internal)?;

    Ok(Json(AuthResponse {
        access_token,
        refresh_token,
        user: PublicUser {
            id: user.id,
            name: user.name,
            email: user.email,
        },
    }))
}

/// The current session's identity with role and permissions, re-resolved
/// from the store on every call so permission changes apply immediately.
#[instrument(skip_all)]
pub async fn me(SessionUser(principal): SessionUser) -> Result<Json<Principal>, ApiError> {
    principal.map(Json).ok_or(ApiError::Unauthenticated)
}
