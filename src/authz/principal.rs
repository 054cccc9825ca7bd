use axum::extract::FromRef;
use serde::Serialize;
use time::Date;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::auth::claims::TokenKind;
use crate::auth::jwt::JwtKeys;
use crate::authz::model::Role;
use crate::error::ApiError;
use crate::roles::repo::RoleRecord;
use crate::state::AppState;
use crate::users::repo::{UserRecord, UserStatus};

/// The authenticated identity for the current request: the user with its
/// role dereferenced and the password hash structurally absent. Built fresh
/// per request and never cached, so permission changes apply without
/// re-login.
#[derive(Debug, Clone, Serialize)]
pub struct Principal {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub gender: String,
    pub age: i32,
    pub birthdate: Date,
    pub hobby: String,
    pub status: UserStatus,
}

impl Principal {
    pub fn new(user: UserRecord, role: Role) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            role,
            gender: user.gender,
            age: user.age,
            birthdate: user.birthdate,
            hobby: user.hobby,
            status: user.status,
        }
    }
}

/// Resolve the session token into a Principal.
///
/// Any token problem (missing, malformed, expired, wrong kind) resolves to
/// `Ok(None)`: the caller is unauthenticated, not an error. A store failure
/// is an infrastructure error and surfaces as `Err` — the two must never be
/// conflated, or a flaky database would read as "permission denied".
pub async fn resolve(
    state: &AppState,
    bearer_token: Option<&str>,
) -> Result<Option<Principal>, ApiError> {
    let Some(token) = bearer_token else {
        return Ok(None);
    };

    let keys = JwtKeys::from_ref(state);
    let claims = match keys.verify(token) {
        Ok(c) => c,
        Err(_) => {
            debug!("session token failed verification");
            return Ok(None);
        }
    };
    if claims.kind != TokenKind::Access {
        return Ok(None);
    }

    // Exact email match; stored emails are case-sensitive.
    let user = UserRecord::find_by_email(&state.db, &claims.email)
        .await
        .map_err(ApiError::Internal)?;
    let Some(user) = user else {
        debug!(email = %claims.email, "session email has no account");
        return Ok(None);
    };

    let role = RoleRecord::find_by_id(&state.db, user.role_id)
        .await
        .map_err(ApiError::Internal)?;
    let Some(role) = role else {
        warn!(user_id = %user.id, role_id = %user.role_id, "user references a missing role");
        return Ok(None);
    };

    Ok(Some(Principal::new(user, role.into_role())))
}
