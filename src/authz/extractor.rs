use axum::{
    async_trait,
    extract::FromRequestParts,
    http::request::Parts,
};

use crate::authz::principal::{resolve, Principal};
use crate::error::ApiError;
use crate::state::AppState;

/// Extracts the request's Principal, if any. Unlike a hard-rejecting auth
/// extractor, this never fails on a bad or absent token: the authorization
/// gate is what turns an anonymous caller into a 403 on protected routes.
pub struct SessionUser(pub Option<Principal>);

#[async_trait]
impl FromRequestParts<AppState> for SessionUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer ").or_else(|| v.strip_prefix("bearer ")));

        let principal = resolve(state, token).await?;
        Ok(SessionUser(principal))
    }
}
