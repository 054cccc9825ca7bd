use crate::authz::model::Action;
use crate::authz::principal::Principal;
use crate::error::ApiError;

/// Decide whether `principal` may perform `action` on `resource`.
///
/// Deny-by-default: a missing principal, an action string that names no
/// known action, and a role with no matching grant all resolve to `false`.
/// Resource names match case-insensitively; if a role carries duplicate
/// grants for one resource, the first wins.
pub fn authorize(principal: Option<&Principal>, resource: &str, action: &str) -> bool {
    let Some(principal) = principal else {
        return false;
    };
    let Some(action) = Action::parse(action) else {
        return false;
    };
    let Some(grant) = principal
        .role
        .resources
        .iter()
        .find(|g| g.resource.eq_ignore_ascii_case(resource))
    else {
        return false;
    };
    grant.permission.allows(action)
}

/// Gate check used by every protected operation. Must return `Ok` before
/// any store mutation for the request begins.
pub fn require(principal: Option<&Principal>, resource: &str, action: &str) -> Result<(), ApiError> {
    if authorize(principal, resource, action) {
        Ok(())
    } else {
        Err(ApiError::PermissionDenied)
    }
}
