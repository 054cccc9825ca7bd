use serde::Serialize;

use crate::roles::repo::RoleWithUsers;

#[derive(Debug, Serialize)]
pub struct RoleListResponse {
    pub roles: Vec<RoleWithUsers>,
}
