use serde::Serialize;
use sqlx::{types::Json, FromRow, PgPool};
use uuid::Uuid;

use crate::authz::model::{ResourceGrant, Role};

/// Role row; the grant list lives in a JSONB column. Roles are seed data —
/// there is no mutation path for them here.
#[derive(Debug, Clone, FromRow)]
pub struct RoleRecord {
    pub id: Uuid,
    pub name: String,
    pub resources: Json<Vec<ResourceGrant>>,
}

/// Role annotated with a live count of assigned users, computed at query
/// time. Roles nobody holds appear with a count of 0.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct RoleWithUsers {
    pub id: Uuid,
    pub name: String,
    pub resources: Json<Vec<ResourceGrant>>,
    pub users: i64,
}

impl RoleRecord {
    pub fn into_role(self) -> Role {
        Role {
            id: self.id,
            name: self.name,
            resources: self.resources.0,
        }
    }

    pub async fn find_by_id(db: &PgPool, id: Uuid) -> anyhow::Result<Option<RoleRecord>> {
        let role = sqlx::query_as::<_, RoleRecord>(
            r#"
            SELECT id, name, resources
            FROM roles
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(role)
    }

    /// Roles are addressed by display name everywhere a request names one.
    pub async fn find_by_name(db: &PgPool, name: &str) -> anyhow::Result<Option<RoleRecord>> {
        let role = sqlx::query_as::<_, RoleRecord>(
            r#"
            SELECT id, name, resources
            FROM roles
            WHERE name = $1
            "#,
        )
        .bind(name)
        .fetch_optional(db)
        .await?;
        Ok(role)
    }

    pub async fn list_with_user_counts(db: &PgPool) -> anyhow::Result<Vec<RoleWithUsers>> {
        let rows = sqlx::query_as::<_, RoleWithUsers>(
            r#"
            SELECT r.id, r.name, r.resources, COUNT(u.id) AS users
            FROM roles r
            LEFT JOIN users u ON u.role_id = r.id
            GROUP BY r.id
            ORDER BY r.name
            "#,
        )
        .fetch_all(db)
        .await?;
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::authz::model::Permission;

    #[test]
    fn role_with_users_serializes_grants_inline() {
        let row = RoleWithUsers {
            id: Uuid::new_v4(),
            name: "Junior".into(),
            resources: Json(vec![ResourceGrant {
                resource: "users".into(),
                permission: Permission {
                    read: true,
                    create: false,
                    update: false,
                    delete: false,
                },
            }]),
            users: 0,
        };
        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["users"], 0);
        assert_eq!(json["resources"][0]["resource"], "users");
        assert_eq!(json["resources"][0]["permission"]["read"], true);
    }
}
