use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

/// Account status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "user_status", rename_all = "lowercase")]
pub enum UserStatus {
    Active,
    Paused,
    Vacation,
}

impl UserStatus {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "active" => Some(UserStatus::Active),
            "paused" => Some(UserStatus::Paused),
            "vacation" => Some(UserStatus::Vacation),
            _ => None,
        }
    }
}

/// User record in the database.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserRecord {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role_id: Uuid,
    pub gender: String,
    pub age: i32,
    pub birthdate: Date,
    pub hobby: String,
    pub status: UserStatus,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Insert parameters for a new account. The password is already hashed by
/// the time it reaches the repo.
#[derive(Debug)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role_id: Uuid,
    pub gender: String,
    pub age: i32,
    pub birthdate: Date,
    pub hobby: String,
    pub status: UserStatus,
}

/// User row joined with its role's display name, as served by the list
/// endpoint. No password field at all.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct UserWithRole {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Option<String>,
    pub gender: String,
    pub age: i32,
    pub birthdate: Date,
    pub hobby: String,
    pub status: UserStatus,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl UserRecord {
    /// Find a user by exact email match.
    pub async fn find_by_email(db: &PgPool, email: &str) -> anyhow::Result<Option<UserRecord>> {
        let user = sqlx::query_as::<_, UserRecord>(
            r#"
            SELECT id, name, email, password_hash, role_id, gender, age, birthdate,
                   hobby, status, created_at, updated_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    pub async fn find_by_id(db: &PgPool, id: Uuid) -> anyhow::Result<Option<UserRecord>> {
        let user = sqlx::query_as::<_, UserRecord>(
            r#"
            SELECT id, name, email, password_hash, role_id, gender, age, birthdate,
                   hobby, status, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    /// Insert a new account. A concurrent insert with the same email fails
    /// on the unique index; the caller maps that to a conflict.
    pub async fn insert(db: &PgPool, new_user: &NewUser) -> anyhow::Result<UserRecord> {
        let user = sqlx::query_as::<_, UserRecord>(
            r#"
            INSERT INTO users (name, email, password_hash, role_id, gender, age, birthdate, hobby, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id, name, email, password_hash, role_id, gender, age, birthdate,
                      hobby, status, created_at, updated_at
            "#,
        )
        .bind(&new_user.name)
        .bind(&new_user.email)
        .bind(&new_user.password_hash)
        .bind(new_user.role_id)
        .bind(&new_user.gender)
        .bind(new_user.age)
        .bind(new_user.birthdate)
        .bind(&new_user.hobby)
        .bind(new_user.status)
        .fetch_one(db)
        .await?;
        Ok(user)
    }

    /// Write back the mutable profile fields after a patch has been applied
    /// in memory. Email and password are not mutable through this path.
    pub async fn update_profile(db: &PgPool, user: &UserRecord) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            UPDATE users
            SET name = $2, gender = $3, age = $4, birthdate = $5, hobby = $6,
                status = $7, role_id = $8, updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(user.id)
        .bind(&user.name)
        .bind(&user.gender)
        .bind(user.age)
        .bind(user.birthdate)
        .bind(&user.hobby)
        .bind(user.status)
        .bind(user.role_id)
        .execute(db)
        .await?;
        Ok(())
    }

    /// Physical delete; there is no soft-delete.
    pub async fn delete(db: &PgPool, id: Uuid) -> anyhow::Result<()> {
        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;
        Ok(())
    }

    /// All users with the role reference expanded to the role's display name
    /// only, never the grant list.
    pub async fn list_with_role(db: &PgPool) -> anyhow::Result<Vec<UserWithRole>> {
        let rows = sqlx::query_as::<_, UserWithRole>(
            r#"
            SELECT u.id, u.name, u.email, r.name AS role, u.gender, u.age, u.birthdate,
                   u.hobby, u.status, u.created_at, u.updated_at
            FROM users u
            LEFT JOIN roles r ON r.id = u.role_id
            ORDER BY u.created_at
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

    #[test]
    fn status_parse_is_exact() {
        assert_eq!(UserStatus::parse("active"), Some(UserStatus::Active));
        assert_eq!(UserStatus::parse("paused"), Some(UserStatus::Paused));
        assert_eq!(UserStatus::parse("vacation"), Some(UserStatus::Vacation));
        assert_eq!(UserStatus::parse("Active"), None);
        assert_eq!(UserStatus::parse("retired"), None);
    }

    #[test]
    fn status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&UserStatus::Vacation).unwrap(),
            "\"vacation\""
        );
    }
}
