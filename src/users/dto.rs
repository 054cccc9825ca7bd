use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use time::Date;
use uuid::Uuid;

use crate::error::ApiError;
use crate::users::repo::{UserRecord, UserStatus, UserWithRole};

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// A required string field: present and non-empty. Empty strings count as
/// missing, matching what the dashboard forms submit for untouched inputs.
fn required(field: Option<String>, name: &str) -> Result<String, ApiError> {
    match field {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(ApiError::Validation(format!(
            "required parameter `{name}` is missing"
        ))),
    }
}

fn parse_birthdate(raw: &str) -> Result<Date, ApiError> {
    crate::users::service::parse_birthdate(raw).ok_or_else(|| {
        ApiError::Validation("birthdate must be a YYYY-MM-DD date".into())
    })
}

fn parse_status(raw: &str) -> Result<UserStatus, ApiError> {
    UserStatus::parse(raw).ok_or_else(|| {
        ApiError::Validation("status must be one of active, paused, vacation".into())
    })
}

/// Body of `PUT /register` (public self-service).
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub gender: Option<String>,
    pub birthdate: Option<String>,
    pub hobby: Option<String>,
}

#[derive(Debug)]
pub struct RegisterData {
    pub name: String,
    pub email: String,
    pub password: String,
    pub gender: String,
    pub birthdate: Date,
    pub hobby: String,
}

impl RegisterRequest {
    pub fn validate(self) -> Result<RegisterData, ApiError> {
        let name = required(self.name, "name")?;
        let email = required(self.email, "email")?;
        let password = required(self.password, "password")?;
        let gender = required(self.gender, "gender")?;
        let birthdate = parse_birthdate(&required(self.birthdate, "birthdate")?)?;
        let hobby = required(self.hobby, "hobby")?;

        if !is_valid_email(&email) {
            return Err(ApiError::Validation("invalid email address".into()));
        }

        Ok(RegisterData {
            name,
            email,
            password,
            gender,
            birthdate,
            hobby,
        })
    }
}

/// Body of `POST /user/add` (admin create).
#[derive(Debug, Deserialize)]
pub struct AddUserRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub gender: Option<String>,
    pub age: Option<i32>,
    pub birthdate: Option<String>,
    pub hobby: Option<String>,
    pub status: Option<String>,
    pub role: Option<String>,
}

#[derive(Debug)]
pub struct AddUserData {
    pub name: String,
    pub email: String,
    pub password: String,
    pub gender: String,
    pub age: i32,
    pub birthdate: Date,
    pub hobby: String,
    pub status: UserStatus,
    pub role: String,
}

impl AddUserRequest {
    pub fn validate(self) -> Result<AddUserData, ApiError> {
        let name = required(self.name, "name")?;
        let email = required(self.email, "email")?;
        let password = required(self.password, "password")?;
        let gender = required(self.gender, "gender")?;
        let age = self
            .age
            .ok_or_else(|| ApiError::Validation("required parameter `age` is missing".into()))?;
        let birthdate = parse_birthdate(&required(self.birthdate, "birthdate")?)?;
        let hobby = required(self.hobby, "hobby")?;
        let status = parse_status(&required(self.status, "status")?)?;
        let role = required(self.role, "role")?;

        if !is_valid_email(&email) {
            return Err(ApiError::Validation("invalid email address".into()));
        }

        Ok(AddUserData {
            name,
            email,
            password,
            gender,
            age,
            birthdate,
            hobby,
            status,
            role,
        })
    }
}

/// Body of `PATCH /user/update`. Everything but the id is optional; absent
/// fields are left untouched.
#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub id: Option<Uuid>,
    pub name: Option<String>,
    pub gender: Option<String>,
    pub age: Option<i32>,
    pub birthdate: Option<String>,
    pub hobby: Option<String>,
    pub status: Option<String>,
    pub role: Option<String>,
}

impl UpdateUserRequest {
    pub fn validate(self) -> Result<(Uuid, UserPatch, Option<String>), ApiError> {
        let id = self
            .id
            .ok_or_else(|| ApiError::Validation("required parameter `id` is missing".into()))?;

        let birthdate = match self.birthdate.as_deref() {
            Some(raw) => Some(parse_birthdate(raw)?),
            None => None,
        };
        let status = match self.status.as_deref() {
            Some(raw) => Some(parse_status(raw)?),
            None => None,
        };

        let patch = UserPatch {
            name: self.name,
            gender: self.gender,
            age: self.age,
            birthdate,
            hobby: self.hobby,
            status,
            role_id: None,
        };
        Ok((id, patch, self.role))
    }
}

/// Explicit partial update. Only `Some` fields overwrite; a present-but-empty
/// string or a zero age is a legitimate value and is applied.
#[derive(Debug, Default)]
pub struct UserPatch {
    pub name: Option<String>,
    pub gender: Option<String>,
    pub age: Option<i32>,
    pub birthdate: Option<Date>,
    pub hobby: Option<String>,
    pub status: Option<UserStatus>,
    pub role_id: Option<Uuid>,
}

impl UserPatch {
    pub fn apply(self, user: &mut UserRecord) {
        if let Some(name) = self.name {
            user.name = name;
        }
        if let Some(gender) = self.gender {
            user.gender = gender;
        }
        if let Some(age) = self.age {
            user.age = age;
        }
        if let Some(birthdate) = self.birthdate {
            user.birthdate = birthdate;
        }
        if let Some(hobby) = self.hobby {
            user.hobby = hobby;
        }
        if let Some(status) = self.status {
            user.status = status;
        }
        if let Some(role_id) = self.role_id {
            user.role_id = role_id;
        }
    }
}

/// Body of `DELETE /user/delete`.
#[derive(Debug, Deserialize)]
pub struct DeleteUserRequest {
    pub id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct UserListResponse {
    pub results: Vec<UserWithRole>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;
    use time::OffsetDateTime;

    fn full_register() -> RegisterRequest {
        RegisterRequest {
            name: Some("Alice".into()),
            email: Some("alice@example.com".into()),
            password: Some("hunter22".into()),
            gender: Some("female".into()),
            birthdate: Some("1995-06-01".into()),
            hobby: Some("chess".into()),
        }
    }

    fn sample_user() -> UserRecord {
        let now = OffsetDateTime::UNIX_EPOCH;
        UserRecord {
            id: Uuid::new_v4(),
            name: "Alice".into(),
            email: "alice@example.com".into(),
            password_hash: "$argon2id$stub".into(),
            role_id: Uuid::new_v4(),
            gender: "female".into(),
            age: 30,
            birthdate: date!(1995 - 06 - 01),
            hobby: "reading".into(),
            status: UserStatus::Active,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn register_accepts_complete_payload() {
        let data = full_register().validate().expect("valid payload");
        assert_eq!(data.email, "alice@example.com");
        assert_eq!(data.birthdate, date!(1995 - 06 - 01));
    }

    #[test]
    fn register_rejects_missing_or_empty_fields() {
        let mut req = full_register();
        req.hobby = None;
        assert!(matches!(req.validate(), Err(ApiError::Validation(_))));

        let mut req = full_register();
        req.name = Some(String::new());
        assert!(matches!(req.validate(), Err(ApiError::Validation(_))));
    }

    #[test]
    fn register_rejects_bad_email_and_bad_birthdate() {
        let mut req = full_register();
        req.email = Some("not-an-email".into());
        assert!(matches!(req.validate(), Err(ApiError::Validation(_))));

        let mut req = full_register();
        req.birthdate = Some("01/06/1995".into());
        assert!(matches!(req.validate(), Err(ApiError::Validation(_))));
    }

    #[test]
    fn update_requires_id() {
        let req = UpdateUserRequest {
            id: None,
            name: Some("Bob".into()),
            gender: None,
            age: None,
            birthdate: None,
            hobby: None,
            status: None,
            role: None,
        };
        assert!(matches!(req.validate(), Err(ApiError::Validation(_))));
    }

    #[test]
    fn patch_applies_only_provided_fields() {
        let mut user = sample_user();
        let before = user.clone();

        let patch = UserPatch {
            hobby: Some("chess".into()),
            ..Default::default()
        };
        patch.apply(&mut user);

        assert_eq!(user.hobby, "chess");
        assert_eq!(user.name, before.name);
        assert_eq!(user.gender, before.gender);
        assert_eq!(user.age, before.age);
        assert_eq!(user.birthdate, before.birthdate);
        assert_eq!(user.status, before.status);
        assert_eq!(user.role_id, before.role_id);
    }

    #[test]
    fn patch_applies_falsy_but_valid_values() {
        let mut user = sample_user();
        let patch = UserPatch {
            name: Some(String::new()),
            age: Some(0),
            ..Default::default()
        };
        patch.apply(&mut user);
        assert_eq!(user.name, "");
        assert_eq!(user.age, 0);
    }

    #[test]
    fn user_with_role_never_exposes_a_password() {
        let now = OffsetDateTime::UNIX_EPOCH;
        let row = UserWithRole {
            id: Uuid::new_v4(),
            name: "Alice".into(),
            email: "alice@example.com".into(),
            role: Some("Junior".into()),
            gender: "female".into(),
            age: 30,
            birthdate: date!(1995 - 06 - 01),
            hobby: "chess".into(),
            status: UserStatus::Active,
            created_at: now,
            updated_at: now,
        };
        let json = serde_json::to_string(&row).unwrap();
        assert!(json.contains("\"role\":\"Junior\""));
        assert!(!json.contains("password"));
    }
}
