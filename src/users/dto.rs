use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use super::repo_types::User;
use crate::auth::services::is_valid_email;
use crate::error::{nullable, ApiResult, FieldErrors, Validate};

pub const MIN_PASSWORD_LEN: usize = 8;
const MAX_USERNAME_LEN: usize = 150;

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub weight: Option<Decimal>,
    pub height: Option<Decimal>,
    pub age: Option<i32>,
    pub diet_type_id: Option<Uuid>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateUserRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub is_staff: Option<bool>,
    #[serde(default, deserialize_with = "nullable")]
    pub weight: Option<Option<Decimal>>,
    #[serde(default, deserialize_with = "nullable")]
    pub height: Option<Option<Decimal>>,
    #[serde(default, deserialize_with = "nullable")]
    pub age: Option<Option<i32>>,
    #[serde(default, deserialize_with = "nullable")]
    pub diet_type_id: Option<Option<Uuid>>,
}

#[derive(Deserialize)]
pub struct VerifyPasswordRequest {
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct VerifyPasswordResponse {
    pub is_valid: bool,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub is_staff: bool,
    pub weight: Option<Decimal>,
    pub height: Option<Decimal>,
    pub age: Option<i32>,
    pub diet_type_id: Option<Uuid>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<User> for UserResponse {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            username: u.username,
            email: u.email,
            is_staff: u.is_staff,
            weight: u.weight,
            height: u.height,
            age: u.age,
            diet_type_id: u.diet_type_id,
            created_at: u.created_at,
        }
    }
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn check_email(errors: &mut FieldErrors, email: &str) {
    if !is_valid_email(&normalize_email(email)) {
        errors.add("email", "Enter a valid email address.");
    }
}

fn check_password(errors: &mut FieldErrors, password: &str) {
    if password.chars().count() < MIN_PASSWORD_LEN {
        errors.add(
            "password",
            format!("Ensure this field has at least {MIN_PASSWORD_LEN} characters."),
        );
    }
}

fn check_body(
    errors: &mut FieldErrors,
    weight: Option<Decimal>,
    height: Option<Decimal>,
    age: Option<i32>,
) {
    for (field, value) in [("weight", weight), ("height", height)] {
        if let Some(v) = value {
            if v <= Decimal::ZERO {
                errors.add(field, "Ensure this value is greater than 0.");
            }
            errors.check_decimal(field, v, 4, 1);
        }
    }
    if matches!(age, Some(a) if a < 0) {
        errors.add("age", "Ensure this value is greater than or equal to 0.");
    }
}

impl Validate for CreateUserRequest {
    fn validate(&self) -> ApiResult<()> {
        let mut errors = FieldErrors::new();
        let username = self.username.trim();
        if username.is_empty() {
            errors.add("username", "This field may not be blank.");
        } else if username.chars().count() > MAX_USERNAME_LEN {
            errors.add(
                "username",
                format!("Ensure this field has no more than {MAX_USERNAME_LEN} characters."),
            );
        }
        check_email(&mut errors, &self.email);
        check_password(&mut errors, &self.password);
        check_body(&mut errors, self.weight, self.height, self.age);
        errors.into_result()
    }
}

impl Validate for UpdateUserRequest {
    fn validate(&self) -> ApiResult<()> {
        let mut errors = FieldErrors::new();
        if let Some(email) = &self.email {
            check_email(&mut errors, email);
        }
        if let Some(password) = &self.password {
            check_password(&mut errors, password);
        }
        check_body(
            &mut errors,
            self.weight.flatten(),
            self.height.flatten(),
            self.age.flatten(),
        );
        errors.into_result()
    }
}

impl Validate for VerifyPasswordRequest {
    fn validate(&self) -> ApiResult<()> {
        Ok(())
    }
}
