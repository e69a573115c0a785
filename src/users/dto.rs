use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::users::error::{UserError, UserResult};
use crate::users::repo_types::{SignUpOption, User, UserStatus};

const MIN_PASSWORD_LEN: usize = 8;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Request body for signup.
#[derive(Debug, Clone, Deserialize)]
pub struct NewUserRequest {
    pub email: String,
    pub password: String,
    pub full_name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub sign_up_option: SignUpOption,
}

/// Request body for login.
#[derive(Debug, Clone, Deserialize)]
pub struct ExistingUserRequest {
    pub email: String,
    pub password: String,
}

impl NewUserRequest {
    pub fn validate(&self) -> UserResult<()> {
        if !is_valid_email(&normalize_email(&self.email)) {
            return Err(UserError::Validation("invalid email".into()));
        }
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(UserError::Validation("password too short".into()));
        }
        if self.full_name.trim().is_empty() {
            return Err(UserError::Validation("full_name is required".into()));
        }
        Ok(())
    }
}

impl ExistingUserRequest {
    pub fn validate(&self) -> UserResult<()> {
        if !is_valid_email(&normalize_email(&self.email)) {
            return Err(UserError::Validation("invalid email".into()));
        }
        if self.password.is_empty() {
            return Err(UserError::Validation("password is required".into()));
        }
        Ok(())
    }
}

/// Public part of the user returned to the client. Carries the uuid only;
/// the numeric id and the password material stay server-side.
#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub user_uuid: Uuid,
    pub email: String,
    pub full_name: String,
    pub phone: String,
    pub sign_up_option: SignUpOption,
    pub status: UserStatus,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<User> for UserResponse {
    fn from(u: User) -> Self {
        Self {
            user_uuid: u.user_uuid,
            email: u.email,
            full_name: u.full_name,
            phone: u.phone,
            sign_up_option: u.sign_up_option,
            status: u.status,
            created_at: u.created_at,
            updated_at: u.updated_at,
        }
    }
}
