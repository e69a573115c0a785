use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use thiserror::Error;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::users::password::Salt;

/// How the account was created.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SignUpOption {
    #[default]
    General,
    Other,
}

/// Accounts are deactivated, never deleted.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    #[default]
    Active,
    Inactive,
}

#[derive(Debug, Error)]
#[error("unknown {kind} value: {value}")]
pub struct UnknownVariant {
    kind: &'static str,
    value: String,
}

impl SignUpOption {
    pub fn as_str(&self) -> &'static str {
        match self {
            SignUpOption::General => "general",
            SignUpOption::Other => "other",
        }
    }
}

impl UserStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserStatus::Active => "active",
            UserStatus::Inactive => "inactive",
        }
    }
}

impl TryFrom<String> for SignUpOption {
    type Error = UnknownVariant;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "general" => Ok(SignUpOption::General),
            "other" => Ok(SignUpOption::Other),
            _ => Err(UnknownVariant { kind: "sign_up_option", value }),
        }
    }
}

impl TryFrom<String> for UserStatus {
    type Error = UnknownVariant;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "active" => Ok(UserStatus::Active),
            "inactive" => Ok(UserStatus::Inactive),
            _ => Err(UnknownVariant { kind: "status", value }),
        }
    }
}

impl fmt::Display for SignUpOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for UserStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// User record in the database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct User {
    pub user_id: i64,                 // store-assigned, never exposed
    pub user_uuid: Uuid,              // public identifier
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,        // salted Argon2 output
    pub full_name: String,
    pub phone: String,
    #[sqlx(try_from = "String")]
    pub sign_up_option: SignUpOption,
    #[sqlx(try_from = "String")]
    pub status: UserStatus,
    pub timezone: String,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// Fields written by `UserRepository::save`; everything else is store-managed.
#[derive(Debug, Clone)]
pub struct UpsertUser {
    pub email: String,
    pub password_hash: String,
    pub password_salt: Salt,
    pub full_name: String,
    pub phone: String,
    pub sign_up_option: SignUpOption,
    pub status: UserStatus,
}
