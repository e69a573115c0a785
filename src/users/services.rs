use std::sync::Arc;

use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::users::dto::{normalize_email, ExistingUserRequest, NewUserRequest, UserResponse};
use crate::users::error::{UserError, UserResult};
use crate::users::password::PasswordHasher;
use crate::users::repo::UserRepository;
use crate::users::repo_types::{UpsertUser, UserStatus};

/// Signup and login on top of a `UserRepository`.
///
/// Passwords are always hashed here before they reach the store. A returning
/// email reuses its stored salt, so the same email and password produce the same
/// hash and `save` updates instead of inserting.
#[derive(Clone)]
pub struct UserService {
    repo: Arc<dyn UserRepository>,
    hasher: Arc<dyn PasswordHasher>,
}

impl UserService {
    pub fn new(repo: Arc<dyn UserRepository>, hasher: Arc<dyn PasswordHasher>) -> Self {
        Self { repo, hasher }
    }

    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn new_user(&self, request: NewUserRequest) -> UserResult<UserResponse> {
        let email = normalize_email(&request.email);

        let salt = match self.repo.find_salt(&email).await? {
            Some(salt) => salt,
            None => self.hasher.generate_salt()?,
        };
        let password_hash = self.hasher.hash_password(&request.password, &salt)?;

        let user = self
            .repo
            .save(UpsertUser {
                email,
                password_hash,
                password_salt: salt,
                full_name: request.full_name,
                phone: request.phone,
                sign_up_option: request.sign_up_option,
                status: UserStatus::Active,
            })
            .await?;

        info!(user_uuid = %user.user_uuid, "user signed up");
        Ok(user.into())
    }

    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn existing_user(&self, request: ExistingUserRequest) -> UserResult<UserResponse> {
        let email = normalize_email(&request.email);

        let Some(salt) = self.repo.find_salt(&email).await? else {
            warn!("login unknown email");
            return Err(UserError::AuthenticationFailed);
        };
        let password_hash = self.hasher.hash_password(&request.password, &salt)?;

        let user = self
            .repo
            .find_existing(&email, &password_hash)
            .await
            .inspect_err(|e| {
                if matches!(e, UserError::AuthenticationFailed) {
                    warn!("login invalid password");
                }
            })?;

        info!(user_uuid = %user.user_uuid, "user logged in");
        Ok(user.into())
    }

    #[instrument(skip(self))]
    pub async fn user_by_uuid(&self, user_uuid: Uuid) -> UserResult<UserResponse> {
        Ok(self.repo.find_by_uuid(user_uuid).await?.into())
    }
}
