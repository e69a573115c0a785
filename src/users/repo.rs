use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::users::error::{UserError, UserResult};
use crate::users::password::Salt;
use crate::users::repo_types::{UpsertUser, User};

const USER_COLUMNS: &str = "user_id, user_uuid, email, password_hash, full_name, phone, \
                            sign_up_option, status, timezone, created_at, updated_at";

/// Persistence boundary for users.
///
/// Lookups distinguish "no such row" from store failures: credential lookups
/// report `AuthenticationFailed`, id/uuid lookups report `NotFound`, and any
/// driver error is `Store`. `save` is the only mutator.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_existing(&self, email: &str, password_hash: &str) -> UserResult<User>;
    async fn find_by_id(&self, user_id: i64) -> UserResult<User>;
    async fn find_by_uuid(&self, user_uuid: Uuid) -> UserResult<User>;

    /// Salt the stored hash for `email` was derived with, if the email is known.
    async fn find_salt(&self, email: &str) -> UserResult<Option<Salt>>;

    /// Store primitive used by `save`; returns the assigned `user_id`.
    async fn insert(&self, user: &UpsertUser, user_uuid: Uuid) -> UserResult<i64>;
    /// Store primitive used by `save`.
    async fn update_by_email(&self, user: &UpsertUser) -> UserResult<()>;

    /// Creates the user if (email, password_hash) is unknown, otherwise updates
    /// the mutable fields in place. Either way the row is re-read by id so the
    /// caller gets the store's view, timestamps included.
    async fn save(&self, user: UpsertUser) -> UserResult<User> {
        match self.find_existing(&user.email, &user.password_hash).await {
            Ok(existing) => {
                self.update_by_email(&user).await?;
                debug!(user_id = existing.user_id, "user updated");
                self.find_by_id(existing.user_id).await
            }
            Err(UserError::AuthenticationFailed) => {
                let user_id = self.insert(&user, Uuid::new_v4()).await?;
                info!(user_id, "user inserted");
                self.find_by_id(user_id).await
            }
            Err(e) => Err(e),
        }
    }
}

#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn find_existing(&self, email: &str, password_hash: &str) -> UserResult<User> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1 AND password_hash = $2");
        sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .bind(password_hash)
            .fetch_optional(&self.pool)
            .await
            .map_err(UserError::store("error scanning user data"))?
            .ok_or(UserError::AuthenticationFailed)
    }

    async fn find_by_id(&self, user_id: i64) -> UserResult<User> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE user_id = $1");
        sqlx::query_as::<_, User>(&sql)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(UserError::store("error scanning user data"))?
            .ok_or_else(|| UserError::NotFound(format!("user_id {user_id}")))
    }

    async fn find_by_uuid(&self, user_uuid: Uuid) -> UserResult<User> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE user_uuid = $1");
        sqlx::query_as::<_, User>(&sql)
            .bind(user_uuid)
            .fetch_optional(&self.pool)
            .await
            .map_err(UserError::store("error scanning user data by uuid"))?
            .ok_or_else(|| UserError::NotFound(format!("user_uuid {user_uuid}")))
    }

    async fn find_salt(&self, email: &str) -> UserResult<Option<Salt>> {
        let salt: Option<Vec<u8>> =
            sqlx::query_scalar(r#"SELECT password_salt FROM users WHERE email = $1"#)
                .bind(email)
                .fetch_optional(&self.pool)
                .await
                .map_err(UserError::store("error reading password salt"))?;

        salt.map(|bytes| {
            Salt::try_from(bytes.as_slice()).map_err(|e| {
                UserError::store("error decoding password salt")(sqlx::Error::Decode(Box::new(e)))
            })
        })
        .transpose()
    }

    async fn insert(&self, user: &UpsertUser, user_uuid: Uuid) -> UserResult<i64> {
        sqlx::query_scalar(
            r#"
            INSERT INTO users (user_uuid, email, password_hash, password_salt, full_name, phone, sign_up_option, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING user_id
            "#,
        )
        .bind(user_uuid)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.password_salt.as_bytes())
        .bind(&user.full_name)
        .bind(&user.phone)
        .bind(user.sign_up_option.as_str())
        .bind(user.status.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(UserError::store("error inserting user"))
    }

    async fn update_by_email(&self, user: &UpsertUser) -> UserResult<()> {
        sqlx::query(
            r#"
            UPDATE users
            SET password_hash = $1, password_salt = $2, full_name = $3, phone = $4,
                sign_up_option = $5, updated_at = now()
            WHERE email = $6
            "#,
        )
        .bind(&user.password_hash)
        .bind(user.password_salt.as_bytes())
        .bind(&user.full_name)
        .bind(&user.phone)
        .bind(user.sign_up_option.as_str())
        .bind(&user.email)
        .execute(&self.pool)
        .await
        .map_err(UserError::store("error updating user"))?;
        Ok(())
    }
}
