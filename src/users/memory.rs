//! In-memory `UserRepository` for tests. `fail_store` makes every call fail the
//! way a dropped database connection would.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::users::error::{UserError, UserResult};
use crate::users::password::Salt;
use crate::users::repo::UserRepository;
use crate::users::repo_types::{UpsertUser, User};

#[derive(Default)]
pub struct MemoryUserRepository {
    rows: Mutex<Vec<(User, Salt)>>,
    failing: AtomicBool,
}

impl MemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_store(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn len(&self) -> usize {
        self.rows.lock().unwrap().len()
    }

    fn check(&self, context: &'static str) -> UserResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(UserError::store(context)(sqlx::Error::PoolClosed));
        }
        Ok(())
    }

    fn find(&self, pred: impl Fn(&User) -> bool) -> Option<User> {
        self.rows
            .lock()
            .unwrap()
            .iter()
            .find(|(u, _)| pred(u))
            .map(|(u, _)| u.clone())
    }
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn find_existing(&self, email: &str, password_hash: &str) -> UserResult<User> {
        self.check("error scanning user data")?;
        self.find(|u| u.email == email && u.password_hash == password_hash)
            .ok_or(UserError::AuthenticationFailed)
    }

    async fn find_by_id(&self, user_id: i64) -> UserResult<User> {
        self.check("error scanning user data")?;
        self.find(|u| u.user_id == user_id)
            .ok_or_else(|| UserError::NotFound(format!("user_id {user_id}")))
    }

    async fn find_by_uuid(&self, user_uuid: Uuid) -> UserResult<User> {
        self.check("error scanning user data by uuid")?;
        self.find(|u| u.user_uuid == user_uuid)
            .ok_or_else(|| UserError::NotFound(format!("user_uuid {user_uuid}")))
    }

    async fn find_salt(&self, email: &str) -> UserResult<Option<Salt>> {
        self.check("error reading password salt")?;
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .find(|(u, _)| u.email == email)
            .map(|(_, salt)| *salt))
    }

    async fn insert(&self, user: &UpsertUser, user_uuid: Uuid) -> UserResult<i64> {
        self.check("error inserting user")?;
        let mut rows = self.rows.lock().unwrap();
        if rows.iter().any(|(u, _)| u.email == user.email) {
            // mirrors the UNIQUE(email) constraint
            return Err(UserError::store("error inserting user")(sqlx::Error::Protocol(
                "duplicate key value violates unique constraint \"users_email_key\"".into(),
            )));
        }
        let user_id = rows.len() as i64 + 1;
        let now = OffsetDateTime::now_utc();
        rows.push((
            User {
                user_id,
                user_uuid,
                email: user.email.clone(),
                password_hash: user.password_hash.clone(),
                full_name: user.full_name.clone(),
                phone: user.phone.clone(),
                sign_up_option: user.sign_up_option,
                status: user.status,
                timezone: "UTC".into(),
                created_at: now,
                updated_at: now,
            },
            user.password_salt,
        ));
        Ok(user_id)
    }

    async fn update_by_email(&self, user: &UpsertUser) -> UserResult<()> {
        self.check("error updating user")?;
        let mut rows = self.rows.lock().unwrap();
        for (row, salt) in rows.iter_mut().filter(|(u, _)| u.email == user.email) {
            row.password_hash = user.password_hash.clone();
            row.full_name = user.full_name.clone();
            row.phone = user.phone.clone();
            row.sign_up_option = user.sign_up_option;
            row.updated_at = OffsetDateTime::now_utc();
            *salt = user.password_salt;
        }
        Ok(())
    }
}
