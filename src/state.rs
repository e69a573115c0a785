use crate::config::AppConfig;
use crate::users::{Argon2Hasher, PgUserRepository, UserService};
use anyhow::Context;
use sqlx::PgPool;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub users: UserService,
}

impl AppState {
    /// Connects the pool and wires the service; returns the pool too so `main`
    /// can run migrations on it.
    pub async fn init() -> anyhow::Result<(Self, PgPool)> {
        let config = Arc::new(AppConfig::from_env()?);

        let db = sqlx::postgres::PgPoolOptions::new()
            .max_connections(config.database.max_connections)
            .acquire_timeout(config.database.acquire_timeout)
            .connect(&config.database.url)
            .await
            .context("connect to database")?;

        let users = UserService::new(
            Arc::new(PgUserRepository::new(db.clone())),
            Arc::new(Argon2Hasher::default()),
        );

        Ok((Self::from_parts(config, users), db))
    }

    pub fn from_parts(config: Arc<AppConfig>, users: UserService) -> Self {
        Self { config, users }
    }
}
