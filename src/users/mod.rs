//! User accounts: signup (create-or-update by email and password), login, and
//! lookup by uuid.

use crate::state::AppState;
use axum::Router;

pub mod dto;
pub mod error;
pub mod handlers;
pub mod password;
pub mod repo;
pub mod repo_types;
pub mod services;

#[cfg(test)]
pub(crate) mod memory;

pub use password::Argon2Hasher;
pub use repo::PgUserRepository;
pub use services::UserService;

pub fn router() -> Router<AppState> {
    Router::new().merge(handlers::user_routes())
}
