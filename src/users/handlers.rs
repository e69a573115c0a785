use std::future::Future;
use std::time::Duration;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{error, instrument, warn};
use uuid::Uuid;

use crate::{
    state::AppState,
    users::{
        dto::{ExistingUserRequest, NewUserRequest, UserResponse},
        error::{UserError, UserResult},
    },
};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users/signup", post(signup))
        .route("/users/login", post(login))
        .route("/users/:user_uuid", get(get_user))
}

#[instrument(skip(state, payload))]
pub async fn signup(
    State(state): State<AppState>,
    Json(payload): Json<NewUserRequest>,
) -> Result<(StatusCode, Json<UserResponse>), (StatusCode, String)> {
    payload.validate().map_err(reject)?;
    let budget = state.config.timeouts.upsert_user();
    let user = with_deadline(budget, state.users.new_user(payload))
        .await
        .map_err(reject)?;
    Ok((StatusCode::CREATED, Json(user)))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<ExistingUserRequest>,
) -> Result<Json<UserResponse>, (StatusCode, String)> {
    payload.validate().map_err(reject)?;
    let budget = state.config.timeouts.get_users;
    let user = with_deadline(budget, state.users.existing_user(payload))
        .await
        .map_err(reject)?;
    Ok(Json(user))
}

#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    Path(user_uuid): Path<Uuid>,
) -> Result<Json<UserResponse>, (StatusCode, String)> {
    let budget = state.config.timeouts.get_users;
    let user = with_deadline(budget, state.users.user_by_uuid(user_uuid))
        .await
        .map_err(reject)?;
    Ok(Json(user))
}

/// Dropping the future on expiry cancels whatever store call is in flight.
async fn with_deadline<T>(
    budget: Duration,
    fut: impl Future<Output = UserResult<T>>,
) -> UserResult<T> {
    tokio::time::timeout(budget, fut)
        .await
        .unwrap_or(Err(UserError::Timeout))
}

fn reject(e: UserError) -> (StatusCode, String) {
    match e {
        UserError::Validation(msg) => {
            warn!(%msg, "rejected request");
            (StatusCode::BAD_REQUEST, msg)
        }
        UserError::AuthenticationFailed => {
            (StatusCode::UNAUTHORIZED, "Invalid credentials".into())
        }
        UserError::NotFound(_) => (StatusCode::NOT_FOUND, "User not found".into()),
        UserError::Timeout => {
            warn!("deadline exceeded");
            (StatusCode::GATEWAY_TIMEOUT, "Request timed out".into())
        }
        e @ (UserError::Store { .. } | UserError::FatalConfig(_)) => {
            error!(error = %e, "user operation failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".into())
        }
    }
}
