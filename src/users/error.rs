use thiserror::Error;

/// Every failure the users layer can surface. Kinds are never downgraded into
/// one another on the way up; the transport decides what the caller sees.
#[derive(Debug, Error)]
pub enum UserError {
    #[error("user not found: {0}")]
    NotFound(String),

    #[error("email and password combination is wrong")]
    AuthenticationFailed,

    #[error("validation error: {0}")]
    Validation(String),

    #[error("{context}: {source}")]
    Store {
        context: &'static str,
        #[source]
        source: sqlx::Error,
    },

    #[error("fatal configuration error: {0}")]
    FatalConfig(String),

    #[error("operation timed out")]
    Timeout,
}

pub type UserResult<T> = Result<T, UserError>;

impl UserError {
    /// Wraps a sqlx failure with context. Pool timeouts are the store honoring a
    /// deadline, so they surface as `Timeout` instead of a store error.
    pub fn store(context: &'static str) -> impl FnOnce(sqlx::Error) -> UserError {
        move |source| match source {
            sqlx::Error::PoolTimedOut => UserError::Timeout,
            source => UserError::Store { context, source },
        }
    }
}
