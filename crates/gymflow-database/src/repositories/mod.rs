//! Repository implementations for all GymFlow entities.

pub mod reservation;
pub mod session;

pub use reservation::ReservationRepository;
pub use session::SessionRepository;

use gymflow_core::error::{AppError, ErrorKind};

/// Wrap a sqlx error in an [`AppError`], mapping pool acquire timeouts to
/// the deadline-exceeded kind so the boundary can signal them distinctly.
pub(crate) fn db_error(context: &str, err: sqlx::Error) -> AppError {
    match err {
        sqlx::Error::PoolTimedOut => AppError::with_source(
            ErrorKind::DeadlineExceeded,
            format!("{context}: timed out waiting for a database connection"),
            err,
        ),
        _ => AppError::with_source(ErrorKind::Database, context.to_string(), err),
    }
}

/// SQLSTATE check for unique-constraint violations.
pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .and_then(|db| db.code())
        .is_some_and(|code| code == "23505")
}

/// SQLSTATE check for serialization failures and deadlocks, which are safe
/// to retry on a fresh transaction.
pub(crate) fn is_retryable_conflict(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .and_then(|db| db.code())
        .is_some_and(|code| code == "40001" || code == "40P01")
}
