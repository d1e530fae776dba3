//! Reservation repository implementation.
//!
//! The capacity-admission transaction lives here. Multiple service
//! instances may run against the shared store, so the check-and-increment
//! is serialized at the storage layer with a row lock on the session,
//! never with in-process locking.

use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use gymflow_core::result::AppResult;
use gymflow_core::types::pagination::{PageRequest, PageResponse};
use gymflow_core::AppError;
use gymflow_entity::reservation::{Reservation, ReservationStatus};
use gymflow_entity::session::Session;

use super::{db_error, is_retryable_conflict, is_unique_violation};

/// Outcome of a single admission attempt, before retry handling.
enum AttemptError {
    /// Serialization failure or deadlock. A fresh transaction may succeed.
    Conflict(sqlx::Error),
    /// Any other failure, already mapped to the application taxonomy.
    Fatal(AppError),
}

impl From<AppError> for AttemptError {
    fn from(err: AppError) -> Self {
        Self::Fatal(err)
    }
}

/// Repository for reservation lifecycle and query operations.
#[derive(Debug, Clone)]
pub struct ReservationRepository {
    pool: PgPool,
}

impl ReservationRepository {
    /// Create a new reservation repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Admit a reservation against a session's remaining capacity.
    ///
    /// Runs as one transaction: the session row is locked `FOR UPDATE`,
    /// the existence / state / duplicate / capacity checks run in order,
    /// then the reservation row is inserted and `reserved_count`
    /// incremented. Two concurrent admissions for the last slot serialize
    /// on the row lock; the loser sees the updated count and is refused.
    ///
    /// Serialization failures and deadlocks are retried on a fresh
    /// transaction up to `max_retries` times, then surfaced as
    /// `ResourceExhausted` — contention on a full session is not an
    /// internal error.
    pub async fn reserve(
        &self,
        session_id: Uuid,
        user_id: &str,
        max_retries: u32,
    ) -> AppResult<Reservation> {
        let mut attempts = 0;
        loop {
            match self.try_reserve(session_id, user_id).await {
                Ok(reservation) => return Ok(reservation),
                Err(AttemptError::Conflict(err)) if attempts < max_retries => {
                    attempts += 1;
                    debug!(
                        %session_id,
                        user_id,
                        attempts,
                        error = %err,
                        "Admission transaction conflict, retrying"
                    );
                }
                Err(AttemptError::Conflict(_)) => {
                    return Err(AppError::resource_exhausted(
                        "Could not admit reservation under contention",
                    ));
                }
                Err(AttemptError::Fatal(err)) => return Err(err),
            }
        }
    }

    /// One admission attempt in a single transaction.
    async fn try_reserve(
        &self,
        session_id: Uuid,
        user_id: &str,
    ) -> Result<Reservation, AttemptError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_error("Failed to begin admission", e))?;

        let session =
            sqlx::query_as::<_, Session>("SELECT * FROM sessions WHERE id = $1 FOR UPDATE")
                .bind(session_id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(|e| self.classify(e, "Failed to lock session for admission"))?
                .ok_or_else(|| AppError::not_found(format!("Session not found: {session_id}")))?;

        if session.is_cancelled {
            return Err(AppError::failed_precondition("Session has been cancelled").into());
        }
        if session.has_ended(chrono::Utc::now()) {
            return Err(AppError::failed_precondition("Session has already ended").into());
        }

        let duplicate: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM reservations \
             WHERE session_id = $1 AND user_id = $2 AND status = 'confirmed')",
        )
        .bind(session_id)
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| self.classify(e, "Failed to check for duplicate reservation"))?;

        if duplicate {
            return Err(AppError::already_exists(
                "User already has an active reservation for this session",
            )
            .into());
        }

        if session.is_full() {
            return Err(AppError::resource_exhausted("Session is fully booked").into());
        }

        // The partial unique index backstops the duplicate check against
        // any writer that inserts without holding the session lock.
        let reservation = sqlx::query_as::<_, Reservation>(
            "INSERT INTO reservations (session_id, user_id) VALUES ($1, $2) RETURNING *",
        )
        .bind(session_id)
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AttemptError::Fatal(AppError::already_exists(
                    "User already has an active reservation for this session",
                ))
            } else {
                self.classify(e, "Failed to insert reservation")
            }
        })?;

        sqlx::query(
            "UPDATE sessions SET reserved_count = reserved_count + 1, updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(session_id)
        .execute(&mut *tx)
        .await
        .map_err(|e| self.classify(e, "Failed to increment reserved count"))?;

        tx.commit()
            .await
            .map_err(|e| self.classify(e, "Failed to commit admission"))?;

        Ok(reservation)
    }

    /// Find a reservation by ID.
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Reservation>> {
        sqlx::query_as::<_, Reservation>("SELECT * FROM reservations WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error("Failed to find reservation", e))
    }

    /// Cancel a reservation and release its capacity unit.
    ///
    /// The reservation row is locked so a concurrent cancel of the same
    /// reservation observes the terminal status and fails with
    /// `FailedPrecondition` instead of decrementing twice. The decrement is
    /// floored at zero in SQL.
    pub async fn cancel(&self, id: Uuid) -> AppResult<Reservation> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_error("Failed to begin cancellation", e))?;

        let current = sqlx::query_as::<_, Reservation>(
            "SELECT * FROM reservations WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| db_error("Failed to lock reservation", e))?
        .ok_or_else(|| AppError::not_found(format!("Reservation not found: {id}")))?;

        if current.status.is_terminal() {
            return Err(AppError::failed_precondition(
                "Reservation has already been cancelled",
            ));
        }

        let cancelled = sqlx::query_as::<_, Reservation>(
            "UPDATE reservations SET status = 'cancelled', updated_at = NOW() \
             WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| db_error("Failed to cancel reservation", e))?;

        sqlx::query(
            "UPDATE sessions \
             SET reserved_count = GREATEST(reserved_count - 1, 0), updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(current.session_id)
        .execute(&mut *tx)
        .await
        .map_err(|e| db_error("Failed to decrement reserved count", e))?;

        tx.commit()
            .await
            .map_err(|e| db_error("Failed to commit cancellation", e))?;

        Ok(cancelled)
    }

    /// List a user's reservations, most recent first.
    pub async fn list_by_user(
        &self,
        user_id: &str,
        status: Option<ReservationStatus>,
        include_past: bool,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Reservation>> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM reservations r \
             JOIN sessions s ON s.id = r.session_id \
             WHERE r.user_id = $1 \
               AND ($2::reservation_status IS NULL OR r.status = $2) \
               AND ($3::boolean OR s.end_time >= NOW())",
        )
        .bind(user_id)
        .bind(status)
        .bind(include_past)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| db_error("Failed to count user reservations", e))?;

        let reservations = sqlx::query_as::<_, Reservation>(
            "SELECT r.* FROM reservations r \
             JOIN sessions s ON s.id = r.session_id \
             WHERE r.user_id = $1 \
               AND ($2::reservation_status IS NULL OR r.status = $2) \
               AND ($3::boolean OR s.end_time >= NOW()) \
             ORDER BY r.reserved_at DESC \
             LIMIT $4 OFFSET $5",
        )
        .bind(user_id)
        .bind(status)
        .bind(include_past)
        .bind(page.limit() as i64)
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to list user reservations", e))?;

        Ok(PageResponse::new(
            reservations,
            page.page,
            page.page_size,
            total as u64,
        ))
    }

    /// List a session's reservations in reservation order.
    pub async fn list_by_session(
        &self,
        session_id: Uuid,
        status: Option<ReservationStatus>,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Reservation>> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM reservations \
             WHERE session_id = $1 \
               AND ($2::reservation_status IS NULL OR status = $2)",
        )
        .bind(session_id)
        .bind(status)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| db_error("Failed to count session reservations", e))?;

        let reservations = sqlx::query_as::<_, Reservation>(
            "SELECT * FROM reservations \
             WHERE session_id = $1 \
               AND ($2::reservation_status IS NULL OR status = $2) \
             ORDER BY reserved_at ASC \
             LIMIT $3 OFFSET $4",
        )
        .bind(session_id)
        .bind(status)
        .bind(page.limit() as i64)
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to list session reservations", e))?;

        Ok(PageResponse::new(
            reservations,
            page.page,
            page.page_size,
            total as u64,
        ))
    }

    /// Count confirmed reservations for a session directly from the rows.
    ///
    /// `sessions.reserved_count` is the source of truth for admission; this
    /// aggregate exists for consistency auditing.
    pub async fn count_confirmed(&self, session_id: Uuid) -> AppResult<i64> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM reservations \
             WHERE session_id = $1 AND status = 'confirmed'",
        )
        .bind(session_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| db_error("Failed to count confirmed reservations", e))
    }

    /// Map a sqlx error from inside the admission transaction, splitting
    /// retryable conflicts from fatal failures.
    fn classify(&self, err: sqlx::Error, context: &str) -> AttemptError {
        if is_retryable_conflict(&err) {
            AttemptError::Conflict(err)
        } else {
            AttemptError::Fatal(db_error(context, err))
        }
    }
}
