//! Session repository implementation.

use sqlx::PgPool;
use uuid::Uuid;

use gymflow_core::result::AppResult;
use gymflow_core::types::pagination::{PageRequest, PageResponse};
use gymflow_core::AppError;
use gymflow_entity::session::{CreateSession, Session, SessionFilter, SessionPatch};

use super::db_error;

/// Repository for session CRUD and query operations.
#[derive(Debug, Clone)]
pub struct SessionRepository {
    pool: PgPool,
}

impl SessionRepository {
    /// Create a new session repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a new session with no reservations.
    pub async fn create(&self, data: &CreateSession) -> AppResult<Session> {
        sqlx::query_as::<_, Session>(
            "INSERT INTO sessions \
             (title, description, coach_id, capacity, start_time, end_time, location, session_type, difficulty_level) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING *",
        )
        .bind(&data.title)
        .bind(&data.description)
        .bind(&data.coach_id)
        .bind(data.capacity)
        .bind(data.start_time)
        .bind(data.end_time)
        .bind(&data.location)
        .bind(&data.session_type)
        .bind(&data.difficulty_level)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| db_error("Failed to create session", e))
    }

    /// Find a session by ID.
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Session>> {
        sqlx::query_as::<_, Session>("SELECT * FROM sessions WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error("Failed to find session", e))
    }

    /// Apply a partial update to a session.
    ///
    /// The session row is locked for the duration of the transaction so the
    /// capacity check cannot race a concurrent admission: shrinking capacity
    /// below the current reserved count fails with `FailedPrecondition` and
    /// leaves the row untouched.
    pub async fn update(&self, id: Uuid, patch: &SessionPatch) -> AppResult<Session> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_error("Failed to begin session update", e))?;

        let current = sqlx::query_as::<_, Session>("SELECT * FROM sessions WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| db_error("Failed to lock session for update", e))?
            .ok_or_else(|| AppError::not_found(format!("Session not found: {id}")))?;

        let merged = patch.apply(&current);

        if merged.capacity < 1 {
            return Err(AppError::validation("Capacity must be at least 1"));
        }
        if merged.end_time <= merged.start_time {
            return Err(AppError::validation("End time must be after start time"));
        }
        if merged.capacity < current.reserved_count {
            return Err(AppError::failed_precondition(format!(
                "Cannot shrink capacity to {} below the {} existing reservations",
                merged.capacity, current.reserved_count
            )));
        }

        let updated = sqlx::query_as::<_, Session>(
            "UPDATE sessions SET \
             title = $2, description = $3, capacity = $4, start_time = $5, end_time = $6, \
             location = $7, session_type = $8, difficulty_level = $9, is_cancelled = $10, \
             updated_at = NOW() \
             WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(&merged.title)
        .bind(&merged.description)
        .bind(merged.capacity)
        .bind(merged.start_time)
        .bind(merged.end_time)
        .bind(&merged.location)
        .bind(&merged.session_type)
        .bind(&merged.difficulty_level)
        .bind(merged.is_cancelled)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| db_error("Failed to update session", e))?;

        tx.commit()
            .await
            .map_err(|e| db_error("Failed to commit session update", e))?;

        Ok(updated)
    }

    /// Delete a session. Reservations go with it via the foreign-key
    /// cascade. Returns false when no such session exists.
    pub async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM sessions WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| db_error("Failed to delete session", e))?;
        Ok(result.rows_affected() > 0)
    }

    /// List sessions matching the filter, ordered by start time ascending.
    pub async fn list(
        &self,
        filter: &SessionFilter,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Session>> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM sessions \
             WHERE ($1::date IS NULL OR (start_time AT TIME ZONE 'UTC')::date = $1) \
               AND ($2::text IS NULL OR session_type = $2) \
               AND ($3::text IS NULL OR coach_id = $3) \
               AND ($4::boolean OR end_time >= NOW())",
        )
        .bind(filter.date)
        .bind(&filter.session_type)
        .bind(&filter.coach_id)
        .bind(filter.include_past)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| db_error("Failed to count sessions", e))?;

        let sessions = sqlx::query_as::<_, Session>(
            "SELECT * FROM sessions \
             WHERE ($1::date IS NULL OR (start_time AT TIME ZONE 'UTC')::date = $1) \
               AND ($2::text IS NULL OR session_type = $2) \
               AND ($3::text IS NULL OR coach_id = $3) \
               AND ($4::boolean OR end_time >= NOW()) \
             ORDER BY start_time ASC \
             LIMIT $5 OFFSET $6",
        )
        .bind(filter.date)
        .bind(&filter.session_type)
        .bind(&filter.coach_id)
        .bind(filter.include_past)
        .bind(page.limit() as i64)
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to list sessions", e))?;

        Ok(PageResponse::new(
            sessions,
            page.page,
            page.page_size,
            total as u64,
        ))
    }
}
