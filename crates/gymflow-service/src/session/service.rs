//! Session CRUD operations with validation and coach/admin policy.

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use gymflow_core::types::pagination::{PageRequest, PageResponse};
use gymflow_core::AppError;
use gymflow_database::repositories::session::SessionRepository;
use gymflow_entity::session::{CreateSession, Session, SessionFilter, SessionPatch};

use crate::context::RequestContext;

/// Manages session CRUD operations.
#[derive(Debug, Clone)]
pub struct SessionService {
    /// Session repository.
    session_repo: Arc<SessionRepository>,
}

impl SessionService {
    /// Creates a new session service.
    pub fn new(session_repo: Arc<SessionRepository>) -> Self {
        Self { session_repo }
    }

    /// Creates a session. Coaches may only create their own sessions;
    /// admins may create sessions for any coach.
    pub async fn create_session(
        &self,
        ctx: &RequestContext,
        data: CreateSession,
    ) -> Result<Session, AppError> {
        if !ctx.is_coach_or_admin() {
            return Err(AppError::permission_denied(
                "Only coaches and admins may create sessions",
            ));
        }
        if !ctx.is_admin() && data.coach_id != ctx.subject_id {
            return Err(AppError::permission_denied(
                "Coaches may only create their own sessions",
            ));
        }

        validate_new_session(&data)?;

        let session = self.session_repo.create(&data).await?;
        info!(session_id = %session.id, coach_id = %session.coach_id, "Session created");
        Ok(session)
    }

    /// Gets a session by ID.
    pub async fn get_session(
        &self,
        _ctx: &RequestContext,
        session_id: Uuid,
    ) -> Result<Session, AppError> {
        self.session_repo
            .find_by_id(session_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Session not found: {session_id}")))
    }

    /// Applies a partial update. Absent fields are left unchanged; the
    /// capacity-shrink guard runs inside the repository transaction.
    pub async fn update_session(
        &self,
        ctx: &RequestContext,
        session_id: Uuid,
        patch: SessionPatch,
    ) -> Result<Session, AppError> {
        let current = self.get_session(ctx, session_id).await?;
        self.require_manages(ctx, &current)?;

        validate_patch(&patch)?;

        let updated = self.session_repo.update(session_id, &patch).await?;
        info!(session_id = %session_id, "Session updated");
        Ok(updated)
    }

    /// Deletes a session and, via the store-level cascade, all of its
    /// reservations.
    pub async fn delete_session(
        &self,
        ctx: &RequestContext,
        session_id: Uuid,
    ) -> Result<(), AppError> {
        let current = self.get_session(ctx, session_id).await?;
        self.require_manages(ctx, &current)?;

        let deleted = self.session_repo.delete(session_id).await?;
        if !deleted {
            return Err(AppError::not_found(format!(
                "Session not found: {session_id}"
            )));
        }
        info!(session_id = %session_id, "Session deleted");
        Ok(())
    }

    /// Lists sessions ordered by start time ascending.
    pub async fn list_sessions(
        &self,
        _ctx: &RequestContext,
        filter: SessionFilter,
        page: PageRequest,
    ) -> Result<PageResponse<Session>, AppError> {
        self.session_repo.list(&filter, &page).await
    }

    /// Admins manage every session; coaches only their own.
    fn require_manages(&self, ctx: &RequestContext, session: &Session) -> Result<(), AppError> {
        if ctx.is_admin() {
            return Ok(());
        }
        if ctx.role == gymflow_entity::identity::Role::Coach
            && session.coach_id == ctx.subject_id
        {
            return Ok(());
        }
        Err(AppError::permission_denied(
            "Only the session's coach or an admin may modify it",
        ))
    }
}

/// Validate all required fields of a new session before any mutation.
fn validate_new_session(data: &CreateSession) -> Result<(), AppError> {
    require_non_empty("title", &data.title)?;
    require_non_empty("coach_id", &data.coach_id)?;
    require_non_empty("location", &data.location)?;
    require_non_empty("session_type", &data.session_type)?;
    require_non_empty("difficulty_level", &data.difficulty_level)?;
    if data.capacity < 1 {
        return Err(AppError::validation("Capacity must be at least 1"));
    }
    if data.end_time <= data.start_time {
        return Err(AppError::validation("End time must be after start time"));
    }
    Ok(())
}

/// Reject patches whose provided fields are malformed. Cross-field rules
/// (merged time window, capacity vs reserved count) are re-checked inside
/// the update transaction where the current row is locked.
fn validate_patch(patch: &SessionPatch) -> Result<(), AppError> {
    if let Some(title) = &patch.title {
        require_non_empty("title", title)?;
    }
    if let Some(location) = &patch.location {
        require_non_empty("location", location)?;
    }
    if let Some(session_type) = &patch.session_type {
        require_non_empty("session_type", session_type)?;
    }
    if let Some(difficulty_level) = &patch.difficulty_level {
        require_non_empty("difficulty_level", difficulty_level)?;
    }
    if let Some(capacity) = patch.capacity {
        if capacity < 1 {
            return Err(AppError::validation("Capacity must be at least 1"));
        }
    }
    Ok(())
}

fn require_non_empty(field: &str, value: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::validation(format!("Field '{field}' is required")));
    }
    Ok(())
}
