//! Reservation admission and cancellation with self-or-admin policy.

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use gymflow_core::types::pagination::{PageRequest, PageResponse};
use gymflow_core::AppError;
use gymflow_database::repositories::reservation::ReservationRepository;
use gymflow_database::repositories::session::SessionRepository;
use gymflow_entity::identity::Role;
use gymflow_entity::reservation::{Reservation, ReservationStatus};

use crate::context::RequestContext;

/// Manages reservation admission and lifecycle.
#[derive(Debug, Clone)]
pub struct ReservationService {
    /// Reservation repository.
    reservation_repo: Arc<ReservationRepository>,
    /// Session repository, for ownership checks on session-scoped listings.
    session_repo: Arc<SessionRepository>,
    /// Bound on admission retries after transactional conflicts.
    admission_max_retries: u32,
}

impl ReservationService {
    /// Creates a new reservation service.
    pub fn new(
        reservation_repo: Arc<ReservationRepository>,
        session_repo: Arc<SessionRepository>,
        admission_max_retries: u32,
    ) -> Self {
        Self {
            reservation_repo,
            session_repo,
            admission_max_retries,
        }
    }

    /// Reserves one capacity unit of a session for the calling user.
    ///
    /// The admission check-and-increment runs at the storage layer; this
    /// method only supplies the caller identity and the retry bound.
    pub async fn create_reservation(
        &self,
        ctx: &RequestContext,
        session_id: Uuid,
    ) -> Result<Reservation, AppError> {
        let reservation = self
            .reservation_repo
            .reserve(session_id, &ctx.subject_id, self.admission_max_retries)
            .await?;

        info!(
            reservation_id = %reservation.id,
            session_id = %session_id,
            user_id = %ctx.subject_id,
            "Reservation admitted"
        );
        Ok(reservation)
    }

    /// Gets a reservation. Only the owner or an admin may see it.
    pub async fn get_reservation(
        &self,
        ctx: &RequestContext,
        reservation_id: Uuid,
    ) -> Result<Reservation, AppError> {
        let reservation = self
            .reservation_repo
            .find_by_id(reservation_id)
            .await?
            .ok_or_else(|| {
                AppError::not_found(format!("Reservation not found: {reservation_id}"))
            })?;

        if !ctx.can_act_for(&reservation.user_id) {
            return Err(AppError::permission_denied(
                "Only the reservation's owner or an admin may view it",
            ));
        }
        Ok(reservation)
    }

    /// Cancels a reservation and releases its capacity unit.
    ///
    /// Ownership never changes after creation, so the policy check can run
    /// before the cancellation transaction; the status transition itself is
    /// re-checked under the row lock.
    pub async fn cancel_reservation(
        &self,
        ctx: &RequestContext,
        reservation_id: Uuid,
    ) -> Result<Reservation, AppError> {
        let reservation = self
            .reservation_repo
            .find_by_id(reservation_id)
            .await?
            .ok_or_else(|| {
                AppError::not_found(format!("Reservation not found: {reservation_id}"))
            })?;

        if !ctx.can_act_for(&reservation.user_id) {
            return Err(AppError::permission_denied(
                "Only the reservation's owner or an admin may cancel it",
            ));
        }

        let cancelled = self.reservation_repo.cancel(reservation_id).await?;
        info!(
            reservation_id = %reservation_id,
            session_id = %cancelled.session_id,
            "Reservation cancelled"
        );
        Ok(cancelled)
    }

    /// Lists a user's reservations, most recent first. Self-or-admin.
    pub async fn list_user_reservations(
        &self,
        ctx: &RequestContext,
        user_id: &str,
        status: Option<ReservationStatus>,
        include_past: bool,
        page: PageRequest,
    ) -> Result<PageResponse<Reservation>, AppError> {
        if !ctx.can_act_for(user_id) {
            return Err(AppError::permission_denied(
                "Only the user or an admin may list these reservations",
            ));
        }
        self.reservation_repo
            .list_by_user(user_id, status, include_past, &page)
            .await
    }

    /// Lists a session's reservations. Owning coach or admin.
    pub async fn list_session_reservations(
        &self,
        ctx: &RequestContext,
        session_id: Uuid,
        status: Option<ReservationStatus>,
        page: PageRequest,
    ) -> Result<PageResponse<Reservation>, AppError> {
        let session = self
            .session_repo
            .find_by_id(session_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Session not found: {session_id}")))?;

        let owns = ctx.role == Role::Coach && session.coach_id == ctx.subject_id;
        if !ctx.is_admin() && !owns {
            return Err(AppError::permission_denied(
                "Only the session's coach or an admin may list its reservations",
            ));
        }

        self.reservation_repo
            .list_by_session(session_id, status, &page)
            .await
    }
}
