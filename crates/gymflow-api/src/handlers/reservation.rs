//! Reservation lifecycle and listing handlers.

use std::str::FromStr;

use axum::extract::{Path, Query, State};
use axum::Json;
use uuid::Uuid;

use gymflow_core::AppError;
use gymflow_entity::reservation::{Reservation, ReservationStatus};

use crate::dto::request::{CreateReservationRequest, ReservationListParams};
use crate::error::ApiError;
use crate::dto::response::{ApiResponse, PaginatedResponse};
use crate::extractors::{Caller, PaginationParams};
use crate::state::AppState;

/// POST /api/reservations
pub async fn create_reservation(
    State(state): State<AppState>,
    caller: Caller,
    Json(req): Json<CreateReservationRequest>,
) -> Result<Json<ApiResponse<Reservation>>, ApiError> {
    let reservation = state
        .reservation_service
        .create_reservation(&caller, req.session_id)
        .await?;

    Ok(Json(ApiResponse::ok(reservation)))
}

/// GET /api/reservations/{id}
pub async fn get_reservation(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Reservation>>, ApiError> {
    let reservation = state
        .reservation_service
        .get_reservation(&caller, id)
        .await?;
    Ok(Json(ApiResponse::ok(reservation)))
}

/// DELETE /api/reservations/{id}
pub async fn cancel_reservation(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Reservation>>, ApiError> {
    let reservation = state
        .reservation_service
        .cancel_reservation(&caller, id)
        .await?;
    Ok(Json(ApiResponse::ok(reservation)))
}

/// GET /api/users/{user_id}/reservations
///
/// `me` is accepted as an alias for the caller's own subject id.
pub async fn list_user_reservations(
    State(state): State<AppState>,
    caller: Caller,
    Path(user_id): Path<String>,
    Query(params): Query<ReservationListParams>,
    Query(pagination): Query<PaginationParams>,
) -> Result<Json<ApiResponse<PaginatedResponse<Reservation>>>, ApiError> {
    let user_id = if user_id == "me" {
        caller.subject_id.clone()
    } else {
        user_id
    };

    let status = parse_status(params.status.as_deref())?;

    let page = state
        .reservation_service
        .list_user_reservations(
            &caller,
            &user_id,
            status,
            params.include_past,
            pagination.into_page_request(),
        )
        .await?;

    Ok(Json(ApiResponse::ok(page.into())))
}

/// GET /api/sessions/{id}/reservations
pub async fn list_session_reservations(
    State(state): State<AppState>,
    caller: Caller,
    Path(session_id): Path<Uuid>,
    Query(params): Query<ReservationListParams>,
    Query(pagination): Query<PaginationParams>,
) -> Result<Json<ApiResponse<PaginatedResponse<Reservation>>>, ApiError> {
    let status = parse_status(params.status.as_deref())?;

    let page = state
        .reservation_service
        .list_session_reservations(&caller, session_id, status, pagination.into_page_request())
        .await?;

    Ok(Json(ApiResponse::ok(page.into())))
}

fn parse_status(raw: Option<&str>) -> Result<Option<ReservationStatus>, AppError> {
    raw.map(ReservationStatus::from_str).transpose()
}
