//! Session CRUD and listing handlers.

use axum::extract::{Path, Query, State};
use axum::Json;
use uuid::Uuid;
use validator::Validate;

use gymflow_core::AppError;
use gymflow_entity::session::{CreateSession, Session, SessionFilter, SessionPatch};

use crate::dto::request::{CreateSessionRequest, SessionListParams, UpdateSessionRequest};
use crate::error::ApiError;
use crate::dto::response::{ApiResponse, MessageResponse, PaginatedResponse};
use crate::extractors::{Caller, PaginationParams};
use crate::state::AppState;

/// POST /api/sessions
pub async fn create_session(
    State(state): State<AppState>,
    caller: Caller,
    Json(req): Json<CreateSessionRequest>,
) -> Result<Json<ApiResponse<Session>>, ApiError> {
    req.validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    let coach_id = req
        .coach_id
        .unwrap_or_else(|| caller.subject_id.clone());

    let session = state
        .session_service
        .create_session(
            &caller,
            CreateSession {
                title: req.title,
                description: req.description,
                coach_id,
                capacity: req.capacity,
                start_time: req.start_time,
                end_time: req.end_time,
                location: req.location,
                session_type: req.session_type,
                difficulty_level: req.difficulty_level,
            },
        )
        .await?;

    Ok(Json(ApiResponse::ok(session)))
}

/// GET /api/sessions/{id}
pub async fn get_session(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Session>>, ApiError> {
    let session = state.session_service.get_session(&caller, id).await?;
    Ok(Json(ApiResponse::ok(session)))
}

/// GET /api/sessions
pub async fn list_sessions(
    State(state): State<AppState>,
    caller: Caller,
    Query(params): Query<SessionListParams>,
    Query(pagination): Query<PaginationParams>,
) -> Result<Json<ApiResponse<PaginatedResponse<Session>>>, ApiError> {
    let filter = SessionFilter {
        date: params.date,
        session_type: params.session_type,
        coach_id: params.coach_id,
        include_past: params.include_past,
    };

    let page = state
        .session_service
        .list_sessions(&caller, filter, pagination.into_page_request())
        .await?;

    Ok(Json(ApiResponse::ok(page.into())))
}

/// PATCH /api/sessions/{id}
pub async fn update_session(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateSessionRequest>,
) -> Result<Json<ApiResponse<Session>>, ApiError> {
    let patch = SessionPatch {
        title: req.title,
        description: req.description,
        capacity: req.capacity,
        start_time: req.start_time,
        end_time: req.end_time,
        location: req.location,
        session_type: req.session_type,
        difficulty_level: req.difficulty_level,
        is_cancelled: req.is_cancelled,
    };

    let session = state
        .session_service
        .update_session(&caller, id, patch)
        .await?;

    Ok(Json(ApiResponse::ok(session)))
}

/// DELETE /api/sessions/{id}
pub async fn delete_session(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    state.session_service.delete_session(&caller, id).await?;
    Ok(Json(ApiResponse::ok(MessageResponse::new(
        "Session deleted",
    ))))
}
