//! Request DTOs with validation.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Create session request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateSessionRequest {
    /// Session title.
    #[validate(length(min = 1, max = 255, message = "Title is required"))]
    pub title: String,
    /// Free-form description.
    pub description: Option<String>,
    /// Coach subject id. Coaches may omit it; it defaults to the caller.
    pub coach_id: Option<String>,
    /// Maximum number of reservations.
    #[validate(range(min = 1, message = "Capacity must be at least 1"))]
    pub capacity: i32,
    /// When the session starts.
    pub start_time: DateTime<Utc>,
    /// When the session ends.
    pub end_time: DateTime<Utc>,
    /// Where the session takes place.
    #[validate(length(min = 1, max = 255, message = "Location is required"))]
    pub location: String,
    /// Kind of activity.
    #[validate(length(min = 1, max = 100, message = "Session type is required"))]
    pub session_type: String,
    /// Difficulty level.
    #[validate(length(min = 1, max = 50, message = "Difficulty level is required"))]
    pub difficulty_level: String,
}

/// Partial session update request body. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateSessionRequest {
    /// New title.
    pub title: Option<String>,
    /// New description (empty string clears it).
    pub description: Option<String>,
    /// New capacity.
    pub capacity: Option<i32>,
    /// New start time.
    pub start_time: Option<DateTime<Utc>>,
    /// New end time.
    pub end_time: Option<DateTime<Utc>>,
    /// New location.
    pub location: Option<String>,
    /// New session type.
    pub session_type: Option<String>,
    /// New difficulty level.
    pub difficulty_level: Option<String>,
    /// Cancel or un-cancel the session.
    pub is_cancelled: Option<bool>,
}

/// Create reservation request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateReservationRequest {
    /// The session to reserve a slot in.
    pub session_id: Uuid,
}

/// Query parameters for session listings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionListParams {
    /// Only sessions starting on this calendar day (UTC).
    pub date: Option<NaiveDate>,
    /// Only sessions of this activity type.
    pub session_type: Option<String>,
    /// Only sessions run by this coach.
    pub coach_id: Option<String>,
    /// Include sessions whose end time has already passed.
    #[serde(default)]
    pub include_past: bool,
}

/// Query parameters for reservation listings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReservationListParams {
    /// Only reservations with this status (`confirmed` or `cancelled`).
    pub status: Option<String>,
    /// Include reservations whose session has already ended.
    #[serde(default)]
    pub include_past: bool,
}
