//! Session entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A schedulable gym activity instance with fixed capacity and time window.
///
/// `reserved_count` is owned exclusively by the scheduling service and is
/// only ever written inside the same transaction as a reservation row
/// change, so `0 <= reserved_count <= capacity` holds at all times.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Session {
    /// Unique session identifier.
    pub id: Uuid,
    /// Session title.
    pub title: String,
    /// Free-form description.
    pub description: Option<String>,
    /// The coach running this session (opaque identity-service subject id).
    /// Display metadata for the coach lives in the identity service.
    pub coach_id: String,
    /// Maximum number of reservations.
    pub capacity: i32,
    /// Number of currently confirmed reservations.
    pub reserved_count: i32,
    /// When the session starts.
    pub start_time: DateTime<Utc>,
    /// When the session ends.
    pub end_time: DateTime<Utc>,
    /// Where the session takes place.
    pub location: String,
    /// Kind of activity (yoga, spin, crossfit, ...).
    pub session_type: String,
    /// Difficulty level (beginner, intermediate, advanced, ...).
    pub difficulty_level: String,
    /// Whether the session has been called off by its coach.
    pub is_cancelled: bool,
    /// When the session was created.
    pub created_at: DateTime<Utc>,
    /// When the session was last modified.
    pub updated_at: DateTime<Utc>,
}

impl Session {
    /// Check whether every capacity slot is taken.
    pub fn is_full(&self) -> bool {
        self.reserved_count >= self.capacity
    }

    /// Number of slots still available.
    pub fn remaining_capacity(&self) -> i32 {
        (self.capacity - self.reserved_count).max(0)
    }

    /// Check whether the session's time window has passed.
    pub fn has_ended(&self, now: DateTime<Utc>) -> bool {
        self.end_time <= now
    }

    /// Check whether new reservations may be admitted, capacity aside.
    pub fn accepts_reservations(&self, now: DateTime<Utc>) -> bool {
        !self.is_cancelled && !self.has_ended(now)
    }
}

/// Data required to create a new session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSession {
    /// Session title.
    pub title: String,
    /// Free-form description.
    pub description: Option<String>,
    /// The coach running this session.
    pub coach_id: String,
    /// Maximum number of reservations.
    pub capacity: i32,
    /// When the session starts.
    pub start_time: DateTime<Utc>,
    /// When the session ends.
    pub end_time: DateTime<Utc>,
    /// Where the session takes place.
    pub location: String,
    /// Kind of activity.
    pub session_type: String,
    /// Difficulty level.
    pub difficulty_level: String,
}

/// Filters for session listings. `None` fields do not constrain the result.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionFilter {
    /// Only sessions starting on this calendar day (UTC).
    pub date: Option<chrono::NaiveDate>,
    /// Only sessions of this activity type.
    pub session_type: Option<String>,
    /// Only sessions run by this coach.
    pub coach_id: Option<String>,
    /// Include sessions whose end time has already passed.
    pub include_past: bool,
}

/// Partial update for a session. `None` fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionPatch {
    /// New title.
    pub title: Option<String>,
    /// New description. `Some(None)` is not expressible here; a provided
    /// empty string clears the description.
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

impl SessionPatch {
    /// Whether the patch carries no changes at all.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.capacity.is_none()
            && self.start_time.is_none()
            && self.end_time.is_none()
            && self.location.is_none()
            && self.session_type.is_none()
            && self.difficulty_level.is_none()
            && self.is_cancelled.is_none()
    }

    /// Apply this patch to a session, returning the merged row.
    ///
    /// Absent fields keep their current value; `reserved_count` and
    /// timestamps are never touched by a patch.
    pub fn apply(&self, current: &Session) -> Session {
        let mut merged = current.clone();
        if let Some(title) = &self.title {
            merged.title = title.clone();
        }
        if let Some(description) = &self.description {
            merged.description = if description.is_empty() {
                None
            } else {
                Some(description.clone())
            };
        }
        if let Some(capacity) = self.capacity {
            merged.capacity = capacity;
        }
        if let Some(start_time) = self.start_time {
            merged.start_time = start_time;
        }
        if let Some(end_time) = self.end_time {
            merged.end_time = end_time;
        }
        if let Some(location) = &self.location {
            merged.location = location.clone();
        }
        if let Some(session_type) = &self.session_type {
            merged.session_type = session_type.clone();
        }
        if let Some(difficulty_level) = &self.difficulty_level {
            merged.difficulty_level = difficulty_level.clone();
        }
        if let Some(is_cancelled) = self.is_cancelled {
            merged.is_cancelled = is_cancelled;
        }
        merged
    }
}
