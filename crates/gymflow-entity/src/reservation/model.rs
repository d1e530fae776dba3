//! Reservation entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use gymflow_core::AppError;

/// Lifecycle status of a reservation.
///
/// The only legal transition is `confirmed -> cancelled`; `cancelled` is
/// terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "reservation_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ReservationStatus {
    /// The reservation holds one unit of the session's capacity.
    Confirmed,
    /// The reservation was cancelled and its capacity unit released.
    Cancelled,
}

impl ReservationStatus {
    /// Whether no further transitions are possible from this status.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Return the status as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Confirmed => "confirmed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ReservationStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "confirmed" => Ok(Self::Confirmed),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(AppError::validation(format!(
                "Invalid reservation status: '{s}'"
            ))),
        }
    }
}

/// A user's claim on one unit of a session's capacity.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Reservation {
    /// Unique reservation identifier.
    pub id: Uuid,
    /// The session this reservation belongs to.
    pub session_id: Uuid,
    /// The reserving user (opaque identity-service subject id).
    pub user_id: String,
    /// When the reservation was made.
    pub reserved_at: DateTime<Utc>,
    /// Current lifecycle status.
    pub status: ReservationStatus,
    /// When the row was created.
    pub created_at: DateTime<Utc>,
    /// When the row was last modified.
    pub updated_at: DateTime<Utc>,
}

impl Reservation {
    /// Whether this reservation currently holds a capacity unit.
    pub fn is_active(&self) -> bool {
        self.status == ReservationStatus::Confirmed
    }

    /// Whether the given subject owns this reservation.
    pub fn is_owned_by(&self, subject_id: &str) -> bool {
        self.user_id == subject_id
    }
}
