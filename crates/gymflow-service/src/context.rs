//! Request context carrying the authenticated caller.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use gymflow_entity::identity::Role;

/// Context for the current authenticated request.
///
/// The gateway authenticates the bearer credential against the identity
/// service and forwards the verified subject; this service trusts the
/// forwarded identity and enforces only its own authorization rules.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestContext {
    /// The authenticated subject's opaque id.
    pub subject_id: String,
    /// The subject's role as asserted by the identity service.
    pub role: Role,
    /// When the request was received.
    pub request_time: DateTime<Utc>,
}

impl RequestContext {
    /// Creates a new request context.
    pub fn new(subject_id: String, role: Role) -> Self {
        Self {
            subject_id,
            role,
            request_time: Utc::now(),
        }
    }

    /// Returns whether the caller is an admin.
    pub fn is_admin(&self) -> bool {
        matches!(self.role, Role::Admin)
    }

    /// Returns whether the caller may manage sessions at all.
    pub fn is_coach_or_admin(&self) -> bool {
        matches!(self.role, Role::Coach | Role::Admin)
    }

    /// Returns whether the caller may act on resources owned by `subject_id`.
    pub fn can_act_for(&self, subject_id: &str) -> bool {
        self.is_admin() || self.subject_id == subject_id
    }
}
