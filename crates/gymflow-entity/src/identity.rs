//! Caller identity types.
//!
//! Authentication lives in the identity service; the gateway forwards the
//! verified subject id and role with every request. This module only models
//! what the scheduling service needs to enforce its own authorization rules.

use serde::{Deserialize, Serialize};

use gymflow_core::AppError;

/// Role of the calling subject, as asserted by the identity service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// A regular gym member.
    Member,
    /// A coach who runs sessions.
    Coach,
    /// A platform administrator.
    Admin,
}

impl Role {
    /// Return the role as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Member => "member",
            Self::Coach => "coach",
            Self::Admin => "admin",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "member" => Ok(Self::Member),
            "coach" => Ok(Self::Coach),
            "admin" => Ok(Self::Admin),
            _ => Err(AppError::validation(format!("Invalid role: '{s}'"))),
        }
    }
}
