//! `Caller` extractor — reads the gateway-forwarded subject identity.
//!
//! Authentication happens upstream: the gateway verifies the bearer
//! credential against the identity service and forwards the verified
//! subject id and role as headers. This service trusts that identity and
//! only enforces its own authorization rules.

use std::str::FromStr;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use gymflow_core::AppError;
use gymflow_entity::identity::Role;
use gymflow_service::context::RequestContext;

use crate::error::ApiError;

/// Header carrying the authenticated subject id.
pub const SUBJECT_ID_HEADER: &str = "x-subject-id";
/// Header carrying the authenticated subject role.
pub const SUBJECT_ROLE_HEADER: &str = "x-subject-role";

/// Extracted caller identity available in handlers.
#[derive(Debug, Clone)]
pub struct Caller(pub RequestContext);

impl Caller {
    /// Returns the inner `RequestContext`.
    pub fn context(&self) -> &RequestContext {
        &self.0
    }
}

impl std::ops::Deref for Caller {
    type Target = RequestContext;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<S: Send + Sync> FromRequestParts<S> for Caller {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let subject_id = parts
            .headers
            .get(SUBJECT_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
            .ok_or_else(|| AppError::unauthenticated("Missing subject identity header"))?;

        let role = parts
            .headers
            .get(SUBJECT_ROLE_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::unauthenticated("Missing subject role header"))?;

        let role = Role::from_str(role)
            .map_err(|_| AppError::unauthenticated(format!("Unknown subject role: '{role}'")))?;

        Ok(Caller(RequestContext::new(subject_id.to_string(), role)))
    }
}
