//! Axum extractors for the GymFlow API.

pub mod auth;
pub mod pagination;

pub use auth::Caller;
pub use pagination::PaginationParams;
