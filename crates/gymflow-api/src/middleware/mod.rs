//! HTTP middleware for the GymFlow API.

pub mod cors;
pub mod logging;
