//! # gymflow-service
//!
//! Business logic services for the GymFlow scheduling service. Services
//! validate input before any mutation, enforce the authorization policy
//! (self-or-admin for cancellations, coach-or-admin for session
//! mutations), and orchestrate the repositories that own the transactional
//! invariants.

pub mod context;
pub mod reservation;
pub mod session;

pub use context::RequestContext;
