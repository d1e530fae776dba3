//! # gymflow-database
//!
//! PostgreSQL connection management and concrete repository implementations
//! for the GymFlow scheduling service. The capacity-admission transaction
//! lives here so the invariant is enforced at the storage layer, not only in
//! application logic.

pub mod connection;
pub mod migration;
pub mod repositories;

pub use connection::DatabasePool;
