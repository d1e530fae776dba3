//! # gymflow-api
//!
//! HTTP API layer for GymFlow built on Axum.
//!
//! Provides the REST endpoints the gateway translates into, the caller
//! identity extractor, middleware (CORS, logging), DTOs, and error mapping.

pub mod app;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::{build_app, run_server};
pub use state::AppState;
