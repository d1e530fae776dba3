//! Session management service.

pub mod service;

pub use service::SessionService;
