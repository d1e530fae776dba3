//! Reservation admission and lifecycle service.

pub mod service;

pub use service::ReservationService;
