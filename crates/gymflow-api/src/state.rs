//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use sqlx::PgPool;

use gymflow_core::config::AppConfig;
use gymflow_database::repositories::reservation::ReservationRepository;
use gymflow_database::repositories::session::SessionRepository;
use gymflow_service::reservation::ReservationService;
use gymflow_service::session::SessionService;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are `Arc`-wrapped for cheap cloning across tasks.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<AppConfig>,
    /// PostgreSQL connection pool.
    pub db_pool: PgPool,
    /// Session repository.
    pub session_repo: Arc<SessionRepository>,
    /// Reservation repository.
    pub reservation_repo: Arc<ReservationRepository>,
    /// Session management service.
    pub session_service: Arc<SessionService>,
    /// Reservation admission service.
    pub reservation_service: Arc<ReservationService>,
}

impl AppState {
    /// Wire repositories and services over a connected pool.
    pub fn new(config: Arc<AppConfig>, db_pool: PgPool) -> Self {
        let session_repo = Arc::new(SessionRepository::new(db_pool.clone()));
        let reservation_repo = Arc::new(ReservationRepository::new(db_pool.clone()));

        let session_service = Arc::new(SessionService::new(Arc::clone(&session_repo)));
        let reservation_service = Arc::new(ReservationService::new(
            Arc::clone(&reservation_repo),
            Arc::clone(&session_repo),
            config.scheduling.admission_max_retries,
        ));

        Self {
            config,
            db_pool,
            session_repo,
            reservation_repo,
            session_service,
            reservation_service,
        }
    }
}
