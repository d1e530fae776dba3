//! Shared test helpers for integration tests.

use std::sync::Arc;

use axum::body::Body;
use axum::Router;
use http::{Request, StatusCode};
use serde_json::Value;
use sqlx::PgPool;
use tower::ServiceExt;

use gymflow_api::{build_app, AppState};
use gymflow_core::config::AppConfig;

/// A caller identity forwarded the way the gateway forwards it.
pub type Identity<'a> = (&'a str, &'a str);

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Database pool for direct queries
    pub db_pool: PgPool,
    /// Application config
    pub config: AppConfig,
}

/// Response from a test request.
pub struct TestResponse {
    /// HTTP status code.
    pub status: StatusCode,
    /// Parsed JSON body (Null when empty or unparseable).
    pub json: Value,
}

impl TestApp {
    /// Create a new test application over a clean database.
    pub async fn new() -> Self {
        let config = AppConfig::load_from("tests/fixtures/test_config")
            .expect("Failed to load test config");

        let db_pool = gymflow_database::DatabasePool::connect(&config.database)
            .await
            .expect("Failed to connect to test database")
            .into_pool();

        gymflow_database::migration::run_migrations(&db_pool)
            .await
            .expect("Failed to run migrations");

        Self::clean_database(&db_pool).await;

        let state = AppState::new(Arc::new(config.clone()), db_pool.clone());
        let router = build_app(state);

        Self {
            router,
            db_pool,
            config,
        }
    }

    /// Truncate all tables between tests.
    async fn clean_database(pool: &PgPool) {
        sqlx::query("TRUNCATE reservations, sessions CASCADE")
            .execute(pool)
            .await
            .expect("Failed to clean database");
    }

    /// Issue a request against the in-process router.
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        identity: Option<Identity<'_>>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(path);

        if let Some((subject_id, role)) = identity {
            builder = builder
                .header("x-subject-id", subject_id)
                .header("x-subject-role", role);
        }

        let request = match body {
            Some(value) => builder
                .header("content-type", "application/json")
                .body(Body::from(value.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Request failed");

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Failed to read body");
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };

        TestResponse { status, json }
    }

    /// Create a session as the given coach and return its id.
    pub async fn create_session(
        &self,
        coach_id: &str,
        capacity: i32,
        start_in_hours: i64,
        duration_hours: i64,
    ) -> String {
        let start = chrono::Utc::now() + chrono::Duration::hours(start_in_hours);
        let end = start + chrono::Duration::hours(duration_hours);

        let response = self
            .request(
                "POST",
                "/api/sessions",
                Some(serde_json::json!({
                    "title": "Test Session",
                    "capacity": capacity,
                    "start_time": start.to_rfc3339(),
                    "end_time": end.to_rfc3339(),
                    "location": "Studio A",
                    "session_type": "yoga",
                    "difficulty_level": "beginner",
                })),
                Some((coach_id, "coach")),
            )
            .await;
        assert_eq!(response.status, StatusCode::OK, "{:?}", response.json);

        response.json["data"]["id"]
            .as_str()
            .expect("Session id missing")
            .to_string()
    }

    /// Create a past session directly in the store (the API refuses to
    /// create sessions that have already ended only at reservation time,
    /// but tests need a row whose end time has passed).
    pub async fn create_past_session(&self, coach_id: &str, capacity: i32) -> String {
        let start = chrono::Utc::now() - chrono::Duration::hours(2);
        let end = start + chrono::Duration::hours(1);

        let id: uuid::Uuid = sqlx::query_scalar(
            "INSERT INTO sessions \
             (title, coach_id, capacity, start_time, end_time, location, session_type, difficulty_level) \
             VALUES ('Past Session', $1, $2, $3, $4, 'Studio A', 'yoga', 'beginner') \
             RETURNING id",
        )
        .bind(coach_id)
        .bind(capacity)
        .bind(start)
        .bind(end)
        .fetch_one(&self.db_pool)
        .await
        .expect("Failed to insert past session");

        id.to_string()
    }

    /// Reserve a slot for a user and return the reservation id.
    pub async fn reserve(&self, session_id: &str, user_id: &str) -> String {
        let response = self
            .request(
                "POST",
                "/api/reservations",
                Some(serde_json::json!({ "session_id": session_id })),
                Some((user_id, "member")),
            )
            .await;
        assert_eq!(response.status, StatusCode::OK, "{:?}", response.json);

        response.json["data"]["id"]
            .as_str()
            .expect("Reservation id missing")
            .to_string()
    }

    /// Fetch a session's reserved_count via the API.
    pub async fn reserved_count(&self, session_id: &str) -> i64 {
        let response = self
            .request(
                "GET",
                &format!("/api/sessions/{session_id}"),
                None,
                Some(("observer", "member")),
            )
            .await;
        assert_eq!(response.status, StatusCode::OK);
        response.json["data"]["reserved_count"]
            .as_i64()
            .expect("reserved_count missing")
    }

    /// Count confirmed reservation rows directly in the store.
    pub async fn confirmed_rows(&self, session_id: &str) -> i64 {
        let id = uuid::Uuid::parse_str(session_id).expect("Invalid session id");
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM reservations WHERE session_id = $1 AND status = 'confirmed'",
        )
        .bind(id)
        .fetch_one(&self.db_pool)
        .await
        .expect("Failed to count reservations")
    }
}
