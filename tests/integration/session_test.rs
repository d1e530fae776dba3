//! Integration tests for session CRUD and listing.

mod helpers;

use http::StatusCode;
use serde_json::json;

#[tokio::test]
async fn test_create_session_returns_stored_row() {
    let app = helpers::TestApp::new().await;
    let start = chrono::Utc::now() + chrono::Duration::hours(3);
    let end = start + chrono::Duration::hours(1);

    let response = app
        .request(
            "POST",
            "/api/sessions",
            Some(json!({
                "title": "Morning Yoga",
                "description": "Vinyasa flow",
                "capacity": 15,
                "start_time": start.to_rfc3339(),
                "end_time": end.to_rfc3339(),
                "location": "Studio A",
                "session_type": "yoga",
                "difficulty_level": "beginner",
            })),
            Some(("coach-1", "coach")),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK, "{:?}", response.json);
    let data = &response.json["data"];
    assert_eq!(data["title"], "Morning Yoga");
    assert_eq!(data["coach_id"], "coach-1");
    assert_eq!(data["reserved_count"], 0);
    assert_eq!(data["is_cancelled"], false);
    assert!(data["id"].as_str().is_some());
    assert!(data["created_at"].as_str().is_some());
}

#[tokio::test]
async fn test_create_session_rejects_missing_fields() {
    let app = helpers::TestApp::new().await;
    let start = chrono::Utc::now() + chrono::Duration::hours(3);
    let end = start + chrono::Duration::hours(1);

    let response = app
        .request(
            "POST",
            "/api/sessions",
            Some(json!({
                "title": "",
                "capacity": 0,
                "start_time": start.to_rfc3339(),
                "end_time": end.to_rfc3339(),
                "location": "Studio A",
                "session_type": "yoga",
                "difficulty_level": "beginner",
            })),
            Some(("coach-1", "coach")),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.json["error"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_create_session_rejects_inverted_window() {
    let app = helpers::TestApp::new().await;
    let start = chrono::Utc::now() + chrono::Duration::hours(3);

    let response = app
        .request(
            "POST",
            "/api/sessions",
            Some(json!({
                "title": "Backwards",
                "capacity": 10,
                "start_time": start.to_rfc3339(),
                "end_time": (start - chrono::Duration::hours(1)).to_rfc3339(),
                "location": "Studio A",
                "session_type": "yoga",
                "difficulty_level": "beginner",
            })),
            Some(("coach-1", "coach")),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_member_cannot_create_session() {
    let app = helpers::TestApp::new().await;
    let start = chrono::Utc::now() + chrono::Duration::hours(3);
    let end = start + chrono::Duration::hours(1);

    let response = app
        .request(
            "POST",
            "/api/sessions",
            Some(json!({
                "title": "Rogue Session",
                "capacity": 10,
                "start_time": start.to_rfc3339(),
                "end_time": end.to_rfc3339(),
                "location": "Studio A",
                "session_type": "yoga",
                "difficulty_level": "beginner",
            })),
            Some(("member-1", "member")),
        )
        .await;

    assert_eq!(response.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_missing_identity_is_unauthenticated() {
    let app = helpers::TestApp::new().await;
    let response = app.request("GET", "/api/sessions", None, None).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_get_unknown_session_is_not_found() {
    let app = helpers::TestApp::new().await;
    let response = app
        .request(
            "GET",
            &format!("/api/sessions/{}", uuid::Uuid::new_v4()),
            None,
            Some(("member-1", "member")),
        )
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.json["error"], "NOT_FOUND");
}

#[tokio::test]
async fn test_partial_update_leaves_absent_fields() {
    let app = helpers::TestApp::new().await;
    let session_id = app.create_session("coach-1", 15, 3, 1).await;

    let response = app
        .request(
            "PATCH",
            &format!("/api/sessions/{session_id}"),
            Some(json!({ "title": "Renamed" })),
            Some(("coach-1", "coach")),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK, "{:?}", response.json);
    let data = &response.json["data"];
    assert_eq!(data["title"], "Renamed");
    assert_eq!(data["capacity"], 15);
    assert_eq!(data["location"], "Studio A");
}

#[tokio::test]
async fn test_update_by_other_coach_is_forbidden() {
    let app = helpers::TestApp::new().await;
    let session_id = app.create_session("coach-1", 15, 3, 1).await;

    let response = app
        .request(
            "PATCH",
            &format!("/api/sessions/{session_id}"),
            Some(json!({ "title": "Hijacked" })),
            Some(("coach-2", "coach")),
        )
        .await;

    assert_eq!(response.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_capacity_shrink_below_reservations_fails() {
    let app = helpers::TestApp::new().await;
    let session_id = app.create_session("coach-1", 5, 3, 1).await;
    app.reserve(&session_id, "member-1").await;
    app.reserve(&session_id, "member-2").await;
    app.reserve(&session_id, "member-3").await;

    let response = app
        .request(
            "PATCH",
            &format!("/api/sessions/{session_id}"),
            Some(json!({ "capacity": 2 })),
            Some(("coach-1", "coach")),
        )
        .await;

    assert_eq!(response.status, StatusCode::CONFLICT);
    assert_eq!(response.json["error"], "FAILED_PRECONDITION");

    // Row unchanged
    let count = app.reserved_count(&session_id).await;
    assert_eq!(count, 3);
    let response = app
        .request(
            "GET",
            &format!("/api/sessions/{session_id}"),
            None,
            Some(("member-1", "member")),
        )
        .await;
    assert_eq!(response.json["data"]["capacity"], 5);
}

#[tokio::test]
async fn test_capacity_shrink_to_reserved_count_succeeds() {
    let app = helpers::TestApp::new().await;
    let session_id = app.create_session("coach-1", 5, 3, 1).await;
    app.reserve(&session_id, "member-1").await;
    app.reserve(&session_id, "member-2").await;

    let response = app
        .request(
            "PATCH",
            &format!("/api/sessions/{session_id}"),
            Some(json!({ "capacity": 2 })),
            Some(("coach-1", "coach")),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK, "{:?}", response.json);
    assert_eq!(response.json["data"]["capacity"], 2);
}

#[tokio::test]
async fn test_delete_session_cascades_reservations() {
    let app = helpers::TestApp::new().await;
    let session_id = app.create_session("coach-1", 10, 3, 1).await;
    app.reserve(&session_id, "member-1").await;
    app.reserve(&session_id, "member-2").await;

    let response = app
        .request(
            "DELETE",
            &format!("/api/sessions/{session_id}"),
            None,
            Some(("coach-1", "coach")),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let orphans: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM reservations WHERE session_id = $1")
            .bind(uuid::Uuid::parse_str(&session_id).unwrap())
            .fetch_one(&app.db_pool)
            .await
            .unwrap();
    assert_eq!(orphans, 0);

    let response = app
        .request(
            "DELETE",
            &format!("/api/sessions/{session_id}"),
            None,
            Some(("coach-1", "coach")),
        )
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_list_excludes_past_sessions_by_default() {
    let app = helpers::TestApp::new().await;
    let upcoming = app.create_session("coach-1", 10, 3, 1).await;
    let past = app.create_past_session("coach-1", 10).await;

    let response = app
        .request(
            "GET",
            "/api/sessions",
            None,
            Some(("member-1", "member")),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    let ids: Vec<&str> = response.json["data"]["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["id"].as_str().unwrap())
        .collect();
    assert!(ids.contains(&upcoming.as_str()));
    assert!(!ids.contains(&past.as_str()));

    let response = app
        .request(
            "GET",
            "/api/sessions?include_past=true",
            None,
            Some(("member-1", "member")),
        )
        .await;
    let ids: Vec<String> = response.json["data"]["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["id"].as_str().unwrap().to_string())
        .collect();
    assert!(ids.contains(&upcoming));
    assert!(ids.contains(&past));
}

#[tokio::test]
async fn test_list_orders_by_start_time_and_filters_by_coach() {
    let app = helpers::TestApp::new().await;
    let later = app.create_session("coach-1", 10, 6, 1).await;
    let sooner = app.create_session("coach-1", 10, 2, 1).await;
    app.create_session("coach-2", 10, 4, 1).await;

    let response = app
        .request(
            "GET",
            "/api/sessions?coach_id=coach-1",
            None,
            Some(("member-1", "member")),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let items = response.json["data"]["items"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["id"], sooner.as_str());
    assert_eq!(items[1]["id"], later.as_str());
}

#[tokio::test]
async fn test_list_pagination() {
    let app = helpers::TestApp::new().await;
    for hour in 1..=5 {
        app.create_session("coach-1", 10, hour, 1).await;
    }

    let response = app
        .request(
            "GET",
            "/api/sessions?page=2&per_page=2",
            None,
            Some(("member-1", "member")),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    let data = &response.json["data"];
    assert_eq!(data["items"].as_array().unwrap().len(), 2);
    assert_eq!(data["total"], 5);
    assert_eq!(data["page"], 2);
    assert_eq!(data["total_pages"], 3);
}
