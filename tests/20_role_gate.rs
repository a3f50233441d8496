mod common;

use std::sync::Arc;

use anyhow::Result;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use tower::ServiceExt;

use campus_feedback_api::auth::Identity;

use common::{
    admin_record, body_json, faculty_record, signed_jwt, student_record, test_app, MockProvider,
};

fn get(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header("authorization", format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap()
}

fn student_token() -> String {
    signed_jwt(&Identity::Student(student_record("s1@x.edu")))
}

fn faculty_token() -> String {
    signed_jwt(&Identity::Faculty(faculty_record("f1@x.edu")))
}

fn admin_token() -> String {
    signed_jwt(&Identity::Admin(admin_record("a1@x.edu")))
}

#[tokio::test]
async fn student_routes_accept_students_only() -> Result<()> {
    let app = test_app(Arc::new(MockProvider::default())).await;

    let response = app
        .clone()
        .oneshot(get("/api/feedback", &student_token()))
        .await?;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(get("/api/feedback", &faculty_token()))
        .await?;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let body = body_json(response).await?;
    assert_eq!(body["code"], "FORBIDDEN");

    let response = app.oneshot(get("/api/feedback", &admin_token())).await?;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    Ok(())
}

#[tokio::test]
async fn faculty_routes_reject_students_and_admins() -> Result<()> {
    let app = test_app(Arc::new(MockProvider::default())).await;

    let response = app
        .clone()
        .oneshot(get("/api/groups", &faculty_token()))
        .await?;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(get("/api/groups", &student_token()))
        .await?;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app.oneshot(get("/api/groups", &admin_token())).await?;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    Ok(())
}

#[tokio::test]
async fn admin_routes_accept_admins_only() -> Result<()> {
    let app = test_app(Arc::new(MockProvider::default())).await;

    let response = app
        .clone()
        .oneshot(get("/api/faculty", &admin_token()))
        .await?;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.oneshot(get("/api/faculty", &faculty_token())).await?;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    Ok(())
}

#[tokio::test]
async fn staff_tier_spans_faculty_and_admin() -> Result<()> {
    let app = test_app(Arc::new(MockProvider::default())).await;

    let uri = "/api/reports/monthly?month=2025-06";

    let response = app.clone().oneshot(get(uri, &faculty_token())).await?;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.clone().oneshot(get(uri, &admin_token())).await?;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.oneshot(get(uri, &student_token())).await?;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    Ok(())
}

#[tokio::test]
async fn shared_routes_accept_any_authenticated_role() -> Result<()> {
    let app = test_app(Arc::new(MockProvider::default())).await;

    for token in [student_token(), faculty_token(), admin_token()] {
        let response = app.clone().oneshot(get("/api/subjects", &token)).await?;
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = app
        .oneshot(Request::builder().uri("/api/subjects").body(Body::empty())?)
        .await?;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn malformed_month_is_bad_request() -> Result<()> {
    let app = test_app(Arc::new(MockProvider::default())).await;

    let response = app
        .oneshot(get("/api/reports/monthly?month=junk", &admin_token()))
        .await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    Ok(())
}
