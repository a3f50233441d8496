mod common;

use std::sync::atomic::Ordering;
use std::sync::Arc;

use anyhow::Result;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::Utc;
use tower::ServiceExt;

use campus_feedback_api::auth::{Claims, Identity, Role};

use common::{
    admin_record, body_json, faculty_record, signed_jwt, student_record, test_app, MockProvider,
    VALID_OPAQUE_TOKEN,
};

fn get_whoami(token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri("/api/auth/whoami");
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }
    builder.body(Body::empty()).unwrap()
}

#[tokio::test]
async fn local_jwt_resolves_without_remote_calls() -> Result<()> {
    let provider = Arc::new(MockProvider::default());
    let app = test_app(provider.clone()).await;

    let identity = Identity::Faculty(faculty_record("f1@x.edu"));
    let token = signed_jwt(&identity);

    let response = app.oneshot(get_whoami(Some(&token))).await?;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await?;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["role"], "faculty");
    assert_eq!(body["data"]["email"], "f1@x.edu");
    assert_eq!(body["data"]["name"], "F One");

    // Locally verified tokens never trigger introspection or table lookups
    assert_eq!(provider.remote_calls.load(Ordering::SeqCst), 0);
    Ok(())
}

#[tokio::test]
async fn opaque_token_resolves_student_with_enrollment_id() -> Result<()> {
    let provider = Arc::new(MockProvider {
        subject_email: Some("s1@x.edu".to_string()),
        students: vec![student_record("s1@x.edu")],
        ..Default::default()
    });
    let app = test_app(provider).await;

    let response = app.oneshot(get_whoami(Some(VALID_OPAQUE_TOKEN))).await?;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await?;
    assert_eq!(body["data"]["role"], "student");
    assert_eq!(body["data"]["enrollment_number"], "E123");
    assert_eq!(body["data"]["email"], "s1@x.edu");
    Ok(())
}

#[tokio::test]
async fn missing_header_is_rejected_with_401() -> Result<()> {
    let app = test_app(Arc::new(MockProvider::default())).await;

    let response = app.oneshot(get_whoami(None)).await?;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = body_json(response).await?;
    assert_eq!(body["error"], true);
    assert_eq!(body["code"], "UNAUTHORIZED");
    assert_eq!(body["message"], "Missing bearer credential");
    Ok(())
}

#[tokio::test]
async fn rejected_token_is_invalid_credential() -> Result<()> {
    let app = test_app(Arc::new(MockProvider::default())).await;

    let response = app.oneshot(get_whoami(Some("not-a-real-token"))).await?;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = body_json(response).await?;
    assert_eq!(body["message"], "Credential rejected");
    Ok(())
}

#[tokio::test]
async fn provisioning_gap_is_rejected_with_distinct_message() -> Result<()> {
    // Introspection succeeds but no role table has the email
    let provider = Arc::new(MockProvider {
        subject_email: Some("ghost@x.edu".to_string()),
        ..Default::default()
    });
    let app = test_app(provider).await;

    let response = app.oneshot(get_whoami(Some(VALID_OPAQUE_TOKEN))).await?;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = body_json(response).await?;
    assert_eq!(body["message"], "No role record for authenticated subject");
    Ok(())
}

#[tokio::test]
async fn student_table_wins_when_email_is_in_two_tables() -> Result<()> {
    let provider = Arc::new(MockProvider {
        subject_email: Some("both@x.edu".to_string()),
        students: vec![student_record("both@x.edu")],
        faculty: vec![faculty_record("both@x.edu")],
        ..Default::default()
    });
    let app = test_app(provider).await;

    let response = app.oneshot(get_whoami(Some(VALID_OPAQUE_TOKEN))).await?;
    let body = body_json(response).await?;
    assert_eq!(body["data"]["role"], "student");
    Ok(())
}

#[tokio::test]
async fn resolution_failure_is_500_not_401() -> Result<()> {
    let provider = Arc::new(MockProvider {
        fail_introspection: true,
        ..Default::default()
    });
    let app = test_app(provider).await;

    let response = app.oneshot(get_whoami(Some("opaque-xyz"))).await?;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body = body_json(response).await?;
    assert_eq!(body["code"], "INTERNAL_SERVER_ERROR");
    Ok(())
}

#[tokio::test]
async fn expired_local_jwt_falls_through_to_rejection() -> Result<()> {
    let app = test_app(Arc::new(MockProvider::default())).await;

    let identity = Identity::Admin(admin_record("a1@x.edu"));
    let mut claims = Claims::new(&identity);
    claims.exp = Utc::now().timestamp() - 3600;
    assert_eq!(claims.role, Role::Admin);

    let secret = &campus_feedback_api::config::config().security.jwt_secret;
    let token = jsonwebtoken::encode(
        &jsonwebtoken::Header::default(),
        &claims,
        &jsonwebtoken::EncodingKey::from_secret(secret.as_bytes()),
    )?;

    let response = app.oneshot(get_whoami(Some(&token))).await?;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn admin_login_issues_token_accepted_by_whoami() -> Result<()> {
    let provider = Arc::new(MockProvider::default());
    let app = test_app(provider.clone()).await;

    let login = Request::builder()
        .method("POST")
        .uri("/auth/login")
        .header("content-type", "application/json")
        .body(Body::from(
            serde_json::json!({
                "email": common::ADMIN_EMAIL,
                "password": common::ADMIN_PASSWORD,
            })
            .to_string(),
        ))?;

    let response = app.clone().oneshot(login).await?;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await?;
    let token = body["data"]["token"].as_str().expect("token").to_string();
    assert_eq!(body["data"]["identity"]["role"], "admin");

    let response = app.oneshot(get_whoami(Some(&token))).await?;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await?;
    assert_eq!(body["data"]["role"], "admin");
    assert_eq!(body["data"]["email"], common::ADMIN_EMAIL);

    // Locally signed admin tokens never touch the remote provider
    assert_eq!(provider.remote_calls.load(Ordering::SeqCst), 0);
    Ok(())
}

#[tokio::test]
async fn wrong_password_login_is_rejected() -> Result<()> {
    let app = test_app(Arc::new(MockProvider::default())).await;

    let login = Request::builder()
        .method("POST")
        .uri("/auth/login")
        .header("content-type", "application/json")
        .body(Body::from(
            serde_json::json!({
                "email": common::ADMIN_EMAIL,
                "password": "wrong",
            })
            .to_string(),
        ))?;

    let response = app.oneshot(login).await?;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}
