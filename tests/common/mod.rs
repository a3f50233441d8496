use std::sync::atomic::AtomicUsize;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use sha2::{Digest, Sha256};

use campus_feedback_api::app::app;
use campus_feedback_api::auth::identity::{AdminRecord, FacultyRecord, StudentRecord};
use campus_feedback_api::auth::Authenticator;
use campus_feedback_api::state::AppState;
use campus_feedback_api::store::{
    IdentityProvider, IntrospectedSubject, StoreClient, StoreError,
};

/// The opaque token the mock provider accepts.
pub const VALID_OPAQUE_TOKEN: &str = "valid-opaque-token";

pub const ADMIN_EMAIL: &str = "admin@x.edu";
pub const ADMIN_PASSWORD: &str = "secret123";

/// In-memory identity provider standing in for the hosted store's auth API
/// and role tables.
#[derive(Default)]
pub struct MockProvider {
    pub subject_email: Option<String>,
    pub students: Vec<StudentRecord>,
    pub faculty: Vec<FacultyRecord>,
    pub admins: Vec<AdminRecord>,
    pub fail_introspection: bool,
    pub remote_calls: AtomicUsize,
}

#[async_trait]
impl IdentityProvider for MockProvider {
    async fn introspect(&self, token: &str) -> Result<Option<IntrospectedSubject>, StoreError> {
        self.remote_calls
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        if self.fail_introspection {
            return Err(StoreError::UnexpectedStatus {
                status: 500,
                body: "mock store down".to_string(),
            });
        }
        if token != VALID_OPAQUE_TOKEN {
            return Ok(None);
        }
        Ok(self.subject_email.clone().map(|email| IntrospectedSubject {
            id: "subject-1".to_string(),
            email: Some(email),
        }))
    }

    async fn find_student(&self, email: &str) -> Result<Option<StudentRecord>, StoreError> {
        self.remote_calls
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        Ok(self.students.iter().find(|s| s.email == email).cloned())
    }

    async fn find_faculty(&self, email: &str) -> Result<Option<FacultyRecord>, StoreError> {
        self.remote_calls
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        Ok(self.faculty.iter().find(|f| f.email == email).cloned())
    }

    async fn find_admin(&self, email: &str) -> Result<Option<AdminRecord>, StoreError> {
        self.remote_calls
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        Ok(self.admins.iter().find(|a| a.email == email).cloned())
    }
}

pub fn student_record(email: &str) -> StudentRecord {
    StudentRecord {
        enrollment_number: "E123".to_string(),
        email: email.to_string(),
        name: "S One".to_string(),
        branch: Some("CSE".to_string()),
        semester: Some(5),
    }
}

pub fn faculty_record(email: &str) -> FacultyRecord {
    FacultyRecord {
        email: email.to_string(),
        name: "F One".to_string(),
        department: Some("CSE".to_string()),
        designation: Some("Assistant Professor".to_string()),
    }
}

pub fn admin_record(email: &str) -> AdminRecord {
    AdminRecord {
        email: email.to_string(),
        name: "Site Admin".to_string(),
    }
}

/// Serve a minimal stand-in for the hosted store's row API on an ephemeral
/// port: fixture rows for the admin login tables, an empty row set for
/// everything else.
async fn spawn_fake_store() -> String {
    let router = Router::new()
        .route("/auth/v1/health", get(|| async { Json(json!({})) }))
        .route(
            "/rest/v1/admin_credentials",
            get(|| async {
                let digest = hex::encode(Sha256::digest(ADMIN_PASSWORD.as_bytes()));
                Json(json!([{ "email": ADMIN_EMAIL, "password_sha256": digest }]))
            }),
        )
        .route(
            "/rest/v1/admins",
            get(|| async { Json(json!([{ "email": ADMIN_EMAIL, "name": "Site Admin" }])) }),
        )
        .fallback(|| async { Json(Value::Array(vec![])) });

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind fake store");
    let addr = listener.local_addr().expect("fake store addr");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("fake store");
    });

    format!("http://{}", addr)
}

/// Build the real router over the mock identity provider and the fake store.
pub async fn test_app(provider: Arc<MockProvider>) -> Router {
    let store_url = spawn_fake_store().await;
    let store = Arc::new(
        StoreClient::new(&store_url, "test-service-key", Duration::from_secs(2))
            .expect("store client"),
    );

    // Sign and verify with the same secret the lib's token issuance uses
    let secret = campus_feedback_api::config::config().security.jwt_secret.clone();
    let authenticator = Arc::new(Authenticator::new(secret, provider));

    app(AppState::new(store, authenticator))
}

/// Issue a locally signed JWT through the lib's own token path.
pub fn signed_jwt(identity: &campus_feedback_api::auth::Identity) -> String {
    use campus_feedback_api::auth::{generate_jwt, Claims};
    generate_jwt(Claims::new(identity)).expect("sign jwt")
}

pub async fn body_json(response: axum::response::Response) -> anyhow::Result<Value> {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
    Ok(serde_json::from_slice(&bytes)?)
}
