use axum::middleware::{from_fn, from_fn_with_state};
use axum::routing::{delete, get, post, put};
use axum::{extract::State, response::IntoResponse, Json, Router};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::handlers::protected::{
    assessments, directory, events, feedback, groups, notices, reports, subjects, whoami,
};
use crate::handlers::public;
use crate::middleware::{
    optional_auth, require_admin, require_auth, require_faculty, require_faculty_or_admin,
    require_student,
};
use crate::state::AppState;

pub fn app(state: AppState) -> Router {
    Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        .route("/auth/login", post(public::login_post))
        // Personalized-but-anonymous-friendly
        .merge(optional_auth_routes(state.clone()))
        // Protected API
        .merge(protected_routes(state.clone()))
        // Global middleware
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn optional_auth_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/api/notices", get(notices::notice_list))
        .route_layer(from_fn_with_state(state, optional_auth))
}

fn protected_routes(state: AppState) -> Router<AppState> {
    // Any authenticated role
    let shared = Router::new()
        .route("/api/auth/whoami", get(whoami::whoami))
        .route("/api/subjects", get(subjects::subject_list))
        .route("/api/events", get(events::event_list));

    let student = Router::new()
        .route(
            "/api/feedback",
            get(feedback::feedback_list).post(feedback::feedback_submit),
        )
        .route_layer(from_fn(require_student));

    let faculty = Router::new()
        .route(
            "/api/groups",
            get(groups::group_list).post(groups::group_create),
        )
        .route(
            "/api/groups/:id",
            put(groups::group_update).delete(groups::group_delete),
        )
        .route(
            "/api/assessments",
            get(assessments::assessment_list).post(assessments::assessment_create),
        )
        .route(
            "/api/assessments/:id",
            put(assessments::assessment_update).delete(assessments::assessment_delete),
        )
        .route("/api/feedback/summary", get(feedback::feedback_summary))
        .route_layer(from_fn(require_faculty));

    let staff = Router::new()
        .route("/api/students", get(directory::student_list))
        .route("/api/reports/monthly", get(reports::monthly_report))
        .route_layer(from_fn(require_faculty_or_admin));

    let admin = Router::new()
        .route("/api/notices", post(notices::notice_create))
        .route(
            "/api/notices/:id",
            put(notices::notice_update).delete(notices::notice_delete),
        )
        .route("/api/subjects", post(subjects::subject_create))
        .route("/api/subjects/:code", delete(subjects::subject_delete))
        .route("/api/events", post(events::event_create))
        .route("/api/events/:id", delete(events::event_delete))
        .route(
            "/api/faculty",
            get(directory::faculty_list).post(directory::faculty_create),
        )
        .route("/api/faculty/:email", delete(directory::faculty_delete))
        .route_layer(from_fn(require_admin));

    shared
        .merge(student)
        .merge(faculty)
        .merge(staff)
        .merge(admin)
        .route_layer(from_fn_with_state(state, require_auth))
}

async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "success": true,
        "data": {
            "name": "Campus Feedback API",
            "version": version,
            "description": "Academic feedback and observation management backend",
            "endpoints": {
                "home": "/ (public)",
                "login": "/auth/login (public - admin token acquisition)",
                "notices": "/api/notices (optional auth for reads, admin for writes)",
                "subjects": "/api/subjects (protected)",
                "groups": "/api/groups (faculty)",
                "feedback": "/api/feedback (student), /api/feedback/summary (faculty)",
                "assessments": "/api/assessments (faculty)",
                "events": "/api/events (protected, admin for writes)",
                "directory": "/api/students, /api/faculty (staff)",
                "reports": "/api/reports/monthly (faculty, admin)",
            }
        }
    }))
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.store.health().await {
        Ok(_) => (
            axum::http::StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "store": "ok"
                }
            })),
        ),
        Err(e) => (
            axum::http::StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "success": false,
                "error": "store unavailable",
                "data": {
                    "status": "degraded",
                    "timestamp": now,
                    "store_error": e.to_string()
                }
            })),
        ),
    }
}
