use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notice {
    pub id: Uuid,
    pub title: String,
    pub body: String,
    /// One of "all", "students", "faculty"
    pub audience: String,
    pub posted_by: String,
    pub published_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subject {
    pub code: String,
    pub name: String,
    pub semester: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
}

/// Student group owned by one faculty member; members are enrollment numbers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Group {
    pub id: Uuid,
    pub name: String,
    pub faculty_email: String,
    pub members: Vec<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyFeedback {
    pub id: Uuid,
    pub date: NaiveDate,
    pub student_enrollment: String,
    pub faculty_email: String,
    pub subject_code: String,
    pub rating: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssessmentPlan {
    pub id: Uuid,
    pub faculty_email: String,
    pub subject_code: String,
    pub title: String,
    /// One of "quiz", "assignment", "viva", "practical", "exam"
    pub assessment_type: String,
    pub planned_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<Uuid>,
    /// One of "planned", "completed", "cancelled"
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: Uuid,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub event_date: NaiveDate,
    pub created_by: String,
}

/// Local credential row for administrator logins. Students and faculty
/// authenticate against the hosted store's own auth instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminCredential {
    pub email: String,
    pub password_sha256: String,
}
