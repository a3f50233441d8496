use serde::{Deserialize, Serialize};

/// Application role tier. The set is closed: every caller is exactly one of
/// these, resolved per request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Faculty,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Faculty => "faculty",
            Role::Admin => "admin",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Role record from the `students` table, keyed by email.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentRecord {
    pub enrollment_number: String,
    pub email: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub semester: Option<i32>,
}

/// Role record from the `faculty` table, keyed by email.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FacultyRecord {
    pub email: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub designation: Option<String>,
}

/// Role record from the `admins` table, keyed by email.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminRecord {
    pub email: String,
    pub name: String,
}

/// Resolved caller identity, recomputed per request and attached to the
/// request context. Role-specific fields live behind the variant; the shared
/// fields are reachable through the accessors below.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum Identity {
    Student(StudentRecord),
    Faculty(FacultyRecord),
    Admin(AdminRecord),
}

impl Identity {
    pub fn role(&self) -> Role {
        match self {
            Identity::Student(_) => Role::Student,
            Identity::Faculty(_) => Role::Faculty,
            Identity::Admin(_) => Role::Admin,
        }
    }

    /// Downstream handlers key records on this value: enrollment number for
    /// students, email for faculty and admins.
    pub fn id(&self) -> &str {
        match self {
            Identity::Student(s) => &s.enrollment_number,
            Identity::Faculty(f) => &f.email,
            Identity::Admin(a) => &a.email,
        }
    }

    pub fn email(&self) -> &str {
        match self {
            Identity::Student(s) => &s.email,
            Identity::Faculty(f) => &f.email,
            Identity::Admin(a) => &a.email,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Identity::Student(s) => &s.name,
            Identity::Faculty(f) => &f.name,
            Identity::Admin(a) => &a.name,
        }
    }
}
