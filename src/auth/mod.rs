use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde::{Deserialize, Serialize};

use crate::config;

pub mod identity;
pub mod resolver;

pub use identity::{AdminRecord, FacultyRecord, Identity, Role, StudentRecord};
pub use resolver::{AuthError, Authenticator};

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub email: String,
    pub name: String,
    pub role: Role,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn new(identity: &Identity) -> Self {
        let now = Utc::now();
        let expiry_hours = config::config().security.jwt_expiry_hours;
        let exp = (now + Duration::hours(expiry_hours as i64)).timestamp();

        Self {
            sub: identity.id().to_string(),
            email: identity.email().to_string(),
            name: identity.name().to_string(),
            role: identity.role(),
            exp,
            iat: now.timestamp(),
        }
    }
}

// A token that verifies locally carries everything needed to rebuild the
// identity; role-specific extras are filled in only on the remote path.
impl From<Claims> for Identity {
    fn from(claims: Claims) -> Self {
        match claims.role {
            Role::Student => Identity::Student(StudentRecord {
                enrollment_number: claims.sub,
                email: claims.email,
                name: claims.name,
                branch: None,
                semester: None,
            }),
            Role::Faculty => Identity::Faculty(FacultyRecord {
                email: claims.email,
                name: claims.name,
                department: None,
                designation: None,
            }),
            Role::Admin => Identity::Admin(AdminRecord {
                email: claims.email,
                name: claims.name,
            }),
        }
    }
}

#[derive(Debug)]
pub enum JwtError {
    TokenGeneration(String),
    InvalidSecret,
}

impl std::fmt::Display for JwtError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JwtError::TokenGeneration(msg) => write!(f, "JWT generation error: {}", msg),
            JwtError::InvalidSecret => write!(f, "Invalid JWT secret"),
        }
    }
}

impl std::error::Error for JwtError {}

pub fn generate_jwt(claims: Claims) -> Result<String, JwtError> {
    let secret = &config::config().security.jwt_secret;

    if secret.is_empty() {
        return Err(JwtError::InvalidSecret);
    }

    let encoding_key = EncodingKey::from_secret(secret.as_bytes());
    let header = Header::default();

    encode(&header, &claims, &encoding_key)
        .map_err(|e| JwtError::TokenGeneration(e.to_string()))
}
