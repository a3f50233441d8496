use std::sync::Arc;

use jsonwebtoken::{decode, DecodingKey, Validation};
use thiserror::Error;

use crate::store::{IdentityProvider, StoreError};

use super::identity::{Identity, Role};
use super::Claims;

/// Role tables are probed in this order, first match wins. A contrived email
/// present in more than one table therefore resolves to the earlier role;
/// nothing enforces cross-table uniqueness.
pub const ROLE_PROBE_ORDER: [Role; 3] = [Role::Student, Role::Faculty, Role::Admin];

#[derive(Debug, Error)]
pub enum AuthError {
    /// No Authorization header, or no `Bearer ` prefix
    #[error("Missing bearer credential")]
    MissingCredential,

    /// Credential neither verified locally nor accepted by introspection
    #[error("Credential rejected")]
    InvalidCredential,

    /// Introspection succeeded but the subject has no row in any role table
    #[error("Authenticated subject has no role record")]
    IdentityNotProvisioned,

    /// Remote call failed; not a rejection and must not be reported as one
    #[error("Identity resolution failed: {0}")]
    ResolutionFailure(#[from] StoreError),
}

/// Resolves a bearer credential to an [`Identity`].
///
/// Two disjoint credential formats are accepted: a locally signed JWT
/// (verified against the shared secret, no remote calls) and an opaque store
/// token (introspected remotely, then matched against the role tables by
/// email). Stateless per request; the provider handle is shared read-only.
pub struct Authenticator {
    secret: String,
    provider: Arc<dyn IdentityProvider>,
}

impl Authenticator {
    pub fn new(secret: impl Into<String>, provider: Arc<dyn IdentityProvider>) -> Self {
        Self {
            secret: secret.into(),
            provider,
        }
    }

    /// Resolve the raw Authorization header value to an identity.
    pub async fn authenticate(&self, authorization: Option<&str>) -> Result<Identity, AuthError> {
        let token = Self::extract_bearer(authorization)?;

        // Attempt 1: local signature check. Terminal on success.
        if let Some(identity) = self.verify_local(token) {
            return Ok(identity);
        }

        // Attempt 2: remote introspection + role-table resolution
        self.resolve_remote(token).await
    }

    fn extract_bearer(header: Option<&str>) -> Result<&str, AuthError> {
        let header = header.ok_or(AuthError::MissingCredential)?;
        let token = header
            .strip_prefix("Bearer ")
            .ok_or(AuthError::MissingCredential)?;
        if token.trim().is_empty() {
            return Err(AuthError::MissingCredential);
        }
        Ok(token)
    }

    fn verify_local(&self, token: &str) -> Option<Identity> {
        if self.secret.is_empty() {
            return None;
        }

        let decoding_key = DecodingKey::from_secret(self.secret.as_bytes());
        let validation = Validation::default();

        match decode::<Claims>(token, &decoding_key, &validation) {
            Ok(data) => Some(Identity::from(data.claims)),
            // Not locally verifiable; may still be a valid opaque token
            Err(_) => None,
        }
    }

    async fn resolve_remote(&self, token: &str) -> Result<Identity, AuthError> {
        let subject = self
            .provider
            .introspect(token)
            .await?
            .ok_or(AuthError::InvalidCredential)?;

        let email = subject.email.ok_or(AuthError::InvalidCredential)?;

        for role in ROLE_PROBE_ORDER {
            let found = match role {
                Role::Student => self
                    .provider
                    .find_student(&email)
                    .await?
                    .map(Identity::Student),
                Role::Faculty => self
                    .provider
                    .find_faculty(&email)
                    .await?
                    .map(Identity::Faculty),
                Role::Admin => self.provider.find_admin(&email).await?.map(Identity::Admin),
            };

            if let Some(identity) = found {
                tracing::debug!("Resolved '{}' as {} via role table", email, role);
                return Ok(identity);
            }
        }

        tracing::warn!("Subject '{}' authenticated but has no role record", email);
        Err(AuthError::IdentityNotProvisioned)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use chrono::Utc;
    use jsonwebtoken::{encode, EncodingKey, Header};

    use crate::auth::identity::{AdminRecord, FacultyRecord, StudentRecord};
    use crate::store::IntrospectedSubject;

    use super::*;

    const SECRET: &str = "unit-test-secret";

    #[derive(Default)]
    struct FakeProvider {
        subject_email: Option<String>,
        student: Option<StudentRecord>,
        faculty: Option<FacultyRecord>,
        admin: Option<AdminRecord>,
        fail_lookups: bool,
        remote_calls: AtomicUsize,
    }

    #[async_trait]
    impl IdentityProvider for FakeProvider {
        async fn introspect(
            &self,
            _token: &str,
        ) -> Result<Option<IntrospectedSubject>, StoreError> {
            self.remote_calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.subject_email.as_ref().map(|email| IntrospectedSubject {
                id: "subject-1".to_string(),
                email: Some(email.clone()),
            }))
        }

        async fn find_student(&self, email: &str) -> Result<Option<StudentRecord>, StoreError> {
            self.remote_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_lookups {
                return Err(StoreError::UnexpectedStatus {
                    status: 500,
                    body: "boom".to_string(),
                });
            }
            Ok(self.student.clone().filter(|s| s.email == email))
        }

        async fn find_faculty(&self, email: &str) -> Result<Option<FacultyRecord>, StoreError> {
            self.remote_calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.faculty.clone().filter(|f| f.email == email))
        }

        async fn find_admin(&self, email: &str) -> Result<Option<AdminRecord>, StoreError> {
            self.remote_calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.admin.clone().filter(|a| a.email == email))
        }
    }

    fn authenticator(provider: FakeProvider) -> (Authenticator, Arc<FakeProvider>) {
        let provider = Arc::new(provider);
        (
            Authenticator::new(SECRET, provider.clone()),
            provider,
        )
    }

    fn signed_token(role: Role) -> String {
        let claims = Claims {
            sub: match role {
                Role::Student => "E123".to_string(),
                _ => "f1@x.edu".to_string(),
            },
            email: match role {
                Role::Student => "s1@x.edu".to_string(),
                _ => "f1@x.edu".to_string(),
            },
            name: "Tester".to_string(),
            role,
            exp: Utc::now().timestamp() + 3600,
            iat: Utc::now().timestamp(),
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap()
    }

    fn student_row(email: &str) -> StudentRecord {
        StudentRecord {
            enrollment_number: "E123".to_string(),
            email: email.to_string(),
            name: "S One".to_string(),
            branch: Some("CSE".to_string()),
            semester: Some(5),
        }
    }

    fn faculty_row(email: &str) -> FacultyRecord {
        FacultyRecord {
            email: email.to_string(),
            name: "F One".to_string(),
            department: Some("CSE".to_string()),
            designation: None,
        }
    }

    #[tokio::test]
    async fn test_local_jwt_never_calls_remote() {
        let (auth, provider) = authenticator(FakeProvider::default());
        let header = format!("Bearer {}", signed_token(Role::Faculty));

        let identity = auth.authenticate(Some(&header)).await.unwrap();

        assert_eq!(identity.role(), Role::Faculty);
        assert_eq!(identity.email(), "f1@x.edu");
        assert_eq!(identity.name(), "Tester");
        assert_eq!(provider.remote_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_opaque_token_resolves_student_by_email() {
        let (auth, _) = authenticator(FakeProvider {
            subject_email: Some("s1@x.edu".to_string()),
            student: Some(student_row("s1@x.edu")),
            ..Default::default()
        });

        let identity = auth.authenticate(Some("Bearer opaque-xyz")).await.unwrap();

        assert_eq!(identity.role(), Role::Student);
        assert_eq!(identity.id(), "E123");
        assert_eq!(identity.email(), "s1@x.edu");
    }

    #[tokio::test]
    async fn test_student_table_wins_over_faculty() {
        // Same email in two tables: the earlier entry of the probe order wins.
        let (auth, _) = authenticator(FakeProvider {
            subject_email: Some("both@x.edu".to_string()),
            student: Some(student_row("both@x.edu")),
            faculty: Some(faculty_row("both@x.edu")),
            ..Default::default()
        });

        let identity = auth.authenticate(Some("Bearer opaque-xyz")).await.unwrap();
        assert_eq!(identity.role(), Role::Student);
    }

    #[tokio::test]
    async fn test_missing_header_and_missing_prefix() {
        let (auth, provider) = authenticator(FakeProvider::default());

        assert!(matches!(
            auth.authenticate(None).await,
            Err(AuthError::MissingCredential)
        ));
        assert!(matches!(
            auth.authenticate(Some("Basic abc")).await,
            Err(AuthError::MissingCredential)
        ));
        assert!(matches!(
            auth.authenticate(Some("Bearer ")).await,
            Err(AuthError::MissingCredential)
        ));
        // Absent header never reaches introspection
        assert_eq!(provider.remote_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_rejected_token_is_invalid_credential() {
        let (auth, _) = authenticator(FakeProvider::default());

        assert!(matches!(
            auth.authenticate(Some("Bearer garbage")).await,
            Err(AuthError::InvalidCredential)
        ));
    }

    #[tokio::test]
    async fn test_provisioning_gap_is_distinct_from_invalid() {
        let (auth, _) = authenticator(FakeProvider {
            subject_email: Some("ghost@x.edu".to_string()),
            ..Default::default()
        });

        assert!(matches!(
            auth.authenticate(Some("Bearer opaque-xyz")).await,
            Err(AuthError::IdentityNotProvisioned)
        ));
    }

    #[tokio::test]
    async fn test_lookup_failure_is_resolution_failure() {
        let (auth, _) = authenticator(FakeProvider {
            subject_email: Some("s1@x.edu".to_string()),
            fail_lookups: true,
            ..Default::default()
        });

        assert!(matches!(
            auth.authenticate(Some("Bearer opaque-xyz")).await,
            Err(AuthError::ResolutionFailure(_))
        ));
    }
}
