use async_trait::async_trait;

use crate::auth::identity::{AdminRecord, FacultyRecord, StudentRecord};

use super::client::{IntrospectedSubject, StoreClient};
use super::error::StoreError;

/// Remote identity capability consumed by the credential verifier: token
/// introspection plus the three role-table lookups, each by exact email.
/// Implemented by [`StoreClient`] in production and by in-memory fakes in
/// tests.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// `Ok(None)` means the token was rejected by the identity provider.
    async fn introspect(&self, token: &str) -> Result<Option<IntrospectedSubject>, StoreError>;

    async fn find_student(&self, email: &str) -> Result<Option<StudentRecord>, StoreError>;

    async fn find_faculty(&self, email: &str) -> Result<Option<FacultyRecord>, StoreError>;

    async fn find_admin(&self, email: &str) -> Result<Option<AdminRecord>, StoreError>;
}

#[async_trait]
impl IdentityProvider for StoreClient {
    async fn introspect(&self, token: &str) -> Result<Option<IntrospectedSubject>, StoreError> {
        self.introspect_token(token).await
    }

    async fn find_student(&self, email: &str) -> Result<Option<StudentRecord>, StoreError> {
        self.from("students")
            .eq("email", email)?
            .fetch_optional()
            .await
    }

    async fn find_faculty(&self, email: &str) -> Result<Option<FacultyRecord>, StoreError> {
        self.from("faculty")
            .eq("email", email)?
            .fetch_optional()
            .await
    }

    async fn find_admin(&self, email: &str) -> Result<Option<AdminRecord>, StoreError> {
        self.from("admins")
            .eq("email", email)?
            .fetch_optional()
            .await
    }
}
