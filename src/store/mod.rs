pub mod client;
pub mod error;
pub mod models;
pub mod provider;
pub mod query;

pub use client::{IntrospectedSubject, StoreClient};
pub use error::StoreError;
pub use provider::IdentityProvider;
pub use query::{RowFilter, RowQuery, SortDirection};
