pub mod auth;
pub mod role_gate;

pub use auth::{optional_auth, require_auth, MaybeIdentity};
pub use role_gate::{require_admin, require_faculty, require_faculty_or_admin, require_student};
