// Public handlers - no authentication required

pub mod login;

pub use login::login_post;
