// Protected handlers - authentication required, role gates applied per route
// group in the router.

pub mod assessments;
pub mod directory;
pub mod events;
pub mod feedback;
pub mod groups;
pub mod notices;
pub mod reports;
pub mod subjects;
pub mod whoami;
