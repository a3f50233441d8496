use std::sync::Arc;

use crate::auth::Authenticator;
use crate::store::StoreClient;

/// Shared application state. Both handles are constructed once at startup
/// and reused read-only for the life of the process.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<StoreClient>,
    pub authenticator: Arc<Authenticator>,
}

impl AppState {
    pub fn new(store: Arc<StoreClient>, authenticator: Arc<Authenticator>) -> Self {
        Self {
            store,
            authenticator,
        }
    }
}
