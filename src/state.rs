use std::sync::Arc;

use crate::auth::TokenValidator;
use crate::store::DataStore;

/// Shared application state. Both collaborators are constructed at startup
/// and injected; there are no module-level singletons.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DataStore>,
    pub auth: Arc<TokenValidator>,
}

impl AppState {
    pub fn new(store: Arc<dyn DataStore>, auth: TokenValidator) -> Self {
        Self { store, auth: Arc::new(auth) }
    }
}
