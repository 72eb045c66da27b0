use std::sync::Arc;

use medrec_store::{InMemoryStore, PatientStore, VersionStore};

use crate::auth::{AllowAllAuth, AuthProvider, TokenAuth};
use crate::config::ServerConfig;

/// Everything the handlers need from a store backend.
pub trait RecordStore: PatientStore + VersionStore {}

impl<T: PatientStore + VersionStore> RecordStore for T {}

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn RecordStore>,
    pub auth: Arc<dyn AuthProvider>,
}

impl AppState {
    pub fn new(store: Arc<dyn RecordStore>, auth: Arc<dyn AuthProvider>) -> Self {
        Self { store, auth }
    }

    /// State over the given store with the auth provider the config asks
    /// for: token auth when tokens are configured, open access otherwise.
    pub fn from_config(config: &ServerConfig, store: InMemoryStore) -> Self {
        let auth: Arc<dyn AuthProvider> = if config.api_tokens.is_empty() {
            Arc::new(AllowAllAuth)
        } else {
            Arc::new(TokenAuth::new(config.api_tokens.clone()))
        };
        Self::new(Arc::new(store), auth)
    }
}
