//! Collaborators the app talks to: the auth provider and the document store.

pub mod auth;
pub mod store;

use std::sync::Arc;

use crate::config::Config;
use auth::{AuthProvider, LocalAuthProvider};
use store::{DocumentStore, LocalStore};

/// Handles to both collaborators, passed explicitly to whoever needs them.
#[derive(Clone)]
pub struct Backend {
    pub auth: Arc<dyn AuthProvider>,
    pub store: Arc<dyn DocumentStore>,
}

impl Backend {
    /// Opens the file-backed provider and store under `config.data_dir`.
    pub fn open_local(config: &Config) -> crate::error::Result<Self> {
        let auth = LocalAuthProvider::open(config.auth_file(), config.token_secret.clone())?;
        let store = LocalStore::open(config.store_file())?;
        Ok(Backend { auth: Arc::new(auth), store: Arc::new(store) })
    }
}
