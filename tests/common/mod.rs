#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::Arc;
use tasksync::backend::auth::User;
use tasksync::backend::store::{CollectionPath, DocumentStore, LocalStore, Subscription};
use tasksync::error::StoreError;
use tasksync::models::{Task, TaskDraft, TaskUpdate};
use tasksync::session::SessionState;
use tempfile::TempDir;

pub const APP_ID: &str = "test-app";

/// A store backed by a file in a fresh temporary directory. Keep the
/// directory alive for as long as the store is used.
pub fn store() -> (TempDir, Arc<LocalStore>) {
    let dir = tempfile::tempdir().unwrap();
    let store = LocalStore::open(dir.path().join("store.json")).unwrap();
    (dir, Arc::new(store))
}

pub fn as_dyn(store: &Arc<LocalStore>) -> Arc<dyn DocumentStore> {
    store.clone()
}

/// A ready session for `uid`.
pub fn session_for(uid: &str) -> SessionState {
    SessionState {
        user: Some(User { uid: uid.to_string(), is_anonymous: true }),
        ready: true,
        sign_in_failed: false,
    }
}

/// A store that refuses every operation.
pub struct BrokenStore;

fn refused() -> StoreError {
    StoreError::InvalidDocument("store unavailable".into())
}

#[async_trait]
impl DocumentStore for BrokenStore {
    async fn insert(&self, _path: &CollectionPath, _draft: TaskDraft) -> Result<Task, StoreError> {
        Err(refused())
    }

    async fn update(&self, _path: &CollectionPath, _id: &str, _update: TaskUpdate) -> Result<(), StoreError> {
        Err(refused())
    }

    async fn delete(&self, _path: &CollectionPath, _id: &str) -> Result<(), StoreError> {
        Err(refused())
    }

    async fn subscribe(&self, _path: &CollectionPath) -> Result<Subscription, StoreError> {
        Err(refused())
    }
}
