//! Keeps an in-memory task list in step with the signed-in user's collection.

use std::sync::Arc;
use tracing::{debug, error, warn};

use crate::backend::store::{CollectionPath, DocumentStore, Snapshot, Subscription};
use crate::models::Task;
use crate::session::SessionState;

/// Holds at most one live query, for the current user's collection.
///
/// The list is only ever replaced wholesale by a snapshot; it is never patched.
pub struct TaskBinding {
    store: Arc<dyn DocumentStore>,
    app_id: String,
    path: Option<CollectionPath>,
    subscription: Option<Subscription>,
    tasks: Vec<Task>,
}

impl TaskBinding {
    pub fn new(store: Arc<dyn DocumentStore>, app_id: impl Into<String>) -> Self {
        TaskBinding {
            store,
            app_id: app_id.into(),
            path: None,
            subscription: None,
            tasks: Vec::new(),
        }
    }

    /// Points the binding at the collection of the session's user.
    ///
    /// Without a ready user the list is cleared and no query is held. When the
    /// user changes the old query is released before the new one is opened.
    /// Binding to the same user again is a no-op.
    pub async fn bind(&mut self, session: &SessionState) {
        let wanted = session
            .active_user()
            .map(|u| CollectionPath::for_user(&self.app_id, &u.uid));
        if wanted == self.path {
            return;
        }

        self.subscription = None;
        self.tasks.clear();
        self.path = wanted;

        let Some(path) = &self.path else {
            debug!("No active session, task list cleared");
            return;
        };
        match self.store.subscribe(path).await {
            Ok(subscription) => {
                debug!(%path, "Task list subscribed");
                self.subscription = Some(subscription);
            }
            Err(e) => error!(%path, "Failed to subscribe to tasks: {}", e),
        }
    }

    /// Applies the newest snapshot already delivered, if any. Returns whether
    /// the list was replaced.
    pub fn poll(&mut self) -> bool {
        let latest = self.subscription.as_mut().and_then(Subscription::try_latest);
        match latest {
            Some(snapshot) => {
                self.replace(snapshot);
                true
            }
            None => false,
        }
    }

    /// Waits for the next snapshot and applies it. Returns false when there is
    /// no query or the store has closed it.
    pub async fn next_snapshot(&mut self) -> bool {
        let Some(subscription) = self.subscription.as_mut() else {
            return false;
        };
        match subscription.next().await {
            Some(snapshot) => {
                self.replace(snapshot);
                true
            }
            None => {
                warn!("Task subscription closed by the store");
                self.subscription = None;
                false
            }
        }
    }

    fn replace(&mut self, snapshot: Snapshot) {
        debug!(tasks = snapshot.len(), "Task list replaced");
        self.tasks = snapshot;
    }

    /// Tasks from the latest snapshot, newest first.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn path(&self) -> Option<&CollectionPath> {
        self.path.as_ref()
    }

    pub fn is_subscribed(&self) -> bool {
        self.subscription.is_some()
    }
}
