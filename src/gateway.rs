//! Mutations against the signed-in user's task collection.
//!
//! Every call is fire-and-forget: the write runs on its own tokio task and
//! its result is logged. Local state is never touched here; the change shows
//! up through the binding's next snapshot.

use chrono::{DateTime, Utc};
use std::future::Future;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::backend::store::{CollectionPath, DocumentStore};
use crate::models::{non_blank, Task, TaskDraft, TaskUpdate};
use crate::session::SessionState;

/// How a dispatched mutation ended.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Refused before reaching the store (no session, empty title).
    Rejected,
    /// A task was inserted.
    Created(Task),
    /// An update or delete was acknowledged.
    Applied,
    /// The store reported an error. Already logged.
    Failed,
}

/// Handle to a dispatched mutation. Dropping it does not cancel the write.
pub struct Dispatch {
    handle: Option<JoinHandle<Outcome>>,
}

impl Dispatch {
    fn rejected() -> Self {
        Dispatch { handle: None }
    }

    pub fn is_rejected(&self) -> bool {
        self.handle.is_none()
    }

    /// Waits for the store to acknowledge the write.
    pub async fn settled(self) -> Outcome {
        match self.handle {
            None => Outcome::Rejected,
            Some(handle) => handle.await.unwrap_or_else(|e| {
                error!("Mutation task did not finish: {}", e);
                Outcome::Failed
            }),
        }
    }
}

/// Issues writes against one collection path, or refuses them all when
/// there is no active session.
#[derive(Clone)]
pub struct TaskGateway {
    store: Arc<dyn DocumentStore>,
    path: Option<CollectionPath>,
}

impl TaskGateway {
    pub fn new(store: Arc<dyn DocumentStore>, app_id: &str, session: &SessionState) -> Self {
        let path = session
            .active_user()
            .map(|u| CollectionPath::for_user(app_id, &u.uid));
        TaskGateway { store, path }
    }

    pub fn path(&self) -> Option<&CollectionPath> {
        self.path.as_ref()
    }

    /// Inserts an open task. Blank titles and a missing session are refused;
    /// any other title is stored as typed.
    pub fn create(&self, title: &str, description: Option<String>, deadline: Option<DateTime<Utc>>) -> Dispatch {
        if title.trim().is_empty() {
            warn!("Refusing to create a task with an empty title");
            return Dispatch::rejected();
        }
        let Some(path) = self.path.clone() else {
            warn!("Refusing to create a task without a session");
            return Dispatch::rejected();
        };
        let draft = TaskDraft {
            title: title.to_string(),
            description: non_blank(description),
            deadline,
        };
        let store = Arc::clone(&self.store);
        spawn(async move {
            match store.insert(&path, draft).await {
                Ok(task) => {
                    info!(id = %task.id, "Task created");
                    Outcome::Created(task)
                }
                Err(e) => {
                    error!("Failed to create task: {}", e);
                    Outcome::Failed
                }
            }
        })
    }

    /// Overwrites title, description, deadline and completion of a task.
    pub fn update(
        &self,
        id: &str,
        title: &str,
        description: Option<String>,
        deadline: Option<DateTime<Utc>>,
        completed: bool,
    ) -> Dispatch {
        if title.trim().is_empty() {
            warn!(id, "Refusing to save a task with an empty title");
            return Dispatch::rejected();
        }
        let update = TaskUpdate::Fields {
            title: title.to_string(),
            description: non_blank(description),
            deadline,
            completed,
        };
        self.write(id, update, "updated")
    }

    /// Overwrites only the completion flag.
    pub fn toggle_completion(&self, id: &str, completed: bool) -> Dispatch {
        self.write(id, TaskUpdate::Completion(completed), "completion toggled")
    }

    /// Removes a task.
    pub fn delete(&self, id: &str) -> Dispatch {
        let Some(path) = self.path.clone() else {
            warn!(id, "Refusing to delete a task without a session");
            return Dispatch::rejected();
        };
        let store = Arc::clone(&self.store);
        let id = id.to_string();
        spawn(async move {
            match store.delete(&path, &id).await {
                Ok(()) => {
                    info!(id = %id, "Task deleted");
                    Outcome::Applied
                }
                Err(e) => {
                    error!(id = %id, "Failed to delete task: {}", e);
                    Outcome::Failed
                }
            }
        })
    }

    fn write(&self, id: &str, update: TaskUpdate, what: &'static str) -> Dispatch {
        let Some(path) = self.path.clone() else {
            warn!(id, "Refusing to write a task without a session");
            return Dispatch::rejected();
        };
        let store = Arc::clone(&self.store);
        let id = id.to_string();
        spawn(async move {
            match store.update(&path, &id, update).await {
                Ok(()) => {
                    info!(id = %id, "Task {}", what);
                    Outcome::Applied
                }
                Err(e) => {
                    error!(id = %id, "Failed to write task: {}", e);
                    Outcome::Failed
                }
            }
        })
    }
}

fn spawn<F>(fut: F) -> Dispatch
where
    F: Future<Output = Outcome> + Send + 'static,
{
    Dispatch { handle: Some(tokio::spawn(fut)) }
}
