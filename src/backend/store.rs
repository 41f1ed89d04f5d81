//! Document store holding task collections, with live queries.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::fs::{self, OpenOptions};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tracing::{debug, error, info, instrument};
use uuid::Uuid;

use crate::error::StoreError;
use crate::models::{Task, TaskDraft, TaskUpdate};

/// Full, ordered view of a collection at one point in time.
pub type Snapshot = Vec<Task>;

/// Location of one user's task collection: `artifacts/{appId}/users/{uid}/todos`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CollectionPath(String);

impl CollectionPath {
    pub fn for_user(app_id: &str, uid: &str) -> Self {
        CollectionPath(format!("artifacts/{}/users/{}/todos", app_id, uid))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CollectionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A live query. Each received item replaces whatever the caller held before.
///
/// Dropping the subscription deregisters it from the store.
pub struct Subscription {
    rx: mpsc::UnboundedReceiver<Snapshot>,
    cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    pub fn new(rx: mpsc::UnboundedReceiver<Snapshot>, cancel: impl FnOnce() + Send + 'static) -> Self {
        Subscription { rx, cancel: Some(Box::new(cancel)) }
    }

    /// Waits for the next snapshot. `None` once the store side has gone away.
    pub async fn next(&mut self) -> Option<Snapshot> {
        self.rx.recv().await
    }

    /// Drains everything already delivered and returns only the newest snapshot.
    pub fn try_latest(&mut self) -> Option<Snapshot> {
        let mut latest = None;
        while let Ok(snapshot) = self.rx.try_recv() {
            latest = Some(snapshot);
        }
        latest
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

/// Operations the app consumes from the document store.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Inserts a new open task, stamping `created_at` with the store clock.
    async fn insert(&self, path: &CollectionPath, draft: TaskDraft) -> Result<Task, StoreError>;

    /// Applies a write to the task with the given id.
    async fn update(&self, path: &CollectionPath, id: &str, update: TaskUpdate) -> Result<(), StoreError>;

    /// Removes the task with the given id. Unknown ids are not an error.
    async fn delete(&self, path: &CollectionPath, id: &str) -> Result<(), StoreError>;

    /// Opens a live query over the collection, newest first. The current
    /// contents are delivered immediately, then again after every change.
    async fn subscribe(&self, path: &CollectionPath) -> Result<Subscription, StoreError>;
}

#[derive(Deserialize)]
struct StoreFile {
    collections: BTreeMap<String, Vec<Task>>,
}

struct StoreState {
    collections: BTreeMap<String, Vec<Task>>,
    last_stamp: Option<DateTime<Utc>>,
}

impl StoreState {
    /// Store clock. Strictly increasing so creation order is always recoverable.
    fn server_timestamp(&mut self) -> DateTime<Utc> {
        let now = Utc::now();
        let stamp = match self.last_stamp {
            Some(last) if now <= last => last + Duration::microseconds(1),
            _ => now,
        };
        self.last_stamp = Some(stamp);
        stamp
    }

    fn snapshot(&self, path: &CollectionPath) -> Snapshot {
        let mut tasks = self.collections.get(path.as_str()).cloned().unwrap_or_default();
        tasks.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        tasks
    }
}

#[derive(Default)]
struct Subscribers {
    next_id: u64,
    by_path: HashMap<CollectionPath, Vec<(u64, mpsc::UnboundedSender<Snapshot>)>>,
}

/// File-backed store. Collections are kept in memory and written as pretty
/// JSON after every mutation.
pub struct LocalStore {
    file: PathBuf,
    state: tokio::sync::Mutex<StoreState>,
    subscribers: Arc<Mutex<Subscribers>>,
}

impl LocalStore {
    /// Opens the store file, starting empty if it does not exist yet.
    pub fn open(file: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let file = file.into();
        let collections = load_collections(&file)?;
        let last_stamp = collections
            .values()
            .flat_map(|tasks| tasks.iter().map(|t| t.created_at))
            .max();
        info!(file = ?file, collections = collections.len(), "Opened local store");
        Ok(LocalStore {
            file,
            state: tokio::sync::Mutex::new(StoreState { collections, last_stamp }),
            subscribers: Arc::new(Mutex::new(Subscribers::default())),
        })
    }

    /// Persists `state` and pushes the new snapshot of `path` to its listeners.
    ///
    /// The file write runs on the blocking pool. Callers hold the state lock
    /// across it so writes land on disk in commit order.
    async fn commit(&self, state: &StoreState, path: &CollectionPath) -> Result<(), StoreError> {
        let contents = serde_json::to_string_pretty(&StoreFileRef { collections: &state.collections })?;
        let file = self.file.clone();
        tokio::task::spawn_blocking(move || write_store_file(&file, &contents))
            .await
            .map_err(|e| StoreError::Io(io::Error::other(e)))??;
        let snapshot = state.snapshot(path);
        let mut subscribers = self.subscribers.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(listeners) = subscribers.by_path.get_mut(path) {
            listeners.retain(|(_, tx)| tx.send(snapshot.clone()).is_ok());
            debug!(%path, listeners = listeners.len(), tasks = snapshot.len(), "Snapshot delivered");
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for LocalStore {
    #[instrument(skip(self, draft), fields(path = %path))]
    async fn insert(&self, path: &CollectionPath, draft: TaskDraft) -> Result<Task, StoreError> {
        if draft.title.trim().is_empty() {
            return Err(StoreError::InvalidDocument("title must not be empty".into()));
        }
        let mut state = self.state.lock().await;
        let task = Task {
            id: Uuid::new_v4().simple().to_string(),
            title: draft.title,
            description: draft.description,
            deadline: draft.deadline,
            completed: false,
            created_at: state.server_timestamp(),
        };
        state
            .collections
            .entry(path.as_str().to_string())
            .or_default()
            .push(task.clone());
        if let Err(e) = self.commit(&state, path).await {
            if let Some(tasks) = state.collections.get_mut(path.as_str()) {
                tasks.retain(|t| t.id != task.id);
            }
            return Err(e);
        }
        Ok(task)
    }

    #[instrument(skip(self, update), fields(path = %path))]
    async fn update(&self, path: &CollectionPath, id: &str, update: TaskUpdate) -> Result<(), StoreError> {
        if let TaskUpdate::Fields { title, .. } = &update {
            if title.trim().is_empty() {
                return Err(StoreError::InvalidDocument("title must not be empty".into()));
            }
        }
        let mut state = self.state.lock().await;
        let task = state
            .collections
            .get_mut(path.as_str())
            .and_then(|tasks| tasks.iter_mut().find(|t| t.id == id))
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        let previous = task.clone();
        update.apply(task);
        if let Err(e) = self.commit(&state, path).await {
            if let Some(t) = state
                .collections
                .get_mut(path.as_str())
                .and_then(|tasks| tasks.iter_mut().find(|t| t.id == id))
            {
                *t = previous;
            }
            return Err(e);
        }
        Ok(())
    }

    #[instrument(skip(self), fields(path = %path))]
    async fn delete(&self, path: &CollectionPath, id: &str) -> Result<(), StoreError> {
        let mut state = self.state.lock().await;
        let Some(tasks) = state.collections.get_mut(path.as_str()) else {
            return Ok(());
        };
        let Some(pos) = tasks.iter().position(|t| t.id == id) else {
            debug!(id, "Delete of unknown document ignored");
            return Ok(());
        };
        let removed = tasks.remove(pos);
        if let Err(e) = self.commit(&state, path).await {
            if let Some(tasks) = state.collections.get_mut(path.as_str()) {
                tasks.insert(pos, removed);
            }
            return Err(e);
        }
        Ok(())
    }

    async fn subscribe(&self, path: &CollectionPath) -> Result<Subscription, StoreError> {
        let state = self.state.lock().await;
        let (tx, rx) = mpsc::unbounded_channel();
        // The initial snapshot is queued before registration so it always arrives first.
        let _ = tx.send(state.snapshot(path));

        let id = {
            let mut subscribers = self.subscribers.lock().unwrap_or_else(|e| e.into_inner());
            let id = subscribers.next_id;
            subscribers.next_id += 1;
            subscribers.by_path.entry(path.clone()).or_default().push((id, tx));
            id
        };
        debug!(%path, subscription = id, "Subscribed");

        let registry = Arc::clone(&self.subscribers);
        let key = path.clone();
        Ok(Subscription::new(rx, move || {
            let mut subscribers = registry.lock().unwrap_or_else(|e| e.into_inner());
            if let Some(listeners) = subscribers.by_path.get_mut(&key) {
                listeners.retain(|(sid, _)| *sid != id);
                if listeners.is_empty() {
                    subscribers.by_path.remove(&key);
                }
            }
            debug!(path = %key, subscription = id, "Unsubscribed");
        }))
    }
}

impl LocalStore {
    /// Number of live queries currently registered for `path`.
    pub fn subscriber_count(&self, path: &CollectionPath) -> usize {
        let subscribers = self.subscribers.lock().unwrap_or_else(|e| e.into_inner());
        subscribers.by_path.get(path).map(Vec::len).unwrap_or(0)
    }
}

fn load_collections(path: &Path) -> Result<BTreeMap<String, Vec<Task>>, StoreError> {
    if !path.exists() {
        return Ok(BTreeMap::new());
    }
    let mut f = OpenOptions::new().read(true).open(path)?;
    let mut s = String::new();
    f.read_to_string(&mut s)?;
    if s.trim().is_empty() {
        return Ok(BTreeMap::new());
    }
    let file: StoreFile = serde_json::from_str(&s).map_err(|e| {
        error!(file = ?path, "Failed to parse store file: {}", e);
        e
    })?;
    Ok(file.collections)
}

#[derive(Serialize)]
struct StoreFileRef<'a> {
    collections: &'a BTreeMap<String, Vec<Task>>,
}

fn write_store_file(path: &Path, contents: &str) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)?;
        }
    }
    let mut f = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(path)?;
    f.write_all(contents.as_bytes())?;
    Ok(())
}
