use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single to-do record as stored in a user's collection.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Task {
    /// Identifier assigned by the store on insert.
    pub id: String,
    /// Short title, never empty once persisted.
    pub title: String,
    /// Optional free-form description.
    #[serde(default)]
    pub description: Option<String>,
    /// Optional point in time the task is due.
    #[serde(default)]
    pub deadline: Option<DateTime<Utc>>,
    /// Whether the task has been completed.
    #[serde(default)]
    pub completed: bool,
    /// Server timestamp assigned at insert. Snapshots are ordered by it, newest first.
    pub created_at: DateTime<Utc>,
}

impl Task {
    /// First eight characters of the id, as shown in tables.
    pub fn short_id(&self) -> &str {
        let end = self
            .id
            .char_indices()
            .nth(8)
            .map(|(i, _)| i)
            .unwrap_or(self.id.len());
        &self.id[..end]
    }
}

/// Fields supplied by the caller when creating a task.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskDraft {
    pub title: String,
    pub description: Option<String>,
    pub deadline: Option<DateTime<Utc>>,
}

/// A write against an existing task.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskUpdate {
    /// Overwrite the editable fields and the completion flag.
    Fields {
        title: String,
        description: Option<String>,
        deadline: Option<DateTime<Utc>>,
        completed: bool,
    },
    /// Overwrite only the completion flag.
    Completion(bool),
}

impl TaskUpdate {
    /// Applies the write to a stored record. `id` and `created_at` are never touched.
    pub fn apply(&self, task: &mut Task) {
        match self {
            TaskUpdate::Fields { title, description, deadline, completed } => {
                task.title = title.clone();
                task.description = description.clone();
                task.deadline = *deadline;
                task.completed = *completed;
            }
            TaskUpdate::Completion(completed) => task.completed = *completed,
        }
    }
}

/// Blank optional text becomes `None`. Anything else is kept as typed.
pub fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
