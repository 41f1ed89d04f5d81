use chrono::{DateTime, Duration, Utc};
use crate::models::Task;

/// Window ahead of `now` in which an open task counts as due soon.
pub fn due_soon_window() -> Duration {
    Duration::hours(24)
}

/// Display state derived from a task's deadline at a given instant.
///
/// Never persisted; recomputed on every render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeadlineStatus {
    /// Deadline has passed and the task is still open.
    Overdue,
    /// Deadline falls within the next 24 hours and the task is still open.
    DueSoon,
    /// Completed, no deadline, or deadline comfortably ahead.
    Clear,
}

/// True when the deadline has passed and the task is not completed.
pub fn is_overdue(task: &Task, now: DateTime<Utc>) -> bool {
    match task.deadline {
        Some(deadline) => !task.completed && deadline < now,
        None => false,
    }
}

/// True when the deadline is strictly ahead but less than 24 hours away
/// and the task is not completed.
pub fn is_due_soon(task: &Task, now: DateTime<Utc>) -> bool {
    match task.deadline {
        Some(deadline) => !task.completed && deadline > now && deadline - now < due_soon_window(),
        None => false,
    }
}

/// Classifies a task. Overdue and due soon never overlap.
pub fn deadline_status(task: &Task, now: DateTime<Utc>) -> DeadlineStatus {
    if is_overdue(task, now) {
        DeadlineStatus::Overdue
    } else if is_due_soon(task, now) {
        DeadlineStatus::DueSoon
    } else {
        DeadlineStatus::Clear
    }
}
