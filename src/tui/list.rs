use chrono::{DateTime, Utc};

use crate::deadline;
use crate::models::Task;
use crate::urgency::{deadline_status, DeadlineStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Badge {
    Overdue,
    DueSoon,
}

impl Badge {
    pub fn label(self) -> &'static str {
        match self {
            Badge::Overdue => "Overdue",
            Badge::DueSoon => "Due soon",
        }
    }
}

/// What one row of the task list shows.
#[derive(Debug, Clone, PartialEq)]
pub struct ListItem {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub deadline: Option<String>,
    pub completed: bool,
    pub badge: Option<Badge>,
}

impl ListItem {
    pub fn from_task(task: &Task, now: DateTime<Utc>) -> ListItem {
        let badge = match deadline_status(task, now) {
            DeadlineStatus::Overdue => Some(Badge::Overdue),
            DeadlineStatus::DueSoon => Some(Badge::DueSoon),
            DeadlineStatus::Clear => None,
        };
        ListItem {
            id: task.id.clone(),
            title: task.title.clone(),
            description: task.description.clone(),
            deadline: task.deadline.as_ref().map(deadline::display),
            completed: task.completed,
            badge,
        }
    }

    pub fn checkbox(&self) -> &'static str {
        if self.completed { "[x]" } else { "[ ]" }
    }
}
