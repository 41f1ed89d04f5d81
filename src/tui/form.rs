use thiserror::Error;

use crate::deadline::{self, DeadlineError};
use crate::gateway::{Dispatch, TaskGateway};
use crate::models::Task;

#[derive(Debug, Clone, PartialEq)]
pub enum FormMode {
    Create,
    /// Editing an existing task. Its completion flag is written back unchanged.
    Edit { id: String, completed: bool },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Title,
    Description,
    Deadline,
}

impl FormField {
    pub fn next(self) -> FormField {
        match self {
            FormField::Title => FormField::Description,
            FormField::Description => FormField::Deadline,
            FormField::Deadline => FormField::Title,
        }
    }

    pub fn previous(self) -> FormField {
        match self {
            FormField::Title => FormField::Deadline,
            FormField::Description => FormField::Title,
            FormField::Deadline => FormField::Description,
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum FormError {
    #[error("Title is required")]
    EmptyTitle,

    #[error(transparent)]
    Deadline(#[from] DeadlineError),

    #[error("Not signed in yet")]
    NoSession,
}

/// Transient input for creating or editing one task.
#[derive(Debug, Clone)]
pub struct TaskForm {
    pub mode: FormMode,
    pub title: String,
    pub description: String,
    pub deadline: String,
    pub focus: FormField,
}

impl Default for TaskForm {
    fn default() -> Self {
        TaskForm {
            mode: FormMode::Create,
            title: String::new(),
            description: String::new(),
            deadline: String::new(),
            focus: FormField::Title,
        }
    }
}

impl TaskForm {
    pub fn new() -> TaskForm {
        TaskForm::default()
    }

    /// Switches to edit mode, pre-filled from `task`.
    pub fn edit(&mut self, task: &Task) {
        self.mode = FormMode::Edit { id: task.id.clone(), completed: task.completed };
        self.title = task.title.clone();
        self.description = task.description.clone().unwrap_or_default();
        self.deadline = task.deadline.as_ref().map(deadline::to_input).unwrap_or_default();
        self.focus = FormField::Title;
    }

    /// Drops any input and goes back to create mode.
    pub fn cancel(&mut self) {
        *self = TaskForm::default();
    }

    pub fn is_editing(&self) -> bool {
        matches!(self.mode, FormMode::Edit { .. })
    }

    /// The id being edited, if any.
    pub fn editing_id(&self) -> Option<&str> {
        match &self.mode {
            FormMode::Edit { id, .. } => Some(id),
            FormMode::Create => None,
        }
    }

    pub fn input(&self, field: FormField) -> &str {
        match field {
            FormField::Title => &self.title,
            FormField::Description => &self.description,
            FormField::Deadline => &self.deadline,
        }
    }

    fn focused_mut(&mut self) -> &mut String {
        match self.focus {
            FormField::Title => &mut self.title,
            FormField::Description => &mut self.description,
            FormField::Deadline => &mut self.deadline,
        }
    }

    pub fn push(&mut self, c: char) {
        self.focused_mut().push(c);
    }

    pub fn backspace(&mut self) {
        self.focused_mut().pop();
    }

    pub fn focus_next(&mut self) {
        self.focus = self.focus.next();
    }

    pub fn focus_previous(&mut self) {
        self.focus = self.focus.previous();
    }

    /// Validates the input and dispatches a create or an update.
    ///
    /// On success the form is reset to create mode. On error the input is kept
    /// so it can be corrected.
    pub fn submit(&mut self, gateway: &TaskGateway) -> Result<Dispatch, FormError> {
        if self.title.trim().is_empty() {
            return Err(FormError::EmptyTitle);
        }
        let deadline = deadline::parse_input(&self.deadline)?;
        let description = Some(self.description.clone());

        let dispatch = match &self.mode {
            FormMode::Create => gateway.create(&self.title, description, deadline),
            FormMode::Edit { id, completed } => {
                gateway.update(id, &self.title, description, deadline, *completed)
            }
        };
        if dispatch.is_rejected() {
            return Err(FormError::NoSession);
        }
        self.cancel();
        Ok(dispatch)
    }
}
