use ratatui::widgets::TableState;
use std::sync::Arc;
use tracing::debug;

use crate::backend::store::DocumentStore;
use crate::binding::TaskBinding;
use crate::gateway::TaskGateway;
use crate::models::Task;
use crate::session::SessionState;
use super::confirm::DeleteFlow;
use super::form::TaskForm;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    List,
    Form,
}

/// Root state of the TUI. Owns the session view, the task list binding and
/// the gateway; presentation reads from here.
pub struct App {
    app_id: String,
    store: Arc<dyn DocumentStore>,
    pub session: SessionState,
    pub binding: TaskBinding,
    pub gateway: TaskGateway,
    pub form: TaskForm,
    pub delete_flow: DeleteFlow,
    pub state: TableState,
    pub focus: Focus,
    pub status: Option<String>,
}

impl App {
    pub fn new(store: Arc<dyn DocumentStore>, app_id: impl Into<String>) -> App {
        let app_id = app_id.into();
        let session = SessionState::default();
        App {
            binding: TaskBinding::new(Arc::clone(&store), app_id.clone()),
            gateway: TaskGateway::new(Arc::clone(&store), &app_id, &session),
            app_id,
            store,
            session,
            form: TaskForm::new(),
            delete_flow: DeleteFlow::Idle,
            state: TableState::default(),
            focus: Focus::List,
            status: None,
        }
    }

    /// Rewires binding and gateway for a new session state.
    pub async fn set_session(&mut self, session: SessionState) {
        debug!(ready = session.ready, uid = ?session.user.as_ref().map(|u| &u.uid), "Session changed");
        self.gateway = TaskGateway::new(Arc::clone(&self.store), &self.app_id, &session);
        self.binding.bind(&session).await;
        self.session = session;
        self.clamp_selection();
    }

    /// Applies any pending snapshot. Returns whether the list changed.
    pub fn refresh(&mut self) -> bool {
        let changed = self.binding.poll();
        if changed {
            self.clamp_selection();
        }
        changed
    }

    pub fn tasks(&self) -> &[Task] {
        self.binding.tasks()
    }

    fn clamp_selection(&mut self) {
        let len = self.tasks().len();
        if len == 0 {
            self.state.select(None);
        } else if let Some(i) = self.state.selected() {
            if i >= len {
                self.state.select(Some(len - 1));
            }
        } else {
            self.state.select(Some(0));
        }
    }

    pub fn selected_task(&self) -> Option<&Task> {
        self.state.selected().and_then(|i| self.tasks().get(i))
    }

    /// Selects the next task, wrapping around.
    pub fn next(&mut self) {
        let len = self.tasks().len();
        if len == 0 { return; }
        let i = match self.state.selected() {
            Some(i) if i + 1 < len => i + 1,
            _ => 0,
        };
        self.state.select(Some(i));
    }

    /// Selects the previous task, wrapping around.
    pub fn previous(&mut self) {
        let len = self.tasks().len();
        if len == 0 { return; }
        let i = match self.state.selected() {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        };
        self.state.select(Some(i));
    }

    /// Flips the completion flag of the selected task.
    pub fn toggle_selected(&mut self) {
        if let Some(task) = self.selected_task() {
            let _ = self.gateway.toggle_completion(&task.id, !task.completed);
        }
    }

    /// Loads the selected task into the form.
    pub fn edit_selected(&mut self) {
        if let Some(task) = self.selected_task().cloned() {
            self.form.edit(&task);
            self.focus = Focus::Form;
            self.status = None;
        }
    }

    /// Opens the confirmation dialog for the selected task.
    pub fn request_delete_selected(&mut self) {
        if let Some(id) = self.selected_task().map(|t| t.id.clone()) {
            self.delete_flow.request(&id);
        }
    }

    pub fn confirm_delete(&mut self) {
        if let Some(id) = self.delete_flow.pending().map(str::to_string) {
            if self.form.editing_id() == Some(id.as_str()) {
                self.form.cancel();
            }
        }
        let _ = self.delete_flow.confirm(&self.gateway);
    }

    pub fn cancel_delete(&mut self) {
        self.delete_flow.cancel();
    }

    pub fn start_create(&mut self) {
        if self.form.is_editing() {
            self.form.cancel();
        }
        self.focus = Focus::Form;
        self.status = None;
    }

    pub fn submit_form(&mut self) {
        match self.form.submit(&self.gateway) {
            Ok(_) => {
                self.status = Some("Saved".to_string());
                self.focus = Focus::List;
            }
            Err(e) => self.status = Some(e.to_string()),
        }
    }

    pub fn cancel_form(&mut self) {
        self.form.cancel();
        self.focus = Focus::List;
        self.status = None;
    }
}
