use crate::gateway::{Dispatch, TaskGateway};

/// Gate in front of deletes: nothing is removed until the user confirms.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DeleteFlow {
    #[default]
    Idle,
    PendingConfirmation(String),
}

impl DeleteFlow {
    /// Asks for confirmation before deleting `id`.
    pub fn request(&mut self, id: &str) {
        *self = DeleteFlow::PendingConfirmation(id.to_string());
    }

    pub fn pending(&self) -> Option<&str> {
        match self {
            DeleteFlow::PendingConfirmation(id) => Some(id),
            DeleteFlow::Idle => None,
        }
    }

    /// Deletes the pending task and returns to idle. Does nothing when idle.
    pub fn confirm(&mut self, gateway: &TaskGateway) -> Option<Dispatch> {
        match std::mem::take(self) {
            DeleteFlow::PendingConfirmation(id) => Some(gateway.delete(&id)),
            DeleteFlow::Idle => None,
        }
    }

    /// Returns to idle without deleting anything.
    pub fn cancel(&mut self) {
        *self = DeleteFlow::Idle;
    }
}
