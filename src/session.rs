//! Identity session: resolves who the user is and tracks identity changes.

use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::backend::auth::{AuthProvider, User};

/// What the rest of the app knows about the current identity.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    /// Current identity, `None` until the provider resolves one.
    pub user: Option<User>,
    /// False until an identity has been resolved, true from then on.
    pub ready: bool,
    /// Set when the last sign-in attempt failed. Nothing retries it.
    pub sign_in_failed: bool,
}

impl SessionState {
    /// The user, but only once the session is ready.
    pub fn active_user(&self) -> Option<&User> {
        if self.ready {
            self.user.as_ref()
        } else {
            None
        }
    }
}

/// Owns the auth-state listener for as long as it lives.
///
/// Dropping the session deregisters the listener.
pub struct IdentitySession {
    state: watch::Receiver<SessionState>,
    listener: JoinHandle<()>,
}

impl IdentitySession {
    /// Starts resolving an identity: an existing one if the provider has it,
    /// else a custom-token sign-in when `custom_token` is given, else anonymous.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(auth: Arc<dyn AuthProvider>, custom_token: Option<String>) -> Self {
        let (tx, rx) = watch::channel(SessionState::default());
        let listener = tokio::spawn(listen(auth, custom_token, tx));
        IdentitySession { state: rx, listener }
    }

    pub fn current(&self) -> SessionState {
        self.state.borrow().clone()
    }

    /// A receiver that observes every session change.
    pub fn watch(&self) -> watch::Receiver<SessionState> {
        self.state.clone()
    }

    /// Waits until the session is ready or the sign-in attempt has failed.
    pub async fn settled(&mut self) -> SessionState {
        let settled = self
            .state
            .wait_for(|s| s.ready || s.sign_in_failed)
            .await
            .map(|s| s.clone());
        settled.unwrap_or_else(|_| self.current())
    }
}

impl Drop for IdentitySession {
    fn drop(&mut self) {
        self.listener.abort();
    }
}

async fn listen(auth: Arc<dyn AuthProvider>, custom_token: Option<String>, tx: watch::Sender<SessionState>) {
    let mut changes = auth.on_auth_state_changed();
    loop {
        let user = changes.borrow_and_update().clone();
        match user {
            Some(user) => {
                info!(uid = %user.uid, anonymous = user.is_anonymous, "Session ready");
                tx.send_modify(|s| {
                    s.user = Some(user);
                    s.ready = true;
                    s.sign_in_failed = false;
                });
            }
            None => {
                tx.send_modify(|s| s.user = None);
                // A successful sign-in shows up as the next identity change.
                if let Err(e) = sign_in(auth.as_ref(), custom_token.as_deref()).await {
                    error!("Sign-in failed: {}", e);
                    tx.send_modify(|s| s.sign_in_failed = true);
                }
            }
        }
        if changes.changed().await.is_err() {
            warn!("Auth provider closed its state channel");
            break;
        }
    }
}

async fn sign_in(auth: &dyn AuthProvider, custom_token: Option<&str>) -> Result<User, crate::error::AuthError> {
    match custom_token {
        Some(token) => auth.sign_in_with_custom_token(token).await,
        None => auth.sign_in_anonymously().await,
    }
}
