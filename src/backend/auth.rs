//! Auth provider: issues identities and reports identity changes.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tokio::sync::watch;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::error::AuthError;

/// An authenticated, possibly anonymous, identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Opaque identifier assigned by the provider.
    pub uid: String,
    #[serde(default)]
    pub is_anonymous: bool,
}

#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// The identity the provider already holds, if any.
    fn current_user(&self) -> Option<User>;

    async fn sign_in_anonymously(&self) -> Result<User, AuthError>;

    async fn sign_in_with_custom_token(&self, token: &str) -> Result<User, AuthError>;

    async fn sign_out(&self) -> Result<(), AuthError>;

    /// Listener for identity changes. The receiver starts at the current identity.
    fn on_auth_state_changed(&self) -> watch::Receiver<Option<User>>;
}

/// Claims carried by a custom token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomTokenClaims {
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

/// Signs a custom token for `uid` that [`LocalAuthProvider`] will accept.
pub fn mint_custom_token(secret: &str, uid: &str, ttl: Duration) -> Result<String, AuthError> {
    let now = Utc::now();
    let claims = CustomTokenClaims {
        sub: uid.to_string(),
        iat: now.timestamp(),
        exp: (now + ttl).timestamp(),
    };
    Ok(encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?)
}

/// Provider that keeps the signed-in user in a JSON file so the identity
/// survives restarts. Custom tokens are HS256 JWTs signed with `secret`.
pub struct LocalAuthProvider {
    file: PathBuf,
    secret: String,
    state: watch::Sender<Option<User>>,
}

impl LocalAuthProvider {
    pub fn open(file: impl Into<PathBuf>, secret: impl Into<String>) -> Result<Self, AuthError> {
        let file = file.into();
        let user = load_user(&file)?;
        debug!(file = ?file, signed_in = user.is_some(), "Opened auth state");
        let (state, _) = watch::channel(user);
        Ok(LocalAuthProvider { file, secret: secret.into(), state })
    }

    fn set_user(&self, user: Option<User>) -> Result<(), AuthError> {
        match &user {
            Some(u) => save_user(&self.file, u)?,
            None => {
                if self.file.exists() {
                    fs::remove_file(&self.file)?;
                }
            }
        }
        self.state.send_replace(user);
        Ok(())
    }
}

#[async_trait]
impl AuthProvider for LocalAuthProvider {
    fn current_user(&self) -> Option<User> {
        self.state.borrow().clone()
    }

    #[instrument(skip(self))]
    async fn sign_in_anonymously(&self) -> Result<User, AuthError> {
        let user = User { uid: Uuid::new_v4().simple().to_string(), is_anonymous: true };
        self.set_user(Some(user.clone()))?;
        info!(uid = %user.uid, "Signed in anonymously");
        Ok(user)
    }

    #[instrument(skip(self, token))]
    async fn sign_in_with_custom_token(&self, token: &str) -> Result<User, AuthError> {
        let data = decode::<CustomTokenClaims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::new(Algorithm::HS256),
        )?;
        if data.claims.sub.trim().is_empty() {
            return Err(AuthError::EmptySubject);
        }
        let user = User { uid: data.claims.sub, is_anonymous: false };
        self.set_user(Some(user.clone()))?;
        info!(uid = %user.uid, "Signed in with custom token");
        Ok(user)
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        self.set_user(None)?;
        info!("Signed out");
        Ok(())
    }

    fn on_auth_state_changed(&self) -> watch::Receiver<Option<User>> {
        self.state.subscribe()
    }
}

fn load_user(path: &Path) -> Result<Option<User>, AuthError> {
    if !path.exists() {
        return Ok(None);
    }
    let s = fs::read_to_string(path)?;
    if s.trim().is_empty() {
        return Ok(None);
    }
    Ok(Some(serde_json::from_str(&s)?))
}

fn save_user(path: &Path, user: &User) -> Result<(), AuthError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(path, serde_json::to_string_pretty(user)?)?;
    Ok(())
}
