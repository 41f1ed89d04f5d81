//! Error types shared across the crate.

use thiserror::Error;

/// Failures raised by a document store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No document with this id exists in the collection.
    #[error("document not found: {0}")]
    NotFound(String),

    /// The document violates a store-side constraint.
    #[error("invalid document: {0}")]
    InvalidDocument(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Failures raised by an auth provider.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The custom token did not verify against the configured secret.
    #[error("invalid custom token: {0}")]
    InvalidToken(#[from] jsonwebtoken::errors::Error),

    /// The token verified but carries an unusable subject.
    #[error("custom token has an empty subject")]
    EmptySubject,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Failures while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

/// Top-level error for callers that deal with more than one layer.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, Error>;
