//! Error types for the store collaborators and the social features

use thiserror::Error;

/// Remote store errors (realtime store and blob store)
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Invalid store path: {0:?}")]
    InvalidPath(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias for StoreError
pub type StoreResult<T> = Result<T, StoreError>;

/// Identity provider errors
#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("Not signed in")]
    NotSignedIn,

    #[error("Unknown user: {0}")]
    UnknownUser(String),
}

/// Profile editing errors
#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("Display name must not be empty")]
    EmptyName,

    #[error("Not signed in")]
    NotSignedIn,

    #[error("Avatar upload failed: {0}")]
    Upload(#[from] StoreError),

    #[error("Profile update failed: {0}")]
    Update(#[from] IdentityError),
}

/// Comment posting errors
#[derive(Debug, Error)]
pub enum CommentError {
    #[error("Comment must not be empty")]
    Empty,

    #[error("Comment is longer than {max} characters")]
    TooLong { max: usize },

    #[error("Could not post comment: {0}")]
    Store(#[from] StoreError),
}

impl StoreError {
    /// Create an InvalidPath error
    pub fn invalid_path(path: &str) -> Self {
        Self::InvalidPath(path.to_string())
    }
}

/// Errors that end a session's game loop
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Tick panicked: {0}")]
    TickPanicked(String),
}
