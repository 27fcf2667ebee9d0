use thiserror::Error;
use vigilant_shared::ValidationError;
use vigilant_store::StoreError;

/// Errors surfaced to callers of the engine.
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Authentication failed: {0}")]
    Auth(#[from] AuthError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("No active session")]
    NoSession,

    #[error("Lock poisoned: {0}")]
    LockPoisoned(String),
}

/// Blocking, user-facing authentication failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Invalid login credentials.")]
    InvalidCredentials,

    #[error("This phone number is already registered.")]
    DuplicatePhone,

    #[error("Passwords do not match!")]
    PasswordMismatch,

    #[error("A phone number is required.")]
    MissingPhone,
}

/// Remote store failures. The facade logs and swallows these.
#[derive(Error, Debug)]
pub enum RemoteError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Remote store answered {status} for {url}")]
    Status { status: u16, url: String },
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ClientError>;
