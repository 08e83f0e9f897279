// linkshelf/src/domain/error.rs
use thiserror::Error;

/// Input rejected before any store request is issued
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Title must not be empty")]
    EmptyTitle,

    #[error("URL must not be empty")]
    EmptyUrl,

    #[error("Invalid URL '{url}': {reason}")]
    MalformedUrl { url: String, reason: String },

    #[error("Invalid identifier: {0}")]
    InvalidId(String),
}

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Malformed change notification: {0}")]
    MalformedChange(String),

    #[error("Bookmark not found: {0}")]
    BookmarkNotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Other error: {0}")]
    Other(String),
}

pub type DomainResult<T> = Result<T, DomainError>;

impl DomainError {
    pub fn context<C: Into<String>>(self, context: C) -> Self {
        match self {
            DomainError::Store(msg) => DomainError::Store(format!("{}: {}", context.into(), msg)),
            DomainError::Other(msg) => DomainError::Other(format!("{}: {}", context.into(), msg)),
            err => err,
        }
    }

    /// True for errors raised by local input checks (no store request was made)
    pub fn is_validation(&self) -> bool {
        matches!(self, DomainError::Validation(_))
    }
}

impl From<serde_json::Error> for DomainError {
    fn from(err: serde_json::Error) -> Self {
        DomainError::MalformedChange(err.to_string())
    }
}
