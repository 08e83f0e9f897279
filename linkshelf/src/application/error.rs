// linkshelf/src/application/error.rs
use crate::domain::error::{DomainError, ValidationError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),

    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("{0}")]
    Other(String),
}

impl ApplicationError {
    pub fn context<C: Into<String>>(self, context: C) -> Self {
        match self {
            ApplicationError::Other(msg) => {
                ApplicationError::Other(format!("{}: {}", context.into(), msg))
            }
            ApplicationError::Domain(err) => ApplicationError::Domain(err.context(context)),
            err => err,
        }
    }

    /// Input rejected locally, no store request was made
    pub fn is_validation(&self) -> bool {
        match self {
            ApplicationError::Validation(_) => true,
            ApplicationError::Domain(err) => err.is_validation(),
            _ => false,
        }
    }

    pub fn validation_error(&self) -> Option<&ValidationError> {
        match self {
            ApplicationError::Validation(err) | ApplicationError::Domain(DomainError::Validation(err)) => {
                Some(err)
            }
            _ => None,
        }
    }
}

impl From<std::io::Error> for ApplicationError {
    fn from(err: std::io::Error) -> Self {
        ApplicationError::Domain(DomainError::Io(err))
    }
}

pub type ApplicationResult<T> = Result<T, ApplicationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_domain_store_error_when_context_then_message_prefixed() {
        let err = ApplicationError::from(DomainError::Store("locked".to_string()))
            .context("delete bookmark");
        assert_eq!(err.to_string(), "Domain error: Store error: delete bookmark: locked");
    }

    #[test]
    fn given_wrapped_validation_when_inspected_then_detected() {
        let err = ApplicationError::from(DomainError::from(ValidationError::EmptyUrl));
        assert!(err.is_validation());
        assert_eq!(err.validation_error(), Some(&ValidationError::EmptyUrl));
        assert!(!ApplicationError::Other("x".to_string()).is_validation());
    }
}
