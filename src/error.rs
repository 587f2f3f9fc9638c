//! Errors raised by the service layer.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    /// The upload could not be read as a ZIP archive
    #[error("not a valid ZIP archive: {0}")]
    InvalidArchive(String),

    /// No recipient was given
    #[error("recipient list cannot be empty")]
    NoRecipients,

    /// A recipient is not a valid email address
    #[error("invalid email address '{0}'")]
    InvalidRecipient(String),

    /// The mail system refused or failed to take the message
    #[error("failed to send email: {0}")]
    Delivery(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ServiceError {
    /// Whether the error was caused by the client's input.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ServiceError::InvalidArchive(_)
                | ServiceError::NoRecipients
                | ServiceError::InvalidRecipient(_)
        )
    }
}

impl From<std::io::Error> for ServiceError {
    fn from(err: std::io::Error) -> Self {
        ServiceError::Internal(err.into())
    }
}
