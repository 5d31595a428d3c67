use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Signature surface unavailable: {reason}")]
    UnsupportedEnvironment { reason: String },

    #[error("Failed to encode signature image: {message}")]
    Encoding { message: String },
}

impl Error {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }
}
