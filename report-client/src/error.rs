use thiserror::Error;

/// Everything that can end an upload or analysis attempt.
///
/// `Display` is the text shown in the error banner.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ClientError {
    #[error("{0}")]
    Validation(String),

    #[error("Please select a medical report image")]
    NoFileSelected,

    #[error("An analysis is already in progress")]
    Busy,

    #[error("Failed to read file")]
    Read(String),

    #[error("{0}")]
    Transport(String),

    #[error("{message}")]
    Http { status: u16, message: String },
}
