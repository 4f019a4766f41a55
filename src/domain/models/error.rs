use thiserror::Error;

use super::GenerationMode;

/// Failures surfaced by the controller. None of them are fatal, each one is
/// recovered locally with a status or notification.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    #[error("Please enter an API key.")]
    EmptyInput,

    #[error("Please enter the full API key, not the masked one.")]
    MaskedInputRejected,

    #[error("Please describe the {0} you want to generate.")]
    EmptyDescription(GenerationMode),

    #[error("Nothing to copy.")]
    NothingToCopy,

    #[error("Nothing to download.")]
    NothingToDownload,

    #[error("Nothing to format.")]
    NothingToFormat,

    #[error("A generation request is already in flight.")]
    Busy,

    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },

    #[error("Copy failed: {0}")]
    Clipboard(String),

    #[error("File system error: {0}")]
    FileSystem(String),

    #[error("Backend request failed: {0}")]
    NetworkOrHttp(String),
}

impl ClientError {
    pub fn is_nothing_to_act_on(&self) -> bool {
        return matches!(
            self,
            ClientError::NothingToCopy
                | ClientError::NothingToDownload
                | ClientError::NothingToFormat
        );
    }
}
