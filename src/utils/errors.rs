use std::time::Duration;
use thiserror::Error;

pub type Result<T, E = RosterError> = std::result::Result<T, E>;

#[derive(Error, Debug)]
pub enum RosterError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Backend error: {0}")]
    Backend(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Player not found: {0}")]
    NotFound(String),

    #[error("No player identifier was provided for the update")]
    MissingIdentifier,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Upload timed out after {0:?}")]
    UploadTimeout(Duration),

    #[error("Upload failed: {0}")]
    Upload(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<reqwest::Error> for RosterError {
    fn from(err: reqwest::Error) -> Self {
        RosterError::Network(err.to_string())
    }
}

impl RosterError {
    /// Text for the dismissable notice shown to the user.
    pub fn user_message(&self) -> String {
        match self {
            RosterError::Network(_) | RosterError::Backend(_) => {
                "Could not reach the server. Please try again later.".to_string()
            }
            RosterError::PermissionDenied(_) => {
                "We need permission to access your media library. Enable it in the system settings."
                    .to_string()
            }
            RosterError::NotFound(_) | RosterError::MissingIdentifier => {
                "The player to update could not be found.".to_string()
            }
            RosterError::UploadTimeout(_) => {
                "The upload took too long. The player was saved; try uploading the file again."
                    .to_string()
            }
            RosterError::Upload(_) => {
                "The file could not be uploaded. The player was saved; try uploading the file again."
                    .to_string()
            }
            other => other.to_string(),
        }
    }

    /// True for failures that happened after the metadata was committed.
    pub fn is_upload_failure(&self) -> bool {
        matches!(self, RosterError::UploadTimeout(_) | RosterError::Upload(_))
    }
}
