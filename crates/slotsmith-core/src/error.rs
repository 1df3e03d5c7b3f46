//! Error types for Slotsmith

use thiserror::Error;

/// Result type alias using Slotsmith's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Coarse classification used by the pipeline when deciding how to log a
/// tier failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Network, DNS or non-2xx responses
    Transport,
    /// No key supplied for an optional tier
    CredentialMissing,
    /// Body present but unusable, even after repair
    MalformedResponse,
}

/// Slotsmith error types with helpful messages and suggestions
#[derive(Error, Debug)]
pub enum Error {
    // Transport errors (E100-E199)
    #[error("Network error: {0}. Check your internet connection.")]
    NetworkError(#[from] reqwest::Error),

    #[error("{service} returned HTTP {status}: {message}")]
    ServiceError {
        service: &'static str,
        status: u16,
        message: String,
    },

    // Credential errors (E200-E299)
    #[error("No API key for {0}. Set the matching environment variable to enable this tier.")]
    CredentialMissing(&'static str),

    // Response errors (E300-E399)
    #[error("{0} returned an empty response")]
    EmptyResponse(&'static str),

    #[error("Malformed response from {0}: {1}")]
    MalformedResponse(&'static str, String),

    #[error("Generated schedule is not valid JSON and could not be repaired")]
    RepairFailure { raw: String },
}

impl Error {
    /// Get error code for this error type
    pub fn code(&self) -> &'static str {
        match self {
            Self::NetworkError(_) => "E100",
            Self::ServiceError { .. } => "E101",
            Self::CredentialMissing(_) => "E200",
            Self::EmptyResponse(_) => "E300",
            Self::MalformedResponse(..) => "E301",
            Self::RepairFailure { .. } => "E302",
        }
    }

    /// Classify this error into the pipeline's failure taxonomy
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NetworkError(_) | Self::ServiceError { .. } => ErrorKind::Transport,
            Self::CredentialMissing(_) => ErrorKind::CredentialMissing,
            Self::EmptyResponse(_) | Self::MalformedResponse(..) | Self::RepairFailure { .. } => {
                ErrorKind::MalformedResponse
            }
        }
    }

    /// Get suggestion for how to fix this error
    pub fn suggestion(&self) -> Option<String> {
        match self {
            Self::NetworkError(_) => Some("Check internet connection".to_string()),
            Self::ServiceError { status: 401 | 403, .. } => {
                Some("Verify the API key for this service".to_string())
            }
            Self::CredentialMissing("compression") => {
                Some("export SCALEDOWN_API_KEY=<key>".to_string())
            }
            Self::CredentialMissing("generation") => {
                Some("export GEMINI_API_KEY=<key>".to_string())
            }
            Self::EmptyResponse(_) | Self::MalformedResponse(..) | Self::RepairFailure { .. } => {
                Some("Retry, or check the service URL with `slotsmith config list`".to_string())
            }
            _ => None,
        }
    }
}
