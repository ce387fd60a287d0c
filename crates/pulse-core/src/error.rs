//! Error types for pulse-core

use thiserror::Error;

/// Result type alias using pulse-core's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in pulse-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// Remote marker store failure
    #[error(transparent)]
    Remote(#[from] RemoteError),

    /// Submission refused or rejected
    #[error(transparent)]
    Submit(#[from] SubmitError),

    /// Delete refused or failed
    #[error(transparent)]
    Delete(#[from] DeleteError),

    /// Device location failure
    #[error(transparent)]
    Location(#[from] LocationError),

    /// Static catalog could not be loaded
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Failures reported by the remote marker store.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RemoteError {
    #[error("network unreachable")]
    Network,
    #[error("service unavailable")]
    Unavailable,
    #[error("permission denied")]
    PermissionDenied,
    #[error("operation timed out")]
    Timeout,
    #[error("rejected by server: {0}")]
    Validation(String),
    #[error("invalid response: {0}")]
    InvalidResponse(String),
    #[error("remote error: {0}")]
    Other(String),
}

impl RemoteError {
    /// Whether a failed write should degrade to a local-only marker.
    ///
    /// Only server-side validation rejections are final; everything else
    /// keeps the user's post visible locally.
    pub const fn is_recoverable(&self) -> bool {
        !matches!(self, Self::Validation(_))
    }

    /// Message shown to the user in a transient notification.
    pub fn user_message(&self) -> String {
        match self {
            Self::Network => "Network error. Please check your internet connection.".to_string(),
            Self::Unavailable => {
                "The marker service is temporarily unavailable. Please try again.".to_string()
            }
            Self::PermissionDenied => {
                "Permission denied. You are not allowed to do that.".to_string()
            }
            Self::Timeout => "Request timed out. Please check your connection.".to_string(),
            Self::Validation(reason) => format!("The server rejected this post: {reason}"),
            Self::InvalidResponse(_) => "The server sent an unexpected response.".to_string(),
            Self::Other(_) => "Something went wrong talking to the server.".to_string(),
        }
    }
}

/// Client-side validation failures for a composed marker.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("description cannot be empty")]
    EmptyDescription,
    #[error("unknown category: {0}")]
    UnknownCategory(String),
    #[error("coordinate must be a finite latitude/longitude pair")]
    InvalidCoordinate,
    #[error("at most {max} images are allowed")]
    TooManyImages { max: usize },
    #[error("image {index} exceeds {max_bytes} bytes")]
    ImageTooLarge { index: usize, max_bytes: usize },
    #[error("image {index} is not an encoded image payload")]
    UnsupportedImage { index: usize },
}

/// Why a submission did not produce a marker.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubmitError {
    #[error("sign in to post markers")]
    AuthRequired,
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Remote(RemoteError),
}

impl SubmitError {
    pub fn user_message(&self) -> String {
        match self {
            Self::AuthRequired => "Please sign in to add markers.".to_string(),
            Self::Validation(error) => format!("Please fix your post: {error}."),
            Self::Remote(error) => error.user_message(),
        }
    }
}

/// Why a delete intent did not remove a marker.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeleteError {
    #[error("sign in to delete markers")]
    AuthRequired,
    #[error("only the author can delete marker {0}")]
    NotOwner(String),
    #[error(transparent)]
    Remote(RemoteError),
}

impl DeleteError {
    pub fn user_message(&self) -> String {
        match self {
            Self::AuthRequired => "Please sign in to delete markers.".to_string(),
            Self::NotOwner(_) => "You can only delete your own markers.".to_string(),
            Self::Remote(error) => format!("Failed to delete marker. {}", error.user_message()),
        }
    }
}

/// Device location failures. Reported to the user, never fatal.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationError {
    #[error("location permission denied")]
    PermissionDenied,
    #[error("location unavailable")]
    Unavailable,
    #[error("location request timed out")]
    Timeout,
    #[error("location is not supported on this device")]
    Unsupported,
}

impl LocationError {
    pub const fn user_message(self) -> &'static str {
        match self {
            Self::PermissionDenied => "Location access denied.",
            Self::Unavailable => "Your location is unavailable right now.",
            Self::Timeout => "Finding your location took too long.",
            Self::Unsupported => "Location is not supported on this device.",
        }
    }
}

/// Invalid static catalog data.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid catalog JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid catalog: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_validation_is_unrecoverable() {
        assert!(RemoteError::Network.is_recoverable());
        assert!(RemoteError::Unavailable.is_recoverable());
        assert!(RemoteError::PermissionDenied.is_recoverable());
        assert!(RemoteError::Timeout.is_recoverable());
        assert!(RemoteError::Other("boom".to_string()).is_recoverable());
        assert!(!RemoteError::Validation("bad".to_string()).is_recoverable());
    }

    #[test]
    fn remote_failure_kinds_have_distinct_messages() {
        let messages = [
            RemoteError::Network.user_message(),
            RemoteError::Unavailable.user_message(),
            RemoteError::PermissionDenied.user_message(),
            RemoteError::Timeout.user_message(),
            RemoteError::Other("x".to_string()).user_message(),
        ];
        for (index, message) in messages.iter().enumerate() {
            for other in &messages[index + 1..] {
                assert_ne!(message, other);
            }
        }
    }
}
