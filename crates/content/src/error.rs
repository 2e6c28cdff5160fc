//! Error types for the content client and record store.

use glint_core::CodecError;
use thiserror::Error;

/// Errors returned by a [`ContentClient`](crate::ContentClient).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContentError {
    /// The file does not exist in the repository.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Network failure, timeout, rate limit, or server-side error.
    #[error("Content API unavailable: {0}")]
    Transient(String),

    /// The access credential was rejected.
    #[error("Content API authentication failed: {0}")]
    Auth(String),

    /// The version token no longer matches the remote file.
    #[error("Version conflict on {0}: the file changed since it was loaded")]
    Conflict(String),

    /// The API refused the request for another reason.
    #[error("Content API rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// The API answered with a payload that could not be understood.
    #[error("Malformed content response: {0}")]
    Decode(String),

    /// The client could not be constructed from its configuration.
    #[error("Content client configuration error: {0}")]
    Configuration(String),
}

impl ContentError {
    /// Whether the error means the caller must reload before saving again.
    #[must_use]
    pub const fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }
}

/// Errors returned by a [`RecordStore`](crate::RecordStore).
#[derive(Debug, Error)]
pub enum StoreError {
    /// The remote content client failed.
    #[error(transparent)]
    Content(#[from] ContentError),

    /// The record file could not be decoded or encoded.
    #[error("Record codec error: {0}")]
    Codec(#[from] CodecError),

    /// The collection was never loaded successfully.
    #[error("Collection {0} is not loaded")]
    NotLoaded(&'static str),
}

impl StoreError {
    /// Whether the error is a stale version token.
    #[must_use]
    pub const fn is_conflict(&self) -> bool {
        matches!(self, Self::Content(ContentError::Conflict(_)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_error_display() {
        let err = ContentError::NotFound("files_csv/products.csv".to_string());
        assert_eq!(err.to_string(), "Not found: files_csv/products.csv");

        let err = ContentError::Rejected {
            status: 400,
            message: "bad".to_string(),
        };
        assert_eq!(err.to_string(), "Content API rejected the request (400): bad");
    }

    #[test]
    fn test_conflict_detection() {
        let conflict = ContentError::Conflict("a.csv".to_string());
        assert!(conflict.is_conflict());
        assert!(StoreError::from(conflict).is_conflict());
        assert!(!StoreError::NotLoaded("a.csv").is_conflict());
        assert!(!StoreError::from(ContentError::Transient("timeout".to_string())).is_conflict());
    }
}
