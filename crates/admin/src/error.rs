//! Unified error taxonomy for the mutation pipeline.

use thiserror::Error;

use crate::store::StoreError;
use crate::upload::UploadError;

/// Error returned by every [`crate::pipeline::MutationPipeline`] operation.
///
/// The pipeline never panics past its boundary: callers always receive one
/// of these kinds and decide whether to re-prompt or retry. Operations are
/// single-shot; nothing here is retried internally.
#[derive(Debug, Error)]
pub enum MutationError {
    /// A required field was missing or malformed. Raised before any I/O.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The asset host rejected or failed an upload. No store write was
    /// performed; an existing entity is left exactly as it was.
    #[error("Asset upload failed: {0}")]
    AssetUpload(#[from] UploadError),

    /// The remote store rejected or failed a create/update/delete. The
    /// store's own atomicity leaves the document at its previous value.
    #[error("Store write failed: {0}")]
    StoreWrite(#[from] StoreError),

    /// The requested order status transition was rejected.
    #[error("Invalid status transition: {0}")]
    InvalidTransition(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mutation_error_display() {
        let err = MutationError::Validation("product name is required".to_string());
        assert_eq!(err.to_string(), "Validation error: product name is required");

        let err = MutationError::InvalidTransition("unknown order status: Lost".to_string());
        assert_eq!(
            err.to_string(),
            "Invalid status transition: unknown order status: Lost"
        );
    }

    #[test]
    fn test_store_error_converts() {
        let err = MutationError::from(StoreError::Status {
            status: 503,
            message: "unavailable".to_string(),
        });
        assert!(matches!(err, MutationError::StoreWrite(_)));
    }

    #[test]
    fn test_upload_error_converts() {
        let err = MutationError::from(UploadError::Rejected {
            status: 400,
            message: "bad preset".to_string(),
        });
        assert!(matches!(err, MutationError::AssetUpload(_)));
    }
}
