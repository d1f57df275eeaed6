//! Error types for the merge policy.

use thiserror::Error;
use uuid::Uuid;

/// Result type for merge operations.
pub type MergeResult<T> = Result<T, MergeError>;

/// Structural problems in merge inputs.
///
/// These are logic errors in the data handed to the merge, never ordinary
/// conflicts; conflicts are resolved, not reported as errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MergeError {
    /// An element has the nil GUID where an identity is required.
    #[error("missing GUID at {path}")]
    MissingGuid {
        /// Location of the element.
        path: String,
    },

    /// Two elements of one collection share a GUID.
    #[error("duplicate GUID {guid} at {path}")]
    DuplicateGuid {
        /// Location of the collection.
        path: String,
        /// The repeated GUID.
        guid: Uuid,
    },

    /// The inputs of one entry merge disagree on identity.
    #[error("GUID mismatch: expected {expected}, found {found}")]
    GuidMismatch {
        /// GUID of the first input.
        expected: Uuid,
        /// GUID of the disagreeing input.
        found: Uuid,
    },
}

impl MergeError {
    /// Create a missing GUID error.
    pub fn missing_guid(path: impl Into<String>) -> Self {
        Self::MissingGuid { path: path.into() }
    }

    /// Create a duplicate GUID error.
    pub fn duplicate_guid(path: impl Into<String>, guid: Uuid) -> Self {
        Self::DuplicateGuid {
            path: path.into(),
            guid,
        }
    }
}
