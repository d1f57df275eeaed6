//! Error types for the sync engine.

use lexisync_merge::MergeError;
use lexisync_spantext::SpanTextError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Persisted error codes of a project in the `ERROR` state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCode {
    /// Cause not classified.
    Unspecified,
    /// The repository has no commits.
    EmptyProject,
    /// The repository is not a lexicon project.
    NoFlexProject,
    /// An unexpected failure stopped the cycle.
    UnhandledException,
}

impl ErrorCode {
    /// Returns the code name as written in the state file.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::Unspecified => "Unspecified",
            ErrorCode::EmptyProject => "EmptyProject",
            ErrorCode::NoFlexProject => "NoFlexProject",
            ErrorCode::UnhandledException => "UnhandledException",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failed initial clone, as reported by the repository collaborator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CloneFailure {
    /// The remote repository has no commits.
    #[error("{message}")]
    EmptyProject {
        /// Failure text from the transport.
        message: String,
    },

    /// The remote repository does not hold a lexicon project.
    #[error("{message}")]
    NoFlexProject {
        /// Failure text from the transport.
        message: String,
    },

    /// Any other clone failure.
    #[error("{message}")]
    Other {
        /// Failure text from the transport.
        message: String,
    },
}

impl CloneFailure {
    /// Classifies a transport failure message.
    pub fn from_message(message: impl Into<String>) -> Self {
        let message = message.into();
        if message.contains("new repository with no commits") {
            Self::EmptyProject { message }
        } else if message.contains("is not a FLEx project") {
            Self::NoFlexProject { message }
        } else {
            Self::Other { message }
        }
    }

    /// Returns the error code of a recoverable failure.
    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            Self::EmptyProject { .. } => Some(ErrorCode::EmptyProject),
            Self::NoFlexProject { .. } => Some(ErrorCode::NoFlexProject),
            Self::Other { .. } => None,
        }
    }

    /// Returns the failure text.
    pub fn message(&self) -> &str {
        match self {
            Self::EmptyProject { message }
            | Self::NoFlexProject { message }
            | Self::Other { message } => message,
        }
    }
}

/// How a failure is handled by the orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    /// Known cause; the project goes to `ERROR` and is not retried.
    Recoverable,
    /// Unknown or external cause; the project goes to `HOLD`.
    Transient,
    /// Logic error in the data; the project goes to `HOLD`.
    Fatal,
}

/// Errors that can occur during a sync cycle.
#[derive(Error, Debug)]
pub enum SyncError {
    /// A known failure, recorded on the project as `ERROR`.
    #[error("{message}")]
    Recoverable {
        /// Persisted error code.
        code: ErrorCode,
        /// Message embedding the underlying cause.
        message: String,
    },

    /// The initial clone failed.
    #[error("clone failed: {0}")]
    Clone(#[from] CloneFailure),

    /// A store, model or repository call failed.
    #[error("collaborator error: {message}")]
    Collaborator {
        /// Error message.
        message: String,
    },

    /// The merge inputs are inconsistent.
    #[error("merge error: {0}")]
    Merge(#[from] MergeError),

    /// Rich text could not be converted.
    #[error("codec error: {0}")]
    Codec(#[from] SpanTextError),

    /// I/O error on state or snapshot files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error on state or snapshot files.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Another orchestrator holds the process lock.
    #[error("another orchestrator instance holds the lock")]
    Locked,

    /// The project is parked in `HOLD`.
    #[error("project {project} is on hold")]
    OnHold {
        /// Project code.
        project: String,
    },
}

impl SyncError {
    /// Creates a recoverable error.
    pub fn recoverable(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::Recoverable {
            code,
            message: message.into(),
        }
    }

    /// Creates a collaborator error.
    pub fn collaborator(message: impl Into<String>) -> Self {
        Self::Collaborator {
            message: message.into(),
        }
    }

    /// Returns how the orchestrator handles this error.
    pub fn classify(&self) -> FailureClass {
        match self {
            SyncError::Recoverable { .. } => FailureClass::Recoverable,
            SyncError::Clone(failure) if failure.code().is_some() => FailureClass::Recoverable,
            SyncError::Merge(_) | SyncError::Codec(_) | SyncError::Json(_) => FailureClass::Fatal,
            _ => FailureClass::Transient,
        }
    }

    /// Returns true if this error can be retried.
    pub fn is_retryable(&self) -> bool {
        self.classify() == FailureClass::Transient
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clone_failure_classification() {
        let empty = CloneFailure::from_message("Clone failure: new repository with no commits. Clone deleted.");
        assert_eq!(empty.code(), Some(ErrorCode::EmptyProject));

        let not_flex = CloneFailure::from_message("Clone failure: clone is not a FLEx project: Clone deleted.");
        assert_eq!(not_flex.code(), Some(ErrorCode::NoFlexProject));

        let other = CloneFailure::from_message("connection reset");
        assert_eq!(other.code(), None);
        assert_eq!(other.message(), "connection reset");
    }

    #[test]
    fn failure_classes() {
        let empty = CloneFailure::from_message("new repository with no commits");
        assert_eq!(SyncError::Clone(empty).classify(), FailureClass::Recoverable);
        assert_eq!(
            SyncError::Clone(CloneFailure::from_message("timeout")).classify(),
            FailureClass::Transient
        );
        assert_eq!(
            SyncError::from(MergeError::missing_guid("entry")).classify(),
            FailureClass::Fatal
        );
        assert_eq!(SyncError::collaborator("down").classify(), FailureClass::Transient);
    }

    #[test]
    fn retryable_errors() {
        assert!(SyncError::collaborator("push rejected").is_retryable());
        assert!(SyncError::Locked.is_retryable());
        assert!(!SyncError::recoverable(ErrorCode::EmptyProject, "empty").is_retryable());
        assert!(!SyncError::from(SpanTextError::unknown_language("xx")).is_retryable());
    }

    #[test]
    fn error_display() {
        let err = SyncError::OnHold {
            project: "test-proj".into(),
        };
        assert_eq!(err.to_string(), "project test-proj is on hold");
        assert_eq!(ErrorCode::NoFlexProject.to_string(), "NoFlexProject");
    }
}
