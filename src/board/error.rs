//! Error types for board mutations.

use thiserror::Error;
use crate::store::StoreError;

/// Broad category of a [`BoardError`], used by front ends to decide how to
/// report it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad input; nothing was applied.
    Validation,
    /// A referenced stage or task does not exist.
    NotFound,
    /// The store rejected a read or write.
    Persistence,
    /// Caller broke an operation contract; state is untouched.
    Invariant,
}

/// Errors returned by `BoardState` operations.
#[derive(Debug, Error)]
pub enum BoardError {
    /// A required text field is empty after trimming.
    #[error("{field} cannot be empty")]
    EmptyField { field: &'static str },

    /// A text field is longer than its cap.
    #[error("{field} is {len} characters long (maximum {max})")]
    TooLong { field: &'static str, len: usize, max: usize },

    /// The color is not a bare hex triplet or sextet.
    #[error("invalid color '{0}': expected 3 or 6 hex digits without '#'")]
    InvalidColor(String),

    /// A task with the same id already lives in the stage.
    #[error("task {task_id} already exists in stage {stage_id}")]
    DuplicateTask { task_id: String, stage_id: String },

    #[error("stage not found: {0}")]
    StageNotFound(String),

    #[error("task {task_id} not found in stage {stage_id}")]
    TaskNotFound { task_id: String, stage_id: String },

    #[error("persistence error: {0}")]
    Persistence(#[from] StoreError),

    /// Reorder indices outside the current sequence.
    #[error("cannot move stage from {from} to {to}: board has {len} stages")]
    IndexOutOfRange { from: usize, to: usize, len: usize },
}

impl BoardError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            BoardError::EmptyField { .. }
            | BoardError::TooLong { .. }
            | BoardError::InvalidColor(_)
            | BoardError::DuplicateTask { .. } => ErrorKind::Validation,
            BoardError::StageNotFound(_) | BoardError::TaskNotFound { .. } => ErrorKind::NotFound,
            BoardError::Persistence(_) => ErrorKind::Persistence,
            BoardError::IndexOutOfRange { .. } => ErrorKind::Invariant,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }
}

/// Result type for board operations.
pub type BoardResult<T> = Result<T, BoardError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(BoardError::EmptyField { field: "label" }.kind(), ErrorKind::Validation);
        assert_eq!(BoardError::InvalidColor("zz".into()).kind(), ErrorKind::Validation);
        assert!(BoardError::StageNotFound("x".into()).is_not_found());
        assert_eq!(
            BoardError::IndexOutOfRange { from: 0, to: 4, len: 2 }.kind(),
            ErrorKind::Invariant
        );
        let store_err = StoreError::Unavailable("disabled".into());
        assert_eq!(BoardError::from(store_err).kind(), ErrorKind::Persistence);
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            BoardError::EmptyField { field: "label" }.to_string(),
            "label cannot be empty"
        );
        assert_eq!(
            BoardError::TooLong { field: "title", len: 300, max: 255 }.to_string(),
            "title is 300 characters long (maximum 255)"
        );
    }
}
