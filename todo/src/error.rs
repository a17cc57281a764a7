//! Error types for the todo state layer.

use crate::types::RecordId;
use thiserror::Error;

/// Errors surfaced by the todo facade and effect orchestrator
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TodoError {
    /// A toggle or delete targeted a record the source does not know
    ///
    /// Treated as a silent no-op: the list is resynced and no error is shown.
    #[error("Record not found: {0}")]
    NotFound(RecordId),

    /// A data source call failed
    ///
    /// The message is what ends up in `TodoState::error`.
    #[error("Data source failure: {0}")]
    SourceFailure(String),

    /// The title of a new record was empty or whitespace only
    #[error("Todo title cannot be empty")]
    ValidationRejected,

    /// The store refused the command or failed to shut down in time
    #[error("Store error: {0}")]
    Store(String),
}

impl From<crate::source::SourceError> for TodoError {
    fn from(error: crate::source::SourceError) -> Self {
        Self::SourceFailure(error.to_string())
    }
}

impl From<composable_state_runtime::StoreError> for TodoError {
    fn from(error: composable_state_runtime::StoreError) -> Self {
        Self::Store(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::SourceError;

    #[test]
    fn test_source_failure_display() {
        let error = TodoError::from(SourceError::Injected);
        assert_eq!(error.to_string(), "Data source failure: simulated source failure");
    }

    #[test]
    fn test_not_found_display() {
        let error = TodoError::NotFound(RecordId::from("42"));
        assert_eq!(error.to_string(), "Record not found: 42");
    }
}
