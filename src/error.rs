use crate::driver::DriverError;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreErrorCode {
    Driver,
    Precondition,
    InvalidConfig,
    BatchTooLarge,
    ShardRangeIdNotMatch,
    CurrentWorkflowConditionFailed,
    WorkflowExecutionAlreadyExists,
    UnknownConditionFailure,
}

impl StoreErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            StoreErrorCode::Driver => "driver",
            StoreErrorCode::Precondition => "precondition",
            StoreErrorCode::InvalidConfig => "invalid_config",
            StoreErrorCode::BatchTooLarge => "batch_too_large",
            StoreErrorCode::ShardRangeIdNotMatch => "shard_range_id_not_match",
            StoreErrorCode::CurrentWorkflowConditionFailed => "current_workflow_condition_failed",
            StoreErrorCode::WorkflowExecutionAlreadyExists => "workflow_execution_already_exists",
            StoreErrorCode::UnknownConditionFailure => "unknown_condition_failure",
        }
    }
}

/// Snapshot of the colliding run returned when a create loses its CAS to an
/// execution that already exists for the same `(domain, workflow)`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkflowExecutionAlreadyExists {
    pub other_info: String,
    pub create_request_id: String,
    pub run_id: String,
    pub state: i32,
    pub close_status: i32,
    pub last_write_version: i64,
}

/// Classified outcome of a non-applied batch CAS.
///
/// The store only ever returns the columns of the single losing row, so the
/// executor reconstructs which logical invariant was violated by pattern
/// matching on row type and the characteristic columns. Exactly one variant
/// describes each failure; message wording is part of the contract (operators
/// read it), with an optional trailing `, columns: (…)` diagnostic suffix.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkflowOperationConditionFailure {
    /// The shard lease moved: the shard row's `range_id` no longer matches
    /// the caller's lease generation.
    #[error("shard range id condition failed, actual range id: {actual}")]
    ShardRangeIdNotMatch { actual: i64 },
    /// The current-run pointer disagrees with the caller's expectation.
    /// Retriable after re-reading the current execution.
    #[error("{0}")]
    CurrentWorkflowConditionFailInfo(String),
    /// Another run of this workflow already exists.
    #[error("{}", .0.other_info)]
    WorkflowExecutionAlreadyExists(WorkflowExecutionAlreadyExists),
    /// Catch-all: `next_event_id` mismatches on update and sub-map conflicts
    /// that are not diagnosable from the losing row.
    #[error("{0}")]
    UnknownConditionFailureDetails(String),
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Driver(#[from] DriverError),
    #[error(transparent)]
    ConditionNotMet(#[from] WorkflowOperationConditionFailure),
    #[error("precondition violated: {0}")]
    Precondition(String),
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    #[error("batch of {statements} statements exceeds configured limit {limit}")]
    BatchTooLarge { statements: usize, limit: usize },
}

impl StoreError {
    pub fn code(&self) -> StoreErrorCode {
        match self {
            StoreError::Driver(_) => StoreErrorCode::Driver,
            StoreError::ConditionNotMet(failure) => match failure {
                WorkflowOperationConditionFailure::ShardRangeIdNotMatch { .. } => {
                    StoreErrorCode::ShardRangeIdNotMatch
                }
                WorkflowOperationConditionFailure::CurrentWorkflowConditionFailInfo(_) => {
                    StoreErrorCode::CurrentWorkflowConditionFailed
                }
                WorkflowOperationConditionFailure::WorkflowExecutionAlreadyExists(_) => {
                    StoreErrorCode::WorkflowExecutionAlreadyExists
                }
                WorkflowOperationConditionFailure::UnknownConditionFailureDetails(_) => {
                    StoreErrorCode::UnknownConditionFailure
                }
            },
            StoreError::Precondition(_) => StoreErrorCode::Precondition,
            StoreError::InvalidConfig(_) => StoreErrorCode::InvalidConfig,
            StoreError::BatchTooLarge { .. } => StoreErrorCode::BatchTooLarge,
        }
    }

    pub fn code_str(&self) -> &'static str {
        self.code().as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_code_strings_are_stable() {
        assert_eq!(
            StoreErrorCode::ShardRangeIdNotMatch.as_str(),
            "shard_range_id_not_match"
        );
        assert_eq!(
            StoreErrorCode::WorkflowExecutionAlreadyExists.as_str(),
            "workflow_execution_already_exists"
        );
        assert_eq!(StoreErrorCode::BatchTooLarge.as_str(), "batch_too_large");
    }

    #[test]
    fn condition_failures_map_to_their_codes() {
        let err = StoreError::ConditionNotMet(
            WorkflowOperationConditionFailure::ShardRangeIdNotMatch { actual: 200 },
        );
        assert_eq!(err.code(), StoreErrorCode::ShardRangeIdNotMatch);

        let err = StoreError::ConditionNotMet(
            WorkflowOperationConditionFailure::UnknownConditionFailureDetails("details".into()),
        );
        assert_eq!(err.code_str(), "unknown_condition_failure");
    }

    #[test]
    fn already_exists_displays_its_other_info() {
        let failure = WorkflowOperationConditionFailure::WorkflowExecutionAlreadyExists(
            WorkflowExecutionAlreadyExists {
                other_info: "Workflow execution already running.".into(),
                ..Default::default()
            },
        );
        assert_eq!(failure.to_string(), "Workflow execution already running.");
    }
}
