use super::*;
use crate::driver::CqlMapKey;
use crate::driver::fake::{FakeBatch, FakeSession};
use crate::model::{CurrentWorkflowRow, CurrentWorkflowWriteCondition, WorkflowExecutionInfo};
use std::collections::BTreeMap;
use uuid::Uuid;

const RUN_ID: &str = "bda9cd9c-32fb-4267-b120-346e5351fc46";
const OTHER_RUN_ID: &str = "fd88863f-bb32-4daa-8878-49e08b91545e";
const UPDATE_RUN_ID: &str = "0875863e-dcef-496a-b8a2-3210b2958e25";

fn uuid(value: &str) -> CqlValue {
    CqlValue::Uuid(Uuid::parse_str(value).unwrap())
}

fn row(entries: Vec<(&str, CqlValue)>) -> RowColumns {
    entries
        .into_iter()
        .map(|(column, value)| (column.to_owned(), value))
        .collect()
}

fn execution_column(workflow_id: &str, run_id: &str, state: i64) -> CqlValue {
    let mut fields = BTreeMap::new();
    fields.insert(
        CqlMapKey::Text("workflow_id".into()),
        CqlValue::Text(workflow_id.into()),
    );
    fields.insert(CqlMapKey::Text("run_id".into()), uuid(run_id));
    fields.insert(CqlMapKey::Text("state".into()), CqlValue::Int(state));
    CqlValue::Map(fields)
}

fn execution_request(info: WorkflowExecutionInfo) -> WorkflowExecutionRequest {
    WorkflowExecutionRequest {
        info,
        ..Default::default()
    }
}

/// Strips the trailing `, columns: (…)` diagnostic so message assertions pin
/// only the contractual prefix.
fn trim_columns(message: &str) -> &str {
    match message.find(", columns: (") {
        Some(index) => &message[..index],
        None => message,
    }
}

fn trimmed(failure: &WorkflowOperationConditionFailure) -> WorkflowOperationConditionFailure {
    match failure {
        WorkflowOperationConditionFailure::CurrentWorkflowConditionFailInfo(message) => {
            WorkflowOperationConditionFailure::CurrentWorkflowConditionFailInfo(
                trim_columns(message).to_owned(),
            )
        }
        WorkflowOperationConditionFailure::UnknownConditionFailureDetails(message) => {
            WorkflowOperationConditionFailure::UnknownConditionFailureDetails(
                trim_columns(message).to_owned(),
            )
        }
        WorkflowOperationConditionFailure::WorkflowExecutionAlreadyExists(details) => {
            WorkflowOperationConditionFailure::WorkflowExecutionAlreadyExists(
                WorkflowExecutionAlreadyExists {
                    other_info: trim_columns(&details.other_info).to_owned(),
                    ..details.clone()
                },
            )
        }
        other => other.clone(),
    }
}

fn assert_condition_failure(result: Result<(), StoreError>, want: WorkflowOperationConditionFailure) {
    match result {
        Err(StoreError::ConditionNotMet(got)) => assert_eq!(trimmed(&got), want),
        other => panic!("expected condition failure, got {other:?}"),
    }
}

#[tokio::test]
async fn create_applied_returns_ok_and_closes_iterator() {
    let session = FakeSession::applied();
    let result = execute_create_workflow_batch_transaction(
        &session,
        Box::new(FakeBatch::new()),
        &CurrentWorkflowWriteRequest::default(),
        None,
        &ShardCondition::default(),
    )
    .await;
    assert!(result.is_ok());
    assert!(session.iter_was_closed());
}

#[tokio::test]
async fn create_propagates_driver_errors_verbatim() {
    let session = FakeSession::failing("db operation failed for some reason");
    let result = execute_create_workflow_batch_transaction(
        &session,
        Box::new(FakeBatch::new()),
        &CurrentWorkflowWriteRequest::default(),
        None,
        &ShardCondition::default(),
    )
    .await;
    match result {
        Err(StoreError::Driver(err)) => {
            assert_eq!(err.to_string(), "db operation failed for some reason");
        }
        other => panic!("expected driver error, got {other:?}"),
    }
    assert!(session.iter_was_closed());
}

#[tokio::test]
async fn create_classifies_shard_range_id_mismatch() {
    let session = FakeSession::rejected_with(row(vec![
        ("type", CqlValue::Int(0)),
        ("run_id", uuid(RUN_ID)),
        ("range_id", CqlValue::Int(200)),
    ]));
    let result = execute_create_workflow_batch_transaction(
        &session,
        Box::new(FakeBatch::new()),
        &CurrentWorkflowWriteRequest::default(),
        None,
        &ShardCondition {
            shard_id: 0,
            range_id: 100,
        },
    )
    .await;
    assert_condition_failure(
        result,
        WorkflowOperationConditionFailure::ShardRangeIdNotMatch { actual: 200 },
    );
    assert!(session.iter_was_closed());
}

fn current_pointer_with_execution() -> RowColumns {
    row(vec![
        ("type", CqlValue::Int(1)),
        ("run_id", uuid(crate::keys::PERMANENT_RUN_ID)),
        ("range_id", CqlValue::Int(100)),
        ("workflow_last_write_version", CqlValue::Int(3)),
        ("execution", execution_column("test-workflow-id", RUN_ID, 1)),
    ])
}

#[tokio::test]
async fn create_reports_running_execution_behind_the_pointer() {
    let session = FakeSession::rejected_with(current_pointer_with_execution());
    let result = execute_create_workflow_batch_transaction(
        &session,
        Box::new(FakeBatch::new()),
        &CurrentWorkflowWriteRequest::default(),
        None,
        &ShardCondition {
            shard_id: 0,
            range_id: 100,
        },
    )
    .await;
    assert_condition_failure(
        result,
        WorkflowOperationConditionFailure::CurrentWorkflowConditionFailInfo(format!(
            "Workflow execution already running. WorkflowId: test-workflow-id, \
             RunId: {RUN_ID}, rangeID: 100"
        )),
    );
    assert!(session.iter_was_closed());
}

#[tokio::test]
async fn create_in_insert_mode_reports_already_exists() {
    let session = FakeSession::rejected_with(current_pointer_with_execution());
    let result = execute_create_workflow_batch_transaction(
        &session,
        Box::new(FakeBatch::new()),
        &CurrentWorkflowWriteRequest {
            write_mode: CurrentWorkflowWriteMode::Insert,
            ..Default::default()
        },
        None,
        &ShardCondition {
            shard_id: 0,
            range_id: 100,
        },
    )
    .await;
    assert_condition_failure(
        result,
        WorkflowOperationConditionFailure::WorkflowExecutionAlreadyExists(
            WorkflowExecutionAlreadyExists {
                other_info: format!(
                    "Workflow execution already running. WorkflowId: test-workflow-id, \
                     RunId: {RUN_ID}, rangeID: 100"
                ),
                run_id: RUN_ID.into(),
                state: 1,
                last_write_version: 3,
                ..Default::default()
            },
        ),
    );
    assert!(session.iter_was_closed());
}

#[tokio::test]
async fn create_reports_current_run_id_mismatch() {
    let session = FakeSession::rejected_with(row(vec![
        ("type", CqlValue::Int(1)),
        ("run_id", uuid(crate::keys::PERMANENT_RUN_ID)),
        ("range_id", CqlValue::Int(100)),
        ("workflow_last_write_version", CqlValue::Int(3)),
        ("current_run_id", uuid(RUN_ID)),
    ]));
    let request = execution_request(WorkflowExecutionInfo {
        workflow_id: "wfid".into(),
        ..Default::default()
    });
    let result = execute_create_workflow_batch_transaction(
        &session,
        Box::new(FakeBatch::new()),
        &CurrentWorkflowWriteRequest {
            condition: Some(CurrentWorkflowWriteCondition {
                current_run_id: Some(OTHER_RUN_ID.into()),
                ..Default::default()
            }),
            ..Default::default()
        },
        Some(&request),
        &ShardCondition {
            shard_id: 0,
            range_id: 100,
        },
    )
    .await;
    assert_condition_failure(
        result,
        WorkflowOperationConditionFailure::CurrentWorkflowConditionFailInfo(format!(
            "Workflow execution creation condition failed by mismatch runID. \
             WorkflowId: wfid, Expected Current RunID: {OTHER_RUN_ID}, \
             Actual Current RunID: {RUN_ID}"
        )),
    );
    assert!(session.iter_was_closed());
}

#[tokio::test]
async fn create_reports_creation_condition_failure() {
    let session = FakeSession::rejected_with(row(vec![
        ("type", CqlValue::Int(1)),
        ("run_id", uuid(crate::keys::PERMANENT_RUN_ID)),
        ("range_id", CqlValue::Int(100)),
        ("workflow_last_write_version", CqlValue::Int(3)),
        ("current_run_id", uuid(RUN_ID)),
    ]));
    let request = execution_request(WorkflowExecutionInfo {
        workflow_id: "wfid".into(),
        run_id: RUN_ID.into(),
        ..Default::default()
    });
    let result = execute_create_workflow_batch_transaction(
        &session,
        Box::new(FakeBatch::new()),
        &CurrentWorkflowWriteRequest::default(),
        Some(&request),
        &ShardCondition {
            shard_id: 0,
            range_id: 100,
        },
    )
    .await;
    assert_condition_failure(
        result,
        WorkflowOperationConditionFailure::CurrentWorkflowConditionFailInfo(format!(
            "Workflow execution creation condition failed. WorkflowId: wfid, \
             CurrentRunID: {RUN_ID}"
        )),
    );
    assert!(session.iter_was_closed());
}

#[tokio::test]
async fn create_reports_collision_with_the_target_execution_row() {
    let session = FakeSession::rejected_with(row(vec![
        ("type", CqlValue::Int(1)),
        ("run_id", uuid(RUN_ID)),
        ("range_id", CqlValue::Int(100)),
        ("workflow_last_write_version", CqlValue::Int(3)),
    ]));
    let request = execution_request(WorkflowExecutionInfo {
        workflow_id: "wfid".into(),
        run_id: RUN_ID.into(),
        create_request_id: "reqid_123".into(),
        state: 2,
        ..Default::default()
    });
    let result = execute_create_workflow_batch_transaction(
        &session,
        Box::new(FakeBatch::new()),
        &CurrentWorkflowWriteRequest::default(),
        Some(&request),
        &ShardCondition {
            shard_id: 0,
            range_id: 100,
        },
    )
    .await;
    assert_condition_failure(
        result,
        WorkflowOperationConditionFailure::WorkflowExecutionAlreadyExists(
            WorkflowExecutionAlreadyExists {
                other_info: format!(
                    "Workflow execution already running. WorkflowId: wfid, RunId: {RUN_ID}, \
                     rangeID: 100"
                ),
                create_request_id: "reqid_123".into(),
                run_id: RUN_ID.into(),
                state: 2,
                last_write_version: 3,
                ..Default::default()
            },
        ),
    );
    assert!(session.iter_was_closed());
}

#[tokio::test]
async fn create_falls_back_to_unknown_condition_failure() {
    let session = FakeSession::rejected_with(row(vec![
        ("type", CqlValue::Int(1)),
        ("run_id", uuid(RUN_ID)),
        ("range_id", CqlValue::Int(100)),
        ("workflow_last_write_version", CqlValue::Int(3)),
    ]));
    let request = execution_request(WorkflowExecutionInfo {
        run_id: "something else".into(),
        ..Default::default()
    });
    let result = execute_create_workflow_batch_transaction(
        &session,
        Box::new(FakeBatch::new()),
        &CurrentWorkflowWriteRequest::default(),
        Some(&request),
        &ShardCondition {
            shard_id: 0,
            range_id: 100,
        },
    )
    .await;
    assert_condition_failure(
        result,
        WorkflowOperationConditionFailure::UnknownConditionFailureDetails(
            "Failed to operate on workflow execution.  Request RangeID: 100".into(),
        ),
    );
    assert!(session.iter_was_closed());
}

#[tokio::test]
async fn update_applied_returns_ok_and_closes_iterator() {
    let session = FakeSession::applied();
    let result = execute_update_workflow_batch_transaction(
        &session,
        Box::new(FakeBatch::new()),
        &CurrentWorkflowWriteRequest::default(),
        0,
        &ShardCondition::default(),
    )
    .await;
    assert!(result.is_ok());
    assert!(session.iter_was_closed());
}

#[tokio::test]
async fn update_propagates_driver_errors_verbatim() {
    let session = FakeSession::failing("db operation failed for some reason");
    let result = execute_update_workflow_batch_transaction(
        &session,
        Box::new(FakeBatch::new()),
        &CurrentWorkflowWriteRequest::default(),
        0,
        &ShardCondition::default(),
    )
    .await;
    assert!(matches!(result, Err(StoreError::Driver(_))));
    assert!(session.iter_was_closed());
}

#[tokio::test]
async fn update_classifies_shard_range_id_mismatch() {
    let session = FakeSession::rejected_with(row(vec![
        ("type", CqlValue::Int(0)),
        ("run_id", uuid(RUN_ID)),
        ("range_id", CqlValue::Int(200)),
    ]));
    let result = execute_update_workflow_batch_transaction(
        &session,
        Box::new(FakeBatch::new()),
        &CurrentWorkflowWriteRequest::default(),
        0,
        &ShardCondition {
            shard_id: 0,
            range_id: 100,
        },
    )
    .await;
    assert_condition_failure(
        result,
        WorkflowOperationConditionFailure::ShardRangeIdNotMatch { actual: 200 },
    );
    assert!(session.iter_was_closed());
}

#[tokio::test]
async fn update_reports_next_event_id_mismatch() {
    let session = FakeSession::rejected_with(row(vec![
        ("type", CqlValue::Int(1)),
        ("run_id", uuid(UPDATE_RUN_ID)),
        ("next_event_id", CqlValue::Int(10)),
    ]));
    let result = execute_update_workflow_batch_transaction(
        &session,
        Box::new(FakeBatch::new()),
        &CurrentWorkflowWriteRequest {
            row: CurrentWorkflowRow {
                run_id: UPDATE_RUN_ID.into(),
                ..Default::default()
            },
            ..Default::default()
        },
        11,
        &ShardCondition {
            shard_id: 0,
            range_id: 200,
        },
    )
    .await;
    assert_condition_failure(
        result,
        WorkflowOperationConditionFailure::UnknownConditionFailureDetails(format!(
            "Failed to update mutable state. previousNextEventIDCondition: 11, \
             actualNextEventID: 10, Request Current RunID: {UPDATE_RUN_ID}"
        )),
    );
    assert!(session.iter_was_closed());
}

#[tokio::test]
async fn update_reports_current_run_id_mismatch() {
    let session = FakeSession::rejected_with(row(vec![
        ("type", CqlValue::Int(1)),
        ("run_id", uuid(crate::keys::PERMANENT_RUN_ID)),
        ("current_run_id", uuid(UPDATE_RUN_ID)),
    ]));
    let result = execute_update_workflow_batch_transaction(
        &session,
        Box::new(FakeBatch::new()),
        &CurrentWorkflowWriteRequest {
            condition: Some(CurrentWorkflowWriteCondition {
                current_run_id: Some(OTHER_RUN_ID.into()),
                ..Default::default()
            }),
            ..Default::default()
        },
        0,
        &ShardCondition::default(),
    )
    .await;
    assert_condition_failure(
        result,
        WorkflowOperationConditionFailure::CurrentWorkflowConditionFailInfo(format!(
            "Workflow execution creation condition failed by mismatch runID. \
             WorkflowId: , Expected Current RunID: {OTHER_RUN_ID}, \
             Actual Current RunID: {UPDATE_RUN_ID}"
        )),
    );
    assert!(session.iter_was_closed());
}

#[tokio::test]
async fn update_reports_running_execution_behind_the_pointer() {
    let session = FakeSession::rejected_with(current_pointer_with_execution());
    let result = execute_update_workflow_batch_transaction(
        &session,
        Box::new(FakeBatch::new()),
        &CurrentWorkflowWriteRequest::default(),
        0,
        &ShardCondition {
            shard_id: 0,
            range_id: 100,
        },
    )
    .await;
    assert_condition_failure(
        result,
        WorkflowOperationConditionFailure::CurrentWorkflowConditionFailInfo(format!(
            "Workflow execution already running. WorkflowId: test-workflow-id, \
             RunId: {RUN_ID}, rangeID: 100"
        )),
    );
    assert!(session.iter_was_closed());
}

#[tokio::test]
async fn update_in_insert_mode_reports_already_exists_behind_the_pointer() {
    let session = FakeSession::rejected_with(current_pointer_with_execution());
    let result = execute_update_workflow_batch_transaction(
        &session,
        Box::new(FakeBatch::new()),
        &CurrentWorkflowWriteRequest {
            write_mode: CurrentWorkflowWriteMode::Insert,
            ..Default::default()
        },
        0,
        &ShardCondition {
            shard_id: 0,
            range_id: 100,
        },
    )
    .await;
    assert_condition_failure(
        result,
        WorkflowOperationConditionFailure::WorkflowExecutionAlreadyExists(
            WorkflowExecutionAlreadyExists {
                other_info: format!(
                    "Workflow execution already running. WorkflowId: test-workflow-id, \
                     RunId: {RUN_ID}, rangeID: 100"
                ),
                run_id: RUN_ID.into(),
                state: 1,
                last_write_version: 3,
                ..Default::default()
            },
        ),
    );
    assert!(session.iter_was_closed());
}

#[tokio::test]
async fn update_falls_back_to_unknown_condition_failure() {
    let session = FakeSession::rejected_with(row(vec![
        ("type", CqlValue::Int(1)),
        ("run_id", uuid(RUN_ID)),
    ]));
    let result = execute_update_workflow_batch_transaction(
        &session,
        Box::new(FakeBatch::new()),
        &CurrentWorkflowWriteRequest {
            condition: Some(CurrentWorkflowWriteCondition {
                current_run_id: Some(UPDATE_RUN_ID.into()),
                ..Default::default()
            }),
            ..Default::default()
        },
        11,
        &ShardCondition {
            shard_id: 345,
            range_id: 200,
        },
    )
    .await;
    assert_condition_failure(
        result,
        WorkflowOperationConditionFailure::UnknownConditionFailureDetails(format!(
            "Failed to update mutable state. ShardID: 345, RangeID: 200, \
             previousNextEventIDCondition: 11, requestConditionalRunID: {UPDATE_RUN_ID}"
        )),
    );
    assert!(session.iter_was_closed());
}
