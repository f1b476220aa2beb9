//! Encoders for the execution row, the current-execution pointer, the
//! buffered-events list and the shard-lease assertion.
//!
//! Encoders are pure: given a request and identifiers they append
//! parameterized statements to a batch and never touch I/O.

use super::statements;
use crate::driver::{Batch, CqlValue};
use crate::error::StoreError;
use crate::keys::{
    DEFAULT_VISIBILITY_TIMESTAMP_MS, EXECUTION_ROW_TASK_ID, PERMANENT_RUN_ID, RowType,
    SHARD_ROW_TASK_ID, run_id_or_empty_sentinel,
};
use crate::model::{
    CurrentWorkflowRow, CurrentWorkflowWriteMode, CurrentWorkflowWriteRequest, DataBlob,
    EVENT_STORE_VERSION, WorkflowExecutionInfo, WorkflowExecutionRequest,
};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::time::Duration;

pub(crate) fn seconds(duration: Duration) -> CqlValue {
    CqlValue::Int(duration.as_secs() as i64)
}

pub(crate) fn epoch_millis(ts: DateTime<Utc>) -> CqlValue {
    CqlValue::Int(ts.timestamp_millis())
}

fn epoch_nanos(ts: DateTime<Utc>) -> CqlValue {
    CqlValue::Int(ts.timestamp_nanos_opt().unwrap_or_default())
}

pub(crate) fn blob_data(blob: &Option<DataBlob>) -> CqlValue {
    CqlValue::Blob(blob.as_ref().map(|b| b.data.clone()).unwrap_or_default())
}

pub(crate) fn blob_encoding(blob: &Option<DataBlob>) -> CqlValue {
    CqlValue::Text(
        blob.as_ref()
            .map(|b| b.encoding.as_str().to_owned())
            .unwrap_or_default(),
    )
}

fn text_list(values: &[String]) -> CqlValue {
    CqlValue::List(values.iter().cloned().map(CqlValue::Text).collect())
}

fn blob_map(entries: &BTreeMap<String, Vec<u8>>) -> CqlValue {
    CqlValue::Map(
        entries
            .iter()
            .map(|(k, v)| {
                (
                    crate::driver::CqlMapKey::Text(k.clone()),
                    CqlValue::Blob(v.clone()),
                )
            })
            .collect(),
    )
}

fn text_map(entries: &BTreeMap<String, String>) -> CqlValue {
    CqlValue::Map(
        entries
            .iter()
            .map(|(k, v)| {
                (
                    crate::driver::CqlMapKey::Text(k.clone()),
                    CqlValue::Text(v.clone()),
                )
            })
            .collect(),
    )
}

/// Arguments backing the placeholders of the `execution` column type, in
/// template order.
fn workflow_execution_args(info: &WorkflowExecutionInfo) -> Vec<CqlValue> {
    vec![
        CqlValue::Text(info.domain_id.clone()),
        CqlValue::Text(info.workflow_id.clone()),
        CqlValue::Text(info.run_id.clone()),
        CqlValue::Text(info.first_run_id.clone()),
        CqlValue::Text(info.parent_domain_id.clone()),
        CqlValue::Text(info.parent_workflow_id.clone()),
        CqlValue::Text(info.parent_run_id.clone()),
        CqlValue::Int(info.initiated_id),
        CqlValue::Int(info.completion_event_batch_id),
        blob_data(&info.completion_event),
        blob_encoding(&info.completion_event),
        CqlValue::Text(info.task_list.clone()),
        CqlValue::Text(info.workflow_type_name.clone()),
        seconds(info.workflow_timeout),
        seconds(info.decision_task_timeout),
        CqlValue::Blob(info.execution_context.clone()),
        CqlValue::Int(info.state as i64),
        CqlValue::Int(info.close_status as i64),
        CqlValue::Int(info.last_first_event_id),
        CqlValue::Int(info.last_event_task_id),
        CqlValue::Int(info.next_event_id),
        CqlValue::Int(info.last_processed_event),
        CqlValue::Timestamp(info.start_timestamp),
        CqlValue::Timestamp(info.last_updated_timestamp),
        CqlValue::Text(info.create_request_id.clone()),
        CqlValue::Int(info.signal_count as i64),
        CqlValue::Int(info.history_size),
        CqlValue::Int(info.decision_version),
        CqlValue::Int(info.decision_schedule_id),
        CqlValue::Int(info.decision_started_id),
        CqlValue::Text(info.decision_request_id.clone()),
        seconds(info.decision_timeout),
        CqlValue::Int(info.decision_attempt),
        epoch_nanos(info.decision_started_timestamp),
        epoch_nanos(info.decision_scheduled_timestamp),
        epoch_nanos(info.decision_original_scheduled_timestamp),
        CqlValue::Bool(info.cancel_requested),
        CqlValue::Text(info.cancel_request_id.clone()),
        CqlValue::Text(info.sticky_task_list.clone()),
        seconds(info.sticky_schedule_to_start_timeout),
        CqlValue::Text(info.client_library_version.clone()),
        CqlValue::Text(info.client_feature_version.clone()),
        CqlValue::Text(info.client_impl.clone()),
        blob_data(&info.auto_reset_points),
        blob_encoding(&info.auto_reset_points),
        CqlValue::Int(info.attempt as i64),
        CqlValue::Bool(info.has_retry_policy),
        seconds(info.initial_interval),
        CqlValue::Double(info.backoff_coefficient),
        seconds(info.maximum_interval),
        CqlValue::Timestamp(info.expiration_time),
        CqlValue::Int(info.maximum_attempts as i64),
        text_list(&info.non_retriable_errors),
        CqlValue::Int(EVENT_STORE_VERSION),
        CqlValue::Blob(info.branch_token.clone()),
        CqlValue::Text(info.cron_schedule.clone()),
        seconds(info.expiration_interval),
        blob_map(&info.search_attributes),
        blob_map(&info.memo),
        text_map(&info.partition_config),
    ]
}

fn execution_row_key(shard_id: i32, domain_id: &str, workflow_id: &str, run_id: &str) -> Vec<CqlValue> {
    vec![
        CqlValue::Int(shard_id as i64),
        CqlValue::Int(RowType::Execution.as_i64()),
        CqlValue::Text(domain_id.to_owned()),
        CqlValue::Text(workflow_id.to_owned()),
        CqlValue::Text(run_id_or_empty_sentinel(run_id).to_owned()),
        CqlValue::Int(DEFAULT_VISIBILITY_TIMESTAMP_MS),
        CqlValue::Int(EXECUTION_ROW_TASK_ID),
    ]
}

/// Inserts a fresh execution row, conditioned on its absence.
pub fn create_workflow_execution(
    batch: &mut dyn Batch,
    shard_id: i32,
    domain_id: &str,
    workflow_id: &str,
    request: &WorkflowExecutionRequest,
) {
    let mut args = vec![
        CqlValue::Int(shard_id as i64),
        CqlValue::Text(domain_id.to_owned()),
        CqlValue::Text(workflow_id.to_owned()),
        CqlValue::Text(request.info.run_id.clone()),
        CqlValue::Int(RowType::Execution.as_i64()),
    ];
    args.extend(workflow_execution_args(&request.info));
    args.push(CqlValue::Int(request.info.next_event_id));
    args.push(CqlValue::Int(DEFAULT_VISIBILITY_TIMESTAMP_MS));
    args.push(CqlValue::Int(EXECUTION_ROW_TASK_ID));
    args.push(CqlValue::Blob(request.version_histories.data.clone()));
    args.push(CqlValue::Text(
        request.version_histories.encoding.as_str().to_owned(),
    ));
    args.push(CqlValue::Int(request.checksum.version as i64));
    args.push(CqlValue::Int(request.checksum.flavor as i64));
    args.push(CqlValue::Blob(request.checksum.value.clone()));
    args.push(CqlValue::Int(request.last_write_version));
    args.push(CqlValue::Int(request.info.state as i64));
    batch.add_query(&statements::CREATE_WORKFLOW_EXECUTION, args);
}

/// Overwrites the execution row under the `next_event_id` optimistic lock.
/// A request carrying no condition conditions on the zero value.
pub fn update_workflow_execution(
    batch: &mut dyn Batch,
    shard_id: i32,
    domain_id: &str,
    workflow_id: &str,
    request: &WorkflowExecutionRequest,
) {
    let condition = request.previous_next_event_id_condition.unwrap_or_default();
    let mut args = workflow_execution_args(&request.info);
    args.push(CqlValue::Int(request.info.next_event_id));
    args.push(CqlValue::Blob(request.version_histories.data.clone()));
    args.push(CqlValue::Text(
        request.version_histories.encoding.as_str().to_owned(),
    ));
    args.push(CqlValue::Int(request.checksum.version as i64));
    args.push(CqlValue::Int(request.checksum.flavor as i64));
    args.push(CqlValue::Blob(request.checksum.value.clone()));
    args.push(CqlValue::Int(request.last_write_version));
    args.push(CqlValue::Int(request.info.state as i64));
    args.extend(execution_row_key(
        shard_id,
        domain_id,
        workflow_id,
        &request.info.run_id,
    ));
    args.push(CqlValue::Int(condition));
    batch.add_query(&statements::UPDATE_WORKFLOW_EXECUTION, args);
}

/// Writes the current-execution pointer row according to the request's write
/// mode. `Noop` emits nothing.
pub fn create_or_update_current_workflow(
    batch: &mut dyn Batch,
    shard_id: i32,
    domain_id: &str,
    workflow_id: &str,
    request: &CurrentWorkflowWriteRequest,
) -> Result<(), StoreError> {
    match request.write_mode {
        CurrentWorkflowWriteMode::Noop => Ok(()),
        CurrentWorkflowWriteMode::Insert => {
            insert_current_workflow(batch, shard_id, domain_id, workflow_id, &request.row);
            Ok(())
        }
        CurrentWorkflowWriteMode::Update => {
            let condition = request.condition.as_ref().ok_or_else(|| {
                StoreError::Precondition(
                    "current workflow update requires a condition with current_run_id".into(),
                )
            })?;
            let current_run_id = condition
                .current_run_id
                .as_deref()
                .filter(|run_id| !run_id.is_empty())
                .ok_or_else(|| {
                    StoreError::Precondition(
                        "current workflow update requires condition.current_run_id".into(),
                    )
                })?;
            update_current_workflow(
                batch,
                shard_id,
                domain_id,
                workflow_id,
                &request.row,
                current_run_id,
                condition.last_write_version,
            );
            Ok(())
        }
    }
}

fn current_workflow_row_args(row: &CurrentWorkflowRow) -> Vec<CqlValue> {
    vec![
        CqlValue::Text(row.run_id.clone()),
        CqlValue::Text(row.create_request_id.clone()),
        CqlValue::Int(row.state as i64),
        CqlValue::Int(row.close_status as i64),
    ]
}

fn insert_current_workflow(
    batch: &mut dyn Batch,
    shard_id: i32,
    domain_id: &str,
    workflow_id: &str,
    row: &CurrentWorkflowRow,
) {
    let mut args = vec![
        CqlValue::Int(shard_id as i64),
        CqlValue::Int(RowType::Execution.as_i64()),
        CqlValue::Text(domain_id.to_owned()),
        CqlValue::Text(workflow_id.to_owned()),
        CqlValue::Text(PERMANENT_RUN_ID.to_owned()),
        CqlValue::Int(DEFAULT_VISIBILITY_TIMESTAMP_MS),
        CqlValue::Int(EXECUTION_ROW_TASK_ID),
        CqlValue::Text(row.run_id.clone()),
    ];
    args.extend(current_workflow_row_args(row));
    args.push(CqlValue::Int(row.last_write_version));
    args.push(CqlValue::Int(row.state as i64));
    batch.add_query(&statements::INSERT_CURRENT_WORKFLOW, args);
}

fn update_current_workflow(
    batch: &mut dyn Batch,
    shard_id: i32,
    domain_id: &str,
    workflow_id: &str,
    row: &CurrentWorkflowRow,
    expected_current_run_id: &str,
    expected_last_write_version: Option<i64>,
) {
    let mut args = vec![CqlValue::Text(row.run_id.clone())];
    args.extend(current_workflow_row_args(row));
    args.push(CqlValue::Int(row.last_write_version));
    args.push(CqlValue::Int(row.state as i64));
    args.push(CqlValue::Int(shard_id as i64));
    args.push(CqlValue::Int(RowType::Execution.as_i64()));
    args.push(CqlValue::Text(domain_id.to_owned()));
    args.push(CqlValue::Text(workflow_id.to_owned()));
    args.push(CqlValue::Text(PERMANENT_RUN_ID.to_owned()));
    args.push(CqlValue::Int(DEFAULT_VISIBILITY_TIMESTAMP_MS));
    args.push(CqlValue::Int(EXECUTION_ROW_TASK_ID));
    args.push(CqlValue::Text(expected_current_run_id.to_owned()));
    match expected_last_write_version {
        Some(version) => {
            args.push(CqlValue::Int(version));
            batch.add_query(
                &statements::UPDATE_CURRENT_WORKFLOW_CHECK_LAST_WRITE_VERSION,
                args,
            );
        }
        None => batch.add_query(&statements::UPDATE_CURRENT_WORKFLOW, args),
    }
}

/// Appends one encoded event batch to the execution row's buffered list.
pub fn append_buffered_events(
    batch: &mut dyn Batch,
    shard_id: i32,
    domain_id: &str,
    workflow_id: &str,
    run_id: &str,
    events: &DataBlob,
) {
    let mut args = vec![
        CqlValue::Text(events.encoding.as_str().to_owned()),
        CqlValue::Int(0),
        CqlValue::Blob(events.data.clone()),
    ];
    args.extend(execution_row_key(shard_id, domain_id, workflow_id, run_id));
    batch.add_query(&statements::APPEND_BUFFERED_EVENTS, args);
}

/// Clears the buffered-events list. Callers pair this with a batch that
/// advances `next_event_id` past the buffered event ids.
pub fn delete_buffered_events(
    batch: &mut dyn Batch,
    shard_id: i32,
    domain_id: &str,
    workflow_id: &str,
    run_id: &str,
) {
    batch.add_query(
        &statements::DELETE_BUFFERED_EVENTS,
        execution_row_key(shard_id, domain_id, workflow_id, run_id),
    );
}

/// Re-asserts the shard lease: the batch only applies while the caller still
/// owns `range_id`.
pub fn assert_shard_range_id(batch: &mut dyn Batch, shard_id: i32, range_id: i64) {
    batch.add_query(
        &statements::ASSERT_SHARD_RANGE_ID,
        vec![
            CqlValue::Int(range_id),
            CqlValue::Int(shard_id as i64),
            CqlValue::Int(RowType::Shard.as_i64()),
            CqlValue::Text(RowType::Shard.domain_sentinel().to_string()),
            CqlValue::Text(RowType::Shard.workflow_sentinel().to_string()),
            CqlValue::Text(RowType::Shard.run_sentinel().to_string()),
            CqlValue::Int(DEFAULT_VISIBILITY_TIMESTAMP_MS),
            CqlValue::Int(SHARD_ROW_TASK_ID),
            CqlValue::Int(range_id),
        ],
    );
}
