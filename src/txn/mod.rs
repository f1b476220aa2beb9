//! Conditional-transaction executor.
//!
//! Submits a composed batch with CAS and, when the store refuses it,
//! reconstructs which invariant was violated from the columns of the losing
//! row. The store reports nothing else, so classification is pure pattern
//! matching on row type and the characteristic columns.

use crate::driver::{Batch, CasResponse, CqlMapKey, CqlValue, Iter, RowColumns, Session};
use crate::error::{StoreError, WorkflowExecutionAlreadyExists, WorkflowOperationConditionFailure};
use crate::keys::{PERMANENT_RUN_ID, RowType};
use crate::model::{
    CurrentWorkflowWriteMode, CurrentWorkflowWriteRequest, EMPTY_VERSION, ShardCondition,
    WorkflowExecutionRequest,
};

#[cfg(test)]
mod tests;

/// Owns the iterator returned by a CAS submission and closes it on drop, so
/// every exit path releases it.
struct IterGuard(Option<Box<dyn Iter>>);

impl IterGuard {
    fn new(iter: Option<Box<dyn Iter>>) -> Self {
        Self(iter)
    }

    fn map_scan(&mut self, row: &mut RowColumns) -> bool {
        match &mut self.0 {
            Some(iter) => iter.map_scan(row),
            None => false,
        }
    }
}

impl Drop for IterGuard {
    fn drop(&mut self) {
        if let Some(iter) = &mut self.0 {
            iter.close();
        }
    }
}

fn column_i64(row: &RowColumns, name: &str) -> Option<i64> {
    match row.get(name) {
        Some(CqlValue::Int(value)) => Some(*value),
        _ => None,
    }
}

/// Run ids arrive as uuid values from a live driver and as text from fakes;
/// both compare as their canonical string form.
fn column_id(row: &RowColumns, name: &str) -> Option<String> {
    value_id(row.get(name)?)
}

fn value_id(value: &CqlValue) -> Option<String> {
    match value {
        CqlValue::Text(text) => Some(text.clone()),
        CqlValue::Uuid(uuid) => Some(uuid.to_string()),
        _ => None,
    }
}

fn render_columns(row: &RowColumns) -> String {
    let mut out = String::new();
    for (i, (column, value)) in row.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        out.push_str(column);
        out.push('=');
        out.push_str(&value.to_string());
    }
    out
}

fn udt_get<'a>(value: &'a CqlValue, name: &str) -> Option<&'a CqlValue> {
    match value {
        CqlValue::Map(entries) => entries.get(&CqlMapKey::Text(name.to_owned())),
        CqlValue::Udt(fields) => fields
            .iter()
            .find(|(field, _)| *field == name)
            .map(|(_, v)| v),
        _ => None,
    }
}

/// The interesting fields of a current-execution pointer's `execution`
/// column, as read back from a losing row.
#[derive(Default)]
struct ExecutionColumnView {
    workflow_id: String,
    run_id: String,
    state: i32,
    close_status: i32,
    create_request_id: String,
}

fn parse_execution_column(value: &CqlValue) -> ExecutionColumnView {
    let text = |name: &str| {
        udt_get(value, name)
            .and_then(value_id)
            .unwrap_or_default()
    };
    let int = |name: &str| match udt_get(value, name) {
        Some(CqlValue::Int(v)) => *v as i32,
        _ => 0,
    };
    ExecutionColumnView {
        workflow_id: text("workflow_id"),
        run_id: text("run_id"),
        state: int("state"),
        close_status: int("close_status"),
        create_request_id: text("create_request_id"),
    }
}

/// Wraps a create batch with CAS and classifies non-application.
pub async fn execute_create_workflow_batch_transaction<S: Session + ?Sized>(
    session: &S,
    batch: Box<dyn Batch>,
    current_workflow_request: &CurrentWorkflowWriteRequest,
    execution_request: Option<&WorkflowExecutionRequest>,
    shard_condition: &ShardCondition,
) -> Result<(), StoreError> {
    let mut prev = RowColumns::new();
    let CasResponse {
        applied,
        iter,
        error,
    } = session.execute_batch_cas(batch, &mut prev).await;
    let mut iter = IterGuard::new(iter);
    if let Some(err) = error {
        return Err(err.into());
    }
    if applied {
        return Ok(());
    }

    let mut shard_range_id_mismatch: Option<i64> = None;
    loop {
        let Some(row_type) = column_i64(&prev, "type").and_then(RowType::from_i64) else {
            break;
        };
        let run_id = column_id(&prev, "run_id").unwrap_or_default();
        match row_type {
            RowType::Shard => {
                if let Some(actual) = column_i64(&prev, "range_id")
                    && actual != shard_condition.range_id
                {
                    shard_range_id_mismatch = Some(actual);
                }
            }
            RowType::Execution if run_id == PERMANENT_RUN_ID => {
                return Err(classify_current_pointer_collision(
                    &prev,
                    current_workflow_request,
                    execution_request,
                    shard_condition,
                )
                .into());
            }
            RowType::Execution => {
                if let Some(request) =
                    execution_request.filter(|request| request.info.run_id == run_id)
                {
                    let last_write_version =
                        column_i64(&prev, "workflow_last_write_version").unwrap_or(EMPTY_VERSION);
                    let other_info = format!(
                        "Workflow execution already running. WorkflowId: {}, RunId: {}, rangeID: {}, columns: ({})",
                        request.info.workflow_id,
                        request.info.run_id,
                        shard_condition.range_id,
                        render_columns(&prev),
                    );
                    return Err(
                        WorkflowOperationConditionFailure::WorkflowExecutionAlreadyExists(
                            WorkflowExecutionAlreadyExists {
                                other_info,
                                create_request_id: request.info.create_request_id.clone(),
                                run_id: request.info.run_id.clone(),
                                state: request.info.state,
                                close_status: request.info.close_status,
                                last_write_version,
                            },
                        )
                        .into(),
                    );
                }
            }
            _ => {}
        }
        prev.clear();
        if !iter.map_scan(&mut prev) {
            break;
        }
    }

    if let Some(actual) = shard_range_id_mismatch {
        return Err(WorkflowOperationConditionFailure::ShardRangeIdNotMatch { actual }.into());
    }
    Err(
        WorkflowOperationConditionFailure::UnknownConditionFailureDetails(format!(
            "Failed to operate on workflow execution.  Request RangeID: {}, columns: ({})",
            shard_condition.range_id,
            render_columns(&prev),
        ))
        .into(),
    )
}

/// Diagnoses a losing current-execution pointer row. Shared by the create
/// and update transactions; `execution_request` is only available on create.
fn classify_current_pointer_collision(
    prev: &RowColumns,
    current_workflow_request: &CurrentWorkflowWriteRequest,
    execution_request: Option<&WorkflowExecutionRequest>,
    shard_condition: &ShardCondition,
) -> WorkflowOperationConditionFailure {
    if let Some(execution_column) = prev.get("execution") {
        // A real execution already sits behind the pointer.
        let view = parse_execution_column(execution_column);
        let last_write_version =
            column_i64(prev, "workflow_last_write_version").unwrap_or(EMPTY_VERSION);
        let other_info = format!(
            "Workflow execution already running. WorkflowId: {}, RunId: {}, rangeID: {}, columns: ({})",
            view.workflow_id,
            view.run_id,
            shard_condition.range_id,
            render_columns(prev),
        );
        if current_workflow_request.write_mode == CurrentWorkflowWriteMode::Insert {
            return WorkflowOperationConditionFailure::WorkflowExecutionAlreadyExists(
                WorkflowExecutionAlreadyExists {
                    other_info,
                    create_request_id: view.create_request_id,
                    run_id: view.run_id,
                    state: view.state,
                    close_status: view.close_status,
                    last_write_version,
                },
            );
        }
        return WorkflowOperationConditionFailure::CurrentWorkflowConditionFailInfo(other_info);
    }

    let actual_current_run_id = column_id(prev, "current_run_id").unwrap_or_default();
    let workflow_id = execution_request
        .map(|request| request.info.workflow_id.as_str())
        .unwrap_or_default();
    if let Some(expected) = current_workflow_request
        .condition
        .as_ref()
        .and_then(|condition| condition.current_run_id.as_deref())
        && expected != actual_current_run_id
    {
        return WorkflowOperationConditionFailure::CurrentWorkflowConditionFailInfo(format!(
            "Workflow execution creation condition failed by mismatch runID. \
             WorkflowId: {workflow_id}, Expected Current RunID: {expected}, \
             Actual Current RunID: {actual_current_run_id}"
        ));
    }
    WorkflowOperationConditionFailure::CurrentWorkflowConditionFailInfo(format!(
        "Workflow execution creation condition failed. WorkflowId: {workflow_id}, \
         CurrentRunID: {actual_current_run_id}, columns: ({})",
        render_columns(prev),
    ))
}

/// Wraps an update batch with CAS and classifies non-application.
pub async fn execute_update_workflow_batch_transaction<S: Session + ?Sized>(
    session: &S,
    batch: Box<dyn Batch>,
    current_workflow_request: &CurrentWorkflowWriteRequest,
    previous_next_event_id_condition: i64,
    shard_condition: &ShardCondition,
) -> Result<(), StoreError> {
    let mut prev = RowColumns::new();
    let CasResponse {
        applied,
        iter,
        error,
    } = session.execute_batch_cas(batch, &mut prev).await;
    let mut iter = IterGuard::new(iter);
    if let Some(err) = error {
        return Err(err.into());
    }
    if applied {
        return Ok(());
    }

    let expected_current_run_id = current_workflow_request
        .condition
        .as_ref()
        .and_then(|condition| condition.current_run_id.as_deref())
        .unwrap_or_default();
    let mut shard_range_id_mismatch: Option<i64> = None;
    let mut next_event_id_mismatch: Option<(i64, String)> = None;
    loop {
        let Some(row_type) = column_i64(&prev, "type").and_then(RowType::from_i64) else {
            break;
        };
        let run_id = column_id(&prev, "run_id").unwrap_or_default();
        match row_type {
            RowType::Shard => {
                if let Some(actual) = column_i64(&prev, "range_id")
                    && actual != shard_condition.range_id
                {
                    shard_range_id_mismatch = Some(actual);
                }
            }
            RowType::Execution if run_id == current_workflow_request.row.run_id => {
                if let Some(actual) = column_i64(&prev, "next_event_id")
                    && actual != previous_next_event_id_condition
                {
                    next_event_id_mismatch = Some((actual, render_columns(&prev)));
                }
            }
            RowType::Execution if run_id == PERMANENT_RUN_ID => {
                return Err(classify_current_pointer_collision(
                    &prev,
                    current_workflow_request,
                    None,
                    shard_condition,
                )
                .into());
            }
            _ => {}
        }
        prev.clear();
        if !iter.map_scan(&mut prev) {
            break;
        }
    }

    if let Some(actual) = shard_range_id_mismatch {
        return Err(WorkflowOperationConditionFailure::ShardRangeIdNotMatch { actual }.into());
    }
    if let Some((actual, columns)) = next_event_id_mismatch {
        return Err(
            WorkflowOperationConditionFailure::UnknownConditionFailureDetails(format!(
                "Failed to update mutable state. \
                 previousNextEventIDCondition: {previous_next_event_id_condition}, \
                 actualNextEventID: {actual}, Request Current RunID: {}, columns: ({columns})",
                current_workflow_request.row.run_id,
            ))
            .into(),
        );
    }
    Err(
        WorkflowOperationConditionFailure::UnknownConditionFailureDetails(format!(
            "Failed to update mutable state. ShardID: {}, RangeID: {}, \
             previousNextEventIDCondition: {previous_next_event_id_condition}, \
             requestConditionalRunID: {expected_current_run_id}, columns: ({})",
            shard_condition.shard_id,
            shard_condition.range_id,
            render_columns(&prev),
        ))
        .into(),
    )
}
