//! Encoders for queue task rows. Task rows share the execution's partition
//! but live under the sentinel key slots of their row type.

use super::execution::epoch_millis;
use super::statements;
use crate::driver::{Batch, CqlValue};
use crate::keys::{DEFAULT_VISIBILITY_TIMESTAMP_MS, RowType, TRANSFER_TARGET_RUN_ID};
use crate::model::{
    CrossClusterTask, EVENT_STORE_VERSION, ReplicationTask, TimerTask, TransferTask,
};
use chrono::{DateTime, Utc};

fn creation_nanos(ts: DateTime<Utc>) -> CqlValue {
    CqlValue::Int(ts.timestamp_nanos_opt().unwrap_or_default())
}

fn transfer_task_args(domain_id: &str, workflow_id: &str, task: &TransferTask) -> Vec<CqlValue> {
    let target_run_id = if task.target_run_id.is_empty() {
        TRANSFER_TARGET_RUN_ID
    } else {
        &task.target_run_id
    };
    vec![
        CqlValue::Text(domain_id.to_owned()),
        CqlValue::Text(workflow_id.to_owned()),
        CqlValue::Text(task.run_id.clone()),
        CqlValue::Timestamp(task.visibility_timestamp),
        CqlValue::Int(task.task_id),
        CqlValue::Text(task.target_domain_id.clone()),
        CqlValue::List(
            task.target_domain_ids
                .iter()
                .cloned()
                .map(CqlValue::Text)
                .collect(),
        ),
        CqlValue::Text(task.target_workflow_id.clone()),
        CqlValue::Text(target_run_id.to_owned()),
        CqlValue::Bool(task.target_child_workflow_only),
        CqlValue::Text(task.task_list.clone()),
        CqlValue::Int(task.task_type as i64),
        CqlValue::Int(task.schedule_id),
        CqlValue::Bool(task.record_visibility),
        CqlValue::Int(task.version),
    ]
}

pub fn create_transfer_tasks(
    batch: &mut dyn Batch,
    shard_id: i32,
    domain_id: &str,
    workflow_id: &str,
    tasks: &[TransferTask],
) {
    for task in tasks {
        let mut args = vec![
            CqlValue::Int(shard_id as i64),
            CqlValue::Int(RowType::TransferTask.as_i64()),
            CqlValue::Text(RowType::TransferTask.domain_sentinel().to_string()),
            CqlValue::Text(RowType::TransferTask.workflow_sentinel().to_string()),
            CqlValue::Text(RowType::TransferTask.run_sentinel().to_string()),
        ];
        args.extend(transfer_task_args(domain_id, workflow_id, task));
        args.push(CqlValue::Int(DEFAULT_VISIBILITY_TIMESTAMP_MS));
        args.push(CqlValue::Int(task.task_id));
        batch.add_query(&statements::CREATE_TRANSFER_TASK, args);
    }
}

/// Cross-cluster rows reuse the transfer payload; the workflow-id key slot
/// carries the target cluster so one cluster's consumer scans one range.
pub fn create_cross_cluster_tasks(
    batch: &mut dyn Batch,
    shard_id: i32,
    domain_id: &str,
    workflow_id: &str,
    tasks: &[CrossClusterTask],
) {
    for task in tasks {
        let mut args = vec![
            CqlValue::Int(shard_id as i64),
            CqlValue::Int(RowType::CrossClusterTask.as_i64()),
            CqlValue::Text(RowType::CrossClusterTask.domain_sentinel().to_string()),
            CqlValue::Text(task.target_cluster.clone()),
            CqlValue::Text(RowType::CrossClusterTask.run_sentinel().to_string()),
        ];
        args.extend(transfer_task_args(domain_id, workflow_id, &task.task));
        args.push(CqlValue::Int(DEFAULT_VISIBILITY_TIMESTAMP_MS));
        args.push(CqlValue::Int(task.task.task_id));
        batch.add_query(&statements::CREATE_CROSS_CLUSTER_TASK, args);
    }
}

/// Timer rows are the one case where `visibility_ts` is real time: the fire
/// time in epoch milliseconds, duplicated inside the payload.
pub fn create_timer_tasks(
    batch: &mut dyn Batch,
    shard_id: i32,
    domain_id: &str,
    workflow_id: &str,
    tasks: &[TimerTask],
) {
    for task in tasks {
        batch.add_query(
            &statements::CREATE_TIMER_TASK,
            vec![
                CqlValue::Int(shard_id as i64),
                CqlValue::Int(RowType::TimerTask.as_i64()),
                CqlValue::Text(RowType::TimerTask.domain_sentinel().to_string()),
                CqlValue::Text(RowType::TimerTask.workflow_sentinel().to_string()),
                CqlValue::Text(RowType::TimerTask.run_sentinel().to_string()),
                CqlValue::Text(domain_id.to_owned()),
                CqlValue::Text(workflow_id.to_owned()),
                CqlValue::Text(task.run_id.clone()),
                epoch_millis(task.visibility_timestamp),
                CqlValue::Int(task.task_id),
                CqlValue::Int(task.task_type as i64),
                CqlValue::Int(task.timeout_type as i64),
                CqlValue::Int(task.event_id),
                CqlValue::Int(task.schedule_attempt),
                CqlValue::Int(task.version),
                epoch_millis(task.visibility_timestamp),
                CqlValue::Int(task.task_id),
            ],
        );
    }
}

pub fn create_replication_tasks(
    batch: &mut dyn Batch,
    shard_id: i32,
    domain_id: &str,
    workflow_id: &str,
    tasks: &[ReplicationTask],
) {
    for task in tasks {
        batch.add_query(
            &statements::CREATE_REPLICATION_TASK,
            vec![
                CqlValue::Int(shard_id as i64),
                CqlValue::Int(RowType::ReplicationTask.as_i64()),
                CqlValue::Text(RowType::ReplicationTask.domain_sentinel().to_string()),
                CqlValue::Text(RowType::ReplicationTask.workflow_sentinel().to_string()),
                CqlValue::Text(RowType::ReplicationTask.run_sentinel().to_string()),
                CqlValue::Text(domain_id.to_owned()),
                CqlValue::Text(workflow_id.to_owned()),
                CqlValue::Text(task.run_id.clone()),
                CqlValue::Int(task.task_id),
                CqlValue::Int(task.task_type as i64),
                CqlValue::Int(task.first_event_id),
                CqlValue::Int(task.next_event_id),
                CqlValue::Int(task.version),
                CqlValue::Int(task.scheduled_id),
                CqlValue::Int(EVENT_STORE_VERSION),
                CqlValue::Blob(task.branch_token.clone()),
                CqlValue::Int(EVENT_STORE_VERSION),
                CqlValue::Blob(task.new_run_branch_token.clone()),
                creation_nanos(task.creation_time),
                CqlValue::Int(DEFAULT_VISIBILITY_TIMESTAMP_MS),
                CqlValue::Int(task.task_id),
            ],
        );
    }
}
