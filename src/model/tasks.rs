//! Queue task records. Each task becomes its own row in the execution
//! partition under the type-specific sentinel key slots.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Transfer-queue task: hands work to the matching/queueing engines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferTask {
    pub run_id: String,
    pub task_id: i64,
    pub task_type: i32,
    pub version: i64,
    pub visibility_timestamp: DateTime<Utc>,
    pub target_domain_id: String,
    pub target_domain_ids: BTreeSet<String>,
    pub target_workflow_id: String,
    pub target_run_id: String,
    pub target_child_workflow_only: bool,
    pub task_list: String,
    pub schedule_id: i64,
    pub record_visibility: bool,
}

impl Default for TransferTask {
    fn default() -> Self {
        Self {
            run_id: String::new(),
            task_id: 0,
            task_type: 0,
            version: 0,
            visibility_timestamp: DateTime::UNIX_EPOCH,
            target_domain_id: String::new(),
            target_domain_ids: BTreeSet::new(),
            target_workflow_id: String::new(),
            target_run_id: String::new(),
            target_child_workflow_only: false,
            task_list: String::new(),
            schedule_id: 0,
            record_visibility: false,
        }
    }
}

/// Timer-queue task; `visibility_timestamp` is the fire time and becomes the
/// row's `visibility_ts` in epoch milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerTask {
    pub run_id: String,
    pub task_id: i64,
    pub task_type: i32,
    pub timeout_type: i32,
    pub event_id: i64,
    pub schedule_attempt: i64,
    pub version: i64,
    pub visibility_timestamp: DateTime<Utc>,
}

impl Default for TimerTask {
    fn default() -> Self {
        Self {
            run_id: String::new(),
            task_id: 0,
            task_type: 0,
            timeout_type: 0,
            event_id: 0,
            schedule_attempt: 0,
            version: 0,
            visibility_timestamp: DateTime::UNIX_EPOCH,
        }
    }
}

/// Replication-queue task: ships a history range to remote clusters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplicationTask {
    pub run_id: String,
    pub task_id: i64,
    pub task_type: i32,
    pub first_event_id: i64,
    pub next_event_id: i64,
    pub version: i64,
    pub scheduled_id: i64,
    pub branch_token: Vec<u8>,
    pub new_run_branch_token: Vec<u8>,
    pub creation_time: DateTime<Utc>,
}

impl Default for ReplicationTask {
    fn default() -> Self {
        Self {
            run_id: String::new(),
            task_id: 0,
            task_type: 0,
            first_event_id: 0,
            next_event_id: 0,
            version: 0,
            scheduled_id: super::EMPTY_EVENT_ID,
            branch_token: Vec::new(),
            new_run_branch_token: Vec::new(),
            creation_time: DateTime::UNIX_EPOCH,
        }
    }
}

/// Cross-cluster task: a transfer-shaped payload addressed to a target
/// cluster. The target cluster name occupies the row's workflow-id key slot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrossClusterTask {
    pub target_cluster: String,
    pub task: TransferTask,
}
