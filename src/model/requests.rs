//! Request envelopes accepted by the composite writers and the store.

use super::execution::{Checksum, DataBlob, WorkflowExecutionInfo};
use super::maps::{ActivityInfo, ChildExecutionInfo, RequestCancelInfo, SignalInfo, TimerInfo};
use super::tasks::{CrossClusterTask, ReplicationTask, TimerTask, TransferTask};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// How the batch treats the buffered-events list of the execution row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EventBufferWriteMode {
    #[default]
    None,
    Append,
    Clear,
}

/// How the batch treats the six sub-map columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MapsWriteMode {
    #[default]
    Create,
    Update,
    Reset,
}

/// How the batch treats the current-execution pointer row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CurrentWorkflowWriteMode {
    #[default]
    Noop,
    Insert,
    Update,
}

/// Everything one execution row write needs: the mutable-state snapshot, the
/// optimistic-concurrency condition, and the sub-map deltas. Upsert maps are
/// ordered so encoder output is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkflowExecutionRequest {
    pub info: WorkflowExecutionInfo,
    pub last_write_version: i64,
    /// `IF next_event_id = ?` condition for update/reset batches.
    pub previous_next_event_id_condition: Option<i64>,
    pub version_histories: DataBlob,
    pub checksum: Checksum,
    pub event_buffer_write_mode: EventBufferWriteMode,
    pub maps_write_mode: MapsWriteMode,
    pub activity_infos: BTreeMap<i64, ActivityInfo>,
    pub delete_activity_infos: Vec<i64>,
    pub timer_infos: BTreeMap<String, TimerInfo>,
    pub delete_timer_infos: Vec<String>,
    pub child_execution_infos: BTreeMap<i64, ChildExecutionInfo>,
    pub delete_child_execution_infos: Vec<i64>,
    pub request_cancel_infos: BTreeMap<i64, RequestCancelInfo>,
    pub delete_request_cancel_infos: Vec<i64>,
    pub signal_infos: BTreeMap<i64, SignalInfo>,
    pub delete_signal_infos: Vec<i64>,
    pub signal_requested_ids: Vec<String>,
    pub delete_signal_requested_ids: Vec<String>,
    /// Appended to the buffered-events list under
    /// [`EventBufferWriteMode::Append`].
    pub new_buffered_event_batch: Option<DataBlob>,
}

/// Value columns of the current-execution pointer row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentWorkflowRow {
    pub run_id: String,
    pub create_request_id: String,
    pub state: i32,
    pub close_status: i32,
    pub last_write_version: i64,
}

/// CAS expectations for updating the current-execution pointer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentWorkflowWriteCondition {
    pub current_run_id: Option<String>,
    pub last_write_version: Option<i64>,
    pub state: Option<i32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentWorkflowWriteRequest {
    pub write_mode: CurrentWorkflowWriteMode,
    pub row: CurrentWorkflowRow,
    pub condition: Option<CurrentWorkflowWriteCondition>,
}

/// Shard-lease expectation attached to every create/update batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShardCondition {
    pub shard_id: i32,
    pub range_id: i64,
}

/// Queue tasks written alongside an execution transition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowTasks {
    pub transfer: Vec<TransferTask>,
    pub timer: Vec<TimerTask>,
    pub replication: Vec<ReplicationTask>,
    pub cross_cluster: Vec<CrossClusterTask>,
}

/// Store-level envelope for starting a new run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InsertWorkflowExecutionRequest {
    pub current_workflow: CurrentWorkflowWriteRequest,
    pub execution: WorkflowExecutionRequest,
    pub tasks: WorkflowTasks,
    pub shard: ShardCondition,
}

/// Store-level envelope for transitioning an existing run. Exactly one of
/// `mutated_execution` and `reset_execution` must be present;
/// `inserted_execution` (a continue-as-new run) may only accompany a reset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateWorkflowExecutionRequest {
    pub current_workflow: CurrentWorkflowWriteRequest,
    pub mutated_execution: Option<WorkflowExecutionRequest>,
    pub inserted_execution: Option<WorkflowExecutionRequest>,
    pub reset_execution: Option<WorkflowExecutionRequest>,
    pub tasks: WorkflowTasks,
    pub shard: ShardCondition,
}
