use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

/// Event id placeholder for "no event".
pub const EMPTY_EVENT_ID: i64 = -23;
/// Version placeholder for "no failover version recorded".
pub const EMPTY_VERSION: i64 = -24;
/// Event store generation written into task and execution records.
pub const EVENT_STORE_VERSION: i64 = 2;

pub const WORKFLOW_STATE_CREATED: i32 = 0;
pub const WORKFLOW_STATE_RUNNING: i32 = 1;
pub const WORKFLOW_STATE_COMPLETED: i32 = 2;
pub const WORKFLOW_STATE_ZOMBIE: i32 = 3;
pub const WORKFLOW_STATE_CORRUPTED: i32 = 4;

pub const WORKFLOW_CLOSE_STATUS_NONE: i32 = 0;
pub const WORKFLOW_CLOSE_STATUS_COMPLETED: i32 = 1;
pub const WORKFLOW_CLOSE_STATUS_FAILED: i32 = 2;
pub const WORKFLOW_CLOSE_STATUS_CANCELED: i32 = 3;
pub const WORKFLOW_CLOSE_STATUS_TERMINATED: i32 = 4;
pub const WORKFLOW_CLOSE_STATUS_CONTINUED_AS_NEW: i32 = 5;
pub const WORKFLOW_CLOSE_STATUS_TIMED_OUT: i32 = 6;

/// Serialization format of an opaque history blob.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Encoding {
    #[default]
    Unspecified,
    ThriftRw,
    Json,
    Proto3,
}

impl Encoding {
    pub fn as_str(self) -> &'static str {
        match self {
            Encoding::Unspecified => "",
            Encoding::ThriftRw => "thriftrw",
            Encoding::Json => "json",
            Encoding::Proto3 => "proto3",
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Opaque encoded payload plus the codec that produced it. The engine never
/// looks inside.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataBlob {
    pub encoding: Encoding,
    pub data: Vec<u8>,
}

impl DataBlob {
    pub fn new(encoding: Encoding, data: Vec<u8>) -> Self {
        Self { encoding, data }
    }
}

/// Mutable-state integrity checksum stored alongside the execution record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checksum {
    pub version: i32,
    pub flavor: i32,
    pub value: Vec<u8>,
}

/// The full mutable-state snapshot written into the `execution` column.
/// Field order here has no bearing on the wire; the statement template fixes
/// the stored field order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowExecutionInfo {
    pub domain_id: String,
    pub workflow_id: String,
    pub run_id: String,
    pub first_run_id: String,
    pub parent_domain_id: String,
    pub parent_workflow_id: String,
    pub parent_run_id: String,
    pub initiated_id: i64,
    pub completion_event_batch_id: i64,
    pub completion_event: Option<DataBlob>,
    pub task_list: String,
    pub workflow_type_name: String,
    pub workflow_timeout: Duration,
    pub decision_task_timeout: Duration,
    pub execution_context: Vec<u8>,
    pub state: i32,
    pub close_status: i32,
    pub last_first_event_id: i64,
    pub last_event_task_id: i64,
    pub next_event_id: i64,
    pub last_processed_event: i64,
    pub start_timestamp: DateTime<Utc>,
    pub last_updated_timestamp: DateTime<Utc>,
    pub create_request_id: String,
    pub signal_count: i32,
    pub history_size: i64,
    pub decision_version: i64,
    pub decision_schedule_id: i64,
    pub decision_started_id: i64,
    pub decision_request_id: String,
    pub decision_timeout: Duration,
    pub decision_attempt: i64,
    pub decision_started_timestamp: DateTime<Utc>,
    pub decision_scheduled_timestamp: DateTime<Utc>,
    pub decision_original_scheduled_timestamp: DateTime<Utc>,
    pub cancel_requested: bool,
    pub cancel_request_id: String,
    pub sticky_task_list: String,
    pub sticky_schedule_to_start_timeout: Duration,
    pub client_library_version: String,
    pub client_feature_version: String,
    pub client_impl: String,
    pub auto_reset_points: Option<DataBlob>,
    pub attempt: i32,
    pub has_retry_policy: bool,
    pub initial_interval: Duration,
    pub backoff_coefficient: f64,
    pub maximum_interval: Duration,
    pub expiration_time: DateTime<Utc>,
    pub maximum_attempts: i32,
    pub non_retriable_errors: Vec<String>,
    pub branch_token: Vec<u8>,
    pub cron_schedule: String,
    pub expiration_interval: Duration,
    pub search_attributes: BTreeMap<String, Vec<u8>>,
    pub memo: BTreeMap<String, Vec<u8>>,
    pub partition_config: BTreeMap<String, String>,
}

impl Default for WorkflowExecutionInfo {
    fn default() -> Self {
        Self {
            domain_id: String::new(),
            workflow_id: String::new(),
            run_id: String::new(),
            first_run_id: String::new(),
            parent_domain_id: String::new(),
            parent_workflow_id: String::new(),
            parent_run_id: String::new(),
            initiated_id: 0,
            completion_event_batch_id: 0,
            completion_event: None,
            task_list: String::new(),
            workflow_type_name: String::new(),
            workflow_timeout: Duration::ZERO,
            decision_task_timeout: Duration::ZERO,
            execution_context: Vec::new(),
            state: WORKFLOW_STATE_CREATED,
            close_status: WORKFLOW_CLOSE_STATUS_NONE,
            last_first_event_id: 0,
            last_event_task_id: 0,
            next_event_id: 0,
            last_processed_event: 0,
            start_timestamp: DateTime::UNIX_EPOCH,
            last_updated_timestamp: DateTime::UNIX_EPOCH,
            create_request_id: String::new(),
            signal_count: 0,
            history_size: 0,
            decision_version: 0,
            decision_schedule_id: 0,
            decision_started_id: 0,
            decision_request_id: String::new(),
            decision_timeout: Duration::ZERO,
            decision_attempt: 0,
            decision_started_timestamp: DateTime::UNIX_EPOCH,
            decision_scheduled_timestamp: DateTime::UNIX_EPOCH,
            decision_original_scheduled_timestamp: DateTime::UNIX_EPOCH,
            cancel_requested: false,
            cancel_request_id: String::new(),
            sticky_task_list: String::new(),
            sticky_schedule_to_start_timeout: Duration::ZERO,
            client_library_version: String::new(),
            client_feature_version: String::new(),
            client_impl: String::new(),
            auto_reset_points: None,
            attempt: 0,
            has_retry_policy: false,
            initial_interval: Duration::ZERO,
            backoff_coefficient: 0.0,
            maximum_interval: Duration::ZERO,
            expiration_time: DateTime::UNIX_EPOCH,
            maximum_attempts: 0,
            non_retriable_errors: Vec::new(),
            branch_token: Vec::new(),
            cron_schedule: String::new(),
            expiration_interval: Duration::ZERO,
            search_attributes: BTreeMap::new(),
            memo: BTreeMap::new(),
            partition_config: BTreeMap::new(),
        }
    }
}
