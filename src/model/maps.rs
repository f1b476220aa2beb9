//! Records stored in the execution row's sub-map columns.

use super::execution::{DataBlob, Encoding};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Value of `activity_map`, keyed by schedule id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityInfo {
    pub version: i64,
    pub schedule_id: i64,
    pub scheduled_event_batch_id: i64,
    pub scheduled_event: Option<DataBlob>,
    pub scheduled_time: DateTime<Utc>,
    pub started_id: i64,
    pub started_event: Option<DataBlob>,
    pub started_time: DateTime<Utc>,
    pub activity_id: String,
    pub request_id: String,
    pub details: Vec<u8>,
    pub schedule_to_start_timeout: Duration,
    pub schedule_to_close_timeout: Duration,
    pub start_to_close_timeout: Duration,
    pub heartbeat_timeout: Duration,
    pub cancel_requested: bool,
    pub cancel_request_id: i64,
    pub last_heartbeat_updated_time: DateTime<Utc>,
    pub timer_task_status: i32,
    pub attempt: i32,
    pub task_list: String,
    pub started_identity: String,
    pub has_retry_policy: bool,
    pub initial_interval: Duration,
    pub backoff_coefficient: f64,
    pub maximum_interval: Duration,
    pub expiration_time: DateTime<Utc>,
    pub maximum_attempts: i32,
    pub non_retriable_errors: Vec<String>,
    pub last_failure_reason: String,
    pub last_worker_identity: String,
    pub last_failure_details: Vec<u8>,
}

impl Default for ActivityInfo {
    fn default() -> Self {
        Self {
            version: 0,
            schedule_id: 0,
            scheduled_event_batch_id: 0,
            scheduled_event: None,
            scheduled_time: DateTime::UNIX_EPOCH,
            started_id: 0,
            started_event: None,
            started_time: DateTime::UNIX_EPOCH,
            activity_id: String::new(),
            request_id: String::new(),
            details: Vec::new(),
            schedule_to_start_timeout: Duration::ZERO,
            schedule_to_close_timeout: Duration::ZERO,
            start_to_close_timeout: Duration::ZERO,
            heartbeat_timeout: Duration::ZERO,
            cancel_requested: false,
            cancel_request_id: 0,
            last_heartbeat_updated_time: DateTime::UNIX_EPOCH,
            timer_task_status: 0,
            attempt: 0,
            task_list: String::new(),
            started_identity: String::new(),
            has_retry_policy: false,
            initial_interval: Duration::ZERO,
            backoff_coefficient: 0.0,
            maximum_interval: Duration::ZERO,
            expiration_time: DateTime::UNIX_EPOCH,
            maximum_attempts: 0,
            non_retriable_errors: Vec::new(),
            last_failure_reason: String::new(),
            last_worker_identity: String::new(),
            last_failure_details: Vec::new(),
        }
    }
}

impl ActivityInfo {
    /// Codec of the attached event blobs; both blobs share one encoding.
    pub fn event_data_encoding(&self) -> Encoding {
        blob_encoding(&self.scheduled_event, &self.started_event)
    }
}

/// Value of `timer_map`, keyed by user timer id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerInfo {
    pub version: i64,
    pub timer_id: String,
    pub started_id: i64,
    pub expiry_time: DateTime<Utc>,
    /// Fire status of the backing timer task; stored in the `task_id` field
    /// of the timer-info column type.
    pub task_status: i64,
}

impl Default for TimerInfo {
    fn default() -> Self {
        Self {
            version: 0,
            timer_id: String::new(),
            started_id: 0,
            expiry_time: DateTime::UNIX_EPOCH,
            task_status: 0,
        }
    }
}

/// Value of `child_executions_map`, keyed by initiated id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChildExecutionInfo {
    pub version: i64,
    pub initiated_id: i64,
    pub initiated_event_batch_id: i64,
    pub initiated_event: Option<DataBlob>,
    pub started_id: i64,
    pub started_workflow_id: String,
    pub started_run_id: String,
    pub started_event: Option<DataBlob>,
    pub create_request_id: String,
    pub domain_id: String,
    pub domain_name: String,
    pub workflow_type_name: String,
    pub parent_close_policy: i32,
}

impl ChildExecutionInfo {
    pub fn event_data_encoding(&self) -> Encoding {
        blob_encoding(&self.initiated_event, &self.started_event)
    }
}

/// Value of `request_cancel_map`, keyed by initiated id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestCancelInfo {
    pub version: i64,
    pub initiated_id: i64,
    pub initiated_event_batch_id: i64,
    pub cancel_request_id: String,
}

/// Value of `signal_map`, keyed by initiated id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalInfo {
    pub version: i64,
    pub initiated_id: i64,
    pub initiated_event_batch_id: i64,
    pub request_id: String,
    pub name: String,
    pub input: Vec<u8>,
    pub control: Vec<u8>,
}

fn blob_encoding(first: &Option<DataBlob>, second: &Option<DataBlob>) -> Encoding {
    first
        .as_ref()
        .or(second.as_ref())
        .map(|blob| blob.encoding)
        .unwrap_or_default()
}
