//! Parameterized CQL templates for the `executions` table.
//!
//! Whitespace and field order in these templates are part of the stored-data
//! contract; the statement-snapshot tests render them with substituted
//! arguments and pin the result.

use std::sync::LazyLock;

/// Six-tuple primary key predicate shared by every single-row statement.
const KEY_PREDICATE: &str = "shard_id = ? and type = ? and domain_id = ? and workflow_id = ? \
     and run_id = ? and visibility_ts = ? and task_id = ?";

/// The `execution` column type; one placeholder per field.
const WORKFLOW_EXECUTION_TYPE: &str = "{domain_id: ?, workflow_id: ?, run_id: ?, first_run_id: ?, \
     parent_domain_id: ?, parent_workflow_id: ?, parent_run_id: ?, initiated_id: ?, \
     completion_event_batch_id: ?, completion_event: ?, completion_event_data_encoding: ?, \
     task_list: ?, workflow_type_name: ?, workflow_timeout: ?, decision_task_timeout: ?, \
     execution_context: ?, state: ?, close_status: ?, last_first_event_id: ?, \
     last_event_task_id: ?, next_event_id: ?, last_processed_event: ?, start_time: ?, \
     last_updated_time: ?, create_request_id: ?, signal_count: ?, history_size: ?, \
     decision_version: ?, decision_schedule_id: ?, decision_started_id: ?, \
     decision_request_id: ?, decision_timeout: ?, decision_attempt: ?, decision_timestamp: ?, \
     decision_scheduled_timestamp: ?, decision_original_scheduled_timestamp: ?, \
     cancel_requested: ?, cancel_request_id: ?, sticky_task_list: ?, \
     sticky_schedule_to_start_timeout: ?, client_library_version: ?, client_feature_version: ?, \
     client_impl: ?, auto_reset_points: ?, auto_reset_points_encoding: ?, attempt: ?, \
     has_retry_policy: ?, init_interval: ?, backoff_coefficient: ?, max_interval: ?, \
     expiration_time: ?, max_attempts: ?, non_retriable_errors: ?, event_store_version: ?, \
     branch_token: ?, cron_schedule: ?, expiration_seconds: ?, search_attributes: ?, memo: ?, \
     partition_config: ?}";

const CHECKSUM_TYPE: &str = "{version: ?, flavor: ?, value: ?}";

const CURRENT_WORKFLOW_TYPE: &str = "{run_id: ?, create_request_id: ?, state: ?, close_status: ?}";

const BUFFERED_EVENT_BATCH_TYPE: &str = "{encoding_type: ?, version: ?, data: ?}";

const TRANSFER_TASK_TYPE: &str = "{domain_id: ?, workflow_id: ?, run_id: ?, visibility_ts: ?, \
     task_id: ?, target_domain_id: ?, target_domain_ids: ?, target_workflow_id: ?, \
     target_run_id: ?, target_child_workflow_only: ?, task_list: ?, type: ?, schedule_id: ?, \
     record_visibility: ?, version: ?}";

const TIMER_TASK_TYPE: &str = "{domain_id: ?, workflow_id: ?, run_id: ?, visibility_ts: ?, \
     task_id: ?, type: ?, timeout_type: ?, event_id: ?, schedule_attempt: ?, version: ?}";

const REPLICATION_TASK_TYPE: &str = "{domain_id: ?, workflow_id: ?, run_id: ?, task_id: ?, \
     type: ?, first_event_id: ?, next_event_id: ?, version: ?, scheduled_id: ?, \
     event_store_version: ?, branch_token: ?, new_run_event_store_version: ?, \
     new_run_branch_token: ?, created_time: ?}";

const ACTIVITY_INFO_TYPE: &str = "{version: ?, schedule_id: ?, scheduled_event_batch_id: ?, \
     scheduled_event: ?, scheduled_time: ?, started_id: ?, started_event: ?, started_time: ?, \
     activity_id: ?, request_id: ?, details: ?, schedule_to_start_timeout: ?, \
     schedule_to_close_timeout: ?, start_to_close_timeout: ?, heart_beat_timeout: ?, \
     cancel_requested: ?, cancel_request_id: ?, last_hb_updated_time: ?, timer_task_status: ?, \
     attempt: ?, task_list: ?, started_identity: ?, has_retry_policy: ?, init_interval: ?, \
     backoff_coefficient: ?, max_interval: ?, expiration_time: ?, max_attempts: ?, \
     non_retriable_errors: ?, last_failure_reason: ?, last_worker_identity: ?, \
     last_failure_details: ?, event_data_encoding: ?}";

const TIMER_INFO_TYPE: &str =
    "{version: ?, timer_id: ?, started_id: ?, expiry_time: ?, task_id: ?}";

const CHILD_EXECUTION_INFO_TYPE: &str = "{version: ?, initiated_id: ?, \
     initiated_event_batch_id: ?, initiated_event: ?, started_id: ?, started_workflow_id: ?, \
     started_run_id: ?, started_event: ?, create_request_id: ?, event_data_encoding: ?, \
     domain_id: ?, domain_name: ?, workflow_type_name: ?, parent_close_policy: ?}";

const REQUEST_CANCEL_INFO_TYPE: &str =
    "{version: ?, initiated_id: ?, initiated_event_batch_id: ?, cancel_request_id: ?}";

const SIGNAL_INFO_TYPE: &str = "{version: ?, initiated_id: ?, initiated_event_batch_id: ?, \
     signal_request_id: ?, signal_name: ?, input: ?, control: ?}";

pub static CREATE_WORKFLOW_EXECUTION: LazyLock<String> = LazyLock::new(|| {
    format!(
        "INSERT INTO executions (shard_id, domain_id, workflow_id, run_id, type, execution, \
         next_event_id, visibility_ts, task_id, version_histories, version_histories_encoding, \
         checksum, workflow_last_write_version, workflow_state) \
         VALUES(?, ?, ?, ?, ?, {WORKFLOW_EXECUTION_TYPE}, ?, ?, ?, ?, ?, {CHECKSUM_TYPE}, ?, ?) \
         IF NOT EXISTS "
    )
});

pub static UPDATE_WORKFLOW_EXECUTION: LazyLock<String> = LazyLock::new(|| {
    format!(
        "UPDATE executions SET execution = {WORKFLOW_EXECUTION_TYPE}, next_event_id = ?, \
         version_histories = ?, version_histories_encoding = ?, checksum = {CHECKSUM_TYPE}, \
         workflow_last_write_version = ?, workflow_state = ? \
         WHERE {KEY_PREDICATE} IF next_event_id = ? "
    )
});

pub static INSERT_CURRENT_WORKFLOW: LazyLock<String> = LazyLock::new(|| {
    format!(
        "INSERT INTO executions (shard_id, type, domain_id, workflow_id, run_id, visibility_ts, \
         task_id, current_run_id, execution, workflow_last_write_version, workflow_state) \
         VALUES(?, ?, ?, ?, ?, ?, ?, ?, {CURRENT_WORKFLOW_TYPE}, ?, ?) \
         IF NOT EXISTS USING TTL 0 "
    )
});

pub static UPDATE_CURRENT_WORKFLOW: LazyLock<String> = LazyLock::new(|| {
    format!(
        "UPDATE executions USING TTL 0 SET current_run_id = ?, \
         execution = {CURRENT_WORKFLOW_TYPE}, workflow_last_write_version = ?, \
         workflow_state = ? WHERE {KEY_PREDICATE} IF current_run_id = ? "
    )
});

/// The further-constrained variant used when the caller also conditions on
/// the last write version.
pub static UPDATE_CURRENT_WORKFLOW_CHECK_LAST_WRITE_VERSION: LazyLock<String> =
    LazyLock::new(|| format!("{}and workflow_last_write_version = ? ", *UPDATE_CURRENT_WORKFLOW));

pub static ASSERT_SHARD_RANGE_ID: LazyLock<String> = LazyLock::new(|| {
    format!("UPDATE executions SET range_id = ? WHERE {KEY_PREDICATE} IF range_id = ? ")
});

pub static APPEND_BUFFERED_EVENTS: LazyLock<String> = LazyLock::new(|| {
    format!(
        "UPDATE executions SET buffered_events_list = buffered_events_list + \
         [{BUFFERED_EVENT_BATCH_TYPE}] WHERE {KEY_PREDICATE} "
    )
});

pub static DELETE_BUFFERED_EVENTS: LazyLock<String> = LazyLock::new(|| {
    format!("UPDATE executions SET buffered_events_list = [] WHERE {KEY_PREDICATE} ")
});

pub static CREATE_TRANSFER_TASK: LazyLock<String> = LazyLock::new(|| {
    format!(
        "INSERT INTO executions (shard_id, type, domain_id, workflow_id, run_id, transfer, \
         visibility_ts, task_id) VALUES(?, ?, ?, ?, ?, {TRANSFER_TASK_TYPE}, ?, ?) "
    )
});

pub static CREATE_CROSS_CLUSTER_TASK: LazyLock<String> = LazyLock::new(|| {
    format!(
        "INSERT INTO executions (shard_id, type, domain_id, workflow_id, run_id, cross_cluster, \
         visibility_ts, task_id) VALUES(?, ?, ?, ?, ?, {TRANSFER_TASK_TYPE}, ?, ?) "
    )
});

pub static CREATE_TIMER_TASK: LazyLock<String> = LazyLock::new(|| {
    format!(
        "INSERT INTO executions (shard_id, type, domain_id, workflow_id, run_id, timer, \
         visibility_ts, task_id) VALUES(?, ?, ?, ?, ?, {TIMER_TASK_TYPE}, ?, ?) "
    )
});

pub static CREATE_REPLICATION_TASK: LazyLock<String> = LazyLock::new(|| {
    format!(
        "INSERT INTO executions (shard_id, type, domain_id, workflow_id, run_id, replication, \
         visibility_ts, task_id) VALUES(?, ?, ?, ?, ?, {REPLICATION_TASK_TYPE}, ?, ?) "
    )
});

pub static UPDATE_ACTIVITY_INFO: LazyLock<String> = LazyLock::new(|| {
    format!(
        "UPDATE executions SET activity_map[ ? ] = {ACTIVITY_INFO_TYPE} WHERE {KEY_PREDICATE} "
    )
});

pub static DELETE_ACTIVITY_INFO: LazyLock<String> = LazyLock::new(|| {
    format!("DELETE activity_map[ ? ] FROM executions WHERE {KEY_PREDICATE} ")
});

pub static RESET_ACTIVITY_MAP: LazyLock<String> =
    LazyLock::new(|| format!("UPDATE executions SET activity_map = ? WHERE {KEY_PREDICATE} "));

pub static UPDATE_TIMER_INFO: LazyLock<String> = LazyLock::new(|| {
    format!("UPDATE executions SET timer_map[ ? ] = {TIMER_INFO_TYPE} WHERE {KEY_PREDICATE} ")
});

pub static DELETE_TIMER_INFO: LazyLock<String> =
    LazyLock::new(|| format!("DELETE timer_map[ ? ] FROM executions WHERE {KEY_PREDICATE} "));

pub static RESET_TIMER_MAP: LazyLock<String> =
    LazyLock::new(|| format!("UPDATE executions SET timer_map = ? WHERE {KEY_PREDICATE} "));

pub static UPDATE_CHILD_EXECUTION_INFO: LazyLock<String> = LazyLock::new(|| {
    format!(
        "UPDATE executions SET child_executions_map[ ? ] = {CHILD_EXECUTION_INFO_TYPE} \
         WHERE {KEY_PREDICATE} "
    )
});

pub static DELETE_CHILD_EXECUTION_INFO: LazyLock<String> = LazyLock::new(|| {
    format!("DELETE child_executions_map[ ? ] FROM executions WHERE {KEY_PREDICATE} ")
});

pub static RESET_CHILD_EXECUTION_MAP: LazyLock<String> = LazyLock::new(|| {
    format!("UPDATE executions SET child_executions_map = ? WHERE {KEY_PREDICATE} ")
});

pub static UPDATE_REQUEST_CANCEL_INFO: LazyLock<String> = LazyLock::new(|| {
    format!(
        "UPDATE executions SET request_cancel_map[ ? ] = {REQUEST_CANCEL_INFO_TYPE} \
         WHERE {KEY_PREDICATE} "
    )
});

pub static DELETE_REQUEST_CANCEL_INFO: LazyLock<String> = LazyLock::new(|| {
    format!("DELETE request_cancel_map[ ? ] FROM executions WHERE {KEY_PREDICATE} ")
});

pub static RESET_REQUEST_CANCEL_MAP: LazyLock<String> = LazyLock::new(|| {
    format!("UPDATE executions SET request_cancel_map = ? WHERE {KEY_PREDICATE} ")
});

pub static UPDATE_SIGNAL_INFO: LazyLock<String> = LazyLock::new(|| {
    format!("UPDATE executions SET signal_map[ ? ] = {SIGNAL_INFO_TYPE} WHERE {KEY_PREDICATE} ")
});

pub static DELETE_SIGNAL_INFO: LazyLock<String> =
    LazyLock::new(|| format!("DELETE signal_map[ ? ] FROM executions WHERE {KEY_PREDICATE} "));

pub static RESET_SIGNAL_MAP: LazyLock<String> =
    LazyLock::new(|| format!("UPDATE executions SET signal_map = ? WHERE {KEY_PREDICATE} "));

pub static ADD_SIGNAL_REQUESTED: LazyLock<String> = LazyLock::new(|| {
    format!(
        "UPDATE executions SET signal_requested = signal_requested + ? WHERE {KEY_PREDICATE} "
    )
});

pub static REMOVE_SIGNAL_REQUESTED: LazyLock<String> = LazyLock::new(|| {
    format!(
        "UPDATE executions SET signal_requested = signal_requested - ? WHERE {KEY_PREDICATE} "
    )
});

pub static RESET_SIGNAL_REQUESTED: LazyLock<String> =
    LazyLock::new(|| format!("UPDATE executions SET signal_requested = ? WHERE {KEY_PREDICATE} "));
