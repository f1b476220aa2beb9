//! Encoders for the execution row's sub-map columns.
//!
//! Each sub-map has an *update* encoder (one upsert statement per entry plus
//! one delete per removed key) and a *reset* encoder (a single whole-map
//! overwrite). Upsert maps are ordered, so the emitted statement sequence is
//! deterministic for a given input.

use super::execution::{blob_data, seconds};
use super::statements;
use crate::driver::{Batch, CqlMapKey, CqlValue};
use crate::keys::{
    DEFAULT_VISIBILITY_TIMESTAMP_MS, EXECUTION_ROW_TASK_ID, RowType, run_id_or_empty_sentinel,
};
use crate::model::{ActivityInfo, ChildExecutionInfo, RequestCancelInfo, SignalInfo, TimerInfo};
use std::collections::BTreeMap;

fn row_key(shard_id: i32, domain_id: &str, workflow_id: &str, run_id: &str) -> Vec<CqlValue> {
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

fn activity_info_fields(info: &ActivityInfo) -> Vec<(&'static str, CqlValue)> {
    vec![
        ("version", CqlValue::Int(info.version)),
        ("schedule_id", CqlValue::Int(info.schedule_id)),
        (
            "scheduled_event_batch_id",
            CqlValue::Int(info.scheduled_event_batch_id),
        ),
        ("scheduled_event", blob_data(&info.scheduled_event)),
        ("scheduled_time", CqlValue::Timestamp(info.scheduled_time)),
        ("started_id", CqlValue::Int(info.started_id)),
        ("started_event", blob_data(&info.started_event)),
        ("started_time", CqlValue::Timestamp(info.started_time)),
        ("activity_id", CqlValue::Text(info.activity_id.clone())),
        ("request_id", CqlValue::Text(info.request_id.clone())),
        ("details", CqlValue::Blob(info.details.clone())),
        (
            "schedule_to_start_timeout",
            seconds(info.schedule_to_start_timeout),
        ),
        (
            "schedule_to_close_timeout",
            seconds(info.schedule_to_close_timeout),
        ),
        (
            "start_to_close_timeout",
            seconds(info.start_to_close_timeout),
        ),
        ("heart_beat_timeout", seconds(info.heartbeat_timeout)),
        ("cancel_requested", CqlValue::Bool(info.cancel_requested)),
        ("cancel_request_id", CqlValue::Int(info.cancel_request_id)),
        (
            "last_hb_updated_time",
            CqlValue::Timestamp(info.last_heartbeat_updated_time),
        ),
        (
            "timer_task_status",
            CqlValue::Int(info.timer_task_status as i64),
        ),
        ("attempt", CqlValue::Int(info.attempt as i64)),
        ("task_list", CqlValue::Text(info.task_list.clone())),
        (
            "started_identity",
            CqlValue::Text(info.started_identity.clone()),
        ),
        ("has_retry_policy", CqlValue::Bool(info.has_retry_policy)),
        ("init_interval", seconds(info.initial_interval)),
        (
            "backoff_coefficient",
            CqlValue::Double(info.backoff_coefficient),
        ),
        ("max_interval", seconds(info.maximum_interval)),
        ("expiration_time", CqlValue::Timestamp(info.expiration_time)),
        ("max_attempts", CqlValue::Int(info.maximum_attempts as i64)),
        (
            "non_retriable_errors",
            CqlValue::List(
                info.non_retriable_errors
                    .iter()
                    .cloned()
                    .map(CqlValue::Text)
                    .collect(),
            ),
        ),
        (
            "last_failure_reason",
            CqlValue::Text(info.last_failure_reason.clone()),
        ),
        (
            "last_worker_identity",
            CqlValue::Text(info.last_worker_identity.clone()),
        ),
        (
            "last_failure_details",
            CqlValue::Blob(info.last_failure_details.clone()),
        ),
        (
            "event_data_encoding",
            CqlValue::Text(info.event_data_encoding().as_str().to_owned()),
        ),
    ]
}

fn timer_info_fields(info: &TimerInfo) -> Vec<(&'static str, CqlValue)> {
    vec![
        ("version", CqlValue::Int(info.version)),
        ("timer_id", CqlValue::Text(info.timer_id.clone())),
        ("started_id", CqlValue::Int(info.started_id)),
        ("expiry_time", CqlValue::Timestamp(info.expiry_time)),
        ("task_id", CqlValue::Int(info.task_status)),
    ]
}

fn child_execution_info_fields(info: &ChildExecutionInfo) -> Vec<(&'static str, CqlValue)> {
    vec![
        ("version", CqlValue::Int(info.version)),
        ("initiated_id", CqlValue::Int(info.initiated_id)),
        (
            "initiated_event_batch_id",
            CqlValue::Int(info.initiated_event_batch_id),
        ),
        ("initiated_event", blob_data(&info.initiated_event)),
        ("started_id", CqlValue::Int(info.started_id)),
        (
            "started_workflow_id",
            CqlValue::Text(info.started_workflow_id.clone()),
        ),
        (
            "started_run_id",
            CqlValue::Text(run_id_or_empty_sentinel(&info.started_run_id).to_owned()),
        ),
        ("started_event", blob_data(&info.started_event)),
        (
            "create_request_id",
            CqlValue::Text(info.create_request_id.clone()),
        ),
        (
            "event_data_encoding",
            CqlValue::Text(info.event_data_encoding().as_str().to_owned()),
        ),
        ("domain_id", CqlValue::Text(info.domain_id.clone())),
        ("domain_name", CqlValue::Text(info.domain_name.clone())),
        (
            "workflow_type_name",
            CqlValue::Text(info.workflow_type_name.clone()),
        ),
        (
            "parent_close_policy",
            CqlValue::Int(info.parent_close_policy as i64),
        ),
    ]
}

fn request_cancel_info_fields(info: &RequestCancelInfo) -> Vec<(&'static str, CqlValue)> {
    vec![
        ("version", CqlValue::Int(info.version)),
        ("initiated_id", CqlValue::Int(info.initiated_id)),
        (
            "initiated_event_batch_id",
            CqlValue::Int(info.initiated_event_batch_id),
        ),
        (
            "cancel_request_id",
            CqlValue::Text(info.cancel_request_id.clone()),
        ),
    ]
}

fn signal_info_fields(info: &SignalInfo) -> Vec<(&'static str, CqlValue)> {
    vec![
        ("version", CqlValue::Int(info.version)),
        ("initiated_id", CqlValue::Int(info.initiated_id)),
        (
            "initiated_event_batch_id",
            CqlValue::Int(info.initiated_event_batch_id),
        ),
        ("signal_request_id", CqlValue::Text(info.request_id.clone())),
        ("signal_name", CqlValue::Text(info.name.clone())),
        ("input", CqlValue::Blob(info.input.clone())),
        ("control", CqlValue::Blob(info.control.clone())),
    ]
}

fn field_values(fields: Vec<(&'static str, CqlValue)>) -> Vec<CqlValue> {
    fields.into_iter().map(|(_, value)| value).collect()
}

macro_rules! submap_encoders {
    (
        $update_fn:ident, $reset_fn:ident, $info_ty:ty, $key_ty:ty, $key_value:expr,
        $fields_fn:ident, $update_tmpl:ident, $delete_tmpl:ident, $reset_tmpl:ident
    ) => {
        pub fn $update_fn(
            batch: &mut dyn Batch,
            shard_id: i32,
            domain_id: &str,
            workflow_id: &str,
            run_id: &str,
            upserts: &BTreeMap<$key_ty, $info_ty>,
            deletes: &[$key_ty],
        ) {
            for (key, info) in upserts {
                let mut args = vec![$key_value(key)];
                args.extend(field_values($fields_fn(info)));
                args.extend(row_key(shard_id, domain_id, workflow_id, run_id));
                batch.add_query(&statements::$update_tmpl, args);
            }
            for key in deletes {
                let mut args = vec![$key_value(key)];
                args.extend(row_key(shard_id, domain_id, workflow_id, run_id));
                batch.add_query(&statements::$delete_tmpl, args);
            }
        }

        pub fn $reset_fn(
            batch: &mut dyn Batch,
            shard_id: i32,
            domain_id: &str,
            workflow_id: &str,
            run_id: &str,
            entries: &BTreeMap<$key_ty, $info_ty>,
        ) {
            let value = CqlValue::Map(
                entries
                    .iter()
                    .map(|(key, info)| (map_key(key), CqlValue::Udt($fields_fn(info))))
                    .collect(),
            );
            let mut args = vec![value];
            args.extend(row_key(shard_id, domain_id, workflow_id, run_id));
            batch.add_query(&statements::$reset_tmpl, args);
        }
    };
}

trait AsMapKey {
    fn as_map_key(&self) -> CqlMapKey;
}

impl AsMapKey for i64 {
    fn as_map_key(&self) -> CqlMapKey {
        CqlMapKey::Int(*self)
    }
}

impl AsMapKey for String {
    fn as_map_key(&self) -> CqlMapKey {
        CqlMapKey::Text(self.clone())
    }
}

fn map_key<K: AsMapKey>(key: &K) -> CqlMapKey {
    key.as_map_key()
}

fn int_key(key: &i64) -> CqlValue {
    CqlValue::Int(*key)
}

fn text_key(key: &String) -> CqlValue {
    CqlValue::Text(key.clone())
}

submap_encoders!(
    update_activity_infos,
    reset_activity_infos,
    ActivityInfo,
    i64,
    int_key,
    activity_info_fields,
    UPDATE_ACTIVITY_INFO,
    DELETE_ACTIVITY_INFO,
    RESET_ACTIVITY_MAP
);

submap_encoders!(
    update_timer_infos,
    reset_timer_infos,
    TimerInfo,
    String,
    text_key,
    timer_info_fields,
    UPDATE_TIMER_INFO,
    DELETE_TIMER_INFO,
    RESET_TIMER_MAP
);

submap_encoders!(
    update_child_execution_infos,
    reset_child_execution_infos,
    ChildExecutionInfo,
    i64,
    int_key,
    child_execution_info_fields,
    UPDATE_CHILD_EXECUTION_INFO,
    DELETE_CHILD_EXECUTION_INFO,
    RESET_CHILD_EXECUTION_MAP
);

submap_encoders!(
    update_request_cancel_infos,
    reset_request_cancel_infos,
    RequestCancelInfo,
    i64,
    int_key,
    request_cancel_info_fields,
    UPDATE_REQUEST_CANCEL_INFO,
    DELETE_REQUEST_CANCEL_INFO,
    RESET_REQUEST_CANCEL_MAP
);

submap_encoders!(
    update_signal_infos,
    reset_signal_infos,
    SignalInfo,
    i64,
    int_key,
    signal_info_fields,
    UPDATE_SIGNAL_INFO,
    DELETE_SIGNAL_INFO,
    RESET_SIGNAL_MAP
);

/// Set-add and set-subtract on `signal_requested`, each emitted only when
/// its id list is non-empty.
pub fn update_signals_requested(
    batch: &mut dyn Batch,
    shard_id: i32,
    domain_id: &str,
    workflow_id: &str,
    run_id: &str,
    add_ids: &[String],
    remove_ids: &[String],
) {
    if !add_ids.is_empty() {
        let mut args = vec![CqlValue::List(
            add_ids.iter().cloned().map(CqlValue::Text).collect(),
        )];
        args.extend(row_key(shard_id, domain_id, workflow_id, run_id));
        batch.add_query(&statements::ADD_SIGNAL_REQUESTED, args);
    }
    if !remove_ids.is_empty() {
        let mut args = vec![CqlValue::List(
            remove_ids.iter().cloned().map(CqlValue::Text).collect(),
        )];
        args.extend(row_key(shard_id, domain_id, workflow_id, run_id));
        batch.add_query(&statements::REMOVE_SIGNAL_REQUESTED, args);
    }
}

/// Overwrites `signal_requested` with exactly the provided ids.
pub fn reset_signals_requested(
    batch: &mut dyn Batch,
    shard_id: i32,
    domain_id: &str,
    workflow_id: &str,
    run_id: &str,
    ids: &[String],
) {
    let mut args = vec![CqlValue::List(
        ids.iter().cloned().map(CqlValue::Text).collect(),
    )];
    args.extend(row_key(shard_id, domain_id, workflow_id, run_id));
    batch.add_query(&statements::RESET_SIGNAL_REQUESTED, args);
}
