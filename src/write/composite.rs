//! Batch composition for the three execution-row operations.
//!
//! Each composite accepts exactly one `(EventBufferWriteMode, MapsWriteMode)`
//! pair and rejects everything else before a single row is encoded.

use super::execution::{
    append_buffered_events, create_workflow_execution, delete_buffered_events,
    update_workflow_execution,
};
use super::maps;
use crate::driver::Batch;
use crate::error::StoreError;
use crate::model::{EventBufferWriteMode, MapsWriteMode, WorkflowExecutionRequest};

/// First write of a run: inserts the execution row and merge-creates every
/// present sub-map entry. Requires `(None, Create)`.
pub fn create_workflow_execution_with_merge_maps(
    batch: &mut dyn Batch,
    shard_id: i32,
    domain_id: &str,
    workflow_id: &str,
    request: &WorkflowExecutionRequest,
) -> Result<(), StoreError> {
    if request.event_buffer_write_mode != EventBufferWriteMode::None {
        return Err(StoreError::Precondition(format!(
            "create workflow execution requires EventBufferWriteMode::None, got {:?}",
            request.event_buffer_write_mode
        )));
    }
    if request.maps_write_mode != MapsWriteMode::Create {
        return Err(StoreError::Precondition(format!(
            "create workflow execution requires MapsWriteMode::Create, got {:?}",
            request.maps_write_mode
        )));
    }

    create_workflow_execution(batch, shard_id, domain_id, workflow_id, request);
    let run_id = request.info.run_id.as_str();
    maps::update_activity_infos(
        batch,
        shard_id,
        domain_id,
        workflow_id,
        run_id,
        &request.activity_infos,
        &[],
    );
    maps::update_timer_infos(
        batch,
        shard_id,
        domain_id,
        workflow_id,
        run_id,
        &request.timer_infos,
        &[],
    );
    maps::update_child_execution_infos(
        batch,
        shard_id,
        domain_id,
        workflow_id,
        run_id,
        &request.child_execution_infos,
        &[],
    );
    maps::update_request_cancel_infos(
        batch,
        shard_id,
        domain_id,
        workflow_id,
        run_id,
        &request.request_cancel_infos,
        &[],
    );
    maps::update_signal_infos(
        batch,
        shard_id,
        domain_id,
        workflow_id,
        run_id,
        &request.signal_infos,
        &[],
    );
    maps::update_signals_requested(
        batch,
        shard_id,
        domain_id,
        workflow_id,
        run_id,
        &request.signal_requested_ids,
        &[],
    );
    Ok(())
}

/// Regular transition: overwrites the execution record under its
/// `next_event_id` lock, appends or clears the event buffer, and merges and
/// deletes individual sub-map entries. Requires `(Clear | Append, Update)`.
pub fn update_workflow_execution_and_event_buffer_with_merge_and_delete_maps(
    batch: &mut dyn Batch,
    shard_id: i32,
    domain_id: &str,
    workflow_id: &str,
    request: &WorkflowExecutionRequest,
) -> Result<(), StoreError> {
    if request.maps_write_mode != MapsWriteMode::Update {
        return Err(StoreError::Precondition(format!(
            "update workflow execution requires MapsWriteMode::Update, got {:?}",
            request.maps_write_mode
        )));
    }
    if request.event_buffer_write_mode == EventBufferWriteMode::None {
        return Err(StoreError::Precondition(
            "update workflow execution requires EventBufferWriteMode::Clear or Append".into(),
        ));
    }

    update_workflow_execution(batch, shard_id, domain_id, workflow_id, request);
    let run_id = request.info.run_id.as_str();
    match request.event_buffer_write_mode {
        EventBufferWriteMode::Clear => {
            delete_buffered_events(batch, shard_id, domain_id, workflow_id, run_id);
        }
        EventBufferWriteMode::Append => {
            if let Some(events) = &request.new_buffered_event_batch {
                append_buffered_events(batch, shard_id, domain_id, workflow_id, run_id, events);
            }
        }
        EventBufferWriteMode::None => unreachable!("rejected above"),
    }
    maps::update_activity_infos(
        batch,
        shard_id,
        domain_id,
        workflow_id,
        run_id,
        &request.activity_infos,
        &request.delete_activity_infos,
    );
    maps::update_timer_infos(
        batch,
        shard_id,
        domain_id,
        workflow_id,
        run_id,
        &request.timer_infos,
        &request.delete_timer_infos,
    );
    maps::update_child_execution_infos(
        batch,
        shard_id,
        domain_id,
        workflow_id,
        run_id,
        &request.child_execution_infos,
        &request.delete_child_execution_infos,
    );
    maps::update_request_cancel_infos(
        batch,
        shard_id,
        domain_id,
        workflow_id,
        run_id,
        &request.request_cancel_infos,
        &request.delete_request_cancel_infos,
    );
    maps::update_signal_infos(
        batch,
        shard_id,
        domain_id,
        workflow_id,
        run_id,
        &request.signal_infos,
        &request.delete_signal_infos,
    );
    maps::update_signals_requested(
        batch,
        shard_id,
        domain_id,
        workflow_id,
        run_id,
        &request.signal_requested_ids,
        &request.delete_signal_requested_ids,
    );
    Ok(())
}

/// History reset: overwrites the execution record, drops the event buffer and
/// replaces every sub-map wholesale (a reset statement is emitted even for an
/// empty replacement map). Requires `(Clear, Reset)`.
pub fn reset_workflow_execution_and_maps_and_event_buffer(
    batch: &mut dyn Batch,
    shard_id: i32,
    domain_id: &str,
    workflow_id: &str,
    request: &WorkflowExecutionRequest,
) -> Result<(), StoreError> {
    if request.event_buffer_write_mode != EventBufferWriteMode::Clear {
        return Err(StoreError::Precondition(format!(
            "reset workflow execution requires EventBufferWriteMode::Clear, got {:?}",
            request.event_buffer_write_mode
        )));
    }
    if request.maps_write_mode != MapsWriteMode::Reset {
        return Err(StoreError::Precondition(format!(
            "reset workflow execution requires MapsWriteMode::Reset, got {:?}",
            request.maps_write_mode
        )));
    }

    update_workflow_execution(batch, shard_id, domain_id, workflow_id, request);
    let run_id = request.info.run_id.as_str();
    delete_buffered_events(batch, shard_id, domain_id, workflow_id, run_id);
    maps::reset_activity_infos(
        batch,
        shard_id,
        domain_id,
        workflow_id,
        run_id,
        &request.activity_infos,
    );
    maps::reset_timer_infos(
        batch,
        shard_id,
        domain_id,
        workflow_id,
        run_id,
        &request.timer_infos,
    );
    maps::reset_child_execution_infos(
        batch,
        shard_id,
        domain_id,
        workflow_id,
        run_id,
        &request.child_execution_infos,
    );
    maps::reset_request_cancel_infos(
        batch,
        shard_id,
        domain_id,
        workflow_id,
        run_id,
        &request.request_cancel_infos,
    );
    maps::reset_signal_infos(
        batch,
        shard_id,
        domain_id,
        workflow_id,
        run_id,
        &request.signal_infos,
    );
    maps::reset_signals_requested(
        batch,
        shard_id,
        domain_id,
        workflow_id,
        run_id,
        &request.signal_requested_ids,
    );
    Ok(())
}
