//! Row encoders and composite batch writers for the execution partition.

mod composite;
mod execution;
mod maps;
pub mod statements;
mod tasks;

pub use composite::{
    create_workflow_execution_with_merge_maps, reset_workflow_execution_and_maps_and_event_buffer,
    update_workflow_execution_and_event_buffer_with_merge_and_delete_maps,
};
pub use execution::{
    append_buffered_events, assert_shard_range_id, create_or_update_current_workflow,
    create_workflow_execution, delete_buffered_events, update_workflow_execution,
};
pub use maps::{
    reset_activity_infos, reset_child_execution_infos, reset_request_cancel_infos,
    reset_signal_infos, reset_signals_requested, reset_timer_infos, update_activity_infos,
    update_child_execution_infos, update_request_cancel_infos, update_signal_infos,
    update_signals_requested, update_timer_infos,
};
pub use tasks::{
    create_cross_cluster_tasks, create_replication_tasks, create_timer_tasks,
    create_transfer_tasks,
};
