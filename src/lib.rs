//! Wide-column persistence engine for durable workflow mutable state.
//!
//! Every transition of a workflow execution is serialized into one batch of
//! conditional writes against a single shard partition of the `executions`
//! table: the execution record, its sub-maps, queue task rows, the
//! current-execution pointer, and a shard-lease assertion. The batch applies
//! atomically or not at all; when the store refuses it, the transaction
//! executor reads back the losing row and classifies the failure.
//!
//! Layering, leaves first: [`driver`] (session/batch/iterator capability
//! traits), [`write`] (pure row encoders and composite batch writers),
//! [`txn`] (the conditional-transaction executor), and [`ExecutionStore`],
//! which wires a session and a validated [`StoreConfig`] into the two
//! business operations.

pub mod config;
pub mod driver;
pub mod error;
pub mod keys;
pub mod model;
pub mod txn;
pub mod write;

#[cfg(test)]
mod lib_tests;

use crate::driver::{Batch, Session};
use crate::model::{
    InsertWorkflowExecutionRequest, UpdateWorkflowExecutionRequest, WorkflowTasks,
};
use tracing::info;

pub use crate::config::StoreConfig;
pub use crate::error::{
    StoreError, StoreErrorCode, WorkflowExecutionAlreadyExists, WorkflowOperationConditionFailure,
};

/// Entry point binding a driver session to the batch writers and the
/// conditional-transaction executor. Stateless apart from configuration;
/// safe to share across tasks.
#[derive(Debug)]
pub struct ExecutionStore<S> {
    session: S,
    config: StoreConfig,
}

impl<S: Session> ExecutionStore<S> {
    pub fn new(session: S, config: StoreConfig) -> Result<Self, StoreError> {
        config.validate()?;
        info!(
            keyspace = %config.keyspace,
            batch_kind = ?config.batch_kind,
            max_batch_statements = config.max_batch_statements,
            "execution store configured"
        );
        Ok(Self { session, config })
    }

    pub fn session(&self) -> &S {
        &self.session
    }

    /// Starts a new run: current-workflow write, execution create with
    /// merge-created sub-maps, queue tasks, and the shard-lease assertion,
    /// applied as one conditional batch.
    pub async fn insert_workflow_execution(
        &self,
        request: &InsertWorkflowExecutionRequest,
    ) -> Result<(), StoreError> {
        let shard_id = request.shard.shard_id;
        let domain_id = request.execution.info.domain_id.as_str();
        let workflow_id = request.execution.info.workflow_id.as_str();

        let mut batch = self.session.new_batch(self.config.batch_kind);
        write::create_or_update_current_workflow(
            batch.as_mut(),
            shard_id,
            domain_id,
            workflow_id,
            &request.current_workflow,
        )?;
        write::create_workflow_execution_with_merge_maps(
            batch.as_mut(),
            shard_id,
            domain_id,
            workflow_id,
            &request.execution,
        )?;
        encode_tasks(batch.as_mut(), shard_id, domain_id, workflow_id, &request.tasks);
        write::assert_shard_range_id(batch.as_mut(), shard_id, request.shard.range_id);
        self.check_batch_bound(batch.len())?;

        txn::execute_create_workflow_batch_transaction(
            &self.session,
            batch,
            &request.current_workflow,
            Some(&request.execution),
            &request.shard,
        )
        .await
    }

    /// Transitions an existing run. Exactly one of `mutated_execution` and
    /// `reset_execution` drives the batch; an `inserted_execution`
    /// (continue-as-new) may only accompany a reset.
    pub async fn update_workflow_execution(
        &self,
        request: &UpdateWorkflowExecutionRequest,
    ) -> Result<(), StoreError> {
        let primary = match (&request.mutated_execution, &request.reset_execution) {
            (Some(mutated), None) => mutated,
            (None, Some(reset)) => reset,
            _ => {
                return Err(StoreError::Precondition(
                    "update requires exactly one of mutated_execution and reset_execution".into(),
                ));
            }
        };
        if request.inserted_execution.is_some() && request.reset_execution.is_none() {
            return Err(StoreError::Precondition(
                "inserted_execution requires reset_execution".into(),
            ));
        }
        let previous_next_event_id_condition =
            primary.previous_next_event_id_condition.unwrap_or_default();

        let shard_id = request.shard.shard_id;
        let domain_id = primary.info.domain_id.as_str();
        let workflow_id = primary.info.workflow_id.as_str();

        let mut batch = self.session.new_batch(self.config.batch_kind);
        write::create_or_update_current_workflow(
            batch.as_mut(),
            shard_id,
            domain_id,
            workflow_id,
            &request.current_workflow,
        )?;
        if let Some(mutated) = &request.mutated_execution {
            write::update_workflow_execution_and_event_buffer_with_merge_and_delete_maps(
                batch.as_mut(),
                shard_id,
                domain_id,
                workflow_id,
                mutated,
            )?;
        } else if let Some(reset) = &request.reset_execution {
            write::reset_workflow_execution_and_maps_and_event_buffer(
                batch.as_mut(),
                shard_id,
                domain_id,
                workflow_id,
                reset,
            )?;
            if let Some(inserted) = &request.inserted_execution {
                write::create_workflow_execution_with_merge_maps(
                    batch.as_mut(),
                    shard_id,
                    inserted.info.domain_id.as_str(),
                    inserted.info.workflow_id.as_str(),
                    inserted,
                )?;
            }
        }
        encode_tasks(batch.as_mut(), shard_id, domain_id, workflow_id, &request.tasks);
        write::assert_shard_range_id(batch.as_mut(), shard_id, request.shard.range_id);
        self.check_batch_bound(batch.len())?;

        txn::execute_update_workflow_batch_transaction(
            &self.session,
            batch,
            &request.current_workflow,
            previous_next_event_id_condition,
            &request.shard,
        )
        .await
    }

    fn check_batch_bound(&self, statements: usize) -> Result<(), StoreError> {
        if statements > self.config.max_batch_statements {
            return Err(StoreError::BatchTooLarge {
                statements,
                limit: self.config.max_batch_statements,
            });
        }
        Ok(())
    }
}

fn encode_tasks(
    batch: &mut dyn Batch,
    shard_id: i32,
    domain_id: &str,
    workflow_id: &str,
    tasks: &WorkflowTasks,
) {
    write::create_transfer_tasks(batch, shard_id, domain_id, workflow_id, &tasks.transfer);
    write::create_cross_cluster_tasks(
        batch,
        shard_id,
        domain_id,
        workflow_id,
        &tasks.cross_cluster,
    );
    write::create_timer_tasks(batch, shard_id, domain_id, workflow_id, &tasks.timer);
    write::create_replication_tasks(batch, shard_id, domain_id, workflow_id, &tasks.replication);
}
