use crate::driver::fake::FakeSession;
use crate::model::{
    CurrentWorkflowRow, CurrentWorkflowWriteMode, CurrentWorkflowWriteRequest,
    EventBufferWriteMode, InsertWorkflowExecutionRequest, MapsWriteMode, ShardCondition,
    TimerTask, UpdateWorkflowExecutionRequest, WorkflowExecutionInfo, WorkflowExecutionRequest,
    WorkflowTasks,
};
use crate::{ExecutionStore, StoreConfig, StoreError};

fn sample_execution(maps_write_mode: MapsWriteMode) -> WorkflowExecutionRequest {
    WorkflowExecutionRequest {
        info: WorkflowExecutionInfo {
            domain_id: "domain1".into(),
            workflow_id: "workflow1".into(),
            run_id: "runid1".into(),
            ..Default::default()
        },
        maps_write_mode,
        ..Default::default()
    }
}

fn insert_request() -> InsertWorkflowExecutionRequest {
    InsertWorkflowExecutionRequest {
        current_workflow: CurrentWorkflowWriteRequest {
            write_mode: CurrentWorkflowWriteMode::Insert,
            row: CurrentWorkflowRow {
                run_id: "runid1".into(),
                create_request_id: "createRequestID1".into(),
                ..Default::default()
            },
            condition: None,
        },
        execution: sample_execution(MapsWriteMode::Create),
        tasks: WorkflowTasks::default(),
        shard: ShardCondition {
            shard_id: 1000,
            range_id: 100,
        },
    }
}

#[test]
fn store_rejects_invalid_config() {
    let config = StoreConfig {
        max_batch_statements: 0,
        ..StoreConfig::default()
    };
    let err = ExecutionStore::new(FakeSession::applied(), config).unwrap_err();
    assert!(matches!(err, StoreError::InvalidConfig(_)));
}

#[tokio::test]
async fn insert_workflow_execution_composes_one_batch() {
    let store = ExecutionStore::new(FakeSession::applied(), StoreConfig::default()).unwrap();
    store
        .insert_workflow_execution(&insert_request())
        .await
        .unwrap();

    let queries = store.session().recorded_queries();
    // current-workflow insert + execution insert + shard-lease assertion
    assert_eq!(queries.len(), 3);
    assert!(queries[0].starts_with("INSERT INTO executions"));
    assert!(queries[2].contains("IF range_id = 100"));
    assert!(store.session().iter_was_closed());
}

#[tokio::test]
async fn insert_rejects_batches_over_the_configured_bound() {
    let config = StoreConfig {
        max_batch_statements: 2,
        ..StoreConfig::default()
    };
    let store = ExecutionStore::new(FakeSession::applied(), config).unwrap();
    let err = store
        .insert_workflow_execution(&insert_request())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        StoreError::BatchTooLarge {
            statements: 3,
            limit: 2
        }
    ));
    // Nothing was submitted, so no iterator was ever opened.
    assert!(!store.session().iter_was_closed());
}

fn mutated_execution() -> WorkflowExecutionRequest {
    let mut execution = sample_execution(MapsWriteMode::Update);
    execution.event_buffer_write_mode = EventBufferWriteMode::Clear;
    execution.previous_next_event_id_condition = Some(10);
    execution
}

#[tokio::test]
async fn update_workflow_execution_composes_one_batch() {
    let store = ExecutionStore::new(FakeSession::applied(), StoreConfig::default()).unwrap();
    let request = UpdateWorkflowExecutionRequest {
        mutated_execution: Some(mutated_execution()),
        tasks: WorkflowTasks {
            timer: vec![TimerTask {
                run_id: "runid1".into(),
                task_id: 1,
                ..Default::default()
            }],
            ..Default::default()
        },
        shard: ShardCondition {
            shard_id: 1000,
            range_id: 100,
        },
        ..Default::default()
    };
    store.update_workflow_execution(&request).await.unwrap();

    let queries = store.session().recorded_queries();
    // execution update + buffered-events clear + timer task + shard-lease assertion
    assert_eq!(queries.len(), 4);
    assert!(queries[0].contains("IF next_event_id = 10"));
    assert!(store.session().iter_was_closed());
}

#[tokio::test]
async fn update_requires_exactly_one_execution_variant() {
    let store = ExecutionStore::new(FakeSession::applied(), StoreConfig::default()).unwrap();

    let neither = UpdateWorkflowExecutionRequest::default();
    assert!(matches!(
        store.update_workflow_execution(&neither).await,
        Err(StoreError::Precondition(_))
    ));

    let both = UpdateWorkflowExecutionRequest {
        mutated_execution: Some(mutated_execution()),
        reset_execution: Some(mutated_execution()),
        ..Default::default()
    };
    assert!(matches!(
        store.update_workflow_execution(&both).await,
        Err(StoreError::Precondition(_))
    ));

    let inserted_without_reset = UpdateWorkflowExecutionRequest {
        mutated_execution: Some(mutated_execution()),
        inserted_execution: Some(sample_execution(MapsWriteMode::Create)),
        ..Default::default()
    };
    assert!(matches!(
        store
            .update_workflow_execution(&inserted_without_reset)
            .await,
        Err(StoreError::Precondition(_))
    ));
}

#[tokio::test]
async fn update_without_a_next_event_id_condition_locks_on_zero() {
    let store = ExecutionStore::new(FakeSession::applied(), StoreConfig::default()).unwrap();
    let mut execution = mutated_execution();
    execution.previous_next_event_id_condition = None;
    let request = UpdateWorkflowExecutionRequest {
        mutated_execution: Some(execution),
        ..Default::default()
    };
    store.update_workflow_execution(&request).await.unwrap();

    let queries = store.session().recorded_queries();
    assert!(queries[0].contains("IF next_event_id = 0"));
}

#[tokio::test]
async fn reset_with_continue_as_new_composes_both_executions() {
    let store = ExecutionStore::new(FakeSession::applied(), StoreConfig::default()).unwrap();
    let mut reset = sample_execution(MapsWriteMode::Reset);
    reset.event_buffer_write_mode = EventBufferWriteMode::Clear;
    reset.previous_next_event_id_condition = Some(5);
    let request = UpdateWorkflowExecutionRequest {
        current_workflow: CurrentWorkflowWriteRequest {
            write_mode: CurrentWorkflowWriteMode::Insert,
            row: CurrentWorkflowRow {
                run_id: "runid2".into(),
                ..Default::default()
            },
            condition: None,
        },
        reset_execution: Some(reset),
        inserted_execution: Some(sample_execution(MapsWriteMode::Create)),
        shard: ShardCondition {
            shard_id: 1000,
            range_id: 100,
        },
        ..Default::default()
    };
    store.update_workflow_execution(&request).await.unwrap();

    let queries = store.session().recorded_queries();
    // current-workflow insert + reset (execution, buffer clear, 6 map overwrites)
    // + inserted execution + shard-lease assertion
    assert_eq!(queries.len(), 11);
    assert!(store.session().iter_was_closed());
}
