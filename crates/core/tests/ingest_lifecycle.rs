//! End-to-end ingest pipeline tests against mock storage.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::sleep;

use inventory_core::testing::{fixtures, MockInstanceStorage, MockItemStorage, MockResolver};
use inventory_core::{
    CallContext, IngestConfig, IngestJob, IngestPipeline, JobState, JobStore, ReferenceKind,
    StorageError,
};

fn ctx() -> CallContext {
    CallContext::new("diku", "http://localhost:9130")
}

struct Harness {
    pipeline: IngestPipeline,
    store: Arc<JobStore>,
    items: Arc<MockItemStorage>,
    instances: Arc<MockInstanceStorage>,
    resolver: Arc<MockResolver>,
}

async fn harness() -> Harness {
    let store = Arc::new(JobStore::new());
    let items = Arc::new(MockItemStorage::new());
    let instances = Arc::new(MockInstanceStorage::new());
    let resolver = Arc::new(MockResolver::new());

    resolver
        .add_found(ReferenceKind::MaterialType, "mt-book", "Book")
        .await;
    resolver
        .add_found(ReferenceKind::LoanType, "lt-circ", "Can Circulate")
        .await;

    let items_dyn: Arc<dyn inventory_core::ItemStorage> =
        Arc::clone(&items) as Arc<dyn inventory_core::ItemStorage>;
    let instances_dyn: Arc<dyn inventory_core::InstanceStorage> =
        Arc::clone(&instances) as Arc<dyn inventory_core::InstanceStorage>;
    let resolver_dyn: Arc<dyn inventory_core::ReferenceResolver> =
        Arc::clone(&resolver) as Arc<dyn inventory_core::ReferenceResolver>;
    let pipeline = IngestPipeline::start(
        Arc::clone(&store),
        items_dyn,
        instances_dyn,
        resolver_dyn,
        IngestConfig::default(),
    );

    Harness {
        pipeline,
        store,
        items,
        instances,
        resolver,
    }
}

/// Poll the store until the job reaches a terminal state.
async fn wait_for_terminal(store: &JobStore, id: &str) -> IngestJob {
    for _ in 0..200 {
        let job = store.get(id).await.unwrap();
        if job.state.is_terminal() {
            return job;
        }
        sleep(Duration::from_millis(10)).await;
    }
    panic!("job {} did not reach a terminal state", id);
}

#[tokio::test]
async fn test_batch_completes_and_persists_records() {
    let h = harness().await;

    let job = h
        .pipeline
        .submit(ctx(), fixtures::ingest_batch(&["Small Island", "Refactoring"]))
        .await;
    assert_eq!(job.state, JobState::Requested);

    let job = wait_for_terminal(&h.store, &job.id).await;
    assert_eq!(job.state, JobState::Completed);

    let instances = h.instances.stored().await;
    let items = h.items.stored().await;
    assert_eq!(instances.len(), 2);
    assert_eq!(items.len(), 2);

    // each item links its instance and carries the resolved default types
    for (item, instance) in items.iter().zip(&instances) {
        assert_eq!(item.instance_id, instance.id);
        assert_eq!(item.material_type_id.as_deref(), Some("mt-book"));
        assert_eq!(item.permanent_loan_type_id.as_deref(), Some("lt-circ"));
        assert_eq!(item.title, Some(instance.title.clone()));
    }

    h.pipeline.stop().await;
}

#[tokio::test]
async fn test_batch_type_names_override_defaults() {
    let h = harness().await;
    h.resolver
        .add_found(ReferenceKind::MaterialType, "mt-journal", "Journal")
        .await;

    let mut batch = fixtures::ingest_batch(&["Nature vol. 634"]);
    batch.material_type_name = Some("Journal".to_string());

    let job = h.pipeline.submit(ctx(), batch).await;
    let job = wait_for_terminal(&h.store, &job.id).await;
    assert_eq!(job.state, JobState::Completed);

    let items = h.items.stored().await;
    assert_eq!(items[0].material_type_id.as_deref(), Some("mt-journal"));

    h.pipeline.stop().await;
}

#[tokio::test]
async fn test_unresolvable_default_type_fails_job() {
    let h = harness().await;

    let mut batch = fixtures::ingest_batch(&["Small Island"]);
    batch.loan_type_name = Some("Never Circulates".to_string());

    let job = h.pipeline.submit(ctx(), batch).await;
    let job = wait_for_terminal(&h.store, &job.id).await;

    match job.state {
        JobState::Failed { reason } => {
            assert!(reason.contains("Never Circulates"), "reason: {}", reason);
        }
        other => panic!("expected Failed, got {:?}", other),
    }

    // nothing was persisted
    assert!(h.items.stored().await.is_empty());
    assert!(h.instances.stored().await.is_empty());

    h.pipeline.stop().await;
}

#[tokio::test]
async fn test_storage_error_fails_job_and_abandons_batch() {
    let h = harness().await;

    // the first item create fails; the batch must stop there
    h.items
        .set_next_error(StorageError::Transport("connection refused".to_string()))
        .await;

    let job = h
        .pipeline
        .submit(ctx(), fixtures::ingest_batch(&["One", "Two", "Three"]))
        .await;
    let job = wait_for_terminal(&h.store, &job.id).await;

    match job.state {
        JobState::Failed { reason } => {
            assert!(reason.contains("connection refused"), "reason: {}", reason);
        }
        other => panic!("expected Failed, got {:?}", other),
    }

    // no item was stored and the remaining records were not attempted
    assert!(h.items.stored().await.is_empty());
    assert_eq!(h.instances.stored().await.len(), 1);

    h.pipeline.stop().await;
}

#[tokio::test]
async fn test_completed_job_refuses_further_transitions() {
    let h = harness().await;

    let job = h
        .pipeline
        .submit(ctx(), fixtures::ingest_batch(&["Small Island"]))
        .await;
    let job = wait_for_terminal(&h.store, &job.id).await;
    assert_eq!(job.state, JobState::Completed);

    let err = h
        .store
        .transition(
            &job.id,
            JobState::Failed {
                reason: "late".to_string(),
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        inventory_core::JobError::InvalidTransition { .. }
    ));

    h.pipeline.stop().await;
}

#[tokio::test]
async fn test_finished_jobs_are_retained() {
    let h = harness().await;
    assert!(h.store.is_empty().await);

    let first = h
        .pipeline
        .submit(ctx(), fixtures::ingest_batch(&["First"]))
        .await;
    let second = h
        .pipeline
        .submit(ctx(), fixtures::ingest_batch(&["Second"]))
        .await;

    wait_for_terminal(&h.store, &first.id).await;
    wait_for_terminal(&h.store, &second.id).await;

    // no eviction: terminal jobs stay queryable for the process lifetime
    assert_eq!(h.store.len().await, 2);
    assert_eq!(
        h.store.get(&first.id).await.unwrap().state,
        JobState::Completed
    );

    h.pipeline.stop().await;
}

#[tokio::test]
async fn test_jobs_are_processed_in_submission_order() {
    let h = harness().await;

    let first = h
        .pipeline
        .submit(ctx(), fixtures::ingest_batch(&["First"]))
        .await;
    let second = h
        .pipeline
        .submit(ctx(), fixtures::ingest_batch(&["Second"]))
        .await;

    let second_done = wait_for_terminal(&h.store, &second.id).await;
    assert_eq!(second_done.state, JobState::Completed);

    // the single consumer finished the earlier job before the later one
    let first_done = h.store.get(&first.id).await.unwrap();
    assert_eq!(first_done.state, JobState::Completed);
    assert!(first_done.updated_at <= second_done.updated_at);

    h.pipeline.stop().await;
}
