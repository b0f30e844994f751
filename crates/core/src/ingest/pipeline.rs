//! Background ingest pipeline.
//!
//! A single worker consumes the ingest bus. For each job it resolves the
//! default reference types by name, persists an instance and an item per
//! record, and drives the job state machine. A batch fails atomically:
//! the first error abandons the rest and the job retains the reason.

use std::sync::Arc;
use std::time::Instant;

use tokio::sync::{broadcast, mpsc, Mutex};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use super::bus::{IngestBus, IngestMessage};
use super::store::JobStore;
use super::types::{IngestBatch, IngestJob, JobState};
use crate::config::IngestConfig;
use crate::context::CallContext;
use crate::metrics::{INGEST_DURATION, INGEST_JOBS, INGEST_RECORDS};
use crate::reference::{ReferenceKind, ReferenceRecord, ReferenceResolver};
use crate::storage::{Instance, InstanceStorage, Item, ItemStatus, ItemStorage};

/// Handle to the running ingest pipeline.
pub struct IngestPipeline {
    store: Arc<JobStore>,
    bus: IngestBus,
    shutdown: broadcast::Sender<()>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl IngestPipeline {
    /// Spawn the worker and return the pipeline handle.
    pub fn start(
        store: Arc<JobStore>,
        items: Arc<dyn ItemStorage>,
        instances: Arc<dyn InstanceStorage>,
        resolver: Arc<dyn ReferenceResolver>,
        defaults: IngestConfig,
    ) -> Self {
        let (bus, rx) = IngestBus::new();
        let (shutdown, shutdown_rx) = broadcast::channel(1);

        let worker = IngestWorker {
            store: Arc::clone(&store),
            items,
            instances,
            resolver,
            defaults,
        };
        let handle = tokio::spawn(worker.run(rx, shutdown_rx));

        Self {
            store,
            bus,
            shutdown,
            handle: Mutex::new(Some(handle)),
        }
    }

    /// Accept a batch: create a job and hand it to the worker.
    pub async fn submit(&self, ctx: CallContext, batch: IngestBatch) -> IngestJob {
        let job = self.store.create().await;
        info!(job_id = %job.id, records = batch.records.len(), "ingest job accepted");

        let delivered = self.bus.publish(IngestMessage::Start {
            job_id: job.id.clone(),
            ctx,
            batch,
        });
        if !delivered {
            // Only happens during shutdown; the job stays Requested.
            warn!(job_id = %job.id, "ingest worker is gone, job will not run");
        }

        job
    }

    /// The job store backing this pipeline.
    pub fn store(&self) -> &Arc<JobStore> {
        &self.store
    }

    /// Stop the worker and wait for it to finish the current job.
    pub async fn stop(&self) {
        let _ = self.shutdown.send(());
        if let Some(handle) = self.handle.lock().await.take() {
            let _ = handle.await;
        }
    }
}

struct IngestWorker {
    store: Arc<JobStore>,
    items: Arc<dyn ItemStorage>,
    instances: Arc<dyn InstanceStorage>,
    resolver: Arc<dyn ReferenceResolver>,
    defaults: IngestConfig,
}

impl IngestWorker {
    async fn run(
        self,
        mut rx: mpsc::UnboundedReceiver<IngestMessage>,
        mut shutdown_rx: broadcast::Receiver<()>,
    ) {
        info!("ingest worker started");
        loop {
            tokio::select! {
                _ = shutdown_rx.recv() => {
                    info!("ingest worker stopping");
                    break;
                }
                message = rx.recv() => match message {
                    Some(IngestMessage::Start { job_id, ctx, batch }) => {
                        self.process(&job_id, &ctx, batch).await;
                    }
                    None => break,
                }
            }
        }
    }

    async fn process(&self, job_id: &str, ctx: &CallContext, batch: IngestBatch) {
        let started = Instant::now();

        if let Err(e) = self.store.transition(job_id, JobState::InProgress).await {
            error!(job_id, error = %e, "could not start ingest job");
            return;
        }

        match self.run_batch(ctx, &batch).await {
            Ok(count) => {
                if let Err(e) = self.store.transition(job_id, JobState::Completed).await {
                    error!(job_id, error = %e, "could not complete ingest job");
                    return;
                }
                INGEST_JOBS.with_label_values(&["completed"]).inc();
                INGEST_DURATION
                    .with_label_values(&["completed"])
                    .observe(started.elapsed().as_secs_f64());
                info!(job_id, records = count, "ingest job completed");
            }
            Err(reason) => {
                warn!(job_id, reason, "ingest job failed");
                if let Err(e) = self
                    .store
                    .transition(job_id, JobState::Failed { reason })
                    .await
                {
                    error!(job_id, error = %e, "could not fail ingest job");
                }
                INGEST_JOBS.with_label_values(&["failed"]).inc();
                INGEST_DURATION
                    .with_label_values(&["failed"])
                    .observe(started.elapsed().as_secs_f64());
            }
        }
    }

    /// Persist the whole batch, or report the first error.
    async fn run_batch(&self, ctx: &CallContext, batch: &IngestBatch) -> Result<usize, String> {
        let material_name = batch
            .material_type_name
            .as_deref()
            .unwrap_or(&self.defaults.default_material_type);
        let loan_name = batch
            .loan_type_name
            .as_deref()
            .unwrap_or(&self.defaults.default_loan_type);

        let material = self
            .resolve_default(ctx, ReferenceKind::MaterialType, material_name)
            .await?;
        let loan = self
            .resolve_default(ctx, ReferenceKind::LoanType, loan_name)
            .await?;

        for record in &batch.records {
            let instance = self
                .instances
                .create(
                    ctx,
                    &Instance {
                        id: None,
                        title: record.title.clone(),
                        source: Some("local".to_string()),
                    },
                )
                .await
                .map_err(|e| format!("creating instance \"{}\": {}", record.title, e))?;

            let item = Item {
                id: None,
                title: Some(record.title.clone()),
                barcode: record.barcode.clone(),
                instance_id: instance.id.clone(),
                status: Some(ItemStatus::available()),
                material_type_id: Some(material.id.clone()),
                permanent_loan_type_id: Some(loan.id.clone()),
                temporary_loan_type_id: None,
            };
            self.items
                .create(ctx, &item)
                .await
                .map_err(|e| format!("creating item \"{}\": {}", record.title, e))?;

            INGEST_RECORDS.inc();
        }

        Ok(batch.records.len())
    }

    async fn resolve_default(
        &self,
        ctx: &CallContext,
        kind: ReferenceKind,
        name: &str,
    ) -> Result<ReferenceRecord, String> {
        match self.resolver.find_by_name(ctx, kind, name).await {
            Ok(Some(record)) => Ok(record),
            Ok(None) => Err(format!("no {} named \"{}\"", kind.label(), name)),
            Err(e) => Err(format!("{} lookup for \"{}\" failed: {}", kind.label(), name, e)),
        }
    }
}
