use std::sync::Arc;

use inventory_core::{
    CompositeCoordinator, Config, IngestPipeline, InstanceStorage, ItemStorage, JobStore,
};

/// Shared application state
pub struct AppState {
    config: Config,
    items: Arc<dyn ItemStorage>,
    instances: Arc<dyn InstanceStorage>,
    coordinator: CompositeCoordinator,
    pipeline: Arc<IngestPipeline>,
}

impl AppState {
    pub fn new(
        config: Config,
        items: Arc<dyn ItemStorage>,
        instances: Arc<dyn InstanceStorage>,
        coordinator: CompositeCoordinator,
        pipeline: Arc<IngestPipeline>,
    ) -> Self {
        Self {
            config,
            items,
            instances,
            coordinator,
            pipeline,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn items(&self) -> &dyn ItemStorage {
        self.items.as_ref()
    }

    pub fn instances(&self) -> &dyn InstanceStorage {
        self.instances.as_ref()
    }

    pub fn coordinator(&self) -> &CompositeCoordinator {
        &self.coordinator
    }

    pub fn pipeline(&self) -> &IngestPipeline {
        &self.pipeline
    }

    pub fn job_store(&self) -> &JobStore {
        self.pipeline.store()
    }
}
