pub mod composite;
pub mod config;
pub mod context;
pub mod ingest;
pub mod metrics;
pub mod reference;
pub mod storage;
pub mod testing;

pub use composite::{CompositeCoordinator, CompositeItem, CompositeItemPage};
pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, IngestConfig,
    ServerConfig, StorageConfig,
};
pub use context::{CallContext, TENANT_HEADER, TOKEN_HEADER, URL_HEADER};
pub use ingest::{
    IngestBatch, IngestJob, IngestPipeline, IngestRecord, JobError, JobState, JobStore,
};
pub use reference::{
    HttpReferenceResolver, ReferenceKind, ReferenceRecord, ReferenceResolver, Resolution,
};
pub use storage::{
    ensure_unique_barcode, HttpInstanceStorage, HttpItemStorage, Instance, InstancePage,
    InstanceStorage, Item, ItemPage, ItemStatus, ItemStorage, StorageError,
};
