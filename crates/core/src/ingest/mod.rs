//! Ingest job tracking and background processing.

mod bus;
mod pipeline;
mod store;
mod types;

pub use bus::{IngestBus, IngestMessage};
pub use pipeline::IngestPipeline;
pub use store::{JobError, JobStore};
pub use types::{IngestBatch, IngestJob, IngestRecord, JobState};
