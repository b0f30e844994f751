//! In-process ingest message bus.
//!
//! A thin wrapper over an unbounded mpsc channel: many publishers, one
//! consumer, each message delivered at most once. Nothing survives a
//! restart; durability is out of scope.

use tokio::sync::mpsc;

use super::types::IngestBatch;
use crate::context::CallContext;

/// Messages carried by the bus.
#[derive(Debug)]
pub enum IngestMessage {
    /// Start processing the batch for the given job.
    Start {
        job_id: String,
        ctx: CallContext,
        batch: IngestBatch,
    },
}

/// Publisher handle for the ingest bus.
#[derive(Clone)]
pub struct IngestBus {
    tx: mpsc::UnboundedSender<IngestMessage>,
}

impl IngestBus {
    /// Create a bus and the single consumer end.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<IngestMessage>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Publish a message. Returns false if the consumer is gone.
    pub fn publish(&self, message: IngestMessage) -> bool {
        self.tx.send(message).is_ok()
    }
}
