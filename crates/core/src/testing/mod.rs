//! Testing utilities and mock implementations.
//!
//! This module provides mock implementations of the storage and resolver
//! traits, allowing pipeline and API testing without real storage modules.

mod mock_resolver;
mod mock_storage;

pub use mock_resolver::MockResolver;
pub use mock_storage::{MockInstanceStorage, MockItemStorage};

/// Test fixtures and helper functions.
pub mod fixtures {
    use crate::ingest::{IngestBatch, IngestRecord};
    use crate::reference::ReferenceRecord;
    use crate::storage::Item;

    /// Create a reference record.
    pub fn reference_record(id: &str, name: &str) -> ReferenceRecord {
        ReferenceRecord {
            id: id.to_string(),
            name: name.to_string(),
        }
    }

    /// Create an item carrying the usual three reference ids.
    pub fn referenced_item(id: &str, material: &str, permanent: &str) -> Item {
        Item {
            id: Some(id.to_string()),
            material_type_id: Some(material.to_string()),
            permanent_loan_type_id: Some(permanent.to_string()),
            ..Item::default()
        }
    }

    /// Create an ingest batch from a list of titles, using default types.
    pub fn ingest_batch(titles: &[&str]) -> IngestBatch {
        IngestBatch {
            records: titles
                .iter()
                .map(|title| IngestRecord {
                    title: title.to_string(),
                    barcode: None,
                })
                .collect(),
            material_type_name: None,
            loan_type_name: None,
        }
    }
}
