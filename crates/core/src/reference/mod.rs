//! Reference record lookup.
//!
//! Material types and loan types are small controlled vocabularies served
//! by their own storage modules. The resolver seam keeps the composite
//! coordinator and the ingest pipeline independent of how lookups happen.

mod http;

pub use http::HttpReferenceResolver;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::context::CallContext;
use crate::storage::StorageError;

/// Which reference vocabulary an id belongs to.
///
/// Both loan type roles (permanent and temporary) draw from the same
/// vocabulary, so they share a kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReferenceKind {
    MaterialType,
    LoanType,
}

impl ReferenceKind {
    /// URL path of the backing storage module.
    pub fn path(&self) -> &'static str {
        match self {
            ReferenceKind::MaterialType => "material-types",
            ReferenceKind::LoanType => "loan-types",
        }
    }

    /// Key of the record array in list responses.
    pub fn collection_key(&self) -> &'static str {
        match self {
            ReferenceKind::MaterialType => "mtypes",
            ReferenceKind::LoanType => "loantypes",
        }
    }

    /// Label used in logs and metrics.
    pub fn label(&self) -> &'static str {
        match self {
            ReferenceKind::MaterialType => "material_type",
            ReferenceKind::LoanType => "loan_type",
        }
    }
}

/// A resolved reference record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReferenceRecord {
    pub id: String,
    pub name: String,
}

/// Outcome of a single reference lookup.
///
/// `NotFound` and `Failed` are distinct outcomes so callers can log them
/// differently, but both lead to the same representation: the section is
/// omitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Found(ReferenceRecord),
    NotFound,
    Failed(String),
}

impl Resolution {
    pub fn label(&self) -> &'static str {
        match self {
            Resolution::Found(_) => "found",
            Resolution::NotFound => "not_found",
            Resolution::Failed(_) => "error",
        }
    }
}

/// Lookup seam for reference vocabularies.
#[async_trait]
pub trait ReferenceResolver: Send + Sync {
    /// Resolve a reference id to its record. Never fails outright; error
    /// conditions are folded into the returned outcome.
    async fn resolve(&self, ctx: &CallContext, kind: ReferenceKind, id: &str) -> Resolution;

    /// Find a reference record by its exact name.
    async fn find_by_name(
        &self,
        ctx: &CallContext,
        kind: ReferenceKind,
        name: &str,
    ) -> Result<Option<ReferenceRecord>, StorageError>;
}
