use serde::{Deserialize, Serialize};

use crate::reference::ReferenceRecord;
use crate::storage::Item;

/// An item with its reference ids expanded.
///
/// A section is present only when its lookup succeeded; misses and lookup
/// errors both leave the section out while the bare id stays on the item.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CompositeItem {
    #[serde(flatten)]
    pub item: Item,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub material_type: Option<ReferenceRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permanent_loan_type: Option<ReferenceRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temporary_loan_type: Option<ReferenceRecord>,
}

/// A page of composite items.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CompositeItemPage {
    pub composite_items: Vec<CompositeItem>,
    pub total_records: u64,
}
