//! Core inventory record types.

use serde::{Deserialize, Serialize};

/// Circulation status of an item.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ItemStatus {
    pub name: String,
}

impl ItemStatus {
    pub fn available() -> Self {
        Self {
            name: "Available".to_string(),
        }
    }
}

/// An item record as stored by the item storage module.
///
/// Reference fields (`material_type_id`, loan type ids) are bare UUIDs;
/// the composite layer expands them into `{id, name}` pairs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub barcode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ItemStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub material_type_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permanent_loan_type_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temporary_loan_type_id: Option<String>,
}

/// An instance record (bibliographic description).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Instance {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

/// A page of items with the backend's total match count.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ItemPage {
    #[serde(default)]
    pub items: Vec<Item>,
    #[serde(default)]
    pub total_records: u64,
}

/// A page of instances with the backend's total match count.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct InstancePage {
    #[serde(default)]
    pub instances: Vec<Instance>,
    #[serde(default)]
    pub total_records: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_wire_field_names() {
        let item = Item {
            id: Some("it-1".to_string()),
            title: Some("Refactoring".to_string()),
            barcode: Some("036000291452".to_string()),
            instance_id: Some("in-1".to_string()),
            status: Some(ItemStatus::available()),
            material_type_id: Some("mt-1".to_string()),
            permanent_loan_type_id: Some("lt-1".to_string()),
            temporary_loan_type_id: None,
        };

        let json = serde_json::to_string(&item).unwrap();
        assert!(json.contains("\"materialTypeId\":\"mt-1\""));
        assert!(json.contains("\"permanentLoanTypeId\":\"lt-1\""));
        assert!(json.contains("\"instanceId\":\"in-1\""));
        // absent optionals are skipped entirely
        assert!(!json.contains("temporaryLoanTypeId"));
    }

    #[test]
    fn test_item_page_defaults() {
        let page: ItemPage = serde_json::from_str("{}").unwrap();
        assert!(page.items.is_empty());
        assert_eq!(page.total_records, 0);
    }

    #[test]
    fn test_instance_roundtrip() {
        let instance = Instance {
            id: None,
            title: "Small Island".to_string(),
            source: Some("local".to_string()),
        };
        let json = serde_json::to_string(&instance).unwrap();
        assert!(!json.contains("\"id\""));
        let back: Instance = serde_json::from_str(&json).unwrap();
        assert_eq!(back, instance);
    }
}
