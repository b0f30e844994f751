use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use tracing::warn;

use super::types::{CompositeItem, CompositeItemPage};
use crate::context::CallContext;
use crate::metrics::{PAGE_LOOKUPS, REFERENCE_LOOKUPS};
use crate::reference::{ReferenceKind, ReferenceRecord, ReferenceResolver, Resolution};
use crate::storage::Item;

/// Assembles composite items by fanning out reference lookups.
///
/// Lookups for a page are deduplicated across items and roles: each
/// distinct `(kind, id)` pair is resolved exactly once, all lookups run
/// in parallel, and assembly starts only after every lookup has settled.
pub struct CompositeCoordinator {
    resolver: Arc<dyn ReferenceResolver>,
    lookup_timeout: Duration,
}

impl CompositeCoordinator {
    pub fn new(resolver: Arc<dyn ReferenceResolver>, lookup_timeout: Duration) -> Self {
        Self {
            resolver,
            lookup_timeout,
        }
    }

    /// Expand a single item.
    pub async fn enrich_one(&self, ctx: &CallContext, item: Item) -> CompositeItem {
        let resolved = self.resolve_all(ctx, std::slice::from_ref(&item)).await;
        compose(item, &resolved)
    }

    /// Expand a page of items, sharing lookups across the whole page.
    pub async fn enrich_page(
        &self,
        ctx: &CallContext,
        items: Vec<Item>,
        total_records: u64,
    ) -> CompositeItemPage {
        let resolved = self.resolve_all(ctx, &items).await;
        CompositeItemPage {
            composite_items: items
                .into_iter()
                .map(|item| compose(item, &resolved))
                .collect(),
            total_records,
        }
    }

    /// Resolve every distinct reference id the given items carry.
    ///
    /// Returns only successful lookups; misses and errors are logged and
    /// simply absent from the map.
    async fn resolve_all(
        &self,
        ctx: &CallContext,
        items: &[Item],
    ) -> HashMap<(ReferenceKind, String), ReferenceRecord> {
        let keys: HashSet<(ReferenceKind, String)> =
            items.iter().flat_map(lookup_keys).collect();

        PAGE_LOOKUPS.with_label_values(&[]).observe(keys.len() as f64);

        let lookups = keys.into_iter().map(|(kind, id)| {
            let resolver = Arc::clone(&self.resolver);
            let timeout = self.lookup_timeout;
            async move {
                let outcome =
                    match tokio::time::timeout(timeout, resolver.resolve(ctx, kind, &id)).await {
                        Ok(outcome) => outcome,
                        Err(_) => {
                            REFERENCE_LOOKUPS
                                .with_label_values(&[kind.label(), "timeout"])
                                .inc();
                            Resolution::Failed(format!("lookup timed out after {:?}", timeout))
                        }
                    };
                ((kind, id), outcome)
            }
        });

        let mut resolved = HashMap::new();
        for ((kind, id), outcome) in join_all(lookups).await {
            match outcome {
                Resolution::Found(record) => {
                    resolved.insert((kind, id), record);
                }
                Resolution::NotFound => {
                    warn!(kind = kind.label(), id, "reference id does not exist");
                }
                Resolution::Failed(reason) => {
                    warn!(kind = kind.label(), id, reason, "reference lookup failed");
                }
            }
        }
        resolved
    }
}

/// The `(kind, id)` pairs an item needs resolved.
fn lookup_keys(item: &Item) -> Vec<(ReferenceKind, String)> {
    let mut keys = Vec::new();
    if let Some(ref id) = item.material_type_id {
        keys.push((ReferenceKind::MaterialType, id.clone()));
    }
    if let Some(ref id) = item.permanent_loan_type_id {
        keys.push((ReferenceKind::LoanType, id.clone()));
    }
    if let Some(ref id) = item.temporary_loan_type_id {
        keys.push((ReferenceKind::LoanType, id.clone()));
    }
    keys
}

fn compose(
    item: Item,
    resolved: &HashMap<(ReferenceKind, String), ReferenceRecord>,
) -> CompositeItem {
    let section = |kind: ReferenceKind, id: &Option<String>| {
        id.as_ref()
            .and_then(|id| resolved.get(&(kind, id.clone())))
            .cloned()
    };

    let material_type = section(ReferenceKind::MaterialType, &item.material_type_id);
    let permanent_loan_type = section(ReferenceKind::LoanType, &item.permanent_loan_type_id);
    let temporary_loan_type = section(ReferenceKind::LoanType, &item.temporary_loan_type_id);

    CompositeItem {
        item,
        material_type,
        permanent_loan_type,
        temporary_loan_type,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{fixtures, MockResolver};

    fn ctx() -> CallContext {
        CallContext::new("diku", "http://localhost:9130")
    }

    fn item(id: &str, material: Option<&str>, permanent: Option<&str>, temporary: Option<&str>) -> Item {
        Item {
            id: Some(id.to_string()),
            material_type_id: material.map(str::to_string),
            permanent_loan_type_id: permanent.map(str::to_string),
            temporary_loan_type_id: temporary.map(str::to_string),
            ..Item::default()
        }
    }

    fn coordinator(resolver: Arc<MockResolver>) -> CompositeCoordinator {
        CompositeCoordinator::new(resolver, Duration::from_secs(5))
    }

    #[tokio::test]
    async fn test_all_sections_resolved() {
        let resolver = Arc::new(MockResolver::new());
        resolver.add_found(ReferenceKind::MaterialType, "mt-1", "Book").await;
        resolver.add_found(ReferenceKind::LoanType, "lt-1", "Can Circulate").await;
        resolver.add_found(ReferenceKind::LoanType, "lt-2", "Course Reserve").await;

        let composite = coordinator(Arc::clone(&resolver))
            .enrich_one(&ctx(), item("it-1", Some("mt-1"), Some("lt-1"), Some("lt-2")))
            .await;

        assert_eq!(
            composite.material_type,
            Some(fixtures::reference_record("mt-1", "Book"))
        );
        assert_eq!(
            composite.permanent_loan_type,
            Some(fixtures::reference_record("lt-1", "Can Circulate"))
        );
        assert_eq!(
            composite.temporary_loan_type,
            Some(fixtures::reference_record("lt-2", "Course Reserve"))
        );
        assert_eq!(composite.item.id.as_deref(), Some("it-1"));
    }

    #[tokio::test]
    async fn test_page_lookups_are_deduplicated() {
        let resolver = Arc::new(MockResolver::new());
        resolver.add_found(ReferenceKind::MaterialType, "mt-1", "Book").await;
        resolver.add_found(ReferenceKind::LoanType, "lt-1", "Can Circulate").await;

        // 50 items all sharing the same two reference ids
        let items: Vec<Item> = (0..50)
            .map(|i| fixtures::referenced_item(&format!("it-{}", i), "mt-1", "lt-1"))
            .collect();

        let page = coordinator(Arc::clone(&resolver))
            .enrich_page(&ctx(), items, 50)
            .await;

        assert_eq!(page.composite_items.len(), 50);
        assert_eq!(page.total_records, 50);
        assert_eq!(resolver.call_count().await, 2);
        for composite in &page.composite_items {
            assert!(composite.material_type.is_some());
            assert!(composite.permanent_loan_type.is_some());
        }
    }

    #[tokio::test]
    async fn test_shared_loan_id_across_roles_resolves_once() {
        let resolver = Arc::new(MockResolver::new());
        resolver.add_found(ReferenceKind::LoanType, "lt-1", "Can Circulate").await;

        let composite = coordinator(Arc::clone(&resolver))
            .enrich_one(&ctx(), item("it-1", None, Some("lt-1"), Some("lt-1")))
            .await;

        assert_eq!(resolver.call_count().await, 1);
        assert_eq!(
            composite.permanent_loan_type.as_ref().unwrap().name,
            "Can Circulate"
        );
        assert_eq!(
            composite.temporary_loan_type.as_ref().unwrap().name,
            "Can Circulate"
        );
    }

    #[tokio::test]
    async fn test_missing_reference_omits_section_only() {
        let resolver = Arc::new(MockResolver::new());
        resolver.add_found(ReferenceKind::MaterialType, "mt-1", "Book").await;
        // lt-dangling is not configured, the mock answers NotFound

        let composite = coordinator(Arc::clone(&resolver))
            .enrich_one(&ctx(), item("it-1", Some("mt-1"), Some("lt-dangling"), None))
            .await;

        assert!(composite.material_type.is_some());
        assert!(composite.permanent_loan_type.is_none());
        // the bare id stays on the item
        assert_eq!(
            composite.item.permanent_loan_type_id.as_deref(),
            Some("lt-dangling")
        );
    }

    #[tokio::test]
    async fn test_lookup_error_omits_section_only() {
        let resolver = Arc::new(MockResolver::new());
        resolver.add_found(ReferenceKind::MaterialType, "mt-1", "Book").await;
        resolver
            .set_record(
                ReferenceKind::LoanType,
                "lt-1",
                Resolution::Failed("connection refused".to_string()),
            )
            .await;

        let composite = coordinator(Arc::clone(&resolver))
            .enrich_one(&ctx(), item("it-1", Some("mt-1"), Some("lt-1"), None))
            .await;

        assert!(composite.material_type.is_some());
        assert!(composite.permanent_loan_type.is_none());
    }

    #[tokio::test]
    async fn test_item_without_reference_ids_needs_no_lookups() {
        let resolver = Arc::new(MockResolver::new());

        let composite = coordinator(Arc::clone(&resolver))
            .enrich_one(&ctx(), item("it-1", None, None, None))
            .await;

        assert_eq!(resolver.call_count().await, 0);
        assert!(composite.material_type.is_none());
        assert!(composite.permanent_loan_type.is_none());
        assert!(composite.temporary_loan_type.is_none());
    }

    #[tokio::test]
    async fn test_slow_lookup_times_out_and_omits_section() {
        let resolver = Arc::new(MockResolver::new());
        resolver.add_found(ReferenceKind::MaterialType, "mt-1", "Book").await;
        resolver.set_delay(Duration::from_millis(200)).await;

        let coordinator =
            CompositeCoordinator::new(
                Arc::clone(&resolver) as Arc<dyn ReferenceResolver>,
                Duration::from_millis(20),
            );
        let composite = coordinator
            .enrich_one(&ctx(), item("it-1", Some("mt-1"), None, None))
            .await;

        assert!(composite.material_type.is_none());
        assert_eq!(composite.item.material_type_id.as_deref(), Some("mt-1"));
    }
}
