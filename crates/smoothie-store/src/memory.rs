//! In-memory backing store for development and testing.

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use smoothie_core::{
    CatalogSource, Ingredient, LedgerStore, MergeOutcome, NewOrder, Order, OrderEdit, OrderId,
    StoreError,
};
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};

/// In-memory catalog and ledger
///
/// Orders are kept in insertion order. [`InMemoryStore::set_offline`]
/// makes every operation fail with `StoreError::Connection`, for exercising
/// failure paths.
#[derive(Debug)]
pub struct InMemoryStore {
    catalog: RwLock<Vec<Ingredient>>,
    orders: RwLock<Vec<Order>>,
    next_id: AtomicI64,
    offline: AtomicBool,
}

impl InMemoryStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::with_catalog(Vec::new())
    }

    /// Create a store with a fixed catalog
    #[must_use]
    pub fn with_catalog(catalog: Vec<Ingredient>) -> Self {
        Self {
            catalog: RwLock::new(catalog),
            orders: RwLock::new(Vec::new()),
            next_id: AtomicI64::new(1),
            offline: AtomicBool::new(false),
        }
    }

    /// Simulate losing (or regaining) the connection
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Total orders stored, filled or not
    #[must_use]
    pub fn order_count(&self) -> usize {
        self.orders.read().len()
    }

    fn ensure_online(&self) -> Result<(), StoreError> {
        if self.offline.load(Ordering::SeqCst) {
            Err(StoreError::Connection("in-memory store is offline".to_string()))
        } else {
            Ok(())
        }
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CatalogSource for InMemoryStore {
    async fn list_ingredients(&self) -> Result<Vec<Ingredient>, StoreError> {
        self.ensure_online()?;
        Ok(self.catalog.read().clone())
    }
}

#[async_trait]
impl LedgerStore for InMemoryStore {
    async fn insert(&self, order: &NewOrder) -> Result<Order, StoreError> {
        self.ensure_online()?;
        let order = Order {
            id: OrderId(self.next_id.fetch_add(1, Ordering::SeqCst)),
            customer_name: order.customer_name().to_string(),
            ingredients: order.ingredients().clone(),
            filled: false,
            created_at: Some(Utc::now()),
        };
        self.orders.write().push(order.clone());
        Ok(order)
    }

    async fn get(&self, id: OrderId) -> Result<Option<Order>, StoreError> {
        self.ensure_online()?;
        Ok(self.orders.read().iter().find(|o| o.id == id).cloned())
    }

    async fn unfilled(&self) -> Result<Vec<Order>, StoreError> {
        self.ensure_online()?;
        Ok(self
            .orders
            .read()
            .iter()
            .filter(|o| !o.filled)
            .cloned()
            .collect())
    }

    async fn merge_filled(&self, edits: &[OrderEdit]) -> Result<MergeOutcome, StoreError> {
        self.ensure_online()?;
        let mut orders = self.orders.write();
        let mut outcome = MergeOutcome::default();

        for edit in edits {
            match orders.iter_mut().find(|o| o.id == edit.id) {
                Some(order) => {
                    order.filled = edit.filled;
                    outcome.applied += 1;
                }
                None => outcome.ignored.push(edit.id),
            }
        }
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offline_store_rejects_every_operation() {
        tokio_test::block_on(async {
            let store = InMemoryStore::new();
            let order = NewOrder::new("Sam", ["Apple"]).unwrap();
            store.insert(&order).await.unwrap();

            store.set_offline(true);
            assert!(matches!(store.insert(&order).await, Err(StoreError::Connection(_))));
            assert!(store.unfilled().await.is_err());
            assert!(store.merge_filled(&[OrderEdit::fill(1)]).await.is_err());
            assert!(store.list_ingredients().await.is_err());

            store.set_offline(false);
            assert_eq!(store.unfilled().await.unwrap().len(), 1);
            assert_eq!(store.order_count(), 1);
        });
    }

    #[test]
    fn ids_start_at_one() {
        tokio_test::block_on(async {
            let store = InMemoryStore::new();
            let order = store.insert(&NewOrder::new("Sam", ["Apple"]).unwrap()).await.unwrap();
            assert_eq!(order.id, OrderId(1));
        });
    }
}
