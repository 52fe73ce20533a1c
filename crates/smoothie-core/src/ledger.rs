//! Order ledger
//!
//! Owns order records in a backing store:
//! - Validated order creation
//! - Listing unfilled orders in creation order
//! - Merging fulfilment edits back by primary key
//!
//! Merging is update-only. An edit whose id is not stored is ignored, never
//! inserted, and only the `filled` column is ever written.

use crate::error::{ShopError, StoreError, ValidationError};
use crate::types::{IngredientList, MergeOutcome, Order, OrderEdit, OrderId, MAX_INGREDIENTS};
use async_trait::async_trait;
use indexmap::IndexMap;
use std::collections::HashSet;
use std::sync::Arc;

/// Validated input for a new order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    customer_name: String,
    ingredients: IngredientList,
}

impl NewOrder {
    /// Validate a customer name and ingredient selection
    ///
    /// Names are trimmed. The selection must hold 1 to [`MAX_INGREDIENTS`]
    /// distinct, non-blank names without commas.
    ///
    /// # Errors
    /// - `ValidationError` describing the first problem found
    pub fn new<I, S>(customer_name: &str, ingredients: I) -> Result<Self, ValidationError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let customer_name = customer_name.trim();
        if customer_name.is_empty() {
            return Err(ValidationError::EmptyCustomerName);
        }

        let names: Vec<String> = ingredients
            .into_iter()
            .map(|name| name.as_ref().trim().to_string())
            .collect();

        if names.is_empty() {
            return Err(ValidationError::NoIngredients);
        }
        if names.len() > MAX_INGREDIENTS {
            return Err(ValidationError::TooManyIngredients {
                count: names.len(),
                max: MAX_INGREDIENTS,
            });
        }

        let mut seen = HashSet::with_capacity(names.len());
        for (position, name) in names.iter().enumerate() {
            if name.is_empty() {
                return Err(ValidationError::BlankIngredient { position });
            }
            if name.contains(',') {
                return Err(ValidationError::InvalidIngredientName(name.clone()));
            }
            if !seen.insert(name.as_str()) {
                return Err(ValidationError::DuplicateIngredient(name.clone()));
            }
        }

        Ok(Self {
            customer_name: customer_name.to_string(),
            ingredients: IngredientList::from_validated(names),
        })
    }

    /// Trimmed customer name
    #[inline]
    #[must_use]
    pub fn customer_name(&self) -> &str {
        &self.customer_name
    }

    /// Validated ingredient list
    #[inline]
    #[must_use]
    pub fn ingredients(&self) -> &IngredientList {
        &self.ingredients
    }
}

/// Durable collection of orders
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Append one order; the store assigns id and creation time
    async fn insert(&self, order: &NewOrder) -> Result<Order, StoreError>;

    /// Load one order by id
    async fn get(&self, id: OrderId) -> Result<Option<Order>, StoreError>;

    /// Orders with `filled == false`, in insertion order
    async fn unfilled(&self) -> Result<Vec<Order>, StoreError>;

    /// Set `filled` on every stored order whose id matches an edit
    ///
    /// Ids without a stored order are reported in `ignored`. One attempt,
    /// no partial-commit guarantee on error.
    async fn merge_filled(&self, edits: &[OrderEdit]) -> Result<MergeOutcome, StoreError>;
}

/// Order ledger over a backing store
#[derive(Clone)]
pub struct OrderLedger {
    store: Arc<dyn LedgerStore>,
}

impl OrderLedger {
    /// Create ledger over a store handle
    #[inline]
    #[must_use]
    pub fn new(store: Arc<dyn LedgerStore>) -> Self {
        Self { store }
    }

    /// Validate and create a new order
    ///
    /// # Errors
    /// - `ShopError::Validation` for a bad name or ingredient selection
    /// - `ShopError::Persistence` if the store rejects the insert
    pub async fn create<I, S>(
        &self,
        customer_name: &str,
        ingredients: I,
    ) -> Result<Order, ShopError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let new_order = NewOrder::new(customer_name, ingredients)?;
        self.create_validated(&new_order).await
    }

    /// Create an order from already-validated input
    ///
    /// # Errors
    /// - `ShopError::Persistence` if the store rejects the insert
    pub async fn create_validated(&self, new_order: &NewOrder) -> Result<Order, ShopError> {
        let order = self.store.insert(new_order).await.map_err(|e| {
            tracing::error!("Order insert failed for {}: {}", new_order.customer_name(), e);
            e
        })?;
        tracing::info!(
            order_id = %order.id,
            ingredients = order.ingredients.len(),
            "Created order for {}",
            order.customer_name
        );
        Ok(order)
    }

    /// Load one order
    ///
    /// # Errors
    /// - `ShopError::Persistence` if the store is unreachable
    pub async fn get(&self, id: OrderId) -> Result<Option<Order>, ShopError> {
        Ok(self.store.get(id).await?)
    }

    /// List orders not yet filled, in creation order
    ///
    /// # Errors
    /// - `ShopError::Persistence` if the store is unreachable
    pub async fn list_unfilled(&self) -> Result<Vec<Order>, ShopError> {
        let orders = self.store.unfilled().await?;
        tracing::debug!("{} unfilled orders", orders.len());
        Ok(orders)
    }

    /// Merge fulfilment edits onto stored orders by primary key
    ///
    /// Later edits for the same id replace earlier ones. Unknown ids are
    /// ignored. Success is reported only once the store has confirmed the
    /// whole batch.
    ///
    /// # Errors
    /// - `ShopError::Persistence` if the store rejects the batch; no edit is
    ///   guaranteed to have been applied
    pub async fn apply_edits(&self, edits: &[OrderEdit]) -> Result<MergeOutcome, ShopError> {
        if edits.is_empty() {
            return Ok(MergeOutcome::default());
        }

        let batch = collapse_edits(edits);
        let outcome = self.store.merge_filled(&batch).await.map_err(|e| {
            tracing::error!("Merge of {} edits failed: {}", batch.len(), e);
            e
        })?;

        if !outcome.ignored.is_empty() {
            tracing::debug!("Ignored edits for unknown orders: {:?}", outcome.ignored);
        }
        tracing::info!(
            applied = outcome.applied,
            ignored = outcome.ignored.len(),
            "Merged order edits"
        );
        Ok(outcome)
    }
}

impl std::fmt::Debug for OrderLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrderLedger").finish_non_exhaustive()
    }
}

/// One edit per id, last value wins, first-seen position kept
fn collapse_edits(edits: &[OrderEdit]) -> Vec<OrderEdit> {
    let mut by_id: IndexMap<OrderId, bool> = IndexMap::with_capacity(edits.len());
    for edit in edits {
        by_id.insert(edit.id, edit.filled);
    }
    by_id
        .into_iter()
        .map(|(id, filled)| OrderEdit { id, filled })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn new_order_trims_input() {
        let order = NewOrder::new("  Sam ", [" Apple", "Mango "]).unwrap();
        assert_eq!(order.customer_name(), "Sam");
        assert_eq!(order.ingredients().names(), ["Apple", "Mango"]);
    }

    #[test]
    fn new_order_rejects_blank_customer() {
        assert_eq!(
            NewOrder::new("   ", ["Apple"]),
            Err(ValidationError::EmptyCustomerName)
        );
    }

    #[test]
    fn new_order_rejects_bad_names() {
        assert_eq!(
            NewOrder::new("Sam", ["Apple", " "]),
            Err(ValidationError::BlankIngredient { position: 1 })
        );
        assert_eq!(
            NewOrder::new("Sam", ["Apple, Mango"]),
            Err(ValidationError::InvalidIngredientName("Apple, Mango".into()))
        );
        assert_eq!(
            NewOrder::new("Sam", ["Apple", "Apple"]),
            Err(ValidationError::DuplicateIngredient("Apple".into()))
        );
    }

    #[test]
    fn collapse_keeps_last_value_per_id() {
        let batch = collapse_edits(&[
            OrderEdit::fill(1),
            OrderEdit::fill(2),
            OrderEdit::new(1, false),
        ]);
        assert_eq!(batch, vec![OrderEdit::new(1, false), OrderEdit::fill(2)]);
    }

    proptest! {
        #[test]
        fn prop_ingredient_count_bounds(count in 0usize..12) {
            let names: Vec<String> = (0..count).map(|i| format!("Fruit{i}")).collect();
            let result = NewOrder::new("Sam", &names);

            if count == 0 {
                prop_assert_eq!(result, Err(ValidationError::NoIngredients));
            } else if count > MAX_INGREDIENTS {
                prop_assert_eq!(
                    result,
                    Err(ValidationError::TooManyIngredients { count, max: MAX_INGREDIENTS })
                );
            } else {
                let order = result.unwrap();
                prop_assert_eq!(order.ingredients().len(), count);
            }
        }
    }
}
