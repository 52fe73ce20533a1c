//! Testing utilities for the smoothie workspace
//!
//! Shared fixtures, a scripted nutrition lookup, and the behavioural checks
//! every [`LedgerStore`] implementation must pass.

#![allow(missing_docs)]

use async_trait::async_trait;
use parking_lot::Mutex;
use pretty_assertions::assert_eq;
use smoothie_core::{
    Ingredient, LedgerStore, LookupError, NewOrder, NutritionFacts, NutritionLookup, OrderEdit,
    OrderId,
};
use std::collections::{BTreeMap, HashMap};

/// Id that no fresh store will have assigned
pub const UNKNOWN_ORDER_ID: OrderId = OrderId(i64::MAX);

/// Two-fruit catalog from the ordering walkthrough
pub fn sample_catalog() -> Vec<Ingredient> {
    vec![
        Ingredient::new("Apple", "apple"),
        Ingredient::new("Blueberries", "blueberry"),
    ]
}

/// Wider catalog for multi-ingredient orders
pub fn full_catalog() -> Vec<Ingredient> {
    vec![
        Ingredient::new("Apple", "apple"),
        Ingredient::new("Blueberries", "blueberry"),
        Ingredient::new("Mango", "mango"),
        Ingredient::new("Kiwi", "kiwi"),
        Ingredient::new("Strawberries", "strawberry"),
        Ingredient::new("Ximenia", "ximenia"),
    ]
}

pub fn new_order(customer: &str, ingredients: &[&str]) -> NewOrder {
    NewOrder::new(customer, ingredients).unwrap()
}

pub fn facts(name: &str, calories: f64) -> NutritionFacts {
    NutritionFacts {
        name: name.to_string(),
        family: None,
        genus: None,
        order: None,
        nutritions: BTreeMap::from([("calories".to_string(), calories)]),
    }
}

/// Nutrition lookup answering from a fixed table
///
/// Unknown keys return `LookupError::NotFound`. Every call is recorded.
#[derive(Debug, Default)]
pub struct StubNutrition {
    records: HashMap<String, NutritionFacts>,
    calls: Mutex<Vec<String>>,
}

impl StubNutrition {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_record(mut self, key: &str, facts: NutritionFacts) -> Self {
        self.records.insert(key.to_string(), facts);
        self
    }

    /// Lookup keys requested so far, in call order
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl NutritionLookup for StubNutrition {
    async fn lookup(&self, lookup_key: &str) -> Result<NutritionFacts, LookupError> {
        self.calls.lock().push(lookup_key.to_string());
        self.records
            .get(lookup_key)
            .cloned()
            .ok_or_else(|| LookupError::NotFound(lookup_key.to_string()))
    }
}

/// Run every ledger check, each against a fresh store from `make`
pub async fn ledger_conformance<S, F>(mut make: F)
where
    S: LedgerStore,
    F: FnMut() -> S,
{
    insert_then_list_unfilled(&make()).await;
    round_trip_preserves_fields(&make()).await;
    merge_fills_existing_order(&make()).await;
    merge_ignores_unknown_ids(&make()).await;
    merge_never_creates_orders(&make()).await;
    merge_touches_only_filled(&make()).await;
    unfilled_keeps_insertion_order(&make()).await;
    ids_are_unique(&make()).await;
}

pub async fn insert_then_list_unfilled(store: &dyn LedgerStore) {
    let order = store.insert(&new_order("Sam", &["Apple", "Mango"])).await.unwrap();
    assert!(!order.filled);

    let unfilled = store.unfilled().await.unwrap();
    let matches = unfilled.iter().filter(|o| o.id == order.id).count();
    assert_eq!(matches, 1);
    assert!(unfilled.iter().all(|o| !o.filled));
}

pub async fn round_trip_preserves_fields(store: &dyn LedgerStore) {
    let created = store.insert(&new_order("Sam", &["Apple", "Mango"])).await.unwrap();
    let loaded = store.get(created.id).await.unwrap().unwrap();

    assert_eq!(loaded.customer_name, "Sam");
    assert_eq!(loaded.ingredients.names(), ["Apple", "Mango"]);
    assert_eq!(loaded.id, created.id);
    assert!(!loaded.filled);
    assert!(loaded.created_at.is_some());
}

pub async fn merge_fills_existing_order(store: &dyn LedgerStore) {
    let order = store.insert(&new_order("Sam", &["Apple"])).await.unwrap();
    let outcome = store.merge_filled(&[OrderEdit::fill(order.id)]).await.unwrap();

    assert_eq!(outcome.applied, 1);
    assert!(outcome.ignored.is_empty());
    let unfilled = store.unfilled().await.unwrap();
    assert!(unfilled.iter().all(|o| o.id != order.id));
}

pub async fn merge_ignores_unknown_ids(store: &dyn LedgerStore) {
    store.insert(&new_order("Sam", &["Apple"])).await.unwrap();
    let before = store.unfilled().await.unwrap();

    let outcome = store.merge_filled(&[OrderEdit::fill(UNKNOWN_ORDER_ID)]).await.unwrap();

    assert_eq!(outcome.applied, 0);
    assert_eq!(outcome.ignored, vec![UNKNOWN_ORDER_ID]);
    assert_eq!(store.unfilled().await.unwrap(), before);
}

pub async fn merge_never_creates_orders(store: &dyn LedgerStore) {
    let outcome = store
        .merge_filled(&[OrderEdit::new(UNKNOWN_ORDER_ID, false), OrderEdit::fill(OrderId(1))])
        .await
        .unwrap();

    assert_eq!(outcome.applied, 0);
    assert!(store.unfilled().await.unwrap().is_empty());
    assert!(store.get(UNKNOWN_ORDER_ID).await.unwrap().is_none());
    assert!(store.get(OrderId(1)).await.unwrap().is_none());
}

pub async fn merge_touches_only_filled(store: &dyn LedgerStore) {
    let order = store.insert(&new_order("Alex", &["Kiwi", "Mango"])).await.unwrap();
    store.merge_filled(&[OrderEdit::fill(order.id)]).await.unwrap();

    let filled = store.get(order.id).await.unwrap().unwrap();
    assert!(filled.filled);
    assert_eq!(filled.customer_name, order.customer_name);
    assert_eq!(filled.ingredients, order.ingredients);
    assert_eq!(filled.created_at, order.created_at);

    store.merge_filled(&[OrderEdit::new(order.id, false)]).await.unwrap();
    let unfilled = store.unfilled().await.unwrap();
    assert_eq!(unfilled.len(), 1);
    assert_eq!(unfilled[0].id, order.id);
}

pub async fn unfilled_keeps_insertion_order(store: &dyn LedgerStore) {
    let mut ids = Vec::new();
    for customer in ["Ana", "Ben", "Cy"] {
        ids.push(store.insert(&new_order(customer, &["Apple"])).await.unwrap().id);
    }
    store.merge_filled(&[OrderEdit::fill(ids[1])]).await.unwrap();

    let listed: Vec<OrderId> = store.unfilled().await.unwrap().iter().map(|o| o.id).collect();
    assert_eq!(listed, vec![ids[0], ids[2]]);
}

pub async fn ids_are_unique(store: &dyn LedgerStore) {
    let a = store.insert(&new_order("Sam", &["Apple"])).await.unwrap();
    let b = store.insert(&new_order("Sam", &["Apple"])).await.unwrap();
    assert_ne!(a.id, b.id);
}
