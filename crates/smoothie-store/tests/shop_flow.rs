//! End-to-end order flow: catalog → selection → nutrition → ledger → merge.

use pretty_assertions::assert_eq;
use smoothie_core::{
    NutritionPanel, OrderEdit, OrderId, Shop, ShopError, StoreError, ValidationError,
};
use smoothie_store::{InMemoryStore, SqliteStore};
use smoothie_test_utils::{facts, full_catalog, sample_catalog, StubNutrition, UNKNOWN_ORDER_ID};
use std::sync::Arc;

fn memory_shop(store: &Arc<InMemoryStore>) -> Shop {
    Shop::new(store.clone(), store.clone())
}

#[tokio::test]
async fn walkthrough_scenario() {
    let store = SqliteStore::open_in_memory().unwrap();
    store.seed_catalog(sample_catalog()).await.unwrap();
    let store = Arc::new(store);
    let shop = Shop::new(store.clone(), store);

    let receipt = shop.place_order("Sam", ["Apple", "Blueberries"]).await.unwrap();
    assert_eq!(receipt.order.id, OrderId(1));
    assert!(!receipt.order.filled);
    assert!(receipt.nutrition.is_empty());

    let pending = shop.pending().await.unwrap();
    assert_eq!(pending, vec![receipt.order.clone()]);

    let outcome = shop.submit_updates(&[OrderEdit::fill(1)]).await.unwrap();
    assert_eq!(outcome.applied, 1);
    assert!(shop.pending().await.unwrap().is_empty());
}

#[tokio::test]
async fn selection_shape_is_validated_before_store_access() {
    let store = Arc::new(InMemoryStore::with_catalog(full_catalog()));
    store.set_offline(true);
    let shop = memory_shop(&store);

    let err = shop.place_order("Sam", Vec::<String>::new()).await.unwrap_err();
    assert!(matches!(err, ShopError::Validation(ValidationError::NoIngredients)));

    let six = ["Apple", "Blueberries", "Mango", "Kiwi", "Strawberries", "Ximenia"];
    let err = shop.place_order("Sam", six).await.unwrap_err();
    assert!(matches!(
        err,
        ShopError::Validation(ValidationError::TooManyIngredients { count: 6, max: 5 })
    ));

    let err = shop.place_order("", ["Apple"]).await.unwrap_err();
    assert!(matches!(err, ShopError::Validation(ValidationError::EmptyCustomerName)));
}

#[tokio::test]
async fn ingredient_outside_catalog_is_rejected() {
    let store = Arc::new(InMemoryStore::with_catalog(sample_catalog()));
    let shop = memory_shop(&store);

    let err = shop.place_order("Sam", ["Apple", "Durian"]).await.unwrap_err();
    assert!(matches!(
        err,
        ShopError::Validation(ValidationError::UnknownIngredient(ref name)) if name == "Durian"
    ));
    assert_eq!(store.order_count(), 0);
}

#[tokio::test]
async fn nutrition_failure_does_not_block_order() {
    let store = Arc::new(InMemoryStore::with_catalog(full_catalog()));
    let nutrition = Arc::new(StubNutrition::new().with_record("apple", facts("Apple", 52.0)));
    let shop = memory_shop(&store).with_nutrition(nutrition.clone());

    let receipt = shop.place_order("Sam", ["Apple", "Ximenia"]).await.unwrap();

    assert_eq!(receipt.nutrition.len(), 2);
    assert!(matches!(
        &receipt.nutrition[0],
        NutritionPanel::Facts { ingredient, .. } if ingredient == "Apple"
    ));
    assert!(receipt.nutrition[1].is_unavailable());
    assert_eq!(store.order_count(), 1);
    assert_eq!(nutrition.calls(), vec!["apple".to_string(), "ximenia".to_string()]);
}

#[tokio::test]
async fn lookups_use_catalog_keys() {
    let store = Arc::new(InMemoryStore::with_catalog(full_catalog()));
    let nutrition = Arc::new(
        StubNutrition::new()
            .with_record("blueberry", facts("Blueberry", 57.0))
            .with_record("strawberry", facts("Strawberry", 32.0)),
    );
    let shop = memory_shop(&store).with_nutrition(nutrition.clone());

    let panels = shop.preview(&["Blueberries", "Strawberries"]).await.unwrap();
    assert!(panels.iter().all(|p| !p.is_unavailable()));

    let facts = shop.nutrition("Blueberries").await.unwrap();
    assert_eq!(facts.name, "Blueberry");
    assert_eq!(
        nutrition.calls(),
        vec!["blueberry".to_string(), "strawberry".to_string(), "blueberry".to_string()]
    );
}

#[tokio::test]
async fn direct_lookup_without_client_is_disabled() {
    let store = Arc::new(InMemoryStore::with_catalog(sample_catalog()));
    let shop = memory_shop(&store);

    let err = shop.nutrition("Apple").await.unwrap_err();
    assert!(matches!(err, ShopError::Lookup(smoothie_core::LookupError::Disabled)));
    assert!(shop.preview(&["Apple"]).await.unwrap().is_empty());
}

#[tokio::test]
async fn store_failure_on_create_is_persistence_error() {
    let store = Arc::new(InMemoryStore::with_catalog(sample_catalog()));
    let shop = memory_shop(&store);
    store.set_offline(true);

    let err = shop.place_order("Sam", ["Apple"]).await.unwrap_err();
    assert!(matches!(err, ShopError::Persistence(StoreError::Connection(_))));
}

#[tokio::test]
async fn store_failure_on_merge_is_single_persistence_error() {
    let store = Arc::new(InMemoryStore::with_catalog(sample_catalog()));
    let shop = memory_shop(&store);
    let order = shop.place_order("Sam", ["Apple"]).await.unwrap().order;

    store.set_offline(true);
    let err = shop
        .submit_updates(&[OrderEdit::fill(order.id), OrderEdit::fill(UNKNOWN_ORDER_ID)])
        .await
        .unwrap_err();
    assert!(err.is_persistence());

    store.set_offline(false);
    assert_eq!(shop.pending().await.unwrap(), vec![order]);
}

#[tokio::test]
async fn empty_batch_does_not_touch_store() {
    let store = Arc::new(InMemoryStore::with_catalog(sample_catalog()));
    let shop = memory_shop(&store);
    store.set_offline(true);

    let outcome = shop.submit_updates(&[]).await.unwrap();
    assert_eq!(outcome.applied, 0);
    assert!(outcome.ignored.is_empty());
}

#[tokio::test]
async fn repeated_edits_for_one_order_apply_last_value() {
    let store = Arc::new(InMemoryStore::with_catalog(sample_catalog()));
    let shop = memory_shop(&store);
    let order = shop.place_order("Sam", ["Apple"]).await.unwrap().order;

    let outcome = shop
        .submit_updates(&[OrderEdit::fill(order.id), OrderEdit::new(order.id, false)])
        .await
        .unwrap();

    assert_eq!(outcome.applied, 1);
    assert_eq!(shop.pending().await.unwrap().len(), 1);
}
