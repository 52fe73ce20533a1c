//! Smoothie Core - catalog, ledger and order flow
//!
//! The pieces behind the smoothie counter:
//! - Reads the ingredient catalog and resolves nutrition search terms
//! - Validates and records new orders
//! - Lists unfilled orders and merges staff edits back by primary key
//! - Attaches display-only nutrition panels to each order
//!
//! Storage and the nutrition API sit behind the [`CatalogSource`],
//! [`LedgerStore`] and [`NutritionLookup`] traits.
//!
//! # Example
//!
//! ```rust,ignore
//! use smoothie_core::{OrderEdit, Shop};
//!
//! # async fn example(shop: Shop) -> Result<(), Box<dyn std::error::Error>> {
//! let receipt = shop.place_order("Sam", ["Apple", "Blueberries"]).await?;
//! assert!(!receipt.order.filled);
//!
//! shop.submit_updates(&[OrderEdit::fill(receipt.order.id)]).await?;
//! assert!(shop.pending().await?.is_empty());
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod catalog;
pub mod config;
pub mod error;
pub mod ledger;
pub mod nutrition;
pub mod shop;
pub mod types;

pub use catalog::{resolve_lookup_key, Catalog, CatalogReader, CatalogSource};
pub use config::{NutritionConfig, ServerConfig, ShopConfig, StoreConfig};
pub use error::{ConfigError, LookupError, ShopError, StoreError, ValidationError};
pub use ledger::{LedgerStore, NewOrder, OrderLedger};
pub use nutrition::{build_panels, NutritionLookup};
pub use shop::Shop;
pub use types::{
    Ingredient, IngredientList, MergeOutcome, NutritionFacts, NutritionPanel, Order, OrderEdit,
    OrderId, OrderReceipt, INGREDIENT_SEPARATOR, MAX_INGREDIENTS,
};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with Smoothie Core
    pub use crate::{
        Ingredient, MergeOutcome, Order, OrderEdit, OrderId, OrderLedger, Shop, ShopError,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
