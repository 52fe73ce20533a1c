//! Order-placement flow
//!
//! Strings the catalog, the ledger and the nutrition lookup together:
//! 1. Validate the selection shape
//! 2. Check every ingredient against the current catalog
//! 3. Fetch a nutrition panel per ingredient (display-only)
//! 4. Create the order
//!
//! Each call acquires what it needs from the handles it was built with; no
//! state outlives a call.

use crate::catalog::{Catalog, CatalogReader, CatalogSource};
use crate::error::{LookupError, ShopError, ValidationError};
use crate::ledger::{LedgerStore, NewOrder, OrderLedger};
use crate::nutrition::{build_panels, NutritionLookup};
use crate::types::{
    Ingredient, MergeOutcome, NutritionFacts, NutritionPanel, Order, OrderEdit, OrderReceipt,
};
use std::sync::Arc;

/// The smoothie counter
#[derive(Clone)]
pub struct Shop {
    catalog: CatalogReader,
    ledger: OrderLedger,
    nutrition: Option<Arc<dyn NutritionLookup>>,
}

impl Shop {
    /// Create shop over catalog and ledger stores, without nutrition lookups
    #[must_use]
    pub fn new(catalog: Arc<dyn CatalogSource>, ledger: Arc<dyn LedgerStore>) -> Self {
        Self {
            catalog: CatalogReader::new(catalog),
            ledger: OrderLedger::new(ledger),
            nutrition: None,
        }
    }

    /// With nutrition lookup
    #[must_use]
    pub fn with_nutrition(mut self, nutrition: Arc<dyn NutritionLookup>) -> Self {
        self.nutrition = Some(nutrition);
        self
    }

    /// Catalog reader
    #[inline]
    #[must_use]
    pub fn catalog_reader(&self) -> &CatalogReader {
        &self.catalog
    }

    /// Order ledger
    #[inline]
    #[must_use]
    pub fn ledger(&self) -> &OrderLedger {
        &self.ledger
    }

    /// All catalog ingredients
    ///
    /// # Errors
    /// - `ShopError::Persistence` if the catalog source is unreachable
    pub async fn ingredients(&self) -> Result<Vec<Ingredient>, ShopError> {
        self.catalog.list_ingredients().await
    }

    /// Nutrition record for one ingredient
    ///
    /// # Errors
    /// - `ShopError::Lookup` if lookups are disabled or the API call fails
    /// - `ShopError::Persistence` if the catalog source is unreachable
    pub async fn nutrition(&self, ingredient: &str) -> Result<NutritionFacts, ShopError> {
        let lookup = self.nutrition.as_deref().ok_or(LookupError::Disabled)?;
        let catalog = self.catalog.snapshot().await?;
        let key = catalog.lookup_key(ingredient.trim());
        Ok(lookup.lookup(&key).await?)
    }

    /// Nutrition panels for a selection, one per name
    ///
    /// # Errors
    /// - `ShopError::Persistence` if the catalog source is unreachable
    pub async fn preview<S: AsRef<str>>(
        &self,
        ingredients: &[S],
    ) -> Result<Vec<NutritionPanel>, ShopError> {
        if self.nutrition.is_none() {
            return Ok(Vec::new());
        }
        let catalog = self.catalog.snapshot().await?;
        let names: Vec<&str> = ingredients.iter().map(|s| s.as_ref().trim()).collect();
        Ok(self.panels(&catalog, &names).await)
    }

    /// Validate a selection, look up nutrition and create the order
    ///
    /// Nutrition failures are reported inside the receipt and never stop the
    /// order from being created.
    ///
    /// # Errors
    /// - `ShopError::Validation` for a bad selection or an ingredient missing
    ///   from the catalog
    /// - `ShopError::Persistence` if the catalog or ledger store fails
    pub async fn place_order<I, S>(
        &self,
        customer_name: &str,
        ingredients: I,
    ) -> Result<OrderReceipt, ShopError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let new_order = NewOrder::new(customer_name, ingredients)?;

        let catalog = self.catalog.snapshot().await?;
        if let Some(unknown) = new_order
            .ingredients()
            .iter()
            .find(|name| !catalog.contains(name))
        {
            return Err(ValidationError::UnknownIngredient(unknown.to_string()).into());
        }

        let names: Vec<&str> = new_order.ingredients().iter().collect();
        let nutrition = self.panels(&catalog, &names).await;

        let order = self.ledger.create_validated(&new_order).await?;
        Ok(OrderReceipt { order, nutrition })
    }

    /// Orders waiting to be filled
    ///
    /// # Errors
    /// - `ShopError::Persistence` if the ledger store is unreachable
    pub async fn pending(&self) -> Result<Vec<Order>, ShopError> {
        self.ledger.list_unfilled().await
    }

    /// Merge staff edits of the pending list
    ///
    /// # Errors
    /// - `ShopError::Persistence` if the ledger store rejects the batch
    pub async fn submit_updates(&self, edits: &[OrderEdit]) -> Result<MergeOutcome, ShopError> {
        self.ledger.apply_edits(edits).await
    }

    async fn panels(&self, catalog: &Catalog, names: &[&str]) -> Vec<NutritionPanel> {
        let Some(lookup) = self.nutrition.as_deref() else {
            return Vec::new();
        };
        let items: Vec<(String, String)> = names
            .iter()
            .map(|name| ((*name).to_string(), catalog.lookup_key(name)))
            .collect();
        build_panels(lookup, &items).await
    }
}

impl std::fmt::Debug for Shop {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Shop")
            .field("nutrition", &self.nutrition.is_some())
            .finish_non_exhaustive()
    }
}
