//! Ingredient catalog
//!
//! Read-only view of the fruit options an administrator maintains in the
//! backing store, plus resolution of the search term sent to the nutrition
//! API for each ingredient.

use crate::error::{ShopError, StoreError};
use crate::types::Ingredient;
use async_trait::async_trait;
use indexmap::IndexMap;
use std::sync::Arc;

/// Display names whose API search term is not the name itself
const LOOKUP_KEY_OVERRIDES: &[(&str, &str)] = &[
    ("apples", "apple"),
    ("blackberries", "blackberry"),
    ("blueberries", "blueberry"),
    ("cherries", "cherry"),
    ("cranberries", "cranberry"),
    ("dragon fruit", "dragonfruit"),
    ("elderberries", "elderberry"),
    ("figs", "fig"),
    ("raspberries", "raspberry"),
    ("strawberries", "strawberry"),
    ("ugli fruit", "ugli"),
];

/// Resolve the API search term for an ingredient
///
/// An explicit, non-blank key from the catalog row wins. Otherwise the
/// override table is consulted (case-insensitive), and failing that the
/// name itself is the key.
#[must_use]
pub fn resolve_lookup_key(name: &str, explicit: Option<&str>) -> String {
    if let Some(key) = explicit.map(str::trim).filter(|k| !k.is_empty()) {
        return key.to_string();
    }

    let name = name.trim();
    let folded = name.to_lowercase();
    LOOKUP_KEY_OVERRIDES
        .iter()
        .find(|(display, _)| *display == folded)
        .map_or_else(|| name.to_string(), |(_, key)| (*key).to_string())
}

impl Ingredient {
    /// Build from a raw catalog row, resolving the lookup key
    #[must_use]
    pub fn from_catalog_row(name: impl Into<String>, lookup_key: Option<&str>) -> Self {
        let name = name.into();
        let lookup_key = resolve_lookup_key(&name, lookup_key);
        Self { name, lookup_key }
    }
}

/// Tabular source of catalog rows
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// All catalog ingredients
    async fn list_ingredients(&self) -> Result<Vec<Ingredient>, StoreError>;
}

/// Point-in-time catalog, indexed by display name
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    entries: IndexMap<String, Ingredient>,
}

impl Catalog {
    /// Index ingredients by name; a later duplicate name replaces the earlier row
    #[must_use]
    pub fn new(ingredients: impl IntoIterator<Item = Ingredient>) -> Self {
        Self {
            entries: ingredients
                .into_iter()
                .map(|ingredient| (ingredient.name.clone(), ingredient))
                .collect(),
        }
    }

    /// Whether a display name is in the catalog
    #[inline]
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Look up an ingredient by display name
    #[inline]
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Ingredient> {
        self.entries.get(name)
    }

    /// Search term for a name, falling back to resolution for unknown names
    #[must_use]
    pub fn lookup_key(&self, name: &str) -> String {
        self.get(name)
            .map_or_else(|| resolve_lookup_key(name, None), |i| i.lookup_key.clone())
    }

    /// Ingredients in source order
    pub fn iter(&self) -> impl Iterator<Item = &Ingredient> {
        self.entries.values()
    }

    /// Owned ingredient list in source order
    #[must_use]
    pub fn to_vec(&self) -> Vec<Ingredient> {
        self.entries.values().cloned().collect()
    }

    /// Number of ingredients
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the catalog is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Reads the catalog from its source
#[derive(Clone)]
pub struct CatalogReader {
    source: Arc<dyn CatalogSource>,
}

impl CatalogReader {
    /// Create reader over a catalog source
    #[inline]
    #[must_use]
    pub fn new(source: Arc<dyn CatalogSource>) -> Self {
        Self { source }
    }

    /// List all ingredients
    ///
    /// # Errors
    /// - `ShopError::Persistence` if the source is unreachable
    pub async fn list_ingredients(&self) -> Result<Vec<Ingredient>, ShopError> {
        let ingredients = self.source.list_ingredients().await.map_err(|e| {
            tracing::error!("Catalog read failed: {}", e);
            e
        })?;
        tracing::debug!("Loaded {} catalog ingredients", ingredients.len());
        Ok(ingredients)
    }

    /// Load an indexed snapshot of the catalog
    ///
    /// # Errors
    /// - `ShopError::Persistence` if the source is unreachable
    pub async fn snapshot(&self) -> Result<Catalog, ShopError> {
        Ok(Catalog::new(self.list_ingredients().await?))
    }
}

impl std::fmt::Debug for CatalogReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogReader").finish_non_exhaustive()
    }
}
