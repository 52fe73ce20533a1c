//! Core types for Smoothie
//!
//! Defines the records that flow between the catalog, the ledger and the
//! HTTP surface:
//! - Catalog ingredients and their external lookup keys
//! - Orders, their identifiers and the stored ingredient list
//! - Fulfilment edits and merge outcomes
//! - Nutrition records and per-ingredient panels

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Maximum number of ingredients in one smoothie
pub const MAX_INGREDIENTS: usize = 5;

/// Separator used when an ingredient list is stored as one string
pub const INGREDIENT_SEPARATOR: &str = ", ";

/// Order primary key (store-assigned sequence number)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(pub i64);

impl OrderId {
    /// Raw sequence value
    #[inline]
    #[must_use]
    pub fn value(self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for OrderId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

/// Selectable catalog ingredient
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ingredient {
    /// Display name, unique within the catalog
    pub name: String,
    /// Search term sent to the nutrition API
    pub lookup_key: String,
}

impl Ingredient {
    /// Create ingredient with an explicit lookup key
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>, lookup_key: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            lookup_key: lookup_key.into(),
        }
    }
}

/// Ordered ingredient names of one order
///
/// Persisted as a single `", "`-joined string. Names never contain a comma,
/// which keeps [`IngredientList::to_stored`] and [`IngredientList::from_stored`]
/// lossless.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IngredientList(Vec<String>);

impl IngredientList {
    /// Wrap already-validated names
    #[inline]
    #[must_use]
    pub(crate) fn from_validated(names: Vec<String>) -> Self {
        Self(names)
    }

    /// Parse a stored ingredient string
    #[must_use]
    pub fn from_stored(stored: &str) -> Self {
        Self(
            stored
                .split(',')
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }

    /// Render for storage
    #[must_use]
    pub fn to_stored(&self) -> String {
        self.0.join(INGREDIENT_SEPARATOR)
    }

    /// Ingredient names in selection order
    #[inline]
    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.0
    }

    /// Number of ingredients
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the list is empty (never true for a stored order)
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over names
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl std::fmt::Display for IngredientList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_stored())
    }
}

/// Stored smoothie order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    /// Primary key
    pub id: OrderId,
    /// Name written on the cup
    pub customer_name: String,
    /// Selected ingredients
    pub ingredients: IngredientList,
    /// Whether staff has filled the order
    pub filled: bool,
    /// Server-assigned creation time
    pub created_at: Option<DateTime<Utc>>,
}

/// Fulfilment edit for one order
///
/// Any other column an editing client sends along is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderEdit {
    /// Order to update
    pub id: OrderId,
    /// New fulfilment flag
    pub filled: bool,
}

impl OrderEdit {
    /// Create edit
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<OrderId>, filled: bool) -> Self {
        Self {
            id: id.into(),
            filled,
        }
    }

    /// Edit marking an order filled
    #[inline]
    #[must_use]
    pub fn fill(id: impl Into<OrderId>) -> Self {
        Self::new(id, true)
    }
}

/// Result of merging a batch of edits
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeOutcome {
    /// Edits that matched a stored order
    pub applied: usize,
    /// Edit ids with no stored order
    pub ignored: Vec<OrderId>,
}

/// Nutrition record as returned by the fruit API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NutritionFacts {
    /// Fruit name as known to the API
    pub name: String,
    /// Botanical family
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub family: Option<String>,
    /// Botanical genus
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genus: Option<String>,
    /// Botanical order
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<String>,
    /// Nutrient amounts per 100g (calories, sugar, ...)
    #[serde(default)]
    pub nutritions: BTreeMap<String, f64>,
}

/// Nutrition panel shown for one selected ingredient
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum NutritionPanel {
    /// Lookup succeeded
    Facts {
        /// Ingredient display name
        ingredient: String,
        /// Record from the API
        facts: NutritionFacts,
    },
    /// Lookup failed; the order flow continues
    Unavailable {
        /// Ingredient display name
        ingredient: String,
        /// Warning shown in place of the panel
        warning: String,
    },
}

impl NutritionPanel {
    /// Ingredient this panel belongs to
    #[must_use]
    pub fn ingredient(&self) -> &str {
        match self {
            Self::Facts { ingredient, .. } | Self::Unavailable { ingredient, .. } => ingredient,
        }
    }

    /// Whether the lookup failed
    #[inline]
    #[must_use]
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable { .. })
    }
}

/// Confirmation returned after placing an order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderReceipt {
    /// The order as stored
    pub order: Order,
    /// One panel per ingredient (empty when lookups are disabled)
    pub nutrition: Vec<NutritionPanel>,
}
