//! Nutrition lookup seam
//!
//! The external fruit API is reached through [`NutritionLookup`]; results are
//! display-only and never affect order data.

use crate::error::LookupError;
use crate::types::{NutritionFacts, NutritionPanel};
use async_trait::async_trait;
use futures::future::join_all;

/// Source of nutrition records keyed by API search term
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NutritionLookup: Send + Sync {
    /// Fetch the record for one lookup key
    async fn lookup(&self, lookup_key: &str) -> Result<NutritionFacts, LookupError>;
}

/// Look up every `(ingredient, lookup_key)` pair concurrently
///
/// Failures turn into [`NutritionPanel::Unavailable`]; the output has one
/// panel per input, in input order.
pub async fn build_panels(
    lookup: &dyn NutritionLookup,
    items: &[(String, String)],
) -> Vec<NutritionPanel> {
    let results = join_all(items.iter().map(|(_, key)| lookup.lookup(key))).await;

    items
        .iter()
        .zip(results)
        .map(|((ingredient, key), result)| match result {
            Ok(facts) => NutritionPanel::Facts {
                ingredient: ingredient.clone(),
                facts,
            },
            Err(e) => {
                tracing::warn!("Nutrition lookup for {} ({}) failed: {}", ingredient, key, e);
                NutritionPanel::Unavailable {
                    ingredient: ingredient.clone(),
                    warning: e.to_string(),
                }
            }
        })
        .collect()
}
