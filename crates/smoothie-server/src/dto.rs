//! Request and response bodies of the HTTP surface and CLI files.

use serde::{Deserialize, Serialize};
use smoothie_core::Ingredient;
use std::collections::HashSet;

/// `POST /orders` body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceOrderRequest {
    pub customer_name: String,
    pub ingredients: Vec<String>,
}

/// `GET /nutrition` query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NutritionQuery {
    pub ingredient: String,
}

/// Error body for every non-2xx response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub message: String,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
        }
    }
}

/// `GET /health` body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HealthBody {
    pub status: &'static str,
}

/// One entry of a catalog seed file
#[derive(Debug, Clone, Deserialize)]
struct CatalogRow {
    name: String,
    #[serde(default)]
    lookup_key: Option<String>,
}

/// Catalog seed file errors
#[derive(Debug, thiserror::Error)]
pub enum CatalogFileError {
    #[error("catalog file is not a JSON array of rows: {0}")]
    Json(#[from] serde_json::Error),

    #[error("catalog row {row} has a blank name")]
    BlankName { row: usize },

    #[error("catalog row {row} name {name:?} contains a comma")]
    CommaInName { row: usize, name: String },

    #[error("catalog row {row} repeats ingredient {name:?}")]
    DuplicateName { row: usize, name: String },
}

/// Parse a JSON catalog seed file: `[{"name": "Apple", "lookup_key": "apple"}, ...]`
///
/// Names follow the same rules orders do: non-blank, no commas, no repeats.
/// Rows without a lookup key resolve one the same way catalog reads do.
///
/// # Errors
/// Fails if the text is not a JSON array of catalog rows, or a row (counted
/// from 1) cannot be ordered.
pub fn parse_catalog_file(text: &str) -> Result<Vec<Ingredient>, CatalogFileError> {
    let rows: Vec<CatalogRow> = serde_json::from_str(text)?;
    let mut seen = HashSet::with_capacity(rows.len());
    let mut ingredients = Vec::with_capacity(rows.len());

    for (index, row) in rows.into_iter().enumerate() {
        let row_number = index + 1;
        let name = row.name.trim();
        if name.is_empty() {
            return Err(CatalogFileError::BlankName { row: row_number });
        }
        if name.contains(',') {
            return Err(CatalogFileError::CommaInName {
                row: row_number,
                name: name.to_string(),
            });
        }
        if !seen.insert(name.to_string()) {
            return Err(CatalogFileError::DuplicateName {
                row: row_number,
                name: name.to_string(),
            });
        }
        ingredients.push(Ingredient::from_catalog_row(name, row.lookup_key.as_deref()));
    }
    Ok(ingredients)
}
