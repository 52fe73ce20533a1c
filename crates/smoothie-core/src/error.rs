//! Error types for Smoothie Core
//!
//! Provides the error taxonomy shared by every crate in the workspace:
//! - Input validation failures (bad customer name, bad ingredient selection)
//! - Backing-store failures (connectivity, constraints, corrupt rows)
//! - Nutrition lookup failures (display-only, never block an order)
//! - Configuration loading failures

use std::path::PathBuf;

/// Main error type for shop operations
#[derive(Debug, thiserror::Error)]
pub enum ShopError {
    /// Input rejected before touching the store
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// Backing store rejected or could not serve the request
    #[error("persistence failed: {0}")]
    Persistence(#[from] StoreError),

    /// Nutrition lookup failed (only surfaced by direct lookups)
    #[error("nutrition lookup failed: {0}")]
    Lookup(#[from] LookupError),
}

impl ShopError {
    /// Check if error was caused by caller input
    #[inline]
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Check if error came from the backing store
    #[inline]
    #[must_use]
    pub fn is_persistence(&self) -> bool {
        matches!(self, Self::Persistence(_))
    }

    /// Short machine-readable kind, used in error bodies
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::Persistence(_) => "persistence",
            Self::Lookup(LookupError::NotFound(_)) => "not_found",
            Self::Lookup(_) => "lookup",
        }
    }
}

/// Order input validation errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// Customer name missing or blank
    #[error("customer name must not be empty")]
    EmptyCustomerName,

    /// No ingredients selected
    #[error("at least one ingredient is required")]
    NoIngredients,

    /// More ingredients than a smoothie holds
    #[error("too many ingredients: {count} selected, at most {max} allowed")]
    TooManyIngredients { count: usize, max: usize },

    /// Ingredient name blank after trimming
    #[error("ingredient at position {position} is blank")]
    BlankIngredient { position: usize },

    /// Ingredient name cannot be stored losslessly
    #[error("ingredient name contains a separator: '{0}'")]
    InvalidIngredientName(String),

    /// Same ingredient selected twice
    #[error("ingredient selected more than once: '{0}'")]
    DuplicateIngredient(String),

    /// Ingredient not in the current catalog
    #[error("unknown ingredient: '{0}'")]
    UnknownIngredient(String),
}

/// Backing store errors
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Store unreachable or could not be opened
    #[error("connection error: {0}")]
    Connection(String),

    /// Write rejected by a store constraint
    #[error("constraint violation: {0}")]
    Constraint(String),

    /// Stored row could not be decoded into a record
    #[error("corrupt row: {0}")]
    Corrupt(String),

    /// Anything else
    #[error("internal error: {0}")]
    Internal(String),
}

/// Nutrition lookup errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LookupError {
    /// External API has no record for the lookup key
    #[error("no nutrition record for '{0}'")]
    NotFound(String),

    /// External API answered with an unexpected status
    #[error("nutrition service returned status {status} for '{key}'")]
    Status { key: String, status: u16 },

    /// Request never completed (connect, timeout, TLS)
    #[error("nutrition service unreachable: {0}")]
    Transport(String),

    /// Response body was not a nutrition record
    #[error("undecodable nutrition record: {0}")]
    Decode(String),

    /// Endpoint configuration is unusable
    #[error("invalid nutrition endpoint: {0}")]
    InvalidEndpoint(String),

    /// Lookups switched off in configuration
    #[error("nutrition lookup is disabled")]
    Disabled,
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File could not be read
    #[error("io error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File is not valid TOML for the config schema
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    /// Values parse but make no sense together
    #[error("invalid config value: {0}")]
    Invalid(String),
}
