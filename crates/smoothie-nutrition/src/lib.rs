//! Nutrition lookups against the external fruit API
//!
//! [`FruitApiClient`] implements [`smoothie_core::NutritionLookup`] over
//! `reqwest`, keeping successful records in a `moka` TTL cache.

#![allow(missing_docs)]

pub mod client;

pub use client::FruitApiClient;
