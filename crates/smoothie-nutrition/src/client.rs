//! Fruit API client
//!
//! `GET {base_url}/{lookup_key}` returning a JSON nutrition record. Records
//! are cached by lookup key; failures are not.

use async_trait::async_trait;
use moka::future::Cache;
use reqwest::{StatusCode, Url};
use serde::Deserialize;
use smoothie_core::{LookupError, NutritionConfig, NutritionFacts, NutritionLookup};
use std::sync::Arc;
use std::time::Duration;

/// Body shapes the API answers with
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ApiRecord {
    /// `{"error": "Not found"}`, sometimes with a 200 status
    Error { error: String },
    Facts(NutritionFacts),
}

/// Cached HTTP client for the fruit nutrition API
#[derive(Debug, Clone)]
pub struct FruitApiClient {
    http: reqwest::Client,
    base_url: Url,
    cache: Cache<String, Arc<NutritionFacts>>,
}

impl FruitApiClient {
    /// Build a client from nutrition config
    ///
    /// # Errors
    /// - `LookupError::InvalidEndpoint` if the base URL cannot take a path
    ///   segment or the HTTP client cannot be built
    pub fn new(config: &NutritionConfig) -> Result<Self, LookupError> {
        let raw = config.base_url.trim();
        let base_url = Url::parse(raw)
            .map_err(|e| LookupError::InvalidEndpoint(format!("{raw}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(LookupError::InvalidEndpoint(raw.to_string()));
        }

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("smoothie/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| LookupError::InvalidEndpoint(e.to_string()))?;

        let cache = Cache::builder()
            .max_capacity(config.cache_capacity)
            .time_to_live(Duration::from_secs(config.cache_ttl_secs))
            .build();

        Ok(Self {
            http,
            base_url,
            cache,
        })
    }

    /// Request URL for a lookup key
    ///
    /// # Errors
    /// - `LookupError::InvalidEndpoint` if the base URL cannot take segments
    pub fn endpoint_for(&self, lookup_key: &str) -> Result<Url, LookupError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| LookupError::InvalidEndpoint(self.base_url.to_string()))?
            .pop_if_empty()
            .push(lookup_key);
        Ok(url)
    }

    /// Number of cached records
    #[must_use]
    pub fn cached_entries(&self) -> u64 {
        self.cache.entry_count()
    }

    async fn fetch(&self, lookup_key: &str) -> Result<NutritionFacts, LookupError> {
        let url = self.endpoint_for(lookup_key)?;
        tracing::debug!("Fetching nutrition from {}", url);

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| LookupError::Transport(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(LookupError::NotFound(lookup_key.to_string()));
        }
        if !status.is_success() {
            return Err(LookupError::Status {
                key: lookup_key.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| LookupError::Transport(e.to_string()))?;
        decode_record(lookup_key, &body)
    }
}

#[async_trait]
impl NutritionLookup for FruitApiClient {
    async fn lookup(&self, lookup_key: &str) -> Result<NutritionFacts, LookupError> {
        let key = lookup_key.trim();
        if key.is_empty() {
            return Err(LookupError::NotFound(String::new()));
        }

        if let Some(hit) = self.cache.get(key).await {
            tracing::debug!("Nutrition cache hit for {}", key);
            return Ok(hit.as_ref().clone());
        }

        let facts = self.fetch(key).await?;
        self.cache.insert(key.to_string(), Arc::new(facts.clone())).await;
        Ok(facts)
    }
}

fn decode_record(lookup_key: &str, body: &[u8]) -> Result<NutritionFacts, LookupError> {
    match serde_json::from_slice::<ApiRecord>(body) {
        Ok(ApiRecord::Facts(facts)) => Ok(facts),
        Ok(ApiRecord::Error { error }) => {
            tracing::debug!("Nutrition API error for {}: {}", lookup_key, error);
            Err(LookupError::NotFound(lookup_key.to_string()))
        }
        Err(e) => Err(LookupError::Decode(e.to_string())),
    }
}
