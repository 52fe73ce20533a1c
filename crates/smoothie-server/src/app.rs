//! Wiring from configuration to a running shop

use crate::routes::routes;
use anyhow::Context;
use smoothie_core::{Shop, ShopConfig};
use smoothie_nutrition::FruitApiClient;
use smoothie_store::SqliteStore;
use std::net::SocketAddr;
use std::sync::Arc;

/// Store handle and shop built from one configuration
#[derive(Debug, Clone)]
pub struct App {
    shop: Arc<Shop>,
    store: SqliteStore,
}

impl App {
    /// Open the configured database and build the shop
    ///
    /// # Errors
    /// Fails if the database cannot be opened or the nutrition client cannot
    /// be built from its config.
    pub fn open(config: &ShopConfig) -> anyhow::Result<Self> {
        let store = SqliteStore::open_config(&config.store)
            .with_context(|| format!("opening database {}", config.store.database.display()))?;

        let mut shop = Shop::new(Arc::new(store.clone()), Arc::new(store.clone()));
        if config.nutrition.enabled {
            let client = FruitApiClient::new(&config.nutrition)
                .context("building nutrition client")?;
            shop = shop.with_nutrition(Arc::new(client));
        } else {
            tracing::info!("Nutrition lookups disabled");
        }

        Ok(Self {
            shop: Arc::new(shop),
            store,
        })
    }

    /// Shared shop handle
    #[inline]
    #[must_use]
    pub fn shop(&self) -> Arc<Shop> {
        Arc::clone(&self.shop)
    }

    /// Underlying store, for administrative commands
    #[inline]
    #[must_use]
    pub fn store(&self) -> &SqliteStore {
        &self.store
    }

    /// Serve the HTTP surface until Ctrl-C
    ///
    /// # Errors
    /// Fails if the address cannot be bound.
    pub async fn serve(self, bind: SocketAddr) -> anyhow::Result<()> {
        let (addr, server) = warp::serve(routes(self.shop()))
            .try_bind_with_graceful_shutdown(bind, async {
                if tokio::signal::ctrl_c().await.is_err() {
                    tracing::warn!("Cannot listen for Ctrl-C; shut down by signal instead");
                    std::future::pending::<()>().await;
                }
            })
            .with_context(|| format!("binding {bind}"))?;

        tracing::info!(%addr, database = self.store.location(), "Smoothie counter listening");
        server.await;
        tracing::info!("Smoothie counter stopped");
        Ok(())
    }
}
