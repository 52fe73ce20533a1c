//! Backing stores for the smoothie catalog and order ledger
//!
//! - [`SqliteStore`]: durable store on a SQLite database (`fruit_options` and
//!   `orders` tables)
//! - [`InMemoryStore`]: development and test store
//!
//! Both implement [`smoothie_core::CatalogSource`] and
//! [`smoothie_core::LedgerStore`].

#![allow(missing_docs)]

pub mod memory;
mod schema;
pub mod sqlite;

pub use memory::InMemoryStore;
pub use sqlite::SqliteStore;
