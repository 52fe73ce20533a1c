//! SQLite backing store
//!
//! One connection behind `Arc<Mutex<_>>`. Every operation takes the lock for
//! exactly its own duration on a `spawn_blocking` thread, so a handle is a
//! plain value that can be cloned into each request.

use crate::schema;
use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use rusqlite::types::Type;
use rusqlite::{params, Connection, ErrorCode, OptionalExtension, Row};
use smoothie_core::{
    CatalogSource, Ingredient, IngredientList, LedgerStore, MergeOutcome, NewOrder, Order,
    OrderEdit, OrderId, StoreConfig, StoreError,
};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

const ORDER_COLUMNS: &str = "order_uid, name_on_order, ingredients, order_filled, order_ts";

/// SQLite implementation of the catalog and ledger stores
#[derive(Debug, Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
    location: Arc<str>,
}

impl SqliteStore {
    /// Open (or create) a database file and apply the schema
    ///
    /// # Errors
    /// - `StoreError::Connection` if the file cannot be opened
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let conn = Connection::open(path)
            .map_err(|e| StoreError::Connection(format!("cannot open {}: {e}", path.display())))?;
        Self::from_connection(conn, &path.display().to_string())
    }

    /// Open a private in-memory database
    ///
    /// # Errors
    /// - `StoreError::Connection` if SQLite cannot allocate the database
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| StoreError::Connection(format!("cannot open in-memory database: {e}")))?;
        Self::from_connection(conn, ":memory:")
    }

    /// Open the database named by a store config
    ///
    /// # Errors
    /// - `StoreError::Connection` if the database cannot be opened
    pub fn open_config(config: &StoreConfig) -> Result<Self, StoreError> {
        if config.is_in_memory() {
            Self::open_in_memory()
        } else {
            Self::open(&config.database)
        }
    }

    fn from_connection(conn: Connection, location: &str) -> Result<Self, StoreError> {
        conn.busy_timeout(BUSY_TIMEOUT).map_err(map_sqlite_error)?;
        schema::migrate(&conn).map_err(map_sqlite_error)?;
        tracing::debug!("Opened SQLite store at {}", location);
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            location: Arc::from(location),
        })
    }

    /// Where the database lives
    #[inline]
    #[must_use]
    pub fn location(&self) -> &str {
        &self.location
    }

    /// Insert catalog rows that are not already present
    ///
    /// Existing rows are never modified. Returns the number of rows inserted.
    ///
    /// # Errors
    /// - `StoreError` if the write fails
    pub async fn seed_catalog(&self, ingredients: Vec<Ingredient>) -> Result<usize, StoreError> {
        self.with_session("seed_catalog", move |conn| {
            let tx = conn.transaction()?;
            let mut inserted = 0;
            {
                let mut stmt = tx.prepare_cached(
                    "INSERT OR IGNORE INTO fruit_options (fruit_name, search_on) VALUES (?1, ?2)",
                )?;
                for ingredient in &ingredients {
                    inserted += stmt.execute(params![ingredient.name, ingredient.lookup_key])?;
                }
            }
            tx.commit()?;
            Ok(inserted)
        })
        .await
    }

    /// Run `f` with exclusive use of the connection
    async fn with_session<T, F>(&self, op: &'static str, f: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection) -> rusqlite::Result<T> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let mut session = conn.lock();
            f(&mut session).map_err(map_sqlite_error)
        })
        .await
        .map_err(|e| StoreError::Internal(format!("{op}: blocking task failed: {e}")))?
        .map_err(|e| {
            tracing::debug!("SQLite {} failed: {}", op, e);
            e
        })
    }
}

#[async_trait]
impl CatalogSource for SqliteStore {
    async fn list_ingredients(&self) -> Result<Vec<Ingredient>, StoreError> {
        self.with_session("list_ingredients", |conn| {
            let mut stmt = conn
                .prepare_cached("SELECT fruit_name, search_on FROM fruit_options ORDER BY rowid")?;
            let rows = stmt.query_map([], |row| {
                let name: String = row.get(0)?;
                let key: Option<String> = row.get(1)?;
                Ok(Ingredient::from_catalog_row(name, key.as_deref()))
            })?;
            rows.collect::<rusqlite::Result<Vec<_>>>()
        })
        .await
    }
}

#[async_trait]
impl LedgerStore for SqliteStore {
    async fn insert(&self, order: &NewOrder) -> Result<Order, StoreError> {
        let customer = order.customer_name().to_string();
        let ingredients = order.ingredients().to_stored();

        self.with_session("insert", move |conn| {
            conn.execute(
                "INSERT INTO orders (name_on_order, ingredients, order_filled, order_ts) \
                 VALUES (?1, ?2, 0, ?3)",
                params![customer, ingredients, Utc::now()],
            )?;
            let id = conn.last_insert_rowid();
            conn.query_row(
                &format!("SELECT {ORDER_COLUMNS} FROM orders WHERE order_uid = ?1"),
                [id],
                row_to_order,
            )
        })
        .await
    }

    async fn get(&self, id: OrderId) -> Result<Option<Order>, StoreError> {
        self.with_session("get", move |conn| {
            conn.query_row(
                &format!("SELECT {ORDER_COLUMNS} FROM orders WHERE order_uid = ?1"),
                [id.value()],
                row_to_order,
            )
            .optional()
        })
        .await
    }

    async fn unfilled(&self) -> Result<Vec<Order>, StoreError> {
        self.with_session("unfilled", |conn| {
            let mut stmt = conn.prepare_cached(&format!(
                "SELECT {ORDER_COLUMNS} FROM orders WHERE order_filled = 0 ORDER BY order_uid"
            ))?;
            let rows = stmt.query_map([], row_to_order)?;
            rows.collect::<rusqlite::Result<Vec<_>>>()
        })
        .await
    }

    async fn merge_filled(&self, edits: &[OrderEdit]) -> Result<MergeOutcome, StoreError> {
        let edits = edits.to_vec();

        self.with_session("merge_filled", move |conn| {
            let tx = conn.transaction()?;
            let mut outcome = MergeOutcome::default();
            {
                let mut stmt = tx
                    .prepare_cached("UPDATE orders SET order_filled = ?1 WHERE order_uid = ?2")?;
                for edit in &edits {
                    match stmt.execute(params![edit.filled, edit.id.value()])? {
                        0 => outcome.ignored.push(edit.id),
                        changed => outcome.applied += changed,
                    }
                }
            }
            tx.commit()?;
            Ok(outcome)
        })
        .await
    }
}

/// Decode one `orders` row
fn row_to_order(row: &Row<'_>) -> rusqlite::Result<Order> {
    let stored: String = row.get(2)?;
    let ingredients = IngredientList::from_stored(&stored);
    if ingredients.is_empty() {
        return Err(rusqlite::Error::FromSqlConversionFailure(
            2,
            Type::Text,
            Box::new(StoreError::Corrupt("order has no ingredients".to_string())),
        ));
    }

    Ok(Order {
        id: OrderId(row.get(0)?),
        customer_name: row.get(1)?,
        ingredients,
        filled: row.get(3)?,
        created_at: row.get(4)?,
    })
}

fn map_sqlite_error(err: rusqlite::Error) -> StoreError {
    match &err {
        rusqlite::Error::SqliteFailure(failure, _) => match failure.code {
            ErrorCode::ConstraintViolation => StoreError::Constraint(err.to_string()),
            ErrorCode::CannotOpen
            | ErrorCode::DatabaseBusy
            | ErrorCode::DatabaseLocked
            | ErrorCode::NotADatabase
            | ErrorCode::SystemIoFailure => StoreError::Connection(err.to_string()),
            _ => StoreError::Internal(err.to_string()),
        },
        rusqlite::Error::FromSqlConversionFailure(..)
        | rusqlite::Error::InvalidColumnType(..)
        | rusqlite::Error::IntegralValueOutOfRange(..) => StoreError::Corrupt(err.to_string()),
        _ => StoreError::Internal(err.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn corrupt_row_is_reported() {
        let store = SqliteStore::open_in_memory().unwrap();
        store
            .with_session("test", |conn| {
                conn.execute_batch(
                    "INSERT INTO orders (name_on_order, ingredients, order_ts) \
                     VALUES ('Sam', ' , ', '2026-01-01T00:00:00Z')",
                )
            })
            .await
            .unwrap();

        let err = store.unfilled().await.unwrap_err();
        assert!(matches!(err, StoreError::Corrupt(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn catalog_rows_without_key_resolve_a_key() {
        let store = SqliteStore::open_in_memory().unwrap();
        store
            .with_session("test", |conn| {
                conn.execute_batch(
                    "INSERT INTO fruit_options (fruit_name, search_on) VALUES ('Blueberries', NULL);
                     INSERT INTO fruit_options (fruit_name, search_on) VALUES ('Mango', '');
                     INSERT INTO fruit_options (fruit_name, search_on) VALUES ('Kiwi', 'kiwi-fruit');",
                )
            })
            .await
            .unwrap();

        let catalog = store.list_ingredients().await.unwrap();
        assert_eq!(
            catalog,
            vec![
                Ingredient::new("Blueberries", "blueberry"),
                Ingredient::new("Mango", "Mango"),
                Ingredient::new("Kiwi", "kiwi-fruit"),
            ]
        );
    }

    #[test]
    fn constraint_failures_are_classified() {
        let conn = Connection::open_in_memory().unwrap();
        schema::migrate(&conn).unwrap();
        let err = conn
            .execute(
                "INSERT INTO orders (name_on_order, ingredients, order_ts) VALUES ('', 'Apple', 'x')",
                [],
            )
            .unwrap_err();
        assert!(matches!(map_sqlite_error(err), StoreError::Constraint(_)));
    }
}
