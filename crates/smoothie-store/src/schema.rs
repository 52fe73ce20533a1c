//! SQLite schema bootstrap

use rusqlite::Connection;

/// Catalog and ledger tables; safe to run against an existing database
pub(crate) const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS fruit_options (
    fruit_name TEXT PRIMARY KEY NOT NULL,
    search_on  TEXT
);

CREATE TABLE IF NOT EXISTS orders (
    order_uid     INTEGER PRIMARY KEY AUTOINCREMENT,
    name_on_order TEXT    NOT NULL CHECK (length(name_on_order) > 0),
    ingredients   TEXT    NOT NULL CHECK (length(ingredients) > 0),
    order_filled  INTEGER NOT NULL DEFAULT 0 CHECK (order_filled IN (0, 1)),
    order_ts      TEXT    NOT NULL
);

CREATE INDEX IF NOT EXISTS orders_by_filled ON orders (order_filled, order_uid);
";

pub(crate) fn migrate(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migrate_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        migrate(&conn).unwrap();
        migrate(&conn).unwrap();

        let tables: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name IN ('fruit_options', 'orders')",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(tables, 2);
    }

    #[test]
    fn orders_reject_empty_ingredients() {
        let conn = Connection::open_in_memory().unwrap();
        migrate(&conn).unwrap();

        let result = conn.execute(
            "INSERT INTO orders (name_on_order, ingredients, order_ts) VALUES ('Sam', '', '2026-01-01')",
            [],
        );
        assert!(result.is_err());
    }
}
