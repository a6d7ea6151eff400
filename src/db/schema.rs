//! Schema management: idempotent creation and explicit teardown.
//!
//! The schema is fixed (three tables), so there is no migration history;
//! `create_all` can be run on every start.

use crate::error::Result;
use rusqlite::Connection;

/// Entity and relationship tables.
///
/// Entity names carry a case-sensitive UNIQUE constraint; case-insensitive
/// deduplication happens in the resolver before rows ever reach the store.
const CREATE_SQL: &str = "\
CREATE TABLE IF NOT EXISTS mirnas (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS diseases (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS relationships (
    id INTEGER PRIMARY KEY,
    mirna_id INTEGER NOT NULL REFERENCES mirnas(id),
    disease_id INTEGER NOT NULL REFERENCES diseases(id),
    up_regulated INTEGER NOT NULL,
    description TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_relationships_mirna ON relationships(mirna_id);
CREATE INDEX IF NOT EXISTS idx_relationships_disease ON relationships(disease_id);
";

/// Relationships first: they hold the foreign keys.
const DROP_SQL: &str = "\
DROP TABLE IF EXISTS relationships;
DROP TABLE IF EXISTS diseases;
DROP TABLE IF EXISTS mirnas;
";

/// Create all tables if they do not exist yet
pub fn create_all(conn: &Connection) -> Result<()> {
    conn.execute_batch(CREATE_SQL)?;
    log::debug!("schema ensured");
    Ok(())
}

/// Drop all tables (test isolation and the `drop` admin command)
pub fn drop_all(conn: &Connection) -> Result<()> {
    conn.execute_batch(DROP_SQL)?;
    log::debug!("schema dropped");
    Ok(())
}
