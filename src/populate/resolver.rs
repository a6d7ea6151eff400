//! Per-run entity identity resolution.

use crate::error::Result;
use rusqlite::{OptionalExtension, Transaction};
use std::collections::HashMap;

/// Get-or-create cache over one entity table.
///
/// Cache keys are trimmed, lower-cased names; the stored name keeps the
/// first-seen trimmed casing. The cache lives for one populate run only.
struct NameCache {
    table: &'static str,
    ids: HashMap<String, i64>,
    created: usize,
}

impl NameCache {
    fn new(table: &'static str) -> Self {
        Self {
            table,
            ids: HashMap::new(),
            created: 0,
        }
    }

    /// Two-tier lookup: in-run cache, then the store, then insert.
    ///
    /// The store lookup compares case-insensitively so that a later run
    /// resolving a different casing converges on the entity persisted by
    /// an earlier one. This ordering is what guarantees at most one
    /// entity per normalized name per run.
    fn resolve(&mut self, tx: &Transaction<'_>, raw_name: &str) -> Result<i64> {
        let name = raw_name.trim();
        let key = name.to_lowercase();

        if let Some(&id) = self.ids.get(&key) {
            return Ok(id);
        }

        let select = format!("SELECT id FROM {} WHERE name = ?1 COLLATE NOCASE", self.table);
        let existing: Option<i64> = tx
            .query_row(&select, [name], |row| row.get(0))
            .optional()?;

        let id = match existing {
            Some(id) => id,
            None => {
                let insert = format!("INSERT INTO {} (name) VALUES (?1)", self.table);
                tx.execute(&insert, [name])?;
                self.created += 1;
                tx.last_insert_rowid()
            }
        };

        self.ids.insert(key, id);
        Ok(id)
    }
}

/// Resolves raw names to entity ids, creating entities lazily.
///
/// Owns one identity cache per entity kind for the duration of a single
/// populate call; discard it when the batch is done.
pub struct EntityResolver {
    mirnas: NameCache,
    diseases: NameCache,
}

impl EntityResolver {
    pub fn new() -> Self {
        Self {
            mirnas: NameCache::new("mirnas"),
            diseases: NameCache::new("diseases"),
        }
    }

    /// Resolve a mirBase name to a microRNA entity id
    pub fn resolve_mirna(&mut self, tx: &Transaction<'_>, raw_name: &str) -> Result<i64> {
        self.mirnas.resolve(tx, raw_name)
    }

    /// Resolve a MeSH term to a disease entity id
    pub fn resolve_disease(&mut self, tx: &Transaction<'_>, raw_name: &str) -> Result<i64> {
        self.diseases.resolve(tx, raw_name)
    }

    /// Number of microRNA entities created by this run
    pub fn mirnas_created(&self) -> usize {
        self.mirnas.created
    }

    /// Number of disease entities created by this run
    pub fn diseases_created(&self) -> usize {
        self.diseases.created
    }
}

impl Default for EntityResolver {
    fn default() -> Self {
        Self::new()
    }
}
