//! Read side of the relational store: the counts and fetches used by the
//! admin surface and the graph exporter.

use crate::db::Db;
use crate::error::{Mir2GraphError, Result};
use rusqlite::OptionalExtension;
use serde::Serialize;

/// A mirBase-named microRNA entity
#[derive(Debug, Clone, Serialize)]
pub struct Mirna {
    pub id: i64,
    pub name: String,
}

/// A MeSH-named disease entity
#[derive(Debug, Clone, Serialize)]
pub struct Disease {
    pub id: i64,
    pub name: String,
}

/// A curated miRNA-disease relationship with its endpoints loaded
#[derive(Debug, Clone, Serialize)]
pub struct Relationship {
    pub id: i64,
    pub mirna: Mirna,
    pub disease: Disease,
    pub up_regulated: bool,
    pub description: String,
}

/// Count the microRNA entities
pub async fn count_mirnas(db: &Db) -> Result<i64> {
    count_table(db, "mirnas").await
}

/// Count the disease entities
pub async fn count_diseases(db: &Db) -> Result<i64> {
    count_table(db, "diseases").await
}

/// Count the relationships
pub async fn count_relationships(db: &Db) -> Result<i64> {
    count_table(db, "relationships").await
}

async fn count_table(db: &Db, table: &'static str) -> Result<i64> {
    db.with_connection(move |conn| {
        let count: i64 =
            conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))?;
        Ok(count)
    })
    .await
}

/// Fetch a microRNA by its exact stored name
pub async fn get_mirna_by_name(db: &Db, name: &str) -> Result<Option<Mirna>> {
    let name = name.to_string();
    db.with_connection(move |conn| {
        conn.query_row(
            "SELECT id, name FROM mirnas WHERE name = ?1",
            [&name],
            |row| {
                Ok(Mirna {
                    id: row.get(0)?,
                    name: row.get(1)?,
                })
            },
        )
        .optional()
        .map_err(Mir2GraphError::Database)
    })
    .await
}

/// Fetch a disease by its exact stored name
pub async fn get_disease_by_name(db: &Db, name: &str) -> Result<Option<Disease>> {
    let name = name.to_string();
    db.with_connection(move |conn| {
        conn.query_row(
            "SELECT id, name FROM diseases WHERE name = ?1",
            [&name],
            |row| {
                Ok(Disease {
                    id: row.get(0)?,
                    name: row.get(1)?,
                })
            },
        )
        .optional()
        .map_err(Mir2GraphError::Database)
    })
    .await
}

/// Fetch every relationship with both endpoint entities, in insertion order
pub async fn list_relationships(db: &Db) -> Result<Vec<Relationship>> {
    db.with_connection(|conn| {
        let mut stmt = conn.prepare(
            "SELECT r.id, r.up_regulated, r.description, \
                    m.id, m.name, d.id, d.name \
             FROM relationships r \
             JOIN mirnas m ON m.id = r.mirna_id \
             JOIN diseases d ON d.id = r.disease_id \
             ORDER BY r.id",
        )?;

        let rows = stmt.query_map([], |row| {
            Ok(Relationship {
                id: row.get(0)?,
                up_regulated: row.get(1)?,
                description: row.get(2)?,
                mirna: Mirna {
                    id: row.get(3)?,
                    name: row.get(4)?,
                },
                disease: Disease {
                    id: row.get(5)?,
                    name: row.get(6)?,
                },
            })
        })?;

        let mut relationships = Vec::new();
        for row in rows {
            relationships.push(row?);
        }
        Ok(relationships)
    })
    .await
}
