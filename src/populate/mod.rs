//! The populate pipeline: row filtering, entity resolution, and the
//! single-transaction batch commit.

mod resolver;

pub use resolver::EntityResolver;

use crate::config::Config;
use crate::db::Db;
use crate::error::{Mir2GraphError, Result};
use crate::source::{self, RawRecord};
use rusqlite::{params, Connection};
use std::path::PathBuf;

/// The one direction value that maps to `up_regulated = true`
pub const UP_REGULATED: &str = "up-regulated";

/// Counts reported by a successful populate run
#[derive(Debug, Clone, Copy, Default)]
pub struct PopulateSummary {
    pub relationships: usize,
    pub skipped_rows: usize,
    pub mirnas_created: usize,
    pub diseases_created: usize,
}

/// Load the feed and persist every valid row.
///
/// Additive over existing entity tables: entities already stored are
/// reused, relationships are appended. Either the whole batch commits or
/// (on any storage failure) the store is left exactly as it was.
///
/// Known data-fidelity gap inherited from the source database: the
/// direction vocabulary is collapsed to a boolean. Only the literal
/// "up-regulated" maps to `true`; "down-regulated" and every other
/// value map to `false`.
pub async fn populate(
    db: &Db,
    config: &Config,
    source_override: Option<PathBuf>,
    force_download: bool,
) -> Result<PopulateSummary> {
    let records = source::load_records(config, source_override.as_deref(), force_download).await?;
    insert_records(db, records).await
}

/// Stage all valid records and commit them as one transaction
pub async fn insert_records(db: &Db, records: Vec<RawRecord>) -> Result<PopulateSummary> {
    let summary = db
        .with_connection(move |conn| insert_all(conn, &records).map_err(map_constraint))
        .await?;

    log::info!(
        "populate committed: {} relationships ({} rows skipped), {} new miRNAs, {} new diseases",
        summary.relationships,
        summary.skipped_rows,
        summary.mirnas_created,
        summary.diseases_created
    );
    Ok(summary)
}

fn insert_all(conn: &mut Connection, records: &[RawRecord]) -> Result<PopulateSummary> {
    let tx = conn.transaction()?;
    let mut resolver = EntityResolver::new();
    let mut summary = PopulateSummary::default();

    for record in records {
        let disease_name = record.disease_name.trim();
        if disease_name.is_empty() {
            log::warn!("skipping row {}: missing disease term", record.row_index);
            summary.skipped_rows += 1;
            continue;
        }

        let direction = record.direction.trim();
        if direction.is_empty() {
            log::warn!(
                "skipping row {}: missing relationship direction",
                record.row_index
            );
            summary.skipped_rows += 1;
            continue;
        }

        // Entity names must be non-empty; a row that would create a
        // nameless miRNA is as unusable as one without a disease term
        let mirna_name = record.mirna_name.trim();
        if mirna_name.is_empty() {
            log::warn!("skipping row {}: missing miRNA identifier", record.row_index);
            summary.skipped_rows += 1;
            continue;
        }

        let mirna_id = resolver.resolve_mirna(&tx, mirna_name)?;
        let disease_id = resolver.resolve_disease(&tx, disease_name)?;
        let up_regulated = direction == UP_REGULATED;

        tx.execute(
            "INSERT INTO relationships (mirna_id, disease_id, up_regulated, description) \
             VALUES (?1, ?2, ?3, ?4)",
            params![mirna_id, disease_id, up_regulated, record.description],
        )?;
        summary.relationships += 1;
    }

    summary.mirnas_created = resolver.mirnas_created();
    summary.diseases_created = resolver.diseases_created();

    tx.commit()?;
    Ok(summary)
}

/// A uniqueness violation at commit time (e.g. a concurrent writer) is a
/// conflict, not a generic database error; everything else passes through.
fn map_constraint(err: Mir2GraphError) -> Mir2GraphError {
    match err {
        Mir2GraphError::Database(rusqlite::Error::SqliteFailure(f, msg))
            if f.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            Mir2GraphError::ConflictingEntity(
                msg.unwrap_or_else(|| "uniqueness constraint violated".to_string()),
            )
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::schema;
    use crate::store;
    use tempfile::TempDir;

    fn record(
        row_index: usize,
        mirna: &str,
        disease: &str,
        direction: &str,
        description: &str,
    ) -> RawRecord {
        RawRecord {
            row_index,
            mirna_name: mirna.to_string(),
            disease_name: disease.to_string(),
            direction: direction.to_string(),
            detection_method: "Northern blot".to_string(),
            year: "2005".to_string(),
            description: description.to_string(),
        }
    }

    async fn setup_test_db() -> (Db, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let db = Db::new(temp_dir.path().join("test.db"));
        db.with_connection(|conn| schema::create_all(conn))
            .await
            .unwrap();
        (db, temp_dir)
    }

    #[tokio::test]
    async fn test_case_variants_collapse_to_one_entity() {
        let (db, _temp_dir) = setup_test_db().await;

        let summary = insert_records(
            &db,
            vec![
                record(0, "hsa-mir-21", "Breast Cancer", "up-regulated", "evidence A"),
                record(1, "hsa-MIR-21", "Lung Cancer", "down-regulated", "evidence B"),
            ],
        )
        .await
        .unwrap();

        assert_eq!(summary.relationships, 2);
        assert_eq!(summary.mirnas_created, 1);
        assert_eq!(summary.diseases_created, 2);

        assert_eq!(store::count_mirnas(&db).await.unwrap(), 1);
        assert_eq!(store::count_diseases(&db).await.unwrap(), 2);
        assert_eq!(store::count_relationships(&db).await.unwrap(), 2);

        // First-seen casing is what got stored
        let mirna = store::get_mirna_by_name(&db, "hsa-mir-21")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(mirna.name, "hsa-mir-21");

        let relationships = store::list_relationships(&db).await.unwrap();
        assert!(relationships[0].up_regulated);
        assert!(!relationships[1].up_regulated);
    }

    #[tokio::test]
    async fn test_invalid_rows_skipped() {
        let (db, _temp_dir) = setup_test_db().await;

        let summary = insert_records(
            &db,
            vec![
                record(0, "hsa-mir-21", "", "up-regulated", "no disease"),
                record(1, "hsa-mir-21", "Breast Cancer", "", "no direction"),
                record(2, "", "Breast Cancer", "up-regulated", "no mirna"),
                record(3, "hsa-mir-21", "Breast Cancer", "up-regulated", "valid"),
                record(4, "hsa-mir-21", "   ", "up-regulated", "whitespace disease"),
            ],
        )
        .await
        .unwrap();

        assert_eq!(summary.relationships, 1);
        assert_eq!(summary.skipped_rows, 4);
        assert_eq!(store::count_relationships(&db).await.unwrap(), 1);
        // Skipped rows must not leave entities behind either
        assert_eq!(store::count_mirnas(&db).await.unwrap(), 1);
        assert_eq!(store::count_diseases(&db).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_direction_collapse_is_literal() {
        let (db, _temp_dir) = setup_test_db().await;

        insert_records(
            &db,
            vec![
                record(0, "a", "X", "up-regulated", ""),
                record(1, "b", "X", "down-regulated", ""),
                record(2, "c", "X", "Up-regulated", ""),
                record(3, "d", "X", "deregulated", ""),
                record(4, "e", "X", "  up-regulated  ", ""),
            ],
        )
        .await
        .unwrap();

        let directions: Vec<bool> = store::list_relationships(&db)
            .await
            .unwrap()
            .iter()
            .map(|r| r.up_regulated)
            .collect();
        // Only the exact (trimmed) literal maps to true
        assert_eq!(directions, vec![true, false, false, false, true]);
    }

    #[tokio::test]
    async fn test_populate_is_additive_across_runs() {
        let (db, _temp_dir) = setup_test_db().await;

        insert_records(
            &db,
            vec![record(0, "hsa-mir-21", "Breast Cancer", "up-regulated", "A")],
        )
        .await
        .unwrap();

        let second = insert_records(
            &db,
            vec![record(0, "hsa-MIR-21", "Breast Cancer", "up-regulated", "A again")],
        )
        .await
        .unwrap();

        // The second run reuses both persisted entities
        assert_eq!(second.mirnas_created, 0);
        assert_eq!(second.diseases_created, 0);
        assert_eq!(store::count_mirnas(&db).await.unwrap(), 1);
        assert_eq!(store::count_diseases(&db).await.unwrap(), 1);
        // Relationships are never deduplicated
        assert_eq!(store::count_relationships(&db).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_referential_integrity_after_populate() {
        let (db, _temp_dir) = setup_test_db().await;

        insert_records(
            &db,
            vec![
                record(0, "hsa-mir-21", "Breast Cancer", "up-regulated", "A"),
                record(1, "hsa-mir-155", "Lung Cancer", "down-regulated", "B"),
            ],
        )
        .await
        .unwrap();

        // Every relationship joins to existing rows in both entity tables
        let dangling: i64 = db
            .with_connection(|conn| {
                let count = conn.query_row(
                    "SELECT COUNT(*) FROM relationships r \
                     LEFT JOIN mirnas m ON m.id = r.mirna_id \
                     LEFT JOIN diseases d ON d.id = r.disease_id \
                     WHERE m.id IS NULL OR d.id IS NULL",
                    [],
                    |row| row.get(0),
                )?;
                Ok(count)
            })
            .await
            .unwrap();
        assert_eq!(dangling, 0);
    }

    #[tokio::test]
    async fn test_failed_batch_leaves_store_unchanged() {
        let (db, _temp_dir) = setup_test_db().await;
        // Sabotage the schema so the relationship insert fails after
        // entities have been staged
        db.with_connection(|conn| {
            conn.execute("DROP TABLE relationships", [])?;
            Ok(())
        })
        .await
        .unwrap();

        let result = insert_records(
            &db,
            vec![record(0, "hsa-mir-21", "Breast Cancer", "up-regulated", "A")],
        )
        .await;
        assert!(result.is_err());

        // The staged entities were rolled back with the batch
        assert_eq!(store::count_mirnas(&db).await.unwrap(), 0);
        assert_eq!(store::count_diseases(&db).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_source_unavailable_commits_nothing() {
        let (db, temp_dir) = setup_test_db().await;
        let mut config = Config::default();
        config.storage.data_dir = temp_dir.path().join("data");
        config.source.url = "http://127.0.0.1:1/AllEntries.txt".to_string();

        let err = populate(&db, &config, None, false).await.unwrap_err();
        assert!(matches!(err, Mir2GraphError::SourceUnavailable(_)));
        assert_eq!(store::count_relationships(&db).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_description_stored_verbatim() {
        let (db, _temp_dir) = setup_test_db().await;

        insert_records(
            &db,
            vec![record(
                0,
                "hsa-mir-21",
                "Breast Cancer",
                "up-regulated",
                "  spaced evidence  ",
            )],
        )
        .await
        .unwrap();

        let relationships = store::list_relationships(&db).await.unwrap();
        assert_eq!(relationships[0].description, "  spaced evidence  ");
    }
}
