use anyhow::{anyhow, Context, Result};
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

use super::schema_gen::{generate_create_table, generate_drop_table, generate_indexes};
use crate::parser::EmissionRecord;
use crate::schema::ALL_TABLES;
use crate::ui::Ui;

const JOINED_QUERY: &str = "SELECT countries.name AS country, emissions.year, emissions.emission_value
     FROM emissions
     JOIN countries ON emissions.country_id = countries.id
     ORDER BY emissions.id";

/// One row of the emissions ⋈ countries join after cleaning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleanedRow {
    pub country: String,
    pub year: i64,
    pub emission_value: f64,
}

impl TryFrom<EmissionRecord> for CleanedRow {
    type Error = anyhow::Error;

    fn try_from(record: EmissionRecord) -> Result<Self> {
        let emission_value = record.emission.ok_or_else(|| {
            anyhow!("Emission for {} is still NULL; clean the store first", record.country)
        })?;
        Ok(Self {
            country: record.country,
            year: record.year,
            emission_value,
        })
    }
}

/// SQLite store holding the `countries` and `emissions` tables
pub struct EmissionStore {
    conn: Connection,
}

impl EmissionStore {
    pub fn open(db_path: &Path) -> Result<Self> {
        let conn = Connection::open(db_path)
            .with_context(|| format!("Failed to open database: {:?}", db_path))?;
        Self::configure(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("Failed to open in-memory database")?;
        Self::configure(conn)
    }

    fn configure(conn: Connection) -> Result<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        Ok(Self { conn })
    }

    /// Drop and recreate every table; children are dropped before parents
    pub fn reset_schema(&self) -> Result<()> {
        for schema in ALL_TABLES.iter().rev() {
            self.conn
                .execute(&generate_drop_table(schema), [])
                .with_context(|| format!("Failed to drop table: {}", schema.name))?;
        }

        for schema in ALL_TABLES {
            let sql = generate_create_table(schema);
            self.conn
                .execute(&sql, [])
                .with_context(|| format!("Failed to create table: {}", schema.name))?;

            for index_sql in generate_indexes(schema) {
                self.conn
                    .execute(&index_sql, [])
                    .with_context(|| format!("Failed to create index for: {}", schema.name))?;
            }
        }

        debug!("schema reset ({} tables)", ALL_TABLES.len());
        Ok(())
    }

    /// Insert `name` if it is new and return its id
    pub fn ensure_country(&self, name: &str) -> Result<i64> {
        ensure_country(&self.conn, name)
    }

    /// Insert one emission row per record, in order. Repeated country/year pairs are kept.
    pub fn load(&mut self, records: &[EmissionRecord], ui: &mut impl Ui) -> Result<u64> {
        let total = records.len() as u64;
        let tx = self.conn.transaction()?;
        let mut count: u64 = 0;

        {
            let mut insert = tx.prepare_cached(
                "INSERT INTO emissions (country_id, year, emission_value) VALUES (?1, ?2, ?3)",
            )?;

            for record in records {
                let country_id = ensure_country(&tx, &record.country)?;
                insert
                    .execute(params![country_id, record.year, record.emission])
                    .with_context(|| format!("Failed to insert emission for {}", record.country))?;

                count += 1;
                ui.set_progress(count, total, "emissions");
            }
        }

        tx.commit()?;
        ui.clear_progress();
        info!("loaded {} emission rows", count);

        Ok(count)
    }

    /// Replace every NULL emission with zero; returns the number of rows changed
    pub fn clean(&self) -> Result<usize> {
        let updated = self
            .conn
            .execute(
                "UPDATE emissions SET emission_value = 0.0 WHERE emission_value IS NULL",
                [],
            )
            .context("Failed to clean emissions")?;

        info!("replaced {} missing emission values with 0", updated);
        Ok(updated)
    }

    /// Read back the join of emissions and countries in insertion order
    pub fn joined_records(&self) -> Result<Vec<EmissionRecord>> {
        let mut stmt = self.conn.prepare(JOINED_QUERY)?;
        let rows = stmt.query_map([], |row| {
            Ok(EmissionRecord {
                country: row.get(0)?,
                year: row.get(1)?,
                emission: row.get(2)?,
            })
        })?;

        rows.collect::<rusqlite::Result<Vec<_>>>()
            .context("Failed to query joined emissions")
    }

    /// Joined rows after cleaning; fails if any emission is still NULL
    pub fn cleaned_rows(&self) -> Result<Vec<CleanedRow>> {
        self.joined_records()?
            .into_iter()
            .map(CleanedRow::try_from)
            .collect()
    }

    pub fn country_count(&self) -> Result<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM countries", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    #[cfg(test)]
    fn null_emission_count(&self) -> Result<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM emissions WHERE emission_value IS NULL",
            [],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    /// Close the connection, surfacing any error SQLite reports
    pub fn close(self) -> Result<()> {
        self.conn
            .close()
            .map_err(|(_, e)| e)
            .context("Failed to close database")
    }
}

fn ensure_country(conn: &Connection, name: &str) -> Result<i64> {
    conn.prepare_cached("INSERT OR IGNORE INTO countries (name) VALUES (?1)")?
        .execute([name])
        .with_context(|| format!("Failed to insert country: {}", name))?;

    conn.prepare_cached("SELECT id FROM countries WHERE name = ?1")?
        .query_row([name], |row| row.get(0))
        .optional()?
        .ok_or_else(|| anyhow!("Country {} missing after insert", name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::SilentUi;

    fn record(country: &str, emission: Option<f64>) -> EmissionRecord {
        EmissionRecord {
            country: country.to_string(),
            year: 2022,
            emission,
        }
    }

    fn store() -> EmissionStore {
        let store = EmissionStore::open_in_memory().unwrap();
        store.reset_schema().unwrap();
        store
    }

    #[test]
    fn test_country_dedup_is_idempotent() {
        let store = store();
        let first = store.ensure_country("France").unwrap();
        let second = store.ensure_country("France").unwrap();

        assert_eq!(first, second);
        assert_eq!(store.country_count().unwrap(), 1);
    }

    #[test]
    fn test_load_then_query_is_identity() {
        let mut store = store();
        let records = vec![
            record("China", Some(12_667_428_430.0)),
            record("France", Some(1_234_567.0)),
            record("Nowhereland", None),
        ];

        let count = store.load(&records, &mut SilentUi::new()).unwrap();
        assert_eq!(count, 3);
        assert_eq!(store.joined_records().unwrap(), records);
    }

    #[test]
    fn test_duplicate_pairs_are_kept() {
        let mut store = store();
        let records = vec![record("Chad", Some(1.0)), record("Chad", Some(2.0))];
        store.load(&records, &mut SilentUi::new()).unwrap();

        assert_eq!(store.country_count().unwrap(), 1);
        assert_eq!(store.joined_records().unwrap().len(), 2);
    }

    #[test]
    fn test_clean_replaces_nulls_with_zero() {
        let mut store = store();
        let records = vec![record("Nowhereland", None), record("Peru", Some(5.5)), record("Atlantis", None)];
        store.load(&records, &mut SilentUi::new()).unwrap();
        assert_eq!(store.null_emission_count().unwrap(), 2);

        assert_eq!(store.clean().unwrap(), 2);
        assert_eq!(store.null_emission_count().unwrap(), 0);

        let rows = store.cleaned_rows().unwrap();
        assert_eq!(rows[0].emission_value, 0.0);
        assert_eq!(rows[1].emission_value, 5.5);
        assert_eq!(rows[2].country, "Atlantis");
    }

    #[test]
    fn test_cleaned_rows_require_clean() {
        let mut store = store();
        store.load(&[record("Nowhereland", None)], &mut SilentUi::new()).unwrap();
        assert!(store.cleaned_rows().is_err());
    }

    #[test]
    fn test_reset_schema_discards_previous_rows() {
        let mut store = store();
        store.load(&[record("Peru", Some(1.0))], &mut SilentUi::new()).unwrap();

        store.reset_schema().unwrap();
        assert_eq!(store.country_count().unwrap(), 0);
        assert!(store.joined_records().unwrap().is_empty());
    }

    #[test]
    fn test_foreign_keys_enforced() {
        let store = store();
        let result = store.conn.execute(
            "INSERT INTO emissions (country_id, year, emission_value) VALUES (999, 2022, 1.0)",
            [],
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_reopen_file_resets_tables() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("emissions.db");

        let mut store = EmissionStore::open(&path).unwrap();
        store.reset_schema().unwrap();
        store.load(&[record("Peru", Some(1.0))], &mut SilentUi::new()).unwrap();
        store.close().unwrap();

        let store = EmissionStore::open(&path).unwrap();
        assert_eq!(store.country_count().unwrap(), 1);
        store.reset_schema().unwrap();
        assert_eq!(store.country_count().unwrap(), 0);
        store.close().unwrap();
    }
}
