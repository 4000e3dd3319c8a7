//! Local SQLite entry store.
//!
//! Mirrors the hosted store's two tables so the same rows can be inspected,
//! exported, or replayed against either backend.
//!
//! # Thread Safety
//!
//! The [`Database`] type wraps a `rusqlite::Connection`, which is `Send` but not `Sync`.
//! A `Database` instance can be moved between threads but cannot be shared
//! across threads without external synchronization.
//!
//! # Schema
//!
//! ## Timestamp Format
//!
//! Timestamps are stored as TEXT in RFC 3339 UTC with millisecond precision
//! (e.g., `2025-01-15T10:30:00.000Z`), so lexicographic ordering matches
//! chronological ordering.
//!
//! ## Dressing Columns
//!
//! `dressing_type` holds the comma-joined drainage names and `condition` holds
//! the derived volume in mL as a decimal string, matching the hosted table.

use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};
use om_core::entry::{join_drainage_types, split_drainage_types};
use om_core::{
    DRESSING_LOCATION, DressingEntry, EntryStore, NewDressingEntry, NewOutputEntry, OutputEntry,
};
use rusqlite::{Connection, params};
use thiserror::Error;
use uuid::Uuid;

/// Database errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// An error from the underlying database.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// A stored row could not be converted into an entry.
    #[error("invalid {table} row {id}: {message}")]
    InvalidRow {
        table: &'static str,
        id: String,
        message: String,
    },
}

/// Database connection wrapper.
///
/// See the [module documentation](self) for thread safety considerations.
#[derive(Debug)]
pub struct Database {
    conn: Connection,
}

/// A raw output row as stored.
#[derive(Debug, Clone, PartialEq, Eq)]
struct OutputRow {
    id: String,
    parent: String,
    amount: u32,
    timestamp: String,
}

/// A raw dressing row as stored.
#[derive(Debug, Clone, PartialEq, Eq)]
struct DressingRow {
    id: String,
    parent: String,
    dressing_type: String,
    location: String,
    condition: String,
    timestamp: String,
}

impl Database {
    /// Opens a database at the given path, creating it if necessary.
    ///
    /// The database schema is automatically initialized on first open.
    pub fn open(path: &Path) -> Result<Self, DbError> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Opens an in-memory database.
    ///
    /// Useful for testing. The database is destroyed when the connection closes.
    pub fn open_in_memory() -> Result<Self, DbError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Initializes the database schema.
    ///
    /// This is idempotent - safe to call on an already-initialized database.
    fn init(&self) -> Result<(), DbError> {
        self.conn.execute_batch(
            "
            -- parent: who recorded the entry
            -- amount: measured output in mL
            CREATE TABLE IF NOT EXISTS urine_entries (
                id TEXT PRIMARY KEY,
                parent TEXT NOT NULL,
                amount INTEGER NOT NULL,
                timestamp TEXT NOT NULL,
                created_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_urine_entries_timestamp ON urine_entries(timestamp);

            -- dressing_type: comma-joined drainage names
            -- condition: derived volume in mL, as text
            CREATE TABLE IF NOT EXISTS dressing_entries (
                id TEXT PRIMARY KEY,
                parent TEXT NOT NULL,
                dressing_type TEXT NOT NULL,
                location TEXT NOT NULL,
                condition TEXT NOT NULL,
                timestamp TEXT NOT NULL,
                created_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_dressing_entries_timestamp ON dressing_entries(timestamp);
            ",
        )?;
        Ok(())
    }

    /// Inserts an output reading and returns the stored row.
    pub fn insert_output(&mut self, entry: &NewOutputEntry) -> Result<OutputEntry, DbError> {
        let row = self.conn.query_row(
            "
            INSERT INTO urine_entries (id, parent, amount, timestamp, created_at)
            VALUES (?, ?, ?, ?, ?)
            RETURNING id, parent, amount, timestamp
            ",
            params![
                Uuid::new_v4().to_string(),
                entry.entered_by,
                entry.amount_ml,
                format_timestamp(entry.timestamp),
                format_timestamp(Utc::now()),
            ],
            |row| {
                Ok(OutputRow {
                    id: row.get(0)?,
                    parent: row.get(1)?,
                    amount: row.get(2)?,
                    timestamp: row.get(3)?,
                })
            },
        )?;
        tracing::debug!(id = %row.id, "inserted output entry");
        output_from_row(row)
    }

    /// Inserts a dressing change and returns the stored row.
    pub fn insert_dressing(&mut self, entry: &NewDressingEntry) -> Result<DressingEntry, DbError> {
        let row = self.conn.query_row(
            "
            INSERT INTO dressing_entries
            (id, parent, dressing_type, location, condition, timestamp, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            RETURNING id, parent, dressing_type, location, condition, timestamp
            ",
            params![
                Uuid::new_v4().to_string(),
                entry.entered_by,
                join_drainage_types(&entry.drainage_types),
                entry.location(),
                entry.amount_ml.to_string(),
                format_timestamp(entry.timestamp),
                format_timestamp(Utc::now()),
            ],
            |row| {
                Ok(DressingRow {
                    id: row.get(0)?,
                    parent: row.get(1)?,
                    dressing_type: row.get(2)?,
                    location: row.get(3)?,
                    condition: row.get(4)?,
                    timestamp: row.get(5)?,
                })
            },
        )?;
        tracing::debug!(id = %row.id, "inserted dressing entry");
        dressing_from_row(row)
    }

    /// Lists output readings, newest first. Ties list the latest insert first.
    ///
    /// Rows that cannot be converted are skipped with a warning.
    pub fn list_outputs(&self) -> Result<Vec<OutputEntry>, DbError> {
        let mut stmt = self.conn.prepare(
            "
            SELECT id, parent, amount, timestamp
            FROM urine_entries
            ORDER BY timestamp DESC, rowid DESC
            ",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(OutputRow {
                id: row.get(0)?,
                parent: row.get(1)?,
                amount: row.get(2)?,
                timestamp: row.get(3)?,
            })
        })?;
        let mut entries = Vec::new();
        for row in rows {
            match output_from_row(row?) {
                Ok(entry) => entries.push(entry),
                Err(err) => tracing::warn!(error = %err, "skipping output row"),
            }
        }
        Ok(entries)
    }

    /// Lists dressing changes, newest first. Ties list the latest insert first.
    ///
    /// Rows that cannot be converted are skipped with a warning.
    pub fn list_dressings(&self) -> Result<Vec<DressingEntry>, DbError> {
        let mut stmt = self.conn.prepare(
            "
            SELECT id, parent, dressing_type, location, condition, timestamp
            FROM dressing_entries
            ORDER BY timestamp DESC, rowid DESC
            ",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(DressingRow {
                id: row.get(0)?,
                parent: row.get(1)?,
                dressing_type: row.get(2)?,
                location: row.get(3)?,
                condition: row.get(4)?,
                timestamp: row.get(5)?,
            })
        })?;
        let mut entries = Vec::new();
        for row in rows {
            match dressing_from_row(row?) {
                Ok(entry) => entries.push(entry),
                Err(err) => tracing::warn!(error = %err, "skipping dressing row"),
            }
        }
        Ok(entries)
    }
}

impl EntryStore for Database {
    type Error = DbError;

    fn insert_output(&mut self, entry: &NewOutputEntry) -> Result<OutputEntry, DbError> {
        Self::insert_output(self, entry)
    }

    fn insert_dressing(&mut self, entry: &NewDressingEntry) -> Result<DressingEntry, DbError> {
        Self::insert_dressing(self, entry)
    }

    fn list_outputs(&self) -> Result<Vec<OutputEntry>, DbError> {
        Self::list_outputs(self)
    }

    fn list_dressings(&self) -> Result<Vec<DressingEntry>, DbError> {
        Self::list_dressings(self)
    }
}

fn output_from_row(row: OutputRow) -> Result<OutputEntry, DbError> {
    let timestamp = parse_timestamp(&row.timestamp).ok_or_else(|| DbError::InvalidRow {
        table: "urine_entries",
        id: row.id.clone(),
        message: format!("invalid timestamp {}", row.timestamp),
    })?;
    Ok(OutputEntry {
        id: row.id,
        entered_by: row.parent,
        amount_ml: row.amount,
        timestamp,
    })
}

fn dressing_from_row(row: DressingRow) -> Result<DressingEntry, DbError> {
    let invalid = |message: String| DbError::InvalidRow {
        table: "dressing_entries",
        id: row.id.clone(),
        message,
    };

    let timestamp = parse_timestamp(&row.timestamp)
        .ok_or_else(|| invalid(format!("invalid timestamp {}", row.timestamp)))?;
    let amount_ml = row
        .condition
        .trim()
        .parse::<u32>()
        .map_err(|_| invalid(format!("invalid volume {}", row.condition)))?;
    let drainage_types =
        split_drainage_types(&row.dressing_type).map_err(|err| invalid(err.to_string()))?;
    let location = if row.location.is_empty() {
        DRESSING_LOCATION.to_string()
    } else {
        row.location
    };

    Ok(DressingEntry {
        id: row.id,
        entered_by: row.parent,
        drainage_types,
        location,
        amount_ml,
        timestamp,
    })
}

fn parse_timestamp(timestamp: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(timestamp)
        .ok()
        .map(|parsed| parsed.with_timezone(&Utc))
}

fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::NaiveDate;
    use om_core::{Dashboard, DrainageType, daily_hourly_averages};

    fn ts(s: &str) -> DateTime<Utc> {
        s.parse().expect("valid test timestamp")
    }

    fn new_output(timestamp: &str, amount_ml: u32) -> NewOutputEntry {
        NewOutputEntry {
            entered_by: "Joe".to_string(),
            amount_ml,
            timestamp: ts(timestamp),
        }
    }

    fn table_columns(conn: &Connection, table: &str) -> Vec<String> {
        let mut stmt = conn
            .prepare(&format!("PRAGMA table_info({table})"))
            .expect("prepare table_info");
        let rows = stmt
            .query_map([], |row| row.get::<_, String>(1))
            .expect("query table_info");
        rows.map(|row| row.expect("table_info row")).collect()
    }

    #[test]
    fn open_in_memory_database() {
        let db = Database::open_in_memory();
        assert!(db.is_ok());
    }

    #[test]
    fn schema_matches_hosted_tables() {
        let db = Database::open_in_memory().expect("open in-memory db");
        assert_eq!(
            table_columns(&db.conn, "urine_entries"),
            vec!["id", "parent", "amount", "timestamp", "created_at"]
        );
        assert_eq!(
            table_columns(&db.conn, "dressing_entries"),
            vec![
                "id",
                "parent",
                "dressing_type",
                "location",
                "condition",
                "timestamp",
                "created_at"
            ]
        );
    }

    #[test]
    fn insert_output_returns_stored_record() {
        let mut db = Database::open_in_memory().unwrap();
        let stored = db
            .insert_output(&new_output("2025-01-15T14:05:00Z", 120))
            .unwrap();

        assert!(Uuid::parse_str(&stored.id).is_ok());
        assert_eq!(stored.entered_by, "Joe");
        assert_eq!(stored.amount_ml, 120);
        assert_eq!(stored.timestamp, ts("2025-01-15T14:05:00Z"));
    }

    #[test]
    fn insert_dressing_stores_derived_columns() {
        let mut db = Database::open_in_memory().unwrap();
        let stored = db
            .insert_dressing(&NewDressingEntry {
                entered_by: "Tori".to_string(),
                drainage_types: vec![DrainageType::SerousDrainage, DrainageType::Urine],
                amount_ml: 4,
                timestamp: ts("2025-01-15T16:00:00Z"),
            })
            .unwrap();

        let (dressing_type, location, condition): (String, String, String) = db
            .conn
            .query_row(
                "SELECT dressing_type, location, condition FROM dressing_entries WHERE id = ?",
                [&stored.id],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .unwrap();
        assert_eq!(dressing_type, "Serous Drainage,Urine");
        assert_eq!(location, "wound");
        assert_eq!(condition, "4");
        assert!(stored.has_urine_leak());
    }

    #[test]
    fn lists_are_newest_first() {
        let mut db = Database::open_in_memory().unwrap();
        db.insert_output(&new_output("2025-01-15T10:00:00Z", 10))
            .unwrap();
        db.insert_output(&new_output("2025-01-15T12:00:00Z", 30))
            .unwrap();
        db.insert_output(&new_output("2025-01-15T11:00:00Z", 20))
            .unwrap();

        let amounts: Vec<_> = db
            .list_outputs()
            .unwrap()
            .iter()
            .map(|entry| entry.amount_ml)
            .collect();
        assert_eq!(amounts, vec![30, 20, 10]);
    }

    #[test]
    fn tied_timestamps_list_latest_insert_first() {
        let mut db = Database::open_in_memory().unwrap();
        for amount_ml in [48, 960, 5] {
            db.insert_output(&new_output("2025-01-01T10:00:00Z", amount_ml))
                .unwrap();
        }

        let amounts: Vec<_> = db
            .list_outputs()
            .unwrap()
            .iter()
            .map(|entry| entry.amount_ml)
            .collect();
        assert_eq!(amounts, vec![5, 960, 48]);
    }

    #[test]
    fn live_dashboard_matches_reloaded_dashboard() {
        let mut db = Database::open_in_memory().unwrap();
        let mut live = Dashboard::default();
        for (timestamp, amount_ml) in [
            ("2025-01-01T08:00:00Z", 0),
            ("2025-01-01T10:00:00Z", 48),
            ("2025-01-01T10:00:00Z", 960),
        ] {
            live.submit_output(&mut db, &new_output(timestamp, amount_ml))
                .unwrap();
        }

        let reloaded = Dashboard::load(&db).unwrap();
        assert_eq!(live, reloaded);

        let day = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let live_rates = daily_hourly_averages(live.outputs(), &Utc);
        assert_eq!(live_rates, daily_hourly_averages(reloaded.outputs(), &Utc));
        assert_eq!(live_rates[&day], 40);
    }

    #[test]
    fn corrupt_rows_are_skipped_on_load() {
        let mut db = Database::open_in_memory().unwrap();
        db.insert_output(&new_output("2025-01-15T10:00:00Z", 10))
            .unwrap();
        db.conn
            .execute(
                "INSERT INTO urine_entries (id, parent, amount, timestamp, created_at)
                 VALUES ('bad', 'Joe', 5, 'yesterday', '2025-01-15T10:00:00Z')",
                [],
            )
            .unwrap();
        db.conn
            .execute(
                "INSERT INTO dressing_entries
                 (id, parent, dressing_type, location, condition, timestamp, created_at)
                 VALUES ('bad', 'Tori', 'Urine', 'wound', 'NaN', '2025-01-15T10:00:00Z', '2025-01-15T10:00:00Z')",
                [],
            )
            .unwrap();

        let outputs = db.list_outputs().unwrap();
        assert_eq!(outputs.len(), 1);
        assert_eq!(outputs[0].amount_ml, 10);
        assert!(db.list_dressings().unwrap().is_empty());
    }

    #[test]
    fn file_database_persists_between_opens() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("om.db");

        {
            let mut db = Database::open(&path).unwrap();
            db.insert_output(&new_output("2025-01-15T10:00:00Z", 10))
                .unwrap();
        }

        let db = Database::open(&path).unwrap();
        assert_eq!(db.list_outputs().unwrap().len(), 1);
    }
}
