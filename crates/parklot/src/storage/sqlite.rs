//! `SQLite`-backed [`LotStore`].

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info};

use super::{migrations, LotStore};
use crate::error::{Error, Result};
use crate::model::{CarRecord, ParkingLot};

const SELECT_CURRENT: &str = r"
    SELECT unique_code, car_number_plate, time_of_entry, image_url, NULL
    FROM current_cars
";

const SELECT_HISTORY: &str = r"
    SELECT unique_code, car_number_plate, time_of_entry, image_url, time_of_exit
    FROM car_history
";

/// Persistent lot storage in a single `SQLite` database file.
///
/// The connection is guarded by a mutex, so every call is serialized. The
/// checkout move runs inside one transaction.
#[derive(Debug)]
pub struct SqliteStore {
    /// Path to the database file.
    path: PathBuf,
    /// Database connection.
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open or create a database at the given path.
    ///
    /// Creates the parent directories and database file if they don't exist,
    /// then brings the schema up to date.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or schema initialization fails.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        debug!("Opening database at {}", path.display());
        let conn = Connection::open(&path).map_err(|source| Error::DatabaseOpen {
            path: path.clone(),
            source,
        })?;

        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;
        migrations::initialize_schema(&conn)?;

        info!("Database opened successfully at {}", path.display());
        Ok(Self {
            path,
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory database, mainly for tests.
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory database cannot be created.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|source| Error::DatabaseOpen {
            path: PathBuf::from(":memory:"),
            source,
        })?;

        migrations::initialize_schema(&conn)?;

        Ok(Self {
            path: PathBuf::from(":memory:"),
            conn: Mutex::new(conn),
        })
    }

    /// Get the path to the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| Error::internal("database connection lock poisoned"))
    }

    fn query_records(
        conn: &Connection,
        sql: &str,
        args: impl rusqlite::Params,
    ) -> Result<Vec<CarRecord>> {
        let mut stmt = conn.prepare(sql)?;
        let records = stmt
            .query_map(args, row_to_record)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(records)
    }

    fn insert_history(conn: &Connection, lot_id: &str, record: &CarRecord) -> Result<()> {
        let exit = record
            .time_of_exit
            .ok_or_else(|| Error::internal("history record without exit time"))?;
        conn.execute(
            r"
            INSERT OR REPLACE INTO car_history
                (lot_id, unique_code, car_number_plate, time_of_entry, image_url, time_of_exit)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ",
            params![
                lot_id,
                record.unique_code,
                record.car_number_plate,
                record.time_of_entry.to_rfc3339(),
                record.image_url,
                exit.to_rfc3339(),
            ],
        )?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl LotStore for SqliteStore {
    async fn put_lot(&self, lot: &ParkingLot) -> Result<()> {
        self.conn()?.execute(
            "INSERT OR REPLACE INTO parking_lots (id, name, time_zone) VALUES (?1, ?2, ?3)",
            params![lot.id, lot.name, lot.time_zone],
        )?;
        Ok(())
    }

    async fn get_lot(&self, lot_id: &str) -> Result<Option<ParkingLot>> {
        let lot = self
            .conn()?
            .query_row(
                "SELECT id, name, time_zone FROM parking_lots WHERE id = ?1",
                [lot_id],
                |row| {
                    Ok(ParkingLot {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        time_zone: row.get(2)?,
                    })
                },
            )
            .optional()?;
        Ok(lot)
    }

    async fn put_current(&self, lot_id: &str, record: &CarRecord) -> Result<()> {
        self.conn()?.execute(
            r"
            INSERT OR REPLACE INTO current_cars
                (lot_id, unique_code, car_number_plate, time_of_entry, image_url)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ",
            params![
                lot_id,
                record.unique_code,
                record.car_number_plate,
                record.time_of_entry.to_rfc3339(),
                record.image_url,
            ],
        )?;
        Ok(())
    }

    async fn get_current(&self, lot_id: &str, unique_code: &str) -> Result<Option<CarRecord>> {
        let sql = format!("{SELECT_CURRENT} WHERE lot_id = ?1 AND unique_code = ?2");
        let record = self
            .conn()?
            .query_row(&sql, [lot_id, unique_code], row_to_record)
            .optional()?;
        Ok(record)
    }

    async fn find_current_by_plate(&self, lot_id: &str, plate: &str) -> Result<Vec<CarRecord>> {
        let sql = format!(
            "{SELECT_CURRENT} WHERE lot_id = ?1 AND car_number_plate = ?2 ORDER BY unique_code ASC"
        );
        let conn = self.conn()?;
        Self::query_records(&conn, &sql, [lot_id, plate])
    }

    async fn delete_current(&self, lot_id: &str, unique_code: &str) -> Result<bool> {
        let affected = self.conn()?.execute(
            "DELETE FROM current_cars WHERE lot_id = ?1 AND unique_code = ?2",
            [lot_id, unique_code],
        )?;
        Ok(affected > 0)
    }

    async fn put_history(&self, lot_id: &str, record: &CarRecord) -> Result<()> {
        let conn = self.conn()?;
        Self::insert_history(&conn, lot_id, record)
    }

    async fn get_history(&self, lot_id: &str, unique_code: &str) -> Result<Option<CarRecord>> {
        let sql = format!("{SELECT_HISTORY} WHERE lot_id = ?1 AND unique_code = ?2");
        let record = self
            .conn()?
            .query_row(&sql, [lot_id, unique_code], row_to_record)
            .optional()?;
        Ok(record)
    }

    async fn list_current(&self, lot_id: &str) -> Result<Vec<CarRecord>> {
        let sql = format!("{SELECT_CURRENT} WHERE lot_id = ?1 ORDER BY time_of_entry, unique_code");
        let conn = self.conn()?;
        Self::query_records(&conn, &sql, [lot_id])
    }

    async fn list_history(&self, lot_id: &str) -> Result<Vec<CarRecord>> {
        let sql = format!("{SELECT_HISTORY} WHERE lot_id = ?1 ORDER BY time_of_exit, unique_code");
        let conn = self.conn()?;
        Self::query_records(&conn, &sql, [lot_id])
    }

    async fn move_to_history(&self, lot_id: &str, record: &CarRecord) -> Result<()> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        Self::insert_history(&tx, lot_id, record)?;
        let removed = tx.execute(
            "DELETE FROM current_cars WHERE lot_id = ?1 AND unique_code = ?2",
            [lot_id, record.unique_code.as_str()],
        )?;
        tx.commit()?;
        debug!(
            lot_id,
            unique_code = %record.unique_code,
            removed,
            "Moved car record to history"
        );
        Ok(())
    }
}

fn parse_timestamp(idx: usize, value: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
        })
}

/// Convert a `current_cars` or `car_history` row into a record.
fn row_to_record(row: &rusqlite::Row) -> rusqlite::Result<CarRecord> {
    let time_of_entry: String = row.get(2)?;
    let time_of_exit: Option<String> = row.get(4)?;

    Ok(CarRecord {
        unique_code: row.get(0)?,
        car_number_plate: row.get(1)?,
        time_of_entry: parse_timestamp(2, &time_of_entry)?,
        image_url: row.get(3)?,
        time_of_exit: time_of_exit
            .map(|value| parse_timestamp(4, &value))
            .transpose()?,
    })
}
