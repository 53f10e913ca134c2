//! Persistence layer for parklot.
//!
//! [`LotStore`] is the hierarchical key-value contract the operations are
//! written against: lots at the top, and under each lot a `current` and a
//! `history` collection of car records keyed by unique code. Two backends
//! implement it: [`SqliteStore`] for real deployments and [`MemoryStore`]
//! for tests.

pub mod memory;
pub mod migrations;
pub mod schema;
pub mod sqlite;

use crate::error::Result;
use crate::model::{CarRecord, ParkingLot};

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Storage contract for lots and their car collections.
///
/// All lookups are scoped to a lot. Writing into the `current` or `history`
/// collection of a lot that was never registered is allowed; the caller is
/// responsible for checking lot existence first.
#[async_trait::async_trait]
pub trait LotStore: Send + Sync + std::fmt::Debug {
    /// Insert or replace a lot.
    async fn put_lot(&self, lot: &ParkingLot) -> Result<()>;

    /// Read a lot by id.
    async fn get_lot(&self, lot_id: &str) -> Result<Option<ParkingLot>>;

    /// Insert or replace a record in the lot's `current` collection.
    async fn put_current(&self, lot_id: &str, record: &CarRecord) -> Result<()>;

    /// Point read from the lot's `current` collection.
    async fn get_current(&self, lot_id: &str, unique_code: &str) -> Result<Option<CarRecord>>;

    /// All `current` records with the given plate, ordered by unique code.
    async fn find_current_by_plate(&self, lot_id: &str, plate: &str) -> Result<Vec<CarRecord>>;

    /// Delete from the lot's `current` collection.
    ///
    /// Returns `true` if a record was removed, `false` if it was already gone.
    async fn delete_current(&self, lot_id: &str, unique_code: &str) -> Result<bool>;

    /// Insert or replace a record in the lot's `history` collection.
    async fn put_history(&self, lot_id: &str, record: &CarRecord) -> Result<()>;

    /// Point read from the lot's `history` collection.
    async fn get_history(&self, lot_id: &str, unique_code: &str) -> Result<Option<CarRecord>>;

    /// Every record in the lot's `current` collection. Empty for unknown lots.
    async fn list_current(&self, lot_id: &str) -> Result<Vec<CarRecord>>;

    /// Every record in the lot's `history` collection. Empty for unknown lots.
    async fn list_history(&self, lot_id: &str) -> Result<Vec<CarRecord>>;

    /// Move a checked-out record from `current` into `history`.
    ///
    /// The default writes `history` first and then deletes from `current`, so
    /// a failure between the two steps leaves the record in both collections
    /// rather than in neither. Backends with transactions override this to
    /// make the move atomic.
    async fn move_to_history(&self, lot_id: &str, record: &CarRecord) -> Result<()> {
        self.put_history(lot_id, record).await?;
        self.delete_current(lot_id, &record.unique_code).await?;
        Ok(())
    }
}
