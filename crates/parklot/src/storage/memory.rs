//! In-memory [`LotStore`] used by tests and for trying things out.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};

use super::LotStore;
use crate::error::{Error, Result};
use crate::model::{CarRecord, ParkingLot};

type Collection = BTreeMap<String, CarRecord>;

#[derive(Debug, Default)]
struct Inner {
    lots: HashMap<String, ParkingLot>,
    current: HashMap<String, Collection>,
    history: HashMap<String, Collection>,
}

/// A [`LotStore`] kept entirely in process memory.
///
/// Counts every mutating call so tests can assert that rejected requests
/// wrote nothing.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
    writes: AtomicUsize,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of mutating calls (`put_*`, `delete_*`, moves) made so far.
    #[must_use]
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>> {
        self.inner
            .lock()
            .map_err(|_| Error::internal("memory store lock poisoned"))
    }

    fn record_write(&self) {
        self.writes.fetch_add(1, Ordering::SeqCst);
    }
}

fn collection_values(map: &HashMap<String, Collection>, lot_id: &str) -> Vec<CarRecord> {
    map.get(lot_id)
        .map(|records| records.values().cloned().collect())
        .unwrap_or_default()
}

fn collection_get(
    map: &HashMap<String, Collection>,
    lot_id: &str,
    unique_code: &str,
) -> Option<CarRecord> {
    map.get(lot_id).and_then(|records| records.get(unique_code).cloned())
}

#[async_trait::async_trait]
impl LotStore for MemoryStore {
    async fn put_lot(&self, lot: &ParkingLot) -> Result<()> {
        self.record_write();
        self.lock()?.lots.insert(lot.id.clone(), lot.clone());
        Ok(())
    }

    async fn get_lot(&self, lot_id: &str) -> Result<Option<ParkingLot>> {
        Ok(self.lock()?.lots.get(lot_id).cloned())
    }

    async fn put_current(&self, lot_id: &str, record: &CarRecord) -> Result<()> {
        self.record_write();
        self.lock()?
            .current
            .entry(lot_id.to_string())
            .or_default()
            .insert(record.unique_code.clone(), record.clone());
        Ok(())
    }

    async fn get_current(&self, lot_id: &str, unique_code: &str) -> Result<Option<CarRecord>> {
        Ok(collection_get(&self.lock()?.current, lot_id, unique_code))
    }

    async fn find_current_by_plate(&self, lot_id: &str, plate: &str) -> Result<Vec<CarRecord>> {
        // BTreeMap iteration is already ordered by unique code.
        Ok(collection_values(&self.lock()?.current, lot_id)
            .into_iter()
            .filter(|record| record.car_number_plate == plate)
            .collect())
    }

    async fn delete_current(&self, lot_id: &str, unique_code: &str) -> Result<bool> {
        self.record_write();
        let removed = self
            .lock()?
            .current
            .get_mut(lot_id)
            .and_then(|records| records.remove(unique_code))
            .is_some();
        Ok(removed)
    }

    async fn put_history(&self, lot_id: &str, record: &CarRecord) -> Result<()> {
        if record.time_of_exit.is_none() {
            return Err(Error::internal("history record without exit time"));
        }
        self.record_write();
        self.lock()?
            .history
            .entry(lot_id.to_string())
            .or_default()
            .insert(record.unique_code.clone(), record.clone());
        Ok(())
    }

    async fn get_history(&self, lot_id: &str, unique_code: &str) -> Result<Option<CarRecord>> {
        Ok(collection_get(&self.lock()?.history, lot_id, unique_code))
    }

    async fn list_current(&self, lot_id: &str) -> Result<Vec<CarRecord>> {
        Ok(collection_values(&self.lock()?.current, lot_id))
    }

    async fn list_history(&self, lot_id: &str) -> Result<Vec<CarRecord>> {
        Ok(collection_values(&self.lock()?.history, lot_id))
    }

    async fn move_to_history(&self, lot_id: &str, record: &CarRecord) -> Result<()> {
        if record.time_of_exit.is_none() {
            return Err(Error::internal("history record without exit time"));
        }
        self.record_write();
        let mut inner = self.lock()?;
        inner
            .history
            .entry(lot_id.to_string())
            .or_default()
            .insert(record.unique_code.clone(), record.clone());
        if let Some(records) = inner.current.get_mut(lot_id) {
            records.remove(&record.unique_code);
        }
        Ok(())
    }
}
