//! Car check-out.

use tracing::{debug, info};

use super::{require, Backends};
use crate::error::{Error, Result};
use crate::model::{CarRecord, Checkout};

/// Checks cars out of a lot, moving them from `current` to `history`.
#[derive(Debug, Clone)]
pub struct CarCheckout {
    backends: Backends,
}

impl CarCheckout {
    /// Create a checkout over the given backends.
    #[must_use]
    pub fn new(backends: Backends) -> Self {
        Self { backends }
    }

    /// Find the current record an identifier refers to.
    ///
    /// The identifier is first tried as a unique code. Failing that it is
    /// matched against plates; when several parked cars share the plate, the
    /// one with the smallest unique code is chosen.
    ///
    /// # Errors
    ///
    /// Returns a not-found error if neither lookup matches.
    pub async fn resolve(&self, lot_id: &str, identifier: &str) -> Result<CarRecord> {
        let store = &self.backends.store;

        if let Some(record) = store.get_current(lot_id, identifier).await? {
            debug!(lot_id, identifier, "Resolved car by unique code");
            return Ok(record);
        }

        let mut matches = store.find_current_by_plate(lot_id, identifier).await?;
        if matches.len() > 1 {
            debug!(lot_id, plate = identifier, count = matches.len(), "Plate is ambiguous");
        }
        if matches.is_empty() {
            return Err(Error::car_not_found(identifier));
        }
        Ok(matches.swap_remove(0))
    }

    /// Check a car out by unique code or plate.
    ///
    /// # Errors
    ///
    /// - validation error if either input is empty
    /// - not-found error if the lot or the car does not exist
    /// - storage error if the move fails; the record then remains in at least
    ///   one of the two sets
    pub async fn remove_car(&self, lot_id: &str, identifier: &str) -> Result<Checkout> {
        let lot_id = require("parkingLotId", lot_id)?;
        let identifier = require("identifier", identifier)?;

        if self.backends.store.get_lot(lot_id).await?.is_none() {
            return Err(Error::lot_not_found(lot_id));
        }

        let record = self.resolve(lot_id, identifier).await?;
        // Never let a clock step backwards produce an exit before the entry.
        let time_of_exit = self.backends.clock.now().max(record.time_of_entry);
        let record = record.checked_out(time_of_exit);

        self.backends.store.move_to_history(lot_id, &record).await?;

        info!(lot_id, unique_code = %record.unique_code, "Car checked out");
        Ok(Checkout {
            unique_code: record.unique_code,
            time_of_entry: record.time_of_entry,
            time_of_exit,
        })
    }
}
