//! Parking lot registration.

use tracing::info;

use super::{require, Backends};
use crate::error::{Error, Result};
use crate::model::ParkingLot;

/// Creates and looks up parking lots.
#[derive(Debug, Clone)]
pub struct LotRegistry {
    backends: Backends,
}

impl LotRegistry {
    /// Create a registry over the given backends.
    #[must_use]
    pub fn new(backends: Backends) -> Self {
        Self { backends }
    }

    pub(crate) fn backends(&self) -> &Backends {
        &self.backends
    }

    /// Register a new lot and return its freshly issued id.
    ///
    /// Names need not be unique; registering the same name twice yields two
    /// lots. The time zone is stored as given.
    ///
    /// # Errors
    ///
    /// Returns a validation error if `name` or `time_zone` is empty, or a
    /// storage error if the lot cannot be written.
    pub async fn register(&self, name: &str, time_zone: &str) -> Result<String> {
        let name = require("name", name)?;
        let time_zone = require("timeZone", time_zone)?;

        let lot = ParkingLot {
            id: self.backends.ids.next_id(),
            name: name.to_string(),
            time_zone: time_zone.to_string(),
        };
        self.backends.store.put_lot(&lot).await?;

        info!(lot_id = %lot.id, name = %lot.name, time_zone = %lot.time_zone, "Registered parking lot");
        Ok(lot.id)
    }

    /// Fetch a registered lot.
    ///
    /// # Errors
    ///
    /// Returns a not-found error if no lot has this id.
    pub async fn get(&self, lot_id: &str) -> Result<ParkingLot> {
        let lot_id = require("parkingLotId", lot_id)?;
        self.backends
            .store
            .get_lot(lot_id)
            .await?
            .ok_or_else(|| Error::lot_not_found(lot_id))
    }
}
