//! Read-only views of a lot's car collections.

use tracing::debug;

use super::{require, Backends};
use crate::error::Result;
use crate::model::CarRecord;

/// Lists the cars currently parked in a lot.
#[derive(Debug, Clone)]
pub struct CurrentCarsQuery {
    backends: Backends,
}

impl CurrentCarsQuery {
    /// Create the query over the given backends.
    #[must_use]
    pub fn new(backends: Backends) -> Self {
        Self { backends }
    }

    /// Every record in the lot's `current` set, in unspecified order.
    ///
    /// An unknown lot yields an empty list rather than an error.
    ///
    /// # Errors
    ///
    /// Returns a validation error for an empty lot id, or a storage error.
    pub async fn list_current(&self, lot_id: &str) -> Result<Vec<CarRecord>> {
        let lot_id = require("parkingLotId", lot_id)?;
        let cars = self.backends.store.list_current(lot_id).await?;
        debug!(lot_id, count = cars.len(), "Listed current cars");
        Ok(cars)
    }
}

/// Lists the cars that have left a lot.
#[derive(Debug, Clone)]
pub struct CarHistoryQuery {
    backends: Backends,
}

impl CarHistoryQuery {
    /// Create the query over the given backends.
    #[must_use]
    pub fn new(backends: Backends) -> Self {
        Self { backends }
    }

    /// Every record in the lot's `history` set. Empty for unknown lots.
    ///
    /// # Errors
    ///
    /// Returns a validation error for an empty lot id, or a storage error.
    pub async fn list_history(&self, lot_id: &str) -> Result<Vec<CarRecord>> {
        let lot_id = require("parkingLotId", lot_id)?;
        let cars = self.backends.store.list_history(lot_id).await?;
        debug!(lot_id, count = cars.len(), "Listed car history");
        Ok(cars)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::testing::{fixture, service};

    #[tokio::test]
    async fn test_list_current_reflects_intake() {
        let fx = fixture();
        let svc = service(&fx);
        let lot_id = svc.register_lot("Lot", "UTC").await.unwrap();
        let query = CurrentCarsQuery::new(fx.backends.clone());

        assert!(query.list_current(&lot_id).await.unwrap().is_empty());

        svc.add_car(&lot_id, "ONE", b"1").await.unwrap();
        svc.add_car(&lot_id, "TWO", b"2").await.unwrap();

        let mut plates: Vec<_> = query
            .list_current(&lot_id)
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.car_number_plate)
            .collect();
        plates.sort();
        assert_eq!(plates, ["ONE", "TWO"]);
    }

    #[tokio::test]
    async fn test_lists_are_per_lot() {
        let fx = fixture();
        let svc = service(&fx);
        let a = svc.register_lot("A", "UTC").await.unwrap();
        let b = svc.register_lot("B", "UTC").await.unwrap();
        svc.add_car(&a, "ONLY-A", b"img").await.unwrap();

        let query = CurrentCarsQuery::new(fx.backends.clone());
        assert_eq!(query.list_current(&a).await.unwrap().len(), 1);
        assert!(query.list_current(&b).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_history_only_holds_exited_cars() {
        let fx = fixture();
        let svc = service(&fx);
        let lot_id = svc.register_lot("Lot", "UTC").await.unwrap();
        let gone = svc.add_car(&lot_id, "GONE", b"g").await.unwrap();
        svc.add_car(&lot_id, "STAYS", b"s").await.unwrap();
        svc.remove_car(&lot_id, &gone).await.unwrap();

        let history = CarHistoryQuery::new(fx.backends.clone());
        let records = history.list_history(&lot_id).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].unique_code, gone);
        assert!(records[0].is_checked_out());

        assert!(history.list_history("unknown").await.unwrap().is_empty());
    }
}
