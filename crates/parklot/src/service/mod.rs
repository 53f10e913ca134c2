//! Parking lot operations.
//!
//! Each component receives its backends at construction time through
//! [`Backends`]; nothing reaches for a global connection. [`ParkingService`]
//! bundles the four components for the HTTP and CLI front ends.

pub mod checkout;
pub mod intake;
pub mod lots;
pub mod query;

use std::sync::Arc;

use crate::blob::{BlobStore, FsBlobStore};
use crate::clock::{Clock, IdGenerator, SystemClock, UuidGenerator};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::model::{CarRecord, Checkout, ParkingLot};
use crate::storage::{LotStore, SqliteStore};

pub use checkout::CarCheckout;
pub use intake::{decode_image_base64, CarIntake, PhotoSettings};
pub use lots::LotRegistry;
pub use query::{CarHistoryQuery, CurrentCarsQuery};

/// The collaborators every operation is built from.
#[derive(Debug, Clone)]
pub struct Backends {
    /// Lot and car record persistence.
    pub store: Arc<dyn LotStore>,
    /// Entry photo storage.
    pub blobs: Arc<dyn BlobStore>,
    /// Source of timestamps.
    pub clock: Arc<dyn Clock>,
    /// Source of lot ids and unique codes.
    pub ids: Arc<dyn IdGenerator>,
}

impl Backends {
    /// Use the given stores with the system clock and random UUIDs.
    #[must_use]
    pub fn new(store: Arc<dyn LotStore>, blobs: Arc<dyn BlobStore>) -> Self {
        Self {
            store,
            blobs,
            clock: Arc::new(SystemClock),
            ids: Arc::new(UuidGenerator),
        }
    }

    /// Replace the clock.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Replace the id generator.
    #[must_use]
    pub fn with_ids(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = ids;
        self
    }
}

/// Reject absent (empty) required inputs.
pub(crate) fn require<'a>(field: &'static str, value: &'a str) -> Result<&'a str> {
    if value.is_empty() {
        Err(Error::missing(field))
    } else {
        Ok(value)
    }
}

/// All parking operations behind one handle.
#[derive(Debug, Clone)]
pub struct ParkingService {
    lots: LotRegistry,
    intake: CarIntake,
    checkout: CarCheckout,
    current: CurrentCarsQuery,
    history: CarHistoryQuery,
}

impl ParkingService {
    /// Build the service from explicit backends.
    #[must_use]
    pub fn new(backends: Backends, photos: PhotoSettings) -> Self {
        Self {
            lots: LotRegistry::new(backends.clone()),
            intake: CarIntake::new(backends.clone(), photos),
            checkout: CarCheckout::new(backends.clone()),
            current: CurrentCarsQuery::new(backends.clone()),
            history: CarHistoryQuery::new(backends),
        }
    }

    /// Open the `SQLite` database and blob directory named by `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if either backend cannot be opened.
    pub fn open(config: &Config) -> Result<Self> {
        let store = SqliteStore::open(config.database_path())?;
        let blobs = FsBlobStore::open(
            config.blob_root(),
            &config.public_base_url(),
            config.blobs.signing_secret.as_deref(),
        )?;
        let backends = Backends::new(Arc::new(store), Arc::new(blobs));
        Ok(Self::new(backends, PhotoSettings::from(&config.blobs)))
    }

    /// The backends shared by every component.
    #[must_use]
    pub fn backends(&self) -> &Backends {
        self.lots.backends()
    }

    /// See [`LotRegistry::register`].
    ///
    /// # Errors
    ///
    /// See [`LotRegistry::register`].
    pub async fn register_lot(&self, name: &str, time_zone: &str) -> Result<String> {
        self.lots.register(name, time_zone).await
    }

    /// See [`LotRegistry::get`].
    ///
    /// # Errors
    ///
    /// See [`LotRegistry::get`].
    pub async fn get_lot(&self, lot_id: &str) -> Result<ParkingLot> {
        self.lots.get(lot_id).await
    }

    /// See [`CarIntake::add_car`].
    ///
    /// # Errors
    ///
    /// See [`CarIntake::add_car`].
    pub async fn add_car(&self, lot_id: &str, number_plate: &str, image: &[u8]) -> Result<String> {
        self.intake.add_car(lot_id, number_plate, image).await
    }

    /// See [`CarCheckout::remove_car`].
    ///
    /// # Errors
    ///
    /// See [`CarCheckout::remove_car`].
    pub async fn remove_car(&self, lot_id: &str, identifier: &str) -> Result<Checkout> {
        self.checkout.remove_car(lot_id, identifier).await
    }

    /// See [`CurrentCarsQuery::list_current`].
    ///
    /// # Errors
    ///
    /// See [`CurrentCarsQuery::list_current`].
    pub async fn list_current(&self, lot_id: &str) -> Result<Vec<CarRecord>> {
        self.current.list_current(lot_id).await
    }

    /// See [`CarHistoryQuery::list_history`].
    ///
    /// # Errors
    ///
    /// See [`CarHistoryQuery::list_history`].
    pub async fn list_history(&self, lot_id: &str) -> Result<Vec<CarRecord>> {
        self.history.list_history(lot_id).await
    }
}
