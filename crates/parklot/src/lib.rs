//! `parklot` - Parking lot vehicle check-in / check-out service
//!
//! This library tracks cars through a parking lot: lots register once, cars are
//! checked in with an entry photo and checked out by unique code or licence
//! plate, moving from the lot's current set into its history.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod blob;
pub mod cli;
pub mod clock;
pub mod config;
pub mod error;
pub mod http;
pub mod logging;
pub mod model;
pub mod service;
pub mod storage;

pub use config::Config;
pub use error::{Error, ErrorKind, Result};
pub use logging::init_logging;
pub use model::{CarRecord, Checkout, ParkingLot};
pub use service::{Backends, ParkingService};
