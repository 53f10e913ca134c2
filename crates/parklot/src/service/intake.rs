//! Car check-in.
//!
//! Intake stores the entry photo before the car record, so a record in the
//! `current` set always points at a photo that exists. A photo upload that
//! succeeds followed by a failed record write leaves an orphaned photo,
//! which is harmless.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{DateTime, Utc};
use tracing::{debug, info};

use super::{require, Backends};
use crate::config::BlobConfig;
use crate::error::{Error, Result};
use crate::model::CarRecord;

/// Where and how entry photos are stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoSettings {
    /// Object path prefix; photos land at `{prefix}/{unique_code}.jpg`.
    pub path_prefix: String,
    /// Content type recorded for each photo.
    pub content_type: String,
    /// Expiry of the issued read URLs.
    pub url_expires_at: DateTime<Utc>,
}

impl PhotoSettings {
    /// Object path of the photo for a car.
    #[must_use]
    pub fn object_path(&self, unique_code: &str) -> String {
        format!("{}/{unique_code}.jpg", self.path_prefix.trim_matches('/'))
    }
}

impl From<&BlobConfig> for PhotoSettings {
    fn from(config: &BlobConfig) -> Self {
        Self {
            path_prefix: config.path_prefix.clone(),
            content_type: config.content_type.clone(),
            url_expires_at: config.url_expires_at,
        }
    }
}

impl Default for PhotoSettings {
    fn default() -> Self {
        Self::from(&BlobConfig::default())
    }
}

/// Decode a base64 photo payload.
///
/// Accepts bare base64 or a `data:<mime>;base64,` URL. Embedded whitespace
/// (line-wrapped encoders) is ignored.
///
/// # Errors
///
/// Returns a missing-field error for an empty payload and an invalid-input
/// error for anything that is not base64.
pub fn decode_image_base64(encoded: &str) -> Result<Vec<u8>> {
    let encoded = encoded.trim();
    let payload = match encoded.strip_prefix("data:") {
        Some(rest) => rest
            .split_once(";base64,")
            .map(|(_, data)| data)
            .ok_or_else(|| Error::invalid("image data URL is not base64 encoded"))?,
        None => encoded,
    };

    let compact: String = payload.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    if compact.is_empty() {
        return Err(Error::missing("imageBase64"));
    }

    let bytes = STANDARD
        .decode(compact.as_bytes())
        .map_err(|e| Error::invalid(format!("image is not valid base64: {e}")))?;
    if bytes.is_empty() {
        return Err(Error::missing("imageBase64"));
    }
    Ok(bytes)
}

/// Checks cars into a lot.
#[derive(Debug, Clone)]
pub struct CarIntake {
    backends: Backends,
    photos: PhotoSettings,
}

impl CarIntake {
    /// Create an intake over the given backends.
    #[must_use]
    pub fn new(backends: Backends, photos: PhotoSettings) -> Self {
        Self { backends, photos }
    }

    /// Check a car into a lot and return its unique code.
    ///
    /// The entry time is taken from the server clock.
    ///
    /// # Errors
    ///
    /// - validation error if any input is empty
    /// - not-found error if the lot does not exist
    /// - storage error if the photo or the record cannot be written; in that
    ///   case no record is created
    pub async fn add_car(&self, lot_id: &str, number_plate: &str, image: &[u8]) -> Result<String> {
        let lot_id = require("parkingLotId", lot_id)?;
        let number_plate = require("numberPlate", number_plate)?;
        if image.is_empty() {
            return Err(Error::missing("imageBase64"));
        }

        let lot = self
            .backends
            .store
            .get_lot(lot_id)
            .await?
            .ok_or_else(|| Error::lot_not_found(lot_id))?;
        debug!(lot_id, time_zone = %lot.time_zone, "Checking car into lot");

        let unique_code = self.backends.ids.next_id();
        let time_of_entry = self.backends.clock.now();

        let object_path = self.photos.object_path(&unique_code);
        self.backends
            .blobs
            .put(&object_path, image, &self.photos.content_type)
            .await?;
        let image_url = self
            .backends
            .blobs
            .signed_url(&object_path, self.photos.url_expires_at)?;

        let record = CarRecord {
            unique_code,
            car_number_plate: number_plate.to_string(),
            time_of_entry,
            image_url,
            time_of_exit: None,
        };
        self.backends.store.put_current(lot_id, &record).await?;

        info!(lot_id, unique_code = %record.unique_code, plate = %record.car_number_plate, "Car checked in");
        Ok(record.unique_code)
    }
}
