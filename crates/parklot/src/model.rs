//! Core record types for parklot.
//!
//! A [`ParkingLot`] owns two disjoint collections of [`CarRecord`]s: the cars
//! currently parked and the cars that have left. Both are keyed by the car's
//! unique code.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A registered parking facility.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParkingLot {
    /// Opaque identifier issued at registration.
    pub id: String,
    /// Free-text display name.
    pub name: String,
    /// Time zone identifier supplied at registration (e.g. `Europe/Paris`).
    pub time_zone: String,
}

/// One parking session of a car in a lot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CarRecord {
    /// Opaque identifier issued at intake. Primary key within a lot.
    pub unique_code: String,
    /// Licence plate as supplied by the caller. Not unique.
    pub car_number_plate: String,
    /// Server time at which the car was checked in.
    pub time_of_entry: DateTime<Utc>,
    /// Long-lived readable URL of the entry photo.
    pub image_url: String,
    /// Server time at which the car was checked out. Only set on history records.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_of_exit: Option<DateTime<Utc>>,
}

impl CarRecord {
    /// Stamp the exit time, turning a current record into a history record.
    #[must_use]
    pub fn checked_out(mut self, at: DateTime<Utc>) -> Self {
        self.time_of_exit = Some(at);
        self
    }

    /// Whether this record has been checked out.
    #[must_use]
    pub fn is_checked_out(&self) -> bool {
        self.time_of_exit.is_some()
    }
}

/// Result of a successful checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Checkout {
    /// Unique code of the car that left.
    pub unique_code: String,
    /// When the car entered.
    pub time_of_entry: DateTime<Utc>,
    /// When the car exited.
    pub time_of_exit: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_record() -> CarRecord {
        CarRecord {
            unique_code: "code-1".to_string(),
            car_number_plate: "ABC123".to_string(),
            time_of_entry: Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap(),
            image_url: "http://localhost/blobs/cars/code-1.jpg".to_string(),
            time_of_exit: None,
        }
    }

    #[test]
    fn test_current_record_serializes_camel_case_without_exit() {
        let json = serde_json::to_value(sample_record()).unwrap();
        assert_eq!(json["carNumberPlate"], "ABC123");
        assert_eq!(json["uniqueCode"], "code-1");
        assert!(json.get("imageUrl").is_some());
        assert!(json.get("timeOfExit").is_none());
    }

    #[test]
    fn test_checked_out_sets_exit() {
        let exit = Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap();
        let record = sample_record().checked_out(exit);
        assert!(record.is_checked_out());
        assert_eq!(record.time_of_exit, Some(exit));

        let json = serde_json::to_value(&record).unwrap();
        assert!(json.get("timeOfExit").is_some());
    }

    #[test]
    fn test_record_deserializes_without_exit() {
        let json = r#"{
            "uniqueCode": "c",
            "carNumberPlate": "P",
            "timeOfEntry": "2024-05-01T08:00:00Z",
            "imageUrl": "u"
        }"#;
        let record: CarRecord = serde_json::from_str(json).unwrap();
        assert!(record.time_of_exit.is_none());
        assert_eq!(record.car_number_plate, "P");
    }

    #[test]
    fn test_parking_lot_serializes_time_zone() {
        let lot = ParkingLot {
            id: "lot".to_string(),
            name: "Main St".to_string(),
            time_zone: "UTC".to_string(),
        };
        let json = serde_json::to_value(&lot).unwrap();
        assert_eq!(json["timeZone"], "UTC");
    }
}
