//! `SQLite` schema definitions for parklot.
//!
//! The hierarchical layout `lot → {current, history} → unique code` is
//! flattened into three tables keyed by `(lot_id, unique_code)`.

/// SQL statement to create the parking lots table.
pub const CREATE_LOTS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS parking_lots (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    time_zone TEXT NOT NULL,
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
)
";

/// SQL statement to create the table of cars presently parked.
pub const CREATE_CURRENT_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS current_cars (
    lot_id TEXT NOT NULL,
    unique_code TEXT NOT NULL,
    car_number_plate TEXT NOT NULL,
    time_of_entry TEXT NOT NULL,
    image_url TEXT NOT NULL,
    PRIMARY KEY (lot_id, unique_code)
)
";

/// SQL statement to create the index used for plate lookups.
pub const CREATE_PLATE_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_current_cars_plate
    ON current_cars(lot_id, car_number_plate, unique_code)
";

/// SQL statement to create the table of cars that have left.
pub const CREATE_HISTORY_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS car_history (
    lot_id TEXT NOT NULL,
    unique_code TEXT NOT NULL,
    car_number_plate TEXT NOT NULL,
    time_of_entry TEXT NOT NULL,
    image_url TEXT NOT NULL,
    time_of_exit TEXT NOT NULL,
    PRIMARY KEY (lot_id, unique_code)
)
";

/// SQL statement to create an index on exit time for history listings.
pub const CREATE_HISTORY_EXIT_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_car_history_exit
    ON car_history(lot_id, time_of_exit)
";

/// SQL statement to create the metadata table for storing key-value pairs.
pub const CREATE_METADATA_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS metadata (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
)
";

/// All schema creation statements in order.
pub const SCHEMA_STATEMENTS: &[&str] = &[
    CREATE_LOTS_TABLE,
    CREATE_CURRENT_TABLE,
    CREATE_PLATE_INDEX,
    CREATE_HISTORY_TABLE,
    CREATE_HISTORY_EXIT_INDEX,
    CREATE_METADATA_TABLE,
];
