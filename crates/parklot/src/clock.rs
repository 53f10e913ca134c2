//! Time and identifier sources.
//!
//! Operations never call `Utc::now()` or generate ids directly; they go
//! through these traits so tests can pin both.

use chrono::{DateTime, Utc};

/// A source of the current UTC time.
pub trait Clock: Send + Sync + std::fmt::Debug {
    /// The current instant.
    fn now(&self) -> DateTime<Utc>;
}

/// The system wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A source of fresh unique identifiers.
pub trait IdGenerator: Send + Sync + std::fmt::Debug {
    /// Produce a new identifier, distinct from every previous one.
    fn next_id(&self) -> String;
}

/// Random (version 4) UUIDs in hyphenated form.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn next_id(&self) -> String {
        uuid::Uuid::new_v4().to_string()
    }
}
