use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{CorrelationId, ReservationId};

/// Version number for a stored aggregate, used for optimistic concurrency control.
///
/// A never-saved aggregate is at version 0; every successful save
/// increments the version by one.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Version(i64);

impl Version {
    /// Creates a new version from a raw value.
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    /// Returns the initial version (0) for an aggregate that was never saved.
    pub fn initial() -> Self {
        Self(0)
    }

    /// Returns the version (1) of the first save.
    pub fn first() -> Self {
        Self(1)
    }

    /// Returns the next version.
    pub fn next(&self) -> Self {
        Self(self.0 + 1)
    }

    /// Returns the raw version value.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for Version {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl From<Version> for i64 {
    fn from(version: Version) -> Self {
        version.0
    }
}

/// One persisted aggregate.
///
/// The store only interprets the identifying columns; the aggregate itself
/// travels as an opaque JSON payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredRecord {
    /// Reservation the record belongs to.
    pub reservation_id: ReservationId,

    /// Resource kind (e.g. "flight", "payment").
    pub kind: String,

    /// Trip the reservation is part of.
    pub correlation_id: CorrelationId,

    /// Current state name, kept as a column for operators and queries.
    pub state: String,

    /// Version after the save that produced this record.
    pub version: Version,

    /// Serialized aggregate.
    pub payload: serde_json::Value,

    /// When the record was last written.
    pub updated_at: DateTime<Utc>,
}

impl StoredRecord {
    /// Builds a record by serializing an aggregate payload.
    pub fn from_payload<T: Serialize>(
        reservation_id: ReservationId,
        kind: impl Into<String>,
        correlation_id: CorrelationId,
        state: impl Into<String>,
        version: Version,
        payload: &T,
    ) -> Result<Self, serde_json::Error> {
        Ok(Self {
            reservation_id,
            kind: kind.into(),
            correlation_id,
            state: state.into(),
            version,
            payload: serde_json::to_value(payload)?,
            updated_at: Utc::now(),
        })
    }

    /// Deserializes the payload into the aggregate type.
    pub fn payload_as<T: serde::de::DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(self.payload.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Seat {
        row: u8,
        letter: char,
    }

    #[test]
    fn version_ordering() {
        assert!(Version::initial() < Version::first());
        assert_eq!(Version::initial().next(), Version::first());
        assert_eq!(Version::new(7).as_i64(), 7);
    }

    #[test]
    fn payload_round_trip() {
        let seat = Seat {
            row: 12,
            letter: 'C',
        };
        let record = StoredRecord::from_payload(
            ReservationId::new(),
            "flight",
            CorrelationId::parse("trip-1").unwrap(),
            "RESERVED",
            Version::first(),
            &seat,
        )
        .unwrap();

        assert_eq!(record.kind, "flight");
        assert_eq!(record.payload["row"], 12);
        assert_eq!(record.payload_as::<Seat>().unwrap(), seat);
    }
}
