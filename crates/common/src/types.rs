use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Maximum accepted length for coordinator supplied identifiers.
pub const MAX_EXTERNAL_ID_LEN: usize = 128;

/// Errors raised when parsing an identifier supplied from outside the process.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdError {
    /// The identifier was empty or whitespace only.
    #[error("{field} must not be empty")]
    Empty { field: &'static str },

    /// The identifier exceeded the accepted length.
    #[error("{field} must be at most {max} characters, got {len}")]
    TooLong {
        field: &'static str,
        len: usize,
        max: usize,
    },
}

/// Unique identifier for one resource reservation.
///
/// Wraps a UUID so reservation ids cannot be confused with the
/// coordinator's correlation ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReservationId(Uuid);

impl ReservationId {
    /// Creates a new random reservation ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a reservation ID from an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for ReservationId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ReservationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for ReservationId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl From<ReservationId> for Uuid {
    fn from(id: ReservationId) -> Self {
        id.0
    }
}

fn parse_external(field: &'static str, raw: &str) -> Result<String, IdError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(IdError::Empty { field });
    }
    let len = trimmed.chars().count();
    if len > MAX_EXTERNAL_ID_LEN {
        return Err(IdError::TooLong {
            field,
            len,
            max: MAX_EXTERNAL_ID_LEN,
        });
    }
    Ok(trimmed.to_string())
}

/// Trip/booking identifier supplied by the coordinator.
///
/// Shared by every resource reservation of one composite booking. Always
/// non-empty and trimmed; deserialization goes through the same checks.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CorrelationId(String);

impl CorrelationId {
    /// Parses a correlation ID, rejecting empty or oversized values.
    pub fn parse(raw: impl AsRef<str>) -> Result<Self, IdError> {
        parse_external("correlationId", raw.as_ref()).map(Self)
    }

    /// Returns the correlation ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for CorrelationId {
    type Error = IdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl TryFrom<&str> for CorrelationId {
    type Error = IdError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<CorrelationId> for String {
    fn from(id: CorrelationId) -> Self {
        id.0
    }
}

impl AsRef<str> for CorrelationId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Customer identifier supplied by the coordinator.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ClientId(String);

impl ClientId {
    /// Parses a client ID, rejecting empty or oversized values.
    pub fn parse(raw: impl AsRef<str>) -> Result<Self, IdError> {
        parse_external("clientId", raw.as_ref()).map(Self)
    }

    /// Returns the client ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ClientId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for ClientId {
    type Error = IdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl TryFrom<&str> for ClientId {
    type Error = IdError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<ClientId> for String {
    fn from(id: ClientId) -> Self {
        id.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reservation_id_new_creates_unique_ids() {
        let id1 = ReservationId::new();
        let id2 = ReservationId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn reservation_id_from_uuid_preserves_value() {
        let uuid = Uuid::new_v4();
        let id = ReservationId::from_uuid(uuid);
        assert_eq!(id.as_uuid(), uuid);
    }

    #[test]
    fn correlation_id_is_trimmed() {
        let id = CorrelationId::parse("  trip-1 ").unwrap();
        assert_eq!(id.as_str(), "trip-1");
    }

    #[test]
    fn correlation_id_rejects_blank() {
        assert_eq!(
            CorrelationId::parse("   "),
            Err(IdError::Empty {
                field: "correlationId"
            })
        );
    }

    #[test]
    fn correlation_id_rejects_oversized() {
        let raw = "x".repeat(MAX_EXTERNAL_ID_LEN + 1);
        assert!(matches!(
            CorrelationId::parse(&raw),
            Err(IdError::TooLong { len, .. }) if len == MAX_EXTERNAL_ID_LEN + 1
        ));
    }

    #[test]
    fn correlation_id_deserialization_validates() {
        let ok: CorrelationId = serde_json::from_str("\"trip-9\"").unwrap();
        assert_eq!(ok.as_str(), "trip-9");

        let err = serde_json::from_str::<CorrelationId>("\"\"");
        assert!(err.is_err());
    }

    #[test]
    fn client_id_serializes_as_plain_string() {
        let id = ClientId::parse("client-9").unwrap();
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"client-9\"");
    }
}
