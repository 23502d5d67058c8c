//! Core aggregate trait and resource kinds.

use common::{CorrelationId, ReservationId};
use reservation_store::Version;
use serde::{Deserialize, Serialize, de::DeserializeOwned};

/// The kinds of resource a trip is assembled from.
///
/// Each kind is a separate bounded context with its own handlers; nothing
/// is ever committed across kinds in one unit of work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Flight,
    Hotel,
    Car,
    Payment,
}

impl ResourceKind {
    /// Returns the kind name used as the store key.
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Flight => "flight",
            ResourceKind::Hotel => "hotel",
            ResourceKind::Car => "car",
            ResourceKind::Payment => "payment",
        }
    }

    /// Parses a kind name.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "flight" => Some(ResourceKind::Flight),
            "hotel" => Some(ResourceKind::Hotel),
            "car" => Some(ResourceKind::Car),
            "payment" => Some(ResourceKind::Payment),
            _ => None,
        }
    }
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Trait for aggregates persisted through the reservation store.
///
/// An aggregate is mutated in place by its transition methods and saved as
/// a whole. The version is owned by the store: it is refreshed from the
/// stored record on every load and save.
pub trait Aggregate: Clone + Serialize + DeserializeOwned + Send + Sync {
    /// Returns the store key for this aggregate type.
    fn kind() -> &'static str;

    /// Returns the aggregate's unique identifier.
    fn id(&self) -> ReservationId;

    /// Returns the trip this aggregate belongs to.
    fn correlation_id(&self) -> &CorrelationId;

    /// Returns the version the aggregate was loaded at.
    ///
    /// `Version::initial()` for an aggregate that was never saved.
    fn version(&self) -> Version;

    /// Sets the aggregate version.
    fn set_version(&mut self, version: Version);

    /// Returns the current state name.
    fn state_name(&self) -> &'static str;

    /// Returns true if no further transition is possible.
    fn is_terminal(&self) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_round_trip() {
        for kind in [
            ResourceKind::Flight,
            ResourceKind::Hotel,
            ResourceKind::Car,
            ResourceKind::Payment,
        ] {
            assert_eq!(ResourceKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(ResourceKind::parse("train"), None);
    }

    #[test]
    fn test_kind_serialization() {
        let json = serde_json::to_string(&ResourceKind::Hotel).unwrap();
        assert_eq!(json, "\"hotel\"");
    }
}
