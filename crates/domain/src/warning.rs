//! Booking warning raised by the coordinator when a trip ends badly.

use chrono::{DateTime, Utc};
use common::{CorrelationId, ReservationId};
use reservation_store::Version;
use serde::{Deserialize, Serialize};

use crate::aggregate::Aggregate;

/// Warning recorded for a trip, one per correlation id.
///
/// Redelivered warnings overwrite the stored values and bump the delivery
/// count instead of creating a second record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingWarning {
    id: ReservationId,
    #[serde(default)]
    version: Version,
    correlation_id: CorrelationId,
    /// Saga state reported by the coordinator (e.g. "COMPENSATION_FAILED").
    final_state: String,
    requires_manual_intervention: bool,
    recorded_at: DateTime<Utc>,
    deliveries: u32,
}

impl Aggregate for BookingWarning {
    fn kind() -> &'static str {
        "booking_warning"
    }

    fn id(&self) -> ReservationId {
        self.id
    }

    fn correlation_id(&self) -> &CorrelationId {
        &self.correlation_id
    }

    fn version(&self) -> Version {
        self.version
    }

    fn set_version(&mut self, version: Version) {
        self.version = version;
    }

    fn state_name(&self) -> &'static str {
        if self.requires_manual_intervention {
            "MANUAL_INTERVENTION"
        } else {
            "RECORDED"
        }
    }

    fn is_terminal(&self) -> bool {
        false
    }
}

impl BookingWarning {
    pub fn new(
        correlation_id: CorrelationId,
        final_state: impl Into<String>,
        requires_manual_intervention: bool,
    ) -> Self {
        Self {
            id: ReservationId::new(),
            version: Version::initial(),
            correlation_id,
            final_state: final_state.into(),
            requires_manual_intervention,
            recorded_at: Utc::now(),
            deliveries: 1,
        }
    }

    /// Overwrites the warning with a later delivery.
    pub fn record_delivery(
        &mut self,
        final_state: impl Into<String>,
        requires_manual_intervention: bool,
    ) {
        self.final_state = final_state.into();
        self.requires_manual_intervention = requires_manual_intervention;
        self.recorded_at = Utc::now();
        self.deliveries += 1;
    }

    pub fn final_state(&self) -> &str {
        &self.final_state
    }

    pub fn requires_manual_intervention(&self) -> bool {
        self.requires_manual_intervention
    }

    pub fn recorded_at(&self) -> DateTime<Utc> {
        self.recorded_at
    }

    /// Number of times the warning was delivered.
    pub fn deliveries(&self) -> u32 {
        self.deliveries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redelivery_overwrites() {
        let mut warning = BookingWarning::new(
            CorrelationId::parse("trip-1").unwrap(),
            "COMPENSATED",
            false,
        );
        assert_eq!(warning.state_name(), "RECORDED");

        warning.record_delivery("COMPENSATION_FAILED", true);

        assert_eq!(warning.final_state(), "COMPENSATION_FAILED");
        assert!(warning.requires_manual_intervention());
        assert_eq!(warning.deliveries(), 2);
        assert_eq!(warning.state_name(), "MANUAL_INTERVENTION");
    }
}
