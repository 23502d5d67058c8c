//! Booking warning handler.

use std::time::Instant;

use domain::{BookingWarning, DomainError, Repository};
use reservation_store::ReservationStore;

use crate::commands::{MarkWarning, WarningResult};
use crate::error::ParticipantError;
use crate::outcome::StepOutcome;

use super::{record_command, retry_on_conflict};

/// Records booking warnings raised by the coordinator.
pub struct WarningHandler<S: ReservationStore> {
    repository: Repository<S, BookingWarning>,
}

impl<S: ReservationStore> WarningHandler<S> {
    pub fn new(store: S) -> Self {
        Self {
            repository: Repository::new(store),
        }
    }

    pub fn repository(&self) -> &Repository<S, BookingWarning> {
        &self.repository
    }

    /// Stores the warning, overwriting an earlier delivery for the same trip.
    #[tracing::instrument(
        skip(self, command),
        fields(
            correlation_id = %command.correlation_id,
            final_state = %command.final_state
        )
    )]
    pub async fn mark_warning(&self, command: MarkWarning) -> StepOutcome<WarningResult> {
        let started = Instant::now();
        let result = retry_on_conflict(|| self.try_mark_warning(&command)).await;
        let outcome = StepOutcome::from_result(result.map_err(ParticipantError::from));

        if let StepOutcome::Succeeded(warning) = &outcome
            && warning.requires_manual_intervention
        {
            metrics::counter!("participant_manual_interventions_total").increment(1);
            tracing::error!(
                deliveries = warning.deliveries,
                "Booking requires manual intervention"
            );
        }

        record_command("mark-warning", &outcome, started);
        outcome
    }

    async fn try_mark_warning(&self, command: &MarkWarning) -> Result<WarningResult, DomainError> {
        let mut warning = match self
            .repository
            .find_by_correlation_id(&command.correlation_id)
            .await?
        {
            Some(mut existing) => {
                existing.record_delivery(
                    command.final_state.clone(),
                    command.requires_manual_intervention,
                );
                existing
            }
            None => BookingWarning::new(
                command.correlation_id.clone(),
                command.final_state.clone(),
                command.requires_manual_intervention,
            ),
        };
        self.repository.save(&mut warning).await?;

        tracing::warn!("Booking warning recorded");
        Ok(WarningResult {
            correlation_id: command.correlation_id.clone(),
            requires_manual_intervention: warning.requires_manual_intervention(),
            deliveries: warning.deliveries(),
        })
    }
}

#[cfg(test)]
mod tests {
    use common::CorrelationId;
    use reservation_store::InMemoryReservationStore;

    use super::*;

    fn mark(final_state: &str, manual: bool) -> MarkWarning {
        MarkWarning {
            correlation_id: CorrelationId::parse("trip-1").unwrap(),
            final_state: final_state.to_string(),
            requires_manual_intervention: manual,
        }
    }

    #[tokio::test]
    async fn test_redelivery_overwrites_single_record() {
        let store = InMemoryReservationStore::new();
        let handler = WarningHandler::new(store.clone());

        let first = handler
            .mark_warning(mark("COMPENSATED", false))
            .await
            .into_result()
            .unwrap();
        assert_eq!(first.deliveries, 1);

        let second = handler
            .mark_warning(mark("COMPENSATION_FAILED", true))
            .await
            .into_result()
            .unwrap();
        assert_eq!(second.deliveries, 2);
        assert!(second.requires_manual_intervention);

        assert_eq!(store.count_kind("booking_warning").await, 1);
        let stored = handler
            .repository()
            .load_existing(&CorrelationId::parse("trip-1").unwrap())
            .await
            .unwrap();
        assert_eq!(stored.final_state(), "COMPENSATION_FAILED");
    }
}
