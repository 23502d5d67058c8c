//! Flight, hotel and car command handlers.

use std::time::Instant;

use common::CorrelationId;
use domain::{
    Aggregate, DomainError, Repository, Reservation, ReservationError, ReservationState,
    Resource, ResourceKind,
};
use reservation_store::ReservationStore;

use crate::availability::Availability;
use crate::commands::{
    CancelReservation, CompleteReservation, CompletionResult, Reserve, ReservationResult,
};
use crate::config::ParticipantContext;
use crate::error::ParticipantError;
use crate::outcome::{CompensationOutcome, StepOutcome};
use crate::policy::FaultSite;

use super::{record_command, record_compensation, retry_on_conflict};

/// Handles reserve, cancel and complete commands for one resource kind.
pub struct ReservationHandler<S, R, A>
where
    S: ReservationStore,
    R: Resource,
    A: Availability<R>,
{
    repository: Repository<S, Reservation<R>>,
    availability: A,
    context: ParticipantContext,
}

impl<S, R, A> ReservationHandler<S, R, A>
where
    S: ReservationStore,
    R: Resource,
    A: Availability<R>,
{
    pub fn new(store: S, availability: A, context: ParticipantContext) -> Self {
        Self {
            repository: Repository::new(store),
            availability,
            context,
        }
    }

    pub fn repository(&self) -> &Repository<S, Reservation<R>> {
        &self.repository
    }

    /// Reserves the resource for a trip.
    ///
    /// A trip that already holds the resource gets the stored result back
    /// unchanged, so redelivered commands never book twice.
    #[tracing::instrument(
        skip(self, command),
        fields(kind = %R::KIND, correlation_id = %command.correlation_id)
    )]
    pub async fn reserve(
        &self,
        command: Reserve<R::Request>,
    ) -> StepOutcome<ReservationResult<R::Details>> {
        let started = Instant::now();
        let outcome = StepOutcome::from_result(self.try_reserve(command).await);
        record_command(command_name(R::KIND, Action::Reserve), &outcome, started);
        outcome
    }

    async fn try_reserve(
        &self,
        command: Reserve<R::Request>,
    ) -> Result<ReservationResult<R::Details>, ParticipantError> {
        let Reserve {
            correlation_id,
            client_id,
            request,
        } = command;
        R::validate(&request)?;

        if let Some(existing) = self
            .repository
            .find_by_correlation_id(&correlation_id)
            .await?
        {
            tracing::info!(state = %existing.state(), "Reservation exists, returning stored result");
            return reservation_result(&existing);
        }

        let mut rng = self.context.rng.next_rng();
        self.context
            .check_fault(FaultSite::Reserve(R::KIND), &mut rng)?;
        let details = self.availability.search(&request, &mut rng);

        let mut reservation = Reservation::<R>::new(correlation_id.clone(), client_id, request)?;
        reservation.reserve(
            details,
            self.context
                .references
                .next_confirmation(R::CONFIRMATION_PREFIX),
        )?;

        match self.repository.save(&mut reservation).await {
            Ok(()) => {
                tracing::info!(
                    reservation_id = %reservation.id(),
                    confirmation_number = ?reservation.confirmation_number(),
                    "Reserved"
                );
                reservation_result(&reservation)
            }
            Err(e) if e.is_conflict() => {
                tracing::info!("Concurrent reserve stored first, returning its result");
                let winner = self.repository.load_existing(&correlation_id).await?;
                reservation_result(&winner)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Releases the resource held for a trip. Never fails the saga.
    #[tracing::instrument(
        skip(self, command),
        fields(kind = %R::KIND, correlation_id = %command.correlation_id)
    )]
    pub async fn cancel(&self, command: CancelReservation) -> CompensationOutcome {
        let correlation_id = &command.correlation_id;
        let outcome = retry_on_conflict(|| self.try_cancel(correlation_id))
            .await
            .unwrap_or_else(|e| CompensationOutcome::Failed {
                reason: e.to_string(),
            });
        record_compensation(R::KIND.as_str(), &outcome);
        outcome
    }

    async fn try_cancel(
        &self,
        correlation_id: &CorrelationId,
    ) -> Result<CompensationOutcome, DomainError> {
        let Some(mut reservation) = self
            .repository
            .find_by_correlation_id(correlation_id)
            .await?
        else {
            return Ok(CompensationOutcome::NothingToCompensate);
        };

        match reservation.state() {
            ReservationState::Cancelled => Ok(CompensationOutcome::AlreadyCompensated),
            ReservationState::Reserved => {
                reservation.cancel()?;
                self.repository.save(&mut reservation).await?;
                Ok(CompensationOutcome::Compensated)
            }
            state @ (ReservationState::Pending | ReservationState::Completed) => {
                Ok(CompensationOutcome::Skipped {
                    reason: format!("{} reservation is {state}", R::KIND),
                })
            }
        }
    }

    /// Marks the held resource as used by the confirmed trip.
    #[tracing::instrument(
        skip(self, command),
        fields(kind = %R::KIND, correlation_id = %command.correlation_id)
    )]
    pub async fn complete(&self, command: CompleteReservation) -> StepOutcome<CompletionResult> {
        let started = Instant::now();
        let correlation_id = &command.correlation_id;
        let result = retry_on_conflict(|| self.try_complete(correlation_id)).await;
        let outcome = StepOutcome::from_result(result.map_err(ParticipantError::from));
        record_command(command_name(R::KIND, Action::Complete), &outcome, started);
        outcome
    }

    async fn try_complete(
        &self,
        correlation_id: &CorrelationId,
    ) -> Result<CompletionResult, DomainError> {
        let mut reservation = self.repository.load_existing(correlation_id).await?;

        if reservation.state() != ReservationState::Completed {
            reservation.complete()?;
            self.repository.save(&mut reservation).await?;
            tracing::info!(reservation_id = %reservation.id(), "Completed");
        }

        let confirmation_number = reservation.confirmation_number().cloned().ok_or(
            ReservationError::InvalidStateTransition {
                current_state: reservation.state(),
                action: "complete",
            },
        )?;

        Ok(CompletionResult {
            correlation_id: correlation_id.clone(),
            kind: R::KIND,
            confirmation_number,
        })
    }

    /// Loads the reservation of a trip.
    pub async fn find(
        &self,
        correlation_id: &CorrelationId,
    ) -> Result<Option<Reservation<R>>, ParticipantError> {
        Ok(self
            .repository
            .find_by_correlation_id(correlation_id)
            .await?)
    }
}

/// Builds the reply for a held reservation.
fn reservation_result<R: Resource>(
    reservation: &Reservation<R>,
) -> Result<ReservationResult<R::Details>, ParticipantError> {
    match (
        reservation.state(),
        reservation.details(),
        reservation.confirmation_number(),
    ) {
        (
            state @ (ReservationState::Reserved | ReservationState::Completed),
            Some(details),
            Some(confirmation_number),
        ) => Ok(ReservationResult {
            correlation_id: reservation.correlation_id().clone(),
            reservation_id: reservation.id(),
            resource_reserved: true,
            state,
            details: details.clone(),
            confirmation_number: confirmation_number.clone(),
        }),
        (state, ..) => Err(ParticipantError::InvalidStateTransition {
            current_state: state.to_string(),
            action: "reserve",
        }),
    }
}

#[derive(Clone, Copy)]
enum Action {
    Reserve,
    Complete,
}

fn command_name(kind: ResourceKind, action: Action) -> &'static str {
    match (action, kind) {
        (Action::Reserve, ResourceKind::Flight) => "reserve-flight",
        (Action::Reserve, ResourceKind::Hotel) => "reserve-hotel",
        (Action::Reserve, ResourceKind::Car) => "reserve-car",
        (Action::Complete, ResourceKind::Flight) => "complete-flight",
        (Action::Complete, ResourceKind::Hotel) => "complete-hotel",
        (Action::Complete, ResourceKind::Car) => "complete-car",
        (_, ResourceKind::Payment) => "process-payment",
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use common::ClientId;
    use domain::{Flight, FlightRequest};
    use reservation_store::InMemoryReservationStore;

    use super::*;
    use crate::availability::SimulatedAvailability;
    use crate::policy::ScriptedFaults;

    type FlightHandler = ReservationHandler<InMemoryReservationStore, Flight, SimulatedAvailability>;

    fn handler(context: ParticipantContext) -> FlightHandler {
        ReservationHandler::new(
            InMemoryReservationStore::new(),
            SimulatedAvailability,
            context,
        )
    }

    fn cid(raw: &str) -> CorrelationId {
        CorrelationId::parse(raw).unwrap()
    }

    fn reserve(trip: &str, origin: &str) -> Reserve<FlightRequest> {
        Reserve::new(
            cid(trip),
            ClientId::parse("client-9").unwrap(),
            FlightRequest {
                origin: origin.to_string(),
                destination: "BCN".to_string(),
                departure_date: None,
                return_date: None,
            },
        )
    }

    #[tokio::test]
    async fn test_invalid_request_is_fatal_and_not_stored() {
        let handler = handler(ParticipantContext::default());

        let outcome = handler.reserve(reserve("trip-1", "")).await;

        let StepOutcome::Fatal(err) = outcome else {
            panic!("expected fatal outcome");
        };
        assert_eq!(err.code(), "VALIDATION_ERROR");
        assert!(handler.find(&cid("trip-1")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_injected_fault_is_recoverable_then_retry_succeeds() {
        let faults = Arc::new(ScriptedFaults::new());
        faults.fail_next(FaultSite::Reserve(ResourceKind::Flight), 1);
        let handler = handler(ParticipantContext::default().with_fault_injector(faults));

        let first = handler.reserve(reserve("trip-2", "MAD")).await;
        assert!(matches!(
            first,
            StepOutcome::Recoverable(ParticipantError::TransientResourceUnavailable {
                site: "reserve-flight"
            })
        ));
        assert!(handler.find(&cid("trip-2")).await.unwrap().is_none());

        let second = handler.reserve(reserve("trip-2", "MAD")).await;
        assert!(second.is_success());
    }

    #[tokio::test]
    async fn test_complete_lifecycle() {
        let handler = handler(ParticipantContext::default());
        let complete = || CompleteReservation {
            correlation_id: cid("trip-3"),
        };

        let missing = handler.complete(complete()).await;
        assert_eq!(missing.error().unwrap().code(), "NOT_FOUND");

        let reserved = handler
            .reserve(reserve("trip-3", "MAD"))
            .await
            .into_result()
            .unwrap();
        let completed = handler.complete(complete()).await.into_result().unwrap();
        assert_eq!(completed.confirmation_number, reserved.confirmation_number);

        // Redelivery returns the same confirmation
        let again = handler.complete(complete()).await.into_result().unwrap();
        assert_eq!(again, completed);

        let cancel = handler
            .cancel(CancelReservation {
                correlation_id: cid("trip-3"),
            })
            .await;
        assert!(matches!(cancel, CompensationOutcome::Skipped { .. }));
    }

    #[tokio::test]
    async fn test_complete_after_cancel_is_fatal() {
        let handler = handler(ParticipantContext::default());
        handler.reserve(reserve("trip-4", "MAD")).await;
        handler
            .cancel(CancelReservation {
                correlation_id: cid("trip-4"),
            })
            .await;

        let outcome = handler
            .complete(CompleteReservation {
                correlation_id: cid("trip-4"),
            })
            .await;
        assert!(matches!(
            outcome,
            StepOutcome::Fatal(ParticipantError::InvalidStateTransition { .. })
        ));
    }

    #[test]
    fn test_command_names() {
        assert_eq!(
            command_name(ResourceKind::Hotel, Action::Reserve),
            "reserve-hotel"
        );
        assert_eq!(
            command_name(ResourceKind::Car, Action::Complete),
            "complete-car"
        );
    }
}
