//! Entry point routing coordinator commands to their handlers.

use common::CorrelationId;
use domain::{Car, Flight, Hotel, ResourceKind};
use reservation_store::ReservationStore;

use crate::availability::SimulatedAvailability;
use crate::commands::{CompensationResult, Command, Reply};
use crate::config::ParticipantContext;
use crate::error::ParticipantError;
use crate::handlers::{PaymentHandler, ReservationHandler, WarningHandler};
use crate::outcome::{CompensationOutcome, StepOutcome};

pub type FlightHandler<S> = ReservationHandler<S, Flight, SimulatedAvailability>;
pub type HotelHandler<S> = ReservationHandler<S, Hotel, SimulatedAvailability>;
pub type CarHandler<S> = ReservationHandler<S, Car, SimulatedAvailability>;

/// All handlers of the travel booking participants over one store.
pub struct TravelParticipant<S: ReservationStore> {
    flights: FlightHandler<S>,
    hotels: HotelHandler<S>,
    cars: CarHandler<S>,
    payments: PaymentHandler<S>,
    warnings: WarningHandler<S>,
}

impl<S> TravelParticipant<S>
where
    S: ReservationStore + Clone,
{
    pub fn new(store: S, context: ParticipantContext) -> Self {
        Self {
            flights: ReservationHandler::new(store.clone(), SimulatedAvailability, context.clone()),
            hotels: ReservationHandler::new(store.clone(), SimulatedAvailability, context.clone()),
            cars: ReservationHandler::new(store.clone(), SimulatedAvailability, context.clone()),
            payments: PaymentHandler::new(store.clone(), context),
            warnings: WarningHandler::new(store),
        }
    }
}

impl<S: ReservationStore> TravelParticipant<S> {
    pub fn flights(&self) -> &FlightHandler<S> {
        &self.flights
    }

    pub fn hotels(&self) -> &HotelHandler<S> {
        &self.hotels
    }

    pub fn cars(&self) -> &CarHandler<S> {
        &self.cars
    }

    pub fn payments(&self) -> &PaymentHandler<S> {
        &self.payments
    }

    pub fn warnings(&self) -> &WarningHandler<S> {
        &self.warnings
    }

    /// Routes a command to its handler.
    ///
    /// Compensation commands always succeed; their outcome is carried in
    /// the [`Reply::Compensation`] reply.
    pub async fn dispatch(&self, command: Command) -> StepOutcome<Reply> {
        tracing::debug!(
            command = command.name(),
            correlation_id = %command.correlation_id(),
            "Dispatching command"
        );

        match command {
            Command::ReserveFlight(c) => self.flights.reserve(c).await.map(Reply::FlightReserved),
            Command::ReserveHotel(c) => self.hotels.reserve(c).await.map(Reply::HotelReserved),
            Command::ReserveCar(c) => self.cars.reserve(c).await.map(Reply::CarReserved),
            Command::CancelFlight(c) => {
                let correlation_id = c.correlation_id.clone();
                let outcome = self.flights.cancel(c).await;
                compensation(correlation_id, ResourceKind::Flight, outcome)
            }
            Command::CancelHotel(c) => {
                let correlation_id = c.correlation_id.clone();
                let outcome = self.hotels.cancel(c).await;
                compensation(correlation_id, ResourceKind::Hotel, outcome)
            }
            Command::CancelCar(c) => {
                let correlation_id = c.correlation_id.clone();
                let outcome = self.cars.cancel(c).await;
                compensation(correlation_id, ResourceKind::Car, outcome)
            }
            Command::CompleteFlight(c) => self
                .flights
                .complete(c)
                .await
                .map(Reply::ReservationCompleted),
            Command::CompleteHotel(c) => self
                .hotels
                .complete(c)
                .await
                .map(Reply::ReservationCompleted),
            Command::CompleteCar(c) => self.cars.complete(c).await.map(Reply::ReservationCompleted),
            Command::ProcessPayment(c) => self.payments.process(c).await.map(Reply::PaymentProcessed),
            Command::ConfirmReservation(c) => self
                .payments
                .confirm(c)
                .await
                .map(Reply::ReservationConfirmed),
            Command::RevertPayment(c) => {
                let correlation_id = c.correlation_id.clone();
                let outcome = self.payments.revert(c).await;
                compensation(correlation_id, ResourceKind::Payment, outcome)
            }
            Command::MarkWarning(c) => self
                .warnings
                .mark_warning(c)
                .await
                .map(Reply::WarningRecorded),
        }
    }

    /// Returns the stored aggregate of a kind for a trip, as JSON.
    pub async fn find(
        &self,
        kind: ResourceKind,
        correlation_id: &CorrelationId,
    ) -> Result<Option<serde_json::Value>, ParticipantError> {
        let value = match kind {
            ResourceKind::Flight => to_json(self.flights.find(correlation_id).await?)?,
            ResourceKind::Hotel => to_json(self.hotels.find(correlation_id).await?)?,
            ResourceKind::Car => to_json(self.cars.find(correlation_id).await?)?,
            ResourceKind::Payment => to_json(self.payments.find(correlation_id).await?)?,
        };
        Ok(value)
    }
}

fn compensation(
    correlation_id: CorrelationId,
    kind: ResourceKind,
    outcome: CompensationOutcome,
) -> StepOutcome<Reply> {
    StepOutcome::Succeeded(Reply::Compensation(CompensationResult {
        correlation_id,
        kind,
        outcome,
    }))
}

fn to_json<T: serde::Serialize>(
    aggregate: Option<T>,
) -> Result<Option<serde_json::Value>, ParticipantError> {
    aggregate
        .map(|a| serde_json::to_value(&a))
        .transpose()
        .map_err(ParticipantError::from)
}
