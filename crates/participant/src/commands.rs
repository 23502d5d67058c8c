//! Commands accepted from the coordinator and the replies sent back.
//!
//! Both travel as JSON tagged by name, e.g.
//! `{"command": "reserve-flight", "correlationId": "trip-1", ...}`.

use common::{ClientId, CorrelationId, ReservationId};
use domain::{
    CarDetails, CarRequest, ConfirmationNumber, FlightDetails, FlightRequest, HotelDetails,
    HotelRequest, Money, PaymentState, ReservationState, ResourceKind, TransactionReference,
};
use serde::{Deserialize, Serialize};

use crate::outcome::CompensationOutcome;

/// Reserves one resource for a trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reserve<Req> {
    pub correlation_id: CorrelationId,
    pub client_id: ClientId,
    #[serde(flatten)]
    pub request: Req,
}

impl<Req> Reserve<Req> {
    pub fn new(correlation_id: CorrelationId, client_id: ClientId, request: Req) -> Self {
        Self {
            correlation_id,
            client_id,
            request,
        }
    }
}

pub type ReserveFlight = Reserve<FlightRequest>;
pub type ReserveHotel = Reserve<HotelRequest>;
pub type ReserveCar = Reserve<CarRequest>;

/// Releases the reservation of one resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelReservation {
    pub correlation_id: CorrelationId,
}

/// Marks the reservation of one resource as used by the confirmed trip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteReservation {
    pub correlation_id: CorrelationId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessPayment {
    pub correlation_id: CorrelationId,
    pub client_id: ClientId,
    pub amount: Money,
}

/// Confirms the trip, finalizing its payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmReservation {
    pub correlation_id: CorrelationId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevertPayment {
    pub correlation_id: CorrelationId,
    #[serde(default)]
    pub reason: Option<String>,
}

/// Records how a trip ended when it needs operator attention.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkWarning {
    pub correlation_id: CorrelationId,
    pub final_state: String,
    #[serde(default)]
    pub requires_manual_intervention: bool,
}

/// Any command a participant accepts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "kebab-case")]
pub enum Command {
    ReserveFlight(ReserveFlight),
    ReserveHotel(ReserveHotel),
    ReserveCar(ReserveCar),
    CancelFlight(CancelReservation),
    CancelHotel(CancelReservation),
    CancelCar(CancelReservation),
    CompleteFlight(CompleteReservation),
    CompleteHotel(CompleteReservation),
    CompleteCar(CompleteReservation),
    ProcessPayment(ProcessPayment),
    ConfirmReservation(ConfirmReservation),
    RevertPayment(RevertPayment),
    MarkWarning(MarkWarning),
}

impl Command {
    /// Returns the command name as it appears on the wire.
    pub fn name(&self) -> &'static str {
        match self {
            Command::ReserveFlight(_) => "reserve-flight",
            Command::ReserveHotel(_) => "reserve-hotel",
            Command::ReserveCar(_) => "reserve-car",
            Command::CancelFlight(_) => "cancel-flight",
            Command::CancelHotel(_) => "cancel-hotel",
            Command::CancelCar(_) => "cancel-car",
            Command::CompleteFlight(_) => "complete-flight",
            Command::CompleteHotel(_) => "complete-hotel",
            Command::CompleteCar(_) => "complete-car",
            Command::ProcessPayment(_) => "process-payment",
            Command::ConfirmReservation(_) => "confirm-reservation",
            Command::RevertPayment(_) => "revert-payment",
            Command::MarkWarning(_) => "mark-warning",
        }
    }

    /// Returns the trip the command applies to.
    pub fn correlation_id(&self) -> &CorrelationId {
        match self {
            Command::ReserveFlight(c) => &c.correlation_id,
            Command::ReserveHotel(c) => &c.correlation_id,
            Command::ReserveCar(c) => &c.correlation_id,
            Command::CancelFlight(c) | Command::CancelHotel(c) | Command::CancelCar(c) => {
                &c.correlation_id
            }
            Command::CompleteFlight(c) | Command::CompleteHotel(c) | Command::CompleteCar(c) => {
                &c.correlation_id
            }
            Command::ProcessPayment(c) => &c.correlation_id,
            Command::ConfirmReservation(c) => &c.correlation_id,
            Command::RevertPayment(c) => &c.correlation_id,
            Command::MarkWarning(c) => &c.correlation_id,
        }
    }
}

/// A held resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationResult<D> {
    pub correlation_id: CorrelationId,
    pub reservation_id: ReservationId,
    pub resource_reserved: bool,
    pub state: ReservationState,
    pub details: D,
    pub confirmation_number: ConfirmationNumber,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionResult {
    pub correlation_id: CorrelationId,
    pub kind: ResourceKind,
    pub confirmation_number: ConfirmationNumber,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentResult {
    pub correlation_id: CorrelationId,
    pub payment_processed: bool,
    pub state: PaymentState,
    pub amount: Money,
    pub transaction_reference: TransactionReference,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmationResult {
    pub correlation_id: CorrelationId,
    pub confirmation_number: ConfirmationNumber,
}

/// Acknowledgement of a compensation command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompensationResult {
    pub correlation_id: CorrelationId,
    pub kind: ResourceKind,
    #[serde(flatten)]
    pub outcome: CompensationOutcome,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WarningResult {
    pub correlation_id: CorrelationId,
    pub requires_manual_intervention: bool,
    pub deliveries: u32,
}

/// Reply to a successfully handled command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "reply", rename_all = "kebab-case")]
pub enum Reply {
    FlightReserved(ReservationResult<FlightDetails>),
    HotelReserved(ReservationResult<HotelDetails>),
    CarReserved(ReservationResult<CarDetails>),
    ReservationCompleted(CompletionResult),
    PaymentProcessed(PaymentResult),
    ReservationConfirmed(ConfirmationResult),
    Compensation(CompensationResult),
    WarningRecorded(WarningResult),
}
