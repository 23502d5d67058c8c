//! Saga participants for travel bookings.
//!
//! Each participant owns one resource of a trip (flight, hotel, car or
//! payment) and exposes the commands an external saga coordinator invokes:
//! a forward step returning a [`StepOutcome`] and a compensation returning a
//! [`CompensationOutcome`].
//!
//! Delivery is at-least-once, so every command is idempotent per
//! correlation id:
//! 1. Repeating a forward step returns the stored result
//! 2. Repeating a compensation reports `AlreadyCompensated`
//! 3. Concurrent duplicates produce a single stored aggregate

pub mod availability;
pub mod commands;
pub mod config;
pub mod error;
pub mod handlers;
pub mod outcome;
pub mod participant;
pub mod policy;

pub use availability::{Availability, SimulatedAvailability};
pub use commands::{
    CancelReservation, Command, CompensationResult, CompleteReservation, CompletionResult,
    ConfirmReservation, ConfirmationResult, MarkWarning, PaymentResult, ProcessPayment, Reply,
    ReservationResult, Reserve, ReserveCar, ReserveFlight, ReserveHotel, RevertPayment,
    WarningResult,
};
pub use config::{ParticipantConfig, ParticipantContext};
pub use error::{ParticipantError, Result};
pub use handlers::{PaymentHandler, ReservationHandler, WarningHandler};
pub use outcome::{CompensationOutcome, StepOutcome};
pub use participant::{CarHandler, FlightHandler, HotelHandler, TravelParticipant};
pub use policy::{
    FaultInjector, FaultSite, NoFaults, PaymentLimits, ProbabilisticFaults, RngSource,
    ScriptedFaults,
};
