//! Flight, hotel and car reservations.
//!
//! The three resources share one state machine, [`Reservation`], and differ
//! only in their request parameters and the details assigned on reservation.

mod aggregate;
mod car;
mod flight;
mod hotel;
mod state;

use std::fmt::Debug;

use serde::{Serialize, de::DeserializeOwned};
use thiserror::Error;

pub use aggregate::Reservation;
pub use car::{Car, CarDetails, CarRequest, CarReservation};
pub use flight::{Flight, FlightDetails, FlightRequest, FlightReservation};
pub use hotel::{Hotel, HotelDetails, HotelRequest, HotelReservation};
pub use state::ReservationState;

use crate::aggregate::ResourceKind;

/// Errors that can occur during reservation operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReservationError {
    /// The reservation is not in a state that allows the action.
    #[error("Invalid state transition: cannot {action} from {current_state} state")]
    InvalidStateTransition {
        current_state: ReservationState,
        action: &'static str,
    },

    /// A request parameter is missing or malformed.
    #[error("Invalid {field}: {reason}")]
    InvalidRequest { field: &'static str, reason: String },
}

impl ReservationError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        ReservationError::InvalidRequest {
            field,
            reason: reason.into(),
        }
    }
}

/// A reservable resource kind.
///
/// Implemented by zero-sized markers ([`Flight`], [`Hotel`], [`Car`]) that
/// pick the request and details types of a [`Reservation`].
pub trait Resource: Clone + Debug + Send + Sync + 'static {
    /// Search parameters supplied with the reserve command.
    type Request: Clone + Debug + PartialEq + Serialize + DeserializeOwned + Send + Sync;

    /// Attributes assigned when the reservation succeeds.
    type Details: Clone + Debug + PartialEq + Serialize + DeserializeOwned + Send + Sync;

    /// The resource kind.
    const KIND: ResourceKind;

    /// Prefix of issued confirmation numbers.
    const CONFIRMATION_PREFIX: &'static str;

    /// Checks the request parameters.
    fn validate(request: &Self::Request) -> Result<(), ReservationError>;
}

/// Checks a three letter uppercase IATA code.
pub(crate) fn validate_iata(field: &'static str, code: &str) -> Result<(), ReservationError> {
    if code.len() == 3 && code.chars().all(|c| c.is_ascii_uppercase()) {
        Ok(())
    } else {
        Err(ReservationError::invalid(
            field,
            format!("'{code}' is not a three letter airport code"),
        ))
    }
}

/// Checks a free-text location such as a city name.
pub(crate) fn validate_place(field: &'static str, place: &str) -> Result<(), ReservationError> {
    if place.trim().is_empty() {
        return Err(ReservationError::invalid(field, "must not be empty"));
    }
    Ok(())
}
