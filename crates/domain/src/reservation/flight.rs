//! Flight reservations.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::aggregate::ResourceKind;
use crate::value_objects::Money;

use super::{Reservation, ReservationError, Resource, validate_iata};

/// Marker for flight reservations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Flight;

/// A flight reservation aggregate.
pub type FlightReservation = Reservation<Flight>;

/// Parameters of a reserve-flight command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlightRequest {
    /// IATA code of the departure airport (e.g. "MAD").
    pub origin: String,
    /// IATA code of the arrival airport (e.g. "BCN").
    pub destination: String,
    #[serde(default)]
    pub departure_date: Option<NaiveDate>,
    #[serde(default)]
    pub return_date: Option<NaiveDate>,
}

/// Flight attributes assigned on reservation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlightDetails {
    pub airline: String,
    /// Carrier code plus four digits, e.g. "IB1234".
    pub flight_number: String,
    /// Row plus seat letter, e.g. "12C".
    pub seat: String,
    pub departure_date: NaiveDate,
    /// Local departure time, "HH:MM".
    pub departure_time: String,
    pub price: Money,
}

impl Resource for Flight {
    type Request = FlightRequest;
    type Details = FlightDetails;

    const KIND: ResourceKind = ResourceKind::Flight;
    const CONFIRMATION_PREFIX: &'static str = "FL";

    fn validate(request: &FlightRequest) -> Result<(), ReservationError> {
        validate_iata("origin", &request.origin)?;
        validate_iata("destination", &request.destination)?;

        if request.origin == request.destination {
            return Err(ReservationError::invalid(
                "destination",
                "must differ from origin",
            ));
        }

        if let (Some(departure), Some(ret)) = (request.departure_date, request.return_date)
            && ret < departure
        {
            return Err(ReservationError::invalid(
                "returnDate",
                "must not be before the departure date",
            ));
        }

        Ok(())
    }
}
