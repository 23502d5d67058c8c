//! Car rental reservations.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::aggregate::ResourceKind;
use crate::value_objects::Money;

use super::{Reservation, ReservationError, Resource, validate_place};

/// Marker for car rental reservations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Car;

/// A car rental reservation aggregate.
pub type CarReservation = Reservation<Car>;

/// Parameters of a reserve-car command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CarRequest {
    /// City of the pick-up office.
    pub city: String,
    pub pickup_date: NaiveDate,
    pub return_date: NaiveDate,
}

impl CarRequest {
    /// Billable rental days; same-day returns count as one day.
    pub fn rental_days(&self) -> u32 {
        u32::try_from((self.return_date - self.pickup_date).num_days())
            .unwrap_or(0)
            .max(1)
    }
}

/// Car attributes assigned on reservation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CarDetails {
    pub company: String,
    pub model: String,
    pub license_plate: String,
    pub daily_rate: Money,
    pub total_price: Money,
}

impl Resource for Car {
    type Request = CarRequest;
    type Details = CarDetails;

    const KIND: ResourceKind = ResourceKind::Car;
    const CONFIRMATION_PREFIX: &'static str = "CR";

    fn validate(request: &CarRequest) -> Result<(), ReservationError> {
        validate_place("city", &request.city)?;

        if request.return_date < request.pickup_date {
            return Err(ReservationError::invalid(
                "returnDate",
                "must not be before the pick-up date",
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(pickup: u32, ret: u32) -> CarRequest {
        CarRequest {
            city: "Barcelona".to_string(),
            pickup_date: NaiveDate::from_ymd_opt(2026, 11, pickup).unwrap(),
            return_date: NaiveDate::from_ymd_opt(2026, 11, ret).unwrap(),
        }
    }

    #[test]
    fn test_rental_days() {
        assert_eq!(request(2, 5).rental_days(), 3);
        assert_eq!(request(2, 2).rental_days(), 1);
    }

    #[test]
    fn test_validation() {
        assert!(Car::validate(&request(2, 5)).is_ok());
        assert!(Car::validate(&request(2, 2)).is_ok());
        assert!(matches!(
            Car::validate(&request(5, 2)),
            Err(ReservationError::InvalidRequest {
                field: "returnDate",
                ..
            })
        ));
    }
}
