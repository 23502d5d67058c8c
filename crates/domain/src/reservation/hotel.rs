//! Hotel reservations.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::aggregate::ResourceKind;
use crate::value_objects::Money;

use super::{Reservation, ReservationError, Resource, validate_place};

/// Marker for hotel reservations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hotel;

/// A hotel reservation aggregate.
pub type HotelReservation = Reservation<Hotel>;

/// Parameters of a reserve-hotel command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HotelRequest {
    pub city: String,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
}

impl HotelRequest {
    /// Number of nights between check-in and check-out.
    pub fn nights(&self) -> u32 {
        u32::try_from((self.check_out - self.check_in).num_days()).unwrap_or(0)
    }
}

/// Hotel attributes assigned on reservation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HotelDetails {
    pub hotel_name: String,
    pub room_number: String,
    pub room_type: String,
    pub nightly_rate: Money,
    pub total_price: Money,
}

impl Resource for Hotel {
    type Request = HotelRequest;
    type Details = HotelDetails;

    const KIND: ResourceKind = ResourceKind::Hotel;
    const CONFIRMATION_PREFIX: &'static str = "HT";

    fn validate(request: &HotelRequest) -> Result<(), ReservationError> {
        validate_place("city", &request.city)?;

        if request.check_out <= request.check_in {
            return Err(ReservationError::invalid(
                "checkOut",
                "must be after the check-in date",
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(city: &str, check_in: (i32, u32, u32), check_out: (i32, u32, u32)) -> HotelRequest {
        HotelRequest {
            city: city.to_string(),
            check_in: NaiveDate::from_ymd_opt(check_in.0, check_in.1, check_in.2).unwrap(),
            check_out: NaiveDate::from_ymd_opt(check_out.0, check_out.1, check_out.2).unwrap(),
        }
    }

    #[test]
    fn test_nights() {
        let req = request("Barcelona", (2026, 11, 2), (2026, 11, 5));
        assert_eq!(req.nights(), 3);
        assert!(Hotel::validate(&req).is_ok());
    }

    #[test]
    fn test_rejects_blank_city() {
        let req = request("  ", (2026, 11, 2), (2026, 11, 5));
        assert!(matches!(
            Hotel::validate(&req),
            Err(ReservationError::InvalidRequest { field: "city", .. })
        ));
    }

    #[test]
    fn test_rejects_non_positive_stay() {
        let req = request("Barcelona", (2026, 11, 5), (2026, 11, 2));
        assert!(Hotel::validate(&req).is_err());
    }
}
