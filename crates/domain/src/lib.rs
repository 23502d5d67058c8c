//! Domain layer for the travel booking saga participants.
//!
//! This crate provides:
//! - The generic [`Reservation`] aggregate for flights, hotels and cars
//! - The [`Payment`] aggregate and its amount rules
//! - [`BookingWarning`] records raised by the coordinator
//! - [`Money`] and the confirmation/transaction [`ReferenceGenerator`]
//! - [`Repository`], typed persistence over a reservation store

pub mod aggregate;
pub mod error;
pub mod payment;
pub mod reference;
pub mod repository;
pub mod reservation;
pub mod value_objects;
pub mod warning;

pub use aggregate::{Aggregate, ResourceKind};
pub use error::DomainError;
pub use payment::{
    DEFAULT_PAYMENT_CEILING, Payment, PaymentError, PaymentFailure, PaymentFailureKind,
    PaymentState,
};
pub use reference::ReferenceGenerator;
pub use repository::Repository;
pub use reservation::{
    Car, CarDetails, CarRequest, CarReservation, Flight, FlightDetails, FlightRequest,
    FlightReservation, Hotel, HotelDetails, HotelRequest, HotelReservation, Reservation,
    ReservationError, ReservationState, Resource,
};
pub use value_objects::{ConfirmationNumber, Money, MoneyError, TransactionReference};
pub use warning::BookingWarning;
