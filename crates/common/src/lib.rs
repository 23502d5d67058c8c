//! Identifier types shared by every saga participant crate.

pub mod types;

pub use types::{ClientId, CorrelationId, IdError, ReservationId};
