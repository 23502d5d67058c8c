//! Domain error types.

use reservation_store::StoreError;
use thiserror::Error;

use crate::payment::PaymentError;
use crate::reservation::ReservationError;
use crate::value_objects::MoneyError;

/// Errors that can occur during domain operations.
#[derive(Debug, Error)]
pub enum DomainError {
    /// An error occurred in the reservation store.
    #[error("Reservation store error: {0}")]
    Store(#[from] StoreError),

    /// A reservation transition or request was rejected.
    #[error("Reservation error: {0}")]
    Reservation(#[from] ReservationError),

    /// A payment transition or amount was rejected.
    #[error("Payment error: {0}")]
    Payment(#[from] PaymentError),

    /// Aggregate not found.
    #[error("Aggregate not found: {kind} for correlation id {correlation_id}")]
    AggregateNotFound {
        kind: &'static str,
        correlation_id: String,
    },

    /// A money amount could not be parsed.
    #[error("Money error: {0}")]
    Money(#[from] MoneyError),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl DomainError {
    /// Returns true if the underlying store rejected a write for a
    /// concurrent change (stale version or duplicate correlation id).
    pub fn is_conflict(&self) -> bool {
        matches!(self, DomainError::Store(e) if e.is_conflict())
    }
}
