//! Participant error types.

use common::IdError;
use domain::{DomainError, Money, PaymentError, ReservationError};
use reservation_store::StoreError;
use thiserror::Error;

/// Errors returned to the coordinator by the command handlers.
///
/// Every variant has a stable [`code`](ParticipantError::code) and tells the
/// coordinator whether retrying the same command may succeed.
#[derive(Debug, Error)]
pub enum ParticipantError {
    /// A command parameter is missing or malformed.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// A payment amount is zero or negative.
    #[error("Invalid amount: {amount} (must be greater than 0)")]
    InvalidAmount { amount: Money },

    /// No aggregate exists for the correlation id.
    #[error("No {kind} found for correlation id {correlation_id}")]
    NotFound {
        kind: &'static str,
        correlation_id: String,
    },

    /// The aggregate is not in a state that allows the command.
    #[error("Invalid state transition: cannot {action} from {current_state} state")]
    InvalidStateTransition {
        current_state: String,
        action: &'static str,
    },

    /// A payment amount is above the configured ceiling.
    #[error("Amount {amount} exceeds the limit of {limit}")]
    LimitExceeded { amount: Money, limit: Money },

    /// A downstream resource did not answer. Retrying may succeed.
    #[error("Resource temporarily unavailable: {site}")]
    TransientResourceUnavailable { site: &'static str },

    /// The reservation store failed or rejected a concurrent write.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ParticipantError {
    /// Returns the stable error code reported to the coordinator.
    pub fn code(&self) -> &'static str {
        match self {
            ParticipantError::Validation(_) => "VALIDATION_ERROR",
            ParticipantError::InvalidAmount { .. } => "INVALID_AMOUNT",
            ParticipantError::NotFound { .. } => "NOT_FOUND",
            ParticipantError::InvalidStateTransition { .. } => "INVALID_STATE_TRANSITION",
            ParticipantError::LimitExceeded { .. } => "AMOUNT_EXCEEDS_LIMIT",
            ParticipantError::TransientResourceUnavailable { .. } => "RESOURCE_UNAVAILABLE",
            ParticipantError::Store(_) => "STORE_ERROR",
            ParticipantError::Serialization(_) => "INTERNAL_ERROR",
        }
    }

    /// Returns true if the coordinator may retry the same command.
    pub fn is_retryable(&self) -> bool {
        match self {
            ParticipantError::TransientResourceUnavailable { .. } => true,
            ParticipantError::Store(e) => e.is_transient(),
            _ => false,
        }
    }
}

impl From<DomainError> for ParticipantError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::Store(e) => ParticipantError::Store(e),
            DomainError::Reservation(e) => e.into(),
            DomainError::Payment(e) => e.into(),
            DomainError::AggregateNotFound {
                kind,
                correlation_id,
            } => ParticipantError::NotFound {
                kind,
                correlation_id,
            },
            DomainError::Money(e) => ParticipantError::Validation(e.to_string()),
            DomainError::Serialization(e) => ParticipantError::Serialization(e),
        }
    }
}

impl From<ReservationError> for ParticipantError {
    fn from(e: ReservationError) -> Self {
        match e {
            ReservationError::InvalidStateTransition {
                current_state,
                action,
            } => ParticipantError::InvalidStateTransition {
                current_state: current_state.to_string(),
                action,
            },
            ReservationError::InvalidRequest { .. } => ParticipantError::Validation(e.to_string()),
        }
    }
}

impl From<PaymentError> for ParticipantError {
    fn from(e: PaymentError) -> Self {
        match e {
            PaymentError::InvalidAmount { amount } => ParticipantError::InvalidAmount { amount },
            PaymentError::AmountExceedsLimit { amount, limit } => {
                ParticipantError::LimitExceeded { amount, limit }
            }
            PaymentError::InvalidStateTransition {
                current_state,
                action,
            } => ParticipantError::InvalidStateTransition {
                current_state: current_state.to_string(),
                action,
            },
        }
    }
}

impl From<IdError> for ParticipantError {
    fn from(e: IdError) -> Self {
        ParticipantError::Validation(e.to_string())
    }
}

/// Convenience type alias for participant results.
pub type Result<T> = std::result::Result<T, ParticipantError>;
