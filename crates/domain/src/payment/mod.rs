//! Payment aggregate and related types.

mod aggregate;
mod state;

pub use aggregate::{Payment, PaymentFailure, PaymentFailureKind};
pub use state::PaymentState;

use thiserror::Error;

use crate::value_objects::Money;

/// Default ceiling for a single payment: 10 000.00.
pub const DEFAULT_PAYMENT_CEILING: Money = Money::from_cents(1_000_000);

/// Errors that can occur during payment operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PaymentError {
    /// The amount is zero or negative.
    #[error("Invalid amount: {amount} (must be greater than 0)")]
    InvalidAmount { amount: Money },

    /// The amount is above the configured ceiling.
    #[error("Amount {amount} exceeds the limit of {limit}")]
    AmountExceedsLimit { amount: Money, limit: Money },

    /// The payment is not in the expected state.
    #[error("Invalid state transition: cannot {action} from {current_state} state")]
    InvalidStateTransition {
        current_state: PaymentState,
        action: &'static str,
    },
}
