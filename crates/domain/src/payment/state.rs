//! Payment state machine.

use serde::{Deserialize, Serialize};

/// The state of a payment in its lifecycle.
///
/// State transitions:
/// ```text
/// Pending ──► Processed ──► Confirmed
///    │            │  │          │
///    └──► Failed ◄┘  └──────────┴──► Reverted
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentState {
    /// Created, amount not yet checked.
    #[default]
    Pending,

    /// Amount accepted and charged, awaiting trip confirmation.
    Processed,

    /// Trip confirmed.
    Confirmed,

    /// Rejected before or during processing (terminal state).
    Failed,

    /// Charge reverted by compensation (terminal state).
    Reverted,
}

impl PaymentState {
    /// Returns true if the amount can be processed in this state.
    pub fn can_process(&self) -> bool {
        matches!(self, PaymentState::Pending)
    }

    /// Returns true if the payment can be confirmed in this state.
    pub fn can_confirm(&self) -> bool {
        matches!(self, PaymentState::Processed)
    }

    /// Returns true if the payment can be marked failed in this state.
    pub fn can_fail(&self) -> bool {
        matches!(self, PaymentState::Pending | PaymentState::Processed)
    }

    /// Returns true if the payment can be reverted in this state.
    pub fn can_revert(&self) -> bool {
        matches!(self, PaymentState::Processed | PaymentState::Confirmed)
    }

    /// Returns true if this is a terminal state (no further transitions possible).
    pub fn is_terminal(&self) -> bool {
        matches!(self, PaymentState::Failed | PaymentState::Reverted)
    }

    /// Returns the state name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentState::Pending => "PENDING",
            PaymentState::Processed => "PROCESSED",
            PaymentState::Confirmed => "CONFIRMED",
            PaymentState::Failed => "FAILED",
            PaymentState::Reverted => "REVERTED",
        }
    }
}

impl std::fmt::Display for PaymentState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
