//! Payment aggregate.

use chrono::{DateTime, Utc};
use common::{ClientId, CorrelationId, ReservationId};
use reservation_store::Version;
use serde::{Deserialize, Serialize};

use crate::aggregate::{Aggregate, ResourceKind};
use crate::reference::ReferenceGenerator;
use crate::value_objects::{ConfirmationNumber, Money, TransactionReference};

use super::{PaymentError, PaymentState};

/// Why a payment ended up `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentFailureKind {
    InvalidAmount,
    AmountExceedsLimit,
    Other,
}

/// Failure recorded on a payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentFailure {
    pub kind: PaymentFailureKind,
    pub reason: String,
    /// Ceiling in force when an over-limit amount was rejected.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<Money>,
    pub failed_at: DateTime<Utc>,
}

impl PaymentFailure {
    /// Builds the failure matching a rejected amount.
    pub fn from_error(error: &PaymentError) -> Self {
        let (kind, limit) = match error {
            PaymentError::InvalidAmount { .. } => (PaymentFailureKind::InvalidAmount, None),
            PaymentError::AmountExceedsLimit { limit, .. } => {
                (PaymentFailureKind::AmountExceedsLimit, Some(*limit))
            }
            PaymentError::InvalidStateTransition { .. } => (PaymentFailureKind::Other, None),
        };

        Self {
            kind,
            reason: error.to_string(),
            limit,
            failed_at: Utc::now(),
        }
    }
}

/// Payment aggregate root for one trip.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    id: ReservationId,

    #[serde(default)]
    version: Version,

    correlation_id: CorrelationId,
    client_id: ClientId,
    amount: Money,
    state: PaymentState,

    /// Issued when the amount is processed.
    transaction_reference: Option<TransactionReference>,

    /// Issued when the trip is confirmed.
    confirmation_number: Option<ConfirmationNumber>,

    failure: Option<PaymentFailure>,
    revert_reason: Option<String>,

    created_at: DateTime<Utc>,
    processed_at: Option<DateTime<Utc>>,
    confirmed_at: Option<DateTime<Utc>>,
    reverted_at: Option<DateTime<Utc>>,
}

impl Aggregate for Payment {
    fn kind() -> &'static str {
        ResourceKind::Payment.as_str()
    }

    fn id(&self) -> ReservationId {
        self.id
    }

    fn correlation_id(&self) -> &CorrelationId {
        &self.correlation_id
    }

    fn version(&self) -> Version {
        self.version
    }

    fn set_version(&mut self, version: Version) {
        self.version = version;
    }

    fn state_name(&self) -> &'static str {
        self.state.as_str()
    }

    fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }
}

// Query methods
impl Payment {
    pub fn state(&self) -> PaymentState {
        self.state
    }

    pub fn client_id(&self) -> &ClientId {
        &self.client_id
    }

    pub fn amount(&self) -> Money {
        self.amount
    }

    pub fn transaction_reference(&self) -> Option<&TransactionReference> {
        self.transaction_reference.as_ref()
    }

    pub fn confirmation_number(&self) -> Option<&ConfirmationNumber> {
        self.confirmation_number.as_ref()
    }

    /// Returns the recorded failure, if the payment failed.
    pub fn failure(&self) -> Option<&PaymentFailure> {
        self.failure.as_ref()
    }

    pub fn revert_reason(&self) -> Option<&str> {
        self.revert_reason.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn processed_at(&self) -> Option<DateTime<Utc>> {
        self.processed_at
    }

    pub fn confirmed_at(&self) -> Option<DateTime<Utc>> {
        self.confirmed_at
    }

    pub fn reverted_at(&self) -> Option<DateTime<Utc>> {
        self.reverted_at
    }

    /// Checks an amount against the positivity rule and the ceiling.
    pub fn check_amount(amount: Money, ceiling: Money) -> Result<(), PaymentError> {
        if !amount.is_positive() {
            return Err(PaymentError::InvalidAmount { amount });
        }
        if amount > ceiling {
            return Err(PaymentError::AmountExceedsLimit {
                amount,
                limit: ceiling,
            });
        }
        Ok(())
    }
}

// Command methods
impl Payment {
    /// Creates a pending payment.
    pub fn new(correlation_id: CorrelationId, client_id: ClientId, amount: Money) -> Self {
        Self {
            id: ReservationId::new(),
            version: Version::initial(),
            correlation_id,
            client_id,
            amount,
            state: PaymentState::Pending,
            transaction_reference: None,
            confirmation_number: None,
            failure: None,
            revert_reason: None,
            created_at: Utc::now(),
            processed_at: None,
            confirmed_at: None,
            reverted_at: None,
        }
    }

    /// Accepts the amount and issues a transaction reference.
    ///
    /// The payment is left untouched when the amount is rejected.
    pub fn process(
        &mut self,
        ceiling: Money,
        references: &ReferenceGenerator,
    ) -> Result<&TransactionReference, PaymentError> {
        if !self.state.can_process() {
            return Err(PaymentError::InvalidStateTransition {
                current_state: self.state,
                action: "process",
            });
        }
        Self::check_amount(self.amount, ceiling)?;

        self.state = PaymentState::Processed;
        self.processed_at = Some(Utc::now());
        Ok(self
            .transaction_reference
            .insert(references.next_transaction()))
    }

    /// Confirms a processed payment.
    pub fn confirm(&mut self, confirmation_number: ConfirmationNumber) -> Result<(), PaymentError> {
        if !self.state.can_confirm() {
            return Err(PaymentError::InvalidStateTransition {
                current_state: self.state,
                action: "confirm",
            });
        }

        self.confirmation_number = Some(confirmation_number);
        self.state = PaymentState::Confirmed;
        self.confirmed_at = Some(Utc::now());
        Ok(())
    }

    /// Marks the payment failed.
    pub fn fail(&mut self, failure: PaymentFailure) -> Result<(), PaymentError> {
        if !self.state.can_fail() {
            return Err(PaymentError::InvalidStateTransition {
                current_state: self.state,
                action: "fail",
            });
        }

        self.failure = Some(failure);
        self.state = PaymentState::Failed;
        Ok(())
    }

    /// Reverts a processed or confirmed payment.
    pub fn revert(&mut self, reason: impl Into<String>) -> Result<(), PaymentError> {
        if !self.state.can_revert() {
            return Err(PaymentError::InvalidStateTransition {
                current_state: self.state,
                action: "revert",
            });
        }

        self.revert_reason = Some(reason.into());
        self.state = PaymentState::Reverted;
        self.reverted_at = Some(Utc::now());
        Ok(())
    }
}
