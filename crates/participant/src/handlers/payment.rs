//! Payment command handlers.

use std::time::Instant;

use common::CorrelationId;
use domain::{
    Aggregate, DomainError, Money, Payment, PaymentError, PaymentFailure, PaymentFailureKind,
    PaymentState, Repository,
};
use reservation_store::ReservationStore;

use crate::commands::{
    ConfirmReservation, ConfirmationResult, PaymentResult, ProcessPayment, RevertPayment,
};
use crate::config::ParticipantContext;
use crate::error::ParticipantError;
use crate::outcome::{CompensationOutcome, StepOutcome};
use crate::policy::FaultSite;

use super::{record_command, record_compensation, retry_on_conflict};

const CONFIRMATION_PREFIX: &str = "CF";
const DEFAULT_REVERT_REASON: &str = "saga compensation";

/// Handles process, confirm and revert commands for trip payments.
pub struct PaymentHandler<S: ReservationStore> {
    repository: Repository<S, Payment>,
    context: ParticipantContext,
}

impl<S: ReservationStore> PaymentHandler<S> {
    pub fn new(store: S, context: ParticipantContext) -> Self {
        Self {
            repository: Repository::new(store),
            context,
        }
    }

    pub fn repository(&self) -> &Repository<S, Payment> {
        &self.repository
    }

    /// Charges the trip amount.
    ///
    /// A rejected amount is stored as a failed payment, so redeliveries of
    /// the same command report the same error without charging.
    #[tracing::instrument(
        skip(self, command),
        fields(correlation_id = %command.correlation_id, amount = %command.amount)
    )]
    pub async fn process(&self, command: ProcessPayment) -> StepOutcome<PaymentResult> {
        let started = Instant::now();
        let outcome = StepOutcome::from_result(self.try_process(command).await);
        record_command("process-payment", &outcome, started);
        outcome
    }

    async fn try_process(&self, command: ProcessPayment) -> Result<PaymentResult, ParticipantError> {
        let ProcessPayment {
            correlation_id,
            client_id,
            amount,
        } = command;
        let ceiling = self.context.limits.ceiling;

        if let Some(existing) = self
            .repository
            .find_by_correlation_id(&correlation_id)
            .await?
        {
            tracing::info!(state = %existing.state(), "Payment exists, returning stored result");
            return payment_result(&existing, ceiling);
        }

        let mut rng = self.context.rng.next_rng();
        self.context
            .check_fault(FaultSite::ProcessPayment, &mut rng)?;

        let mut payment = Payment::new(correlation_id.clone(), client_id, amount);
        let rejection = match payment.process(ceiling, &self.context.references) {
            Ok(_) => None,
            Err(e) => {
                payment.fail(PaymentFailure::from_error(&e))?;
                Some(e)
            }
        };

        match self.repository.save(&mut payment).await {
            Ok(()) => {}
            Err(e) if e.is_conflict() => {
                tracing::info!("Concurrent payment stored first, returning its result");
                let winner = self.repository.load_existing(&correlation_id).await?;
                return payment_result(&winner, ceiling);
            }
            Err(e) => return Err(e.into()),
        }

        if let Some(e) = rejection {
            tracing::warn!(error = %e, "Payment rejected");
            return Err(e.into());
        }

        tracing::info!(
            transaction_reference = ?payment.transaction_reference(),
            "Payment processed"
        );
        payment_result(&payment, ceiling)
    }

    /// Confirms the trip's processed payment.
    ///
    /// Confirming twice returns the confirmation number issued first.
    #[tracing::instrument(skip(self, command), fields(correlation_id = %command.correlation_id))]
    pub async fn confirm(&self, command: ConfirmReservation) -> StepOutcome<ConfirmationResult> {
        let started = Instant::now();
        let correlation_id = &command.correlation_id;
        let result = retry_on_conflict(|| self.try_confirm(correlation_id)).await;
        let outcome = StepOutcome::from_result(result.map_err(ParticipantError::from));
        record_command("confirm-reservation", &outcome, started);
        outcome
    }

    async fn try_confirm(
        &self,
        correlation_id: &CorrelationId,
    ) -> Result<ConfirmationResult, DomainError> {
        let mut payment = self.repository.load_existing(correlation_id).await?;

        if payment.state() != PaymentState::Confirmed {
            payment.confirm(
                self.context
                    .references
                    .next_confirmation(CONFIRMATION_PREFIX),
            )?;
            self.repository.save(&mut payment).await?;
            tracing::info!(confirmation_number = ?payment.confirmation_number(), "Confirmed");
        }

        let confirmation_number = payment.confirmation_number().cloned().ok_or(
            PaymentError::InvalidStateTransition {
                current_state: payment.state(),
                action: "confirm",
            },
        )?;

        Ok(ConfirmationResult {
            correlation_id: correlation_id.clone(),
            confirmation_number,
        })
    }

    /// Reverts the trip's payment. Never fails the saga.
    #[tracing::instrument(skip(self, command), fields(correlation_id = %command.correlation_id))]
    pub async fn revert(&self, command: RevertPayment) -> CompensationOutcome {
        let correlation_id = &command.correlation_id;
        let reason = command.reason.as_deref().unwrap_or(DEFAULT_REVERT_REASON);
        let outcome = retry_on_conflict(|| self.try_revert(correlation_id, reason))
            .await
            .unwrap_or_else(|e| CompensationOutcome::Failed {
                reason: e.to_string(),
            });
        record_compensation(Payment::kind(), &outcome);
        outcome
    }

    async fn try_revert(
        &self,
        correlation_id: &CorrelationId,
        reason: &str,
    ) -> Result<CompensationOutcome, DomainError> {
        let Some(mut payment) = self
            .repository
            .find_by_correlation_id(correlation_id)
            .await?
        else {
            return Ok(CompensationOutcome::NothingToCompensate);
        };

        match payment.state() {
            PaymentState::Reverted => Ok(CompensationOutcome::AlreadyCompensated),
            PaymentState::Processed | PaymentState::Confirmed => {
                payment.revert(reason)?;
                self.repository.save(&mut payment).await?;
                Ok(CompensationOutcome::Compensated)
            }
            state @ (PaymentState::Pending | PaymentState::Failed) => {
                Ok(CompensationOutcome::Skipped {
                    reason: format!("payment is {state}"),
                })
            }
        }
    }

    /// Loads the payment of a trip.
    pub async fn find(
        &self,
        correlation_id: &CorrelationId,
    ) -> Result<Option<Payment>, ParticipantError> {
        Ok(self
            .repository
            .find_by_correlation_id(correlation_id)
            .await?)
    }
}

/// Builds the reply for a stored payment, re-raising a recorded failure.
fn payment_result(payment: &Payment, ceiling: Money) -> Result<PaymentResult, ParticipantError> {
    match (payment.state(), payment.transaction_reference()) {
        (state @ (PaymentState::Processed | PaymentState::Confirmed), Some(reference)) => {
            Ok(PaymentResult {
                correlation_id: payment.correlation_id().clone(),
                payment_processed: true,
                state,
                amount: payment.amount(),
                transaction_reference: reference.clone(),
            })
        }
        (PaymentState::Failed, _) => Err(failure_error(payment, ceiling)),
        (state, _) => Err(ParticipantError::InvalidStateTransition {
            current_state: state.to_string(),
            action: "process",
        }),
    }
}

fn failure_error(payment: &Payment, ceiling: Money) -> ParticipantError {
    let amount = payment.amount();
    match payment.failure() {
        Some(failure) => match failure.kind {
            PaymentFailureKind::InvalidAmount => ParticipantError::InvalidAmount { amount },
            PaymentFailureKind::AmountExceedsLimit => ParticipantError::LimitExceeded {
                amount,
                limit: failure.limit.unwrap_or(ceiling),
            },
            PaymentFailureKind::Other => ParticipantError::Validation(failure.reason.clone()),
        },
        None => ParticipantError::Validation("payment failed".to_string()),
    }
}
