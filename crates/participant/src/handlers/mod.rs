//! Command handlers, one per aggregate type.

mod payment;
mod reservation;
mod warning;

pub use payment::PaymentHandler;
pub use reservation::ReservationHandler;
pub use warning::WarningHandler;

use std::future::Future;
use std::time::Instant;

use domain::DomainError;

use crate::outcome::{CompensationOutcome, StepOutcome};

/// Attempts made by a handler before giving up on concurrent updates.
pub(crate) const MAX_CONFLICT_ATTEMPTS: u32 = 3;

/// Runs `op` again while it fails with a store conflict.
///
/// `op` must reload the aggregate on every attempt.
pub(crate) async fn retry_on_conflict<T, F, Fut>(mut op: F) -> Result<T, DomainError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, DomainError>>,
{
    let mut attempt = 1;
    loop {
        match op().await {
            Err(e) if e.is_conflict() && attempt < MAX_CONFLICT_ATTEMPTS => {
                tracing::debug!(attempt, error = %e, "Concurrent update, reloading");
                attempt += 1;
            }
            result => return result,
        }
    }
}

pub(crate) fn record_command<T>(command: &'static str, outcome: &StepOutcome<T>, started: Instant) {
    metrics::counter!(
        "participant_commands_total",
        "command" => command,
        "outcome" => outcome.as_str()
    )
    .increment(1);
    metrics::histogram!("participant_command_duration_seconds", "command" => command)
        .record(started.elapsed().as_secs_f64());

    match outcome {
        StepOutcome::Succeeded(_) => {}
        StepOutcome::Recoverable(e) => {
            tracing::warn!(command, code = e.code(), error = %e, "Command failed, retryable");
        }
        StepOutcome::Fatal(e) => {
            tracing::info!(command, code = e.code(), error = %e, "Command rejected");
        }
    }
}

pub(crate) fn record_compensation(kind: &'static str, outcome: &CompensationOutcome) {
    metrics::counter!(
        "participant_compensations_total",
        "kind" => kind,
        "outcome" => outcome.as_str()
    )
    .increment(1);

    match outcome {
        CompensationOutcome::Compensated => tracing::info!(kind, "Compensated"),
        CompensationOutcome::AlreadyCompensated => {
            tracing::warn!(kind, "Already compensated, ignoring redelivery")
        }
        CompensationOutcome::NothingToCompensate => tracing::info!(kind, "Nothing to compensate"),
        CompensationOutcome::Skipped { reason } => {
            tracing::warn!(kind, reason = %reason, "Compensation skipped")
        }
        CompensationOutcome::Failed { reason } => {
            tracing::error!(kind, reason = %reason, "Compensation failed")
        }
    }
}
