//! Typed results handed back to the coordinator.

use serde::{Deserialize, Serialize};

use crate::error::ParticipantError;

/// Result of a forward step.
///
/// `Recoverable` tells the coordinator a retry of the same command may
/// succeed; `Fatal` routes the saga to its compensation branch.
#[derive(Debug)]
pub enum StepOutcome<T> {
    Succeeded(T),
    Recoverable(ParticipantError),
    Fatal(ParticipantError),
}

impl<T> StepOutcome<T> {
    /// Classifies an error by its retryability.
    pub fn from_error(error: ParticipantError) -> Self {
        if error.is_retryable() {
            StepOutcome::Recoverable(error)
        } else {
            StepOutcome::Fatal(error)
        }
    }

    /// Wraps a handler result.
    pub fn from_result(result: Result<T, ParticipantError>) -> Self {
        match result {
            Ok(value) => StepOutcome::Succeeded(value),
            Err(error) => Self::from_error(error),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, StepOutcome::Succeeded(_))
    }

    /// Returns the error of a failed step.
    pub fn error(&self) -> Option<&ParticipantError> {
        match self {
            StepOutcome::Succeeded(_) => None,
            StepOutcome::Recoverable(e) | StepOutcome::Fatal(e) => Some(e),
        }
    }

    /// Converts into a plain result, dropping the retry classification.
    pub fn into_result(self) -> Result<T, ParticipantError> {
        match self {
            StepOutcome::Succeeded(value) => Ok(value),
            StepOutcome::Recoverable(e) | StepOutcome::Fatal(e) => Err(e),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> StepOutcome<U> {
        match self {
            StepOutcome::Succeeded(value) => StepOutcome::Succeeded(f(value)),
            StepOutcome::Recoverable(e) => StepOutcome::Recoverable(e),
            StepOutcome::Fatal(e) => StepOutcome::Fatal(e),
        }
    }

    /// Returns the outcome name used as a metrics label.
    pub fn as_str(&self) -> &'static str {
        match self {
            StepOutcome::Succeeded(_) => "succeeded",
            StepOutcome::Recoverable(_) => "recoverable",
            StepOutcome::Fatal(_) => "fatal",
        }
    }
}

/// Result of a compensation step.
///
/// Compensations never fail the saga: errors are absorbed into `Failed` or
/// `Skipped` and reported for follow-up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CompensationOutcome {
    /// The resource was released by this call.
    Compensated,

    /// An earlier delivery already released the resource.
    AlreadyCompensated,

    /// Nothing was ever reserved for the correlation id.
    NothingToCompensate,

    /// The resource is in a state compensation does not apply to.
    Skipped { reason: String },

    /// The compensation could not be carried out.
    Failed { reason: String },
}

impl CompensationOutcome {
    /// Returns true if the coordinator should raise a booking warning.
    pub fn requires_attention(&self) -> bool {
        matches!(
            self,
            CompensationOutcome::Skipped { .. } | CompensationOutcome::Failed { .. }
        )
    }

    /// Returns the outcome name used as a metrics label.
    pub fn as_str(&self) -> &'static str {
        match self {
            CompensationOutcome::Compensated => "compensated",
            CompensationOutcome::AlreadyCompensated => "already_compensated",
            CompensationOutcome::NothingToCompensate => "nothing_to_compensate",
            CompensationOutcome::Skipped { .. } => "skipped",
            CompensationOutcome::Failed { .. } => "failed",
        }
    }
}

#[cfg(test)]
mod tests {
    use domain::Money;

    use super::*;

    #[test]
    fn test_step_outcome_classification() {
        let transient: StepOutcome<()> =
            StepOutcome::from_error(ParticipantError::TransientResourceUnavailable {
                site: "process-payment",
            });
        assert!(matches!(transient, StepOutcome::Recoverable(_)));
        assert_eq!(transient.as_str(), "recoverable");

        let invalid: StepOutcome<()> = StepOutcome::from_error(ParticipantError::InvalidAmount {
            amount: Money::zero(),
        });
        assert!(matches!(invalid, StepOutcome::Fatal(_)));
        assert_eq!(invalid.error().unwrap().code(), "INVALID_AMOUNT");
    }

    #[test]
    fn test_step_outcome_map() {
        let outcome = StepOutcome::from_result(Ok::<_, ParticipantError>(2)).map(|n| n * 10);
        assert!(outcome.is_success());
        assert_eq!(outcome.into_result().unwrap(), 20);
    }

    #[test]
    fn test_requires_attention() {
        assert!(!CompensationOutcome::Compensated.requires_attention());
        assert!(!CompensationOutcome::AlreadyCompensated.requires_attention());
        assert!(!CompensationOutcome::NothingToCompensate.requires_attention());
        assert!(
            CompensationOutcome::Skipped {
                reason: "PENDING".into()
            }
            .requires_attention()
        );
        assert!(
            CompensationOutcome::Failed {
                reason: "db down".into()
            }
            .requires_attention()
        );
    }

    #[test]
    fn test_compensation_serialization() {
        let json = serde_json::to_value(CompensationOutcome::Skipped {
            reason: "payment is FAILED".into(),
        })
        .unwrap();
        assert_eq!(json["status"], "SKIPPED");
        assert_eq!(json["reason"], "payment is FAILED");

        let json = serde_json::to_value(CompensationOutcome::AlreadyCompensated).unwrap();
        assert_eq!(json["status"], "ALREADY_COMPENSATED");
    }
}
