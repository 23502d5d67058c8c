//! Participant policy configuration.

use std::sync::Arc;

use domain::{DEFAULT_PAYMENT_CEILING, Money, ReferenceGenerator};
use rand::rngs::StdRng;

use crate::error::ParticipantError;
use crate::policy::{
    FaultInjector, FaultSite, NoFaults, PaymentLimits, ProbabilisticFaults, RngSource,
};

/// Policy settings for a participant.
#[derive(Debug, Clone, PartialEq)]
pub struct ParticipantConfig {
    /// Largest amount a single payment may charge.
    pub payment_ceiling: Money,
    /// Probability of injecting a transient fault into a forward step. Zero disables injection.
    pub fault_rate: f64,
    /// Seed for the per-command random generators. `None` draws from OS entropy.
    pub rng_seed: Option<u64>,
}

impl Default for ParticipantConfig {
    fn default() -> Self {
        Self {
            payment_ceiling: DEFAULT_PAYMENT_CEILING,
            fault_rate: 0.0,
            rng_seed: None,
        }
    }
}

/// Collaborators shared by every handler of a participant.
#[derive(Debug, Clone)]
pub struct ParticipantContext {
    pub limits: PaymentLimits,
    pub references: Arc<ReferenceGenerator>,
    pub faults: Arc<dyn FaultInjector>,
    pub rng: Arc<RngSource>,
}

impl Default for ParticipantContext {
    fn default() -> Self {
        Self::from_config(&ParticipantConfig::default())
    }
}

impl ParticipantContext {
    /// Builds the context described by a configuration.
    pub fn from_config(config: &ParticipantConfig) -> Self {
        let faults: Arc<dyn FaultInjector> = if config.fault_rate > 0.0 {
            Arc::new(ProbabilisticFaults::new(config.fault_rate))
        } else {
            Arc::new(NoFaults)
        };
        let rng = match config.rng_seed {
            Some(seed) => RngSource::seeded(seed),
            None => RngSource::from_entropy(),
        };

        Self {
            limits: PaymentLimits {
                ceiling: config.payment_ceiling,
            },
            references: Arc::new(ReferenceGenerator::new()),
            faults,
            rng: Arc::new(rng),
        }
    }

    /// Replaces the fault injector.
    pub fn with_fault_injector(mut self, faults: Arc<dyn FaultInjector>) -> Self {
        self.faults = faults;
        self
    }

    /// Fails with `TransientResourceUnavailable` if a fault is injected at `site`.
    pub(crate) fn check_fault(
        &self,
        site: FaultSite,
        rng: &mut StdRng,
    ) -> Result<(), ParticipantError> {
        if self.faults.should_fail(site, rng) {
            tracing::warn!(site = site.as_str(), "Injected transient fault");
            metrics::counter!("participant_injected_faults_total", "site" => site.as_str())
                .increment(1);
            return Err(ParticipantError::TransientResourceUnavailable {
                site: site.as_str(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use domain::ResourceKind;

    use super::*;
    use crate::policy::ScriptedFaults;

    #[test]
    fn test_default_config() {
        let config = ParticipantConfig::default();
        assert_eq!(config.payment_ceiling, Money::from_units(10_000));
        assert_eq!(config.fault_rate, 0.0);
        assert_eq!(config.rng_seed, None);
    }

    #[test]
    fn test_context_without_faults_never_fails() {
        let context = ParticipantContext::default();
        let mut rng = context.rng.next_rng();
        for _ in 0..50 {
            assert!(context.check_fault(FaultSite::ProcessPayment, &mut rng).is_ok());
        }
    }

    #[test]
    fn test_context_from_config() {
        let context = ParticipantContext::from_config(&ParticipantConfig {
            payment_ceiling: Money::from_units(500),
            fault_rate: 1.0,
            rng_seed: Some(11),
        });
        let mut rng = context.rng.next_rng();

        assert_eq!(context.limits.ceiling, Money::from_units(500));
        assert_eq!(context.rng.seed(), Some(11));
        let err = context
            .check_fault(FaultSite::Reserve(ResourceKind::Car), &mut rng)
            .unwrap_err();
        assert_eq!(err.code(), "RESOURCE_UNAVAILABLE");
    }

    #[test]
    fn test_with_fault_injector() {
        let faults = Arc::new(ScriptedFaults::new());
        faults.fail_next(FaultSite::ProcessPayment, 1);
        let context = ParticipantContext::default().with_fault_injector(faults);
        let mut rng = context.rng.next_rng();

        assert!(context.check_fault(FaultSite::ProcessPayment, &mut rng).is_err());
        assert!(context.check_fault(FaultSite::ProcessPayment, &mut rng).is_ok());
    }
}
