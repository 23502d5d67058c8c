//! Payment limits, fault injection and per-call random generators.

use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

use domain::{DEFAULT_PAYMENT_CEILING, Money, ResourceKind};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Monetary limits applied to payments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaymentLimits {
    /// Largest amount a single payment may charge.
    pub ceiling: Money,
}

impl Default for PaymentLimits {
    fn default() -> Self {
        Self {
            ceiling: DEFAULT_PAYMENT_CEILING,
        }
    }
}

/// Point in a forward step where a fault may be injected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FaultSite {
    Reserve(ResourceKind),
    ProcessPayment,
}

impl FaultSite {
    /// Returns the site name, which matches the command it interrupts.
    pub fn as_str(&self) -> &'static str {
        match self {
            FaultSite::Reserve(ResourceKind::Flight) => "reserve-flight",
            FaultSite::Reserve(ResourceKind::Hotel) => "reserve-hotel",
            FaultSite::Reserve(ResourceKind::Car) => "reserve-car",
            FaultSite::Reserve(ResourceKind::Payment) | FaultSite::ProcessPayment => {
                "process-payment"
            }
        }
    }
}

impl std::fmt::Display for FaultSite {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Decides whether a forward step should fail with a simulated outage.
///
/// Used in tests and staging to exercise the coordinator's retry and
/// compensation paths. Production runs with [`NoFaults`].
pub trait FaultInjector: Debug + Send + Sync {
    fn should_fail(&self, site: FaultSite, rng: &mut StdRng) -> bool;
}

/// Never injects a fault.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoFaults;

impl FaultInjector for NoFaults {
    fn should_fail(&self, _site: FaultSite, _rng: &mut StdRng) -> bool {
        false
    }
}

/// Fails each step with a fixed probability, drawn from the call's RNG.
#[derive(Debug, Clone, Copy)]
pub struct ProbabilisticFaults {
    rate: f64,
}

impl ProbabilisticFaults {
    /// Creates an injector failing with probability `rate`, clamped to `[0, 1]`.
    pub fn new(rate: f64) -> Self {
        let rate = if rate.is_nan() { 0.0 } else { rate.clamp(0.0, 1.0) };
        Self { rate }
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }
}

impl FaultInjector for ProbabilisticFaults {
    fn should_fail(&self, _site: FaultSite, rng: &mut StdRng) -> bool {
        rng.gen_bool(self.rate)
    }
}

/// Fails the next N calls at chosen sites, then lets calls through.
#[derive(Debug, Default)]
pub struct ScriptedFaults {
    remaining: Mutex<HashMap<FaultSite, u32>>,
}

impl ScriptedFaults {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedules `count` more failures at `site`.
    pub fn fail_next(&self, site: FaultSite, count: u32) {
        let mut remaining = self.remaining.lock().unwrap_or_else(PoisonError::into_inner);
        *remaining.entry(site).or_default() += count;
    }

    /// Returns how many scheduled failures are left at `site`.
    pub fn pending(&self, site: FaultSite) -> u32 {
        let remaining = self.remaining.lock().unwrap_or_else(PoisonError::into_inner);
        remaining.get(&site).copied().unwrap_or_default()
    }
}

impl FaultInjector for ScriptedFaults {
    fn should_fail(&self, site: FaultSite, _rng: &mut StdRng) -> bool {
        let mut remaining = self.remaining.lock().unwrap_or_else(PoisonError::into_inner);
        match remaining.get_mut(&site) {
            Some(count) if *count > 0 => {
                *count -= 1;
                true
            }
            _ => false,
        }
    }
}

/// Odd multiplier spreading call counters across the seed space.
const SEED_MIX: u64 = 0x9E37_79B9_7F4A_7C15;

/// Hands out one random generator per command.
///
/// A seeded source derives each generator from the seed and a call counter,
/// so a given sequence of commands always sees the same random values.
/// Without a seed every generator is drawn from OS entropy.
#[derive(Debug, Default)]
pub struct RngSource {
    seed: Option<u64>,
    calls: AtomicU64,
}

impl RngSource {
    pub fn seeded(seed: u64) -> Self {
        Self {
            seed: Some(seed),
            calls: AtomicU64::new(0),
        }
    }

    pub fn from_entropy() -> Self {
        Self::default()
    }

    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    /// Returns a fresh generator for one command.
    pub fn next_rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => {
                let call = self.calls.fetch_add(1, Ordering::Relaxed);
                StdRng::seed_from_u64(seed ^ call.wrapping_mul(SEED_MIX))
            }
            None => StdRng::from_entropy(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_ceiling() {
        assert_eq!(PaymentLimits::default().ceiling, Money::from_units(10_000));
    }

    #[test]
    fn test_no_faults() {
        let mut rng = RngSource::seeded(1).next_rng();
        assert!(!NoFaults.should_fail(FaultSite::ProcessPayment, &mut rng));
    }

    #[test]
    fn test_probabilistic_extremes() {
        let source = RngSource::seeded(7);
        let always = ProbabilisticFaults::new(1.0);
        let never = ProbabilisticFaults::new(0.0);

        for _ in 0..100 {
            let mut rng = source.next_rng();
            assert!(always.should_fail(FaultSite::Reserve(ResourceKind::Car), &mut rng));
            assert!(!never.should_fail(FaultSite::Reserve(ResourceKind::Car), &mut rng));
        }
        assert_eq!(ProbabilisticFaults::new(3.5).rate(), 1.0);
        assert_eq!(ProbabilisticFaults::new(f64::NAN).rate(), 0.0);
    }

    #[test]
    fn test_scripted_faults_count_down_per_site() {
        let faults = ScriptedFaults::new();
        let flight = FaultSite::Reserve(ResourceKind::Flight);
        faults.fail_next(flight, 2);
        let mut rng = RngSource::seeded(1).next_rng();

        assert!(!faults.should_fail(FaultSite::ProcessPayment, &mut rng));
        assert!(faults.should_fail(flight, &mut rng));
        assert_eq!(faults.pending(flight), 1);
        assert!(faults.should_fail(flight, &mut rng));
        assert!(!faults.should_fail(flight, &mut rng));
    }

    #[test]
    fn test_seeded_sources_repeat() {
        let first = RngSource::seeded(42);
        let second = RngSource::seeded(42);

        for _ in 0..5 {
            let a: u64 = first.next_rng().r#gen();
            let b: u64 = second.next_rng().r#gen();
            assert_eq!(a, b);
        }
    }

    #[test]
    fn test_calls_get_distinct_generators() {
        let source = RngSource::seeded(42);
        let a: u64 = source.next_rng().r#gen();
        let b: u64 = source.next_rng().r#gen();
        assert_ne!(a, b);
    }

    #[test]
    fn test_adjacent_seeds_do_not_share_streams() {
        let low = RngSource::seeded(42);
        let high = RngSource::seeded(43);

        let low_calls: Vec<u64> = (0..4).map(|_| low.next_rng().r#gen()).collect();
        let high_calls: Vec<u64> = (0..4).map(|_| high.next_rng().r#gen()).collect();

        for value in &high_calls {
            assert!(!low_calls.contains(value));
        }
    }

    #[test]
    fn test_site_names() {
        assert_eq!(
            FaultSite::Reserve(ResourceKind::Hotel).to_string(),
            "reserve-hotel"
        );
        assert_eq!(FaultSite::ProcessPayment.as_str(), "process-payment");
    }
}
