//! Confirmation number and transaction reference generation.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;

use crate::value_objects::{ConfirmationNumber, TransactionReference};

const TRANSACTION_PREFIX: &str = "TX";
const ALPHABET: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Issues references from a strictly increasing microsecond tick.
///
/// Each call takes `max(now, last + 1)`, so no two references issued by one
/// generator share a tick, even under bursts within the same microsecond or
/// when the wall clock steps backwards. Share one generator per process.
#[derive(Debug, Default)]
pub struct ReferenceGenerator {
    last_tick: AtomicU64,
}

impl ReferenceGenerator {
    /// Creates a new generator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Issues a confirmation number with the given prefix (e.g. `"FL"`).
    pub fn next_confirmation(&self, prefix: &str) -> ConfirmationNumber {
        ConfirmationNumber::new(self.next_reference(prefix))
    }

    /// Issues a payment transaction reference.
    pub fn next_transaction(&self) -> TransactionReference {
        TransactionReference::new(self.next_reference(TRANSACTION_PREFIX))
    }

    fn next_reference(&self, prefix: &str) -> String {
        format!("{prefix}-{}", encode_base36(self.next_tick()))
    }

    fn next_tick(&self) -> u64 {
        let now = u64::try_from(Utc::now().timestamp_micros()).unwrap_or_default();
        let advance = |last: u64| now.max(last + 1);

        // The closure always returns Some, so the update cannot fail
        match self
            .last_tick
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |last| {
                Some(advance(last))
            }) {
            Ok(previous) | Err(previous) => advance(previous),
        }
    }
}

fn encode_base36(mut value: u64) -> String {
    if value == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    while value > 0 {
        digits.push(ALPHABET[(value % 36) as usize]);
        value /= 36;
    }
    digits.reverse();
    String::from_utf8(digits).unwrap_or_default()
}
