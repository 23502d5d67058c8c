//! Application configuration loaded from environment variables.

use domain::Money;
use participant::ParticipantConfig;

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl LogFormat {
    fn parse(raw: &str) -> Self {
        if raw.eq_ignore_ascii_case("json") {
            LogFormat::Json
        } else {
            LogFormat::Text
        }
    }
}

/// Server configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `HOST`: bind address (default: `"0.0.0.0"`)
/// - `PORT`: listen port (default: `3000`)
/// - `RUST_LOG`: tracing filter directive (default: `"info"`)
/// - `LOG_FORMAT`: `text` or `json` (default: `text`)
/// - `DATABASE_URL`: PostgreSQL connection string (default: unset, in-memory store)
/// - `PAYMENT_CEILING`: largest payment amount (default: `10000.00`)
/// - `FAULT_RATE`: probability of injected transient faults (default: `0.0`)
/// - `RNG_SEED`: seed for simulated availability (default: unset, OS entropy)
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub log_format: LogFormat,
    pub database_url: Option<String>,
    pub participant: ParticipantConfig,
}

impl Config {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        Self {
            host: lookup("HOST").unwrap_or(defaults.host),
            port: lookup("PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
            log_level: lookup("RUST_LOG").unwrap_or(defaults.log_level),
            log_format: lookup("LOG_FORMAT")
                .map(|f| LogFormat::parse(&f))
                .unwrap_or_default(),
            database_url: lookup("DATABASE_URL").filter(|url| !url.trim().is_empty()),
            participant: ParticipantConfig {
                payment_ceiling: lookup("PAYMENT_CEILING")
                    .and_then(|c| Money::parse(&c).ok())
                    .filter(Money::is_positive)
                    .unwrap_or(defaults.participant.payment_ceiling),
                fault_rate: lookup("FAULT_RATE")
                    .and_then(|r| r.parse().ok())
                    .unwrap_or(defaults.participant.fault_rate),
                rng_seed: lookup("RNG_SEED").and_then(|s| s.parse().ok()),
            },
        }
    }

    /// Returns the `"host:port"` bind address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            log_level: "info".to_string(),
            log_format: LogFormat::Text,
            database_url: None,
            participant: ParticipantConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn from_pairs(pairs: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_default_values() {
        let config = Config::default();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 3000);
        assert_eq!(config.log_level, "info");
        assert_eq!(config.log_format, LogFormat::Text);
        assert_eq!(config.database_url, None);
        assert_eq!(
            config.participant.payment_ceiling,
            Money::from_units(10_000)
        );
    }

    #[test]
    fn test_reads_all_variables() {
        let config = from_pairs(&[
            ("HOST", "127.0.0.1"),
            ("PORT", "8080"),
            ("RUST_LOG", "debug"),
            ("LOG_FORMAT", "JSON"),
            ("DATABASE_URL", "postgres://localhost/travel"),
            ("PAYMENT_CEILING", "2500.50"),
            ("FAULT_RATE", "0.25"),
            ("RNG_SEED", "42"),
        ]);

        assert_eq!(config.addr(), "127.0.0.1:8080");
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(
            config.database_url.as_deref(),
            Some("postgres://localhost/travel")
        );
        assert_eq!(config.participant.payment_ceiling, Money::from_cents(250_050));
        assert_eq!(config.participant.fault_rate, 0.25);
        assert_eq!(config.participant.rng_seed, Some(42));
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let config = from_pairs(&[
            ("PORT", "not-a-port"),
            ("PAYMENT_CEILING", "-10"),
            ("FAULT_RATE", "often"),
            ("RNG_SEED", "abc"),
            ("DATABASE_URL", " "),
        ]);

        assert_eq!(config.port, 3000);
        assert_eq!(
            config.participant.payment_ceiling,
            Money::from_units(10_000)
        );
        assert_eq!(config.participant.fault_rate, 0.0);
        assert_eq!(config.participant.rng_seed, None);
        assert_eq!(config.database_url, None);
    }

    #[test]
    fn test_addr_default() {
        let config = Config::default();
        assert_eq!(config.addr(), "0.0.0.0:3000");
    }
}
