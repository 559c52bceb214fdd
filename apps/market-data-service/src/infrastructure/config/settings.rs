//! Service Configuration Settings
//!
//! All settings are fixed at construction; there is no dynamic reload.
//! Values come from environment variables with typed defaults.

use std::time::Duration;

/// Default symbols polled from the stock quote API.
const DEFAULT_STOCK_SYMBOLS: &[&str] = &["PETR4", "ITUB4", "VALE3", "MGLU3", "BBDC4", "WEGE3"];

/// Default pairs polled from the currency quote API.
const DEFAULT_CURRENCY_PAIRS: &[&str] = &["USD-BRL", "EUR-BRL", "BTC-BRL"];

/// Complete service configuration.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Query surface HTTP port.
    pub http_port: u16,
    /// Refresh interval between cycles. Always greater than zero.
    pub update_interval: Duration,
    /// Stock symbols polled every cycle.
    pub stock_symbols: Vec<String>,
    /// Currency pairs polled every cycle.
    pub currency_pairs: Vec<String>,
    /// Stock quote API base URL.
    pub brapi_base_url: String,
    /// Currency quote API base URL.
    pub awesome_base_url: String,
    /// Per-request timeout for quote provider calls.
    pub request_timeout: Duration,
    /// Broadcast channel capacity per receiver.
    pub broadcast_capacity: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            http_port: 8080,
            update_interval: Duration::from_secs(5),
            stock_symbols: to_owned(DEFAULT_STOCK_SYMBOLS),
            currency_pairs: to_owned(DEFAULT_CURRENCY_PAIRS),
            brapi_base_url: "https://brapi.dev/api".to_string(),
            awesome_base_url: "https://economia.awesomeapi.com.br".to_string(),
            request_timeout: Duration::from_secs(10),
            broadcast_capacity: 256,
        }
    }
}

impl ServiceConfig {
    /// Load configuration from environment variables, falling back to
    /// defaults for anything unset.
    ///
    /// # Errors
    ///
    /// Returns an error when the refresh interval is zero or a symbol list
    /// is set but empty.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let config = Self {
            http_port: parse_env_u16("MARKET_DATA_HTTP_PORT", defaults.http_port),
            update_interval: parse_env_duration_secs(
                "MARKET_DATA_UPDATE_INTERVAL_SECS",
                defaults.update_interval,
            ),
            stock_symbols: parse_env_list("MARKET_DATA_STOCK_SYMBOLS", defaults.stock_symbols),
            currency_pairs: parse_env_list("MARKET_DATA_CURRENCY_PAIRS", defaults.currency_pairs),
            brapi_base_url: parse_env_string("MARKET_DATA_BRAPI_BASE_URL", defaults.brapi_base_url),
            awesome_base_url: parse_env_string(
                "MARKET_DATA_AWESOME_BASE_URL",
                defaults.awesome_base_url,
            ),
            request_timeout: parse_env_duration_secs(
                "MARKET_DATA_REQUEST_TIMEOUT_SECS",
                defaults.request_timeout,
            ),
            broadcast_capacity: parse_env_usize(
                "MARKET_DATA_BROADCAST_CAPACITY",
                defaults.broadcast_capacity,
            ),
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.update_interval.is_zero() {
            return Err(ConfigError::InvalidValue {
                key: "MARKET_DATA_UPDATE_INTERVAL_SECS".to_string(),
                reason: "interval must be greater than zero".to_string(),
            });
        }
        if self.stock_symbols.is_empty() {
            return Err(ConfigError::EmptyValue(
                "MARKET_DATA_STOCK_SYMBOLS".to_string(),
            ));
        }
        if self.currency_pairs.is_empty() {
            return Err(ConfigError::EmptyValue(
                "MARKET_DATA_CURRENCY_PAIRS".to_string(),
            ));
        }
        if self.broadcast_capacity == 0 {
            return Err(ConfigError::InvalidValue {
                key: "MARKET_DATA_BROADCAST_CAPACITY".to_string(),
                reason: "capacity must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Environment variable resolves to an empty list or value.
    #[error("environment variable {0} cannot be empty")]
    EmptyValue(String),
    /// Environment variable has a value outside the accepted range.
    #[error("invalid value for {key}: {reason}")]
    InvalidValue {
        /// The offending variable.
        key: String,
        /// Why the value was rejected.
        reason: String,
    },
}

fn to_owned(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| (*v).to_string()).collect()
}

fn parse_env_u16(key: &str, default: u16) -> u16 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn parse_env_usize(key: &str, default: usize) -> usize {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn parse_env_duration_secs(key: &str, default: Duration) -> Duration {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .map_or(default, Duration::from_secs)
}

fn parse_env_string(key: &str, default: String) -> String {
    std::env::var(key).ok().filter(|v| !v.is_empty()).unwrap_or(default)
}

/// Parse a comma-separated list, trimming entries and dropping empties.
/// An unset variable falls back to the default; a set-but-empty one
/// produces an empty list (rejected by validation).
fn parse_env_list(key: &str, default: Vec<String>) -> Vec<String> {
    std::env::var(key).ok().map_or(default, |v| split_list(&v))
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    #[test]
    fn defaults_match_reference_configuration() {
        let config = ServiceConfig::default();

        assert_eq!(config.http_port, 8080);
        assert_eq!(config.update_interval, Duration::from_secs(5));
        assert_eq!(config.stock_symbols.len(), 6);
        assert_eq!(config.stock_symbols[0], "PETR4");
        assert_eq!(
            config.currency_pairs,
            vec!["USD-BRL", "EUR-BRL", "BTC-BRL"]
        );
        assert_eq!(config.request_timeout, Duration::from_secs(10));
    }

    #[test_case("PETR4,VALE3", &["PETR4", "VALE3"]; "plain list")]
    #[test_case("PETR4, VALE3 ,,ITUB4", &["PETR4", "VALE3", "ITUB4"]; "trims and drops empties")]
    #[test_case("", &[]; "empty string")]
    #[test_case(" , ", &[]; "only separators")]
    fn split_list_cases(input: &str, expected: &[&str]) {
        let expected: Vec<String> = expected.iter().map(|e| (*e).to_string()).collect();
        assert_eq!(split_list(input), expected);
    }

    #[test]
    fn zero_interval_is_rejected() {
        let config = ServiceConfig {
            update_interval: Duration::ZERO,
            ..ServiceConfig::default()
        };

        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn empty_symbol_list_is_rejected() {
        let config = ServiceConfig {
            stock_symbols: vec![],
            ..ServiceConfig::default()
        };

        assert!(matches!(config.validate(), Err(ConfigError::EmptyValue(_))));
    }

    #[test]
    fn default_configuration_validates() {
        assert!(ServiceConfig::default().validate().is_ok());
    }
}
