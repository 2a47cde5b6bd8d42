//! Application configuration management.

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::types::DEFAULT_BALANCE_TOLERANCE;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Posting engine configuration.
    #[serde(default)]
    pub ledger: LedgerConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

/// What the registry does when asked to deactivate an account.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeactivationPolicy {
    /// Deactivation only hides the account from new postings.
    #[default]
    AlwaysAllow,
    /// Refuse while the account has unreconciled lines in the open period.
    RejectOpenUnreconciled,
}

/// Posting engine configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LedgerConfig {
    /// Largest allowed difference between journal debits and credits.
    #[serde(default = "default_balance_tolerance")]
    pub balance_tolerance: Decimal,
    /// Width of the zero-padded sequence in journal references.
    #[serde(default = "default_reference_digits")]
    pub reference_digits: usize,
    /// Attempts made by an originator before surfacing a concurrency error.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Account deactivation policy.
    #[serde(default)]
    pub deactivation_policy: DeactivationPolicy,
}

fn default_balance_tolerance() -> Decimal {
    DEFAULT_BALANCE_TOLERANCE
}

fn default_reference_digits() -> usize {
    6
}

fn default_max_retries() -> u32 {
    3
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            balance_tolerance: default_balance_tolerance(),
            reference_digits: default_reference_digits(),
            max_retries: default_max_retries(),
            deactivation_policy: DeactivationPolicy::default(),
        }
    }
}

/// Logging configuration for the binaries.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Default `EnvFilter` directive when `RUST_LOG` is unset.
    #[serde(default = "default_log_filter")]
    pub filter: String,
    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

fn default_log_filter() -> String {
    "bursar=info,sea_orm=warn".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
            json: false,
        }
    }
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("BURSAR").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}
