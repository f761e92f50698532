use std::time::Duration;
use validator::{Validate, ValidationError};

use super::chains::ChainIdentity;
use super::environment::Settings;
use super::ConfigError;
use crate::services::monitor::RetryPolicy;

/// Immutable configuration of one monitoring run
#[derive(Debug, Clone, Validate)]
pub struct MonitorConfig {
    #[validate(length(min = 1, message = "application name must not be empty"))]
    pub app_name: String,
    #[validate(url(message = "node address must be a valid URI"))]
    pub node_address: String,
    #[validate(length(min = 1, message = "account must not be empty"))]
    pub account: String,
    #[validate(custom(function = "validate_poll_interval"))]
    pub poll_interval: Duration,
    pub chain_identity: ChainIdentity,
    pub retry: RetryPolicy,
}

/// Values given on the command line, each overriding its settings counterpart
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub node: Option<String>,
    pub account: Option<String>,
    pub checking_timeout: Option<u64>,
    pub chain: Option<String>,
    pub max_retries: Option<u32>,
}

fn validate_poll_interval(interval: &Duration) -> Result<(), ValidationError> {
    if interval.is_zero() {
        let mut err = ValidationError::new("poll_interval");
        err.message = Some("poll interval must be strictly positive".into());
        return Err(err);
    }
    Ok(())
}

impl MonitorConfig {
    /// Resolve settings and overrides into a validated config
    pub fn from_settings(settings: &Settings, overrides: Overrides) -> Result<Self, ConfigError> {
        let chain = overrides.chain.unwrap_or_else(|| settings.chain.clone());
        let chain_identity = settings
            .known_chains
            .get(&chain)
            .cloned()
            .ok_or(ConfigError::UnknownChain(chain))?;

        let retry = RetryPolicy {
            max_attempts: overrides.max_retries.unwrap_or(settings.max_retries),
            base_delay_secs: settings.retry_base_delay_secs,
            max_delay_secs: settings.retry_max_delay_secs,
            ..RetryPolicy::default()
        };

        let config = Self {
            app_name: settings.app_name.clone(),
            node_address: overrides.node.unwrap_or_else(|| settings.node.clone()),
            account: overrides.account.unwrap_or_else(|| settings.account.clone()),
            poll_interval: Duration::from_secs(
                overrides
                    .checking_timeout
                    .unwrap_or(settings.checking_witness_timeout),
            ),
            chain_identity,
            retry,
        };

        config.check()?;
        Ok(config)
    }

    /// Validate invariants; also used by callers that build the config by hand
    pub fn check(&self) -> Result<(), ConfigError> {
        self.validate().map_err(ConfigError::Invalid)?;
        if self.account.trim().is_empty() {
            return Err(ConfigError::Invalid({
                let mut errors = validator::ValidationErrors::new();
                errors.add("account", ValidationError::new("blank"));
                errors
            }));
        }
        Ok(())
    }
}
