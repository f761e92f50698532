use std::collections::HashMap;
use std::env;
use std::net::SocketAddr;
use std::str::FromStr;

use super::chains::{default_known_chains, load_known_chains, ChainIdentity};
use super::ConfigError;

pub const DEFAULT_APP_NAME: &str = "witness_health_monitor";
pub const DEFAULT_NODE: &str = "wss://127.0.0.1:11011/";
pub const DEFAULT_ACCOUNT: &str = "abetterbid";
pub const DEFAULT_CHAIN: &str = "VIN";

/// Static settings of the monitor.
/// Built from defaults, then overridden by environment variables (and `.env`).
#[derive(Debug, Clone)]
pub struct Settings {
    pub app_name: String,
    /// Seconds between two witness checks
    pub checking_witness_timeout: u64,
    pub node: String,
    pub account: String,
    /// Symbol of the chain in `known_chains` the node must belong to
    pub chain: String,
    pub known_chains: HashMap<String, ChainIdentity>,

    // Logstash transport; an empty host disables it
    pub logstash_host: String,
    pub logstash_port: u16,
    pub logging_version: u8,

    pub rpc_timeout_secs: u64,
    pub max_retries: u32,
    pub retry_base_delay_secs: u64,
    pub retry_max_delay_secs: u64,

    /// Address of the status/metrics HTTP server, disabled when `None`
    pub status_addr: Option<SocketAddr>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            app_name: DEFAULT_APP_NAME.to_string(),
            checking_witness_timeout: 30,
            node: DEFAULT_NODE.to_string(),
            account: DEFAULT_ACCOUNT.to_string(),
            chain: DEFAULT_CHAIN.to_string(),
            known_chains: default_known_chains(),
            logstash_host: "127.0.0.1".to_string(),
            logstash_port: 5200,
            logging_version: 1,
            rpc_timeout_secs: 10,
            max_retries: 0,
            retry_base_delay_secs: 5,
            retry_max_delay_secs: 60,
            status_addr: None,
        }
    }
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let mut settings = Self::default();

        if let Ok(app_name) = env::var("WITNESS_MONITOR_APP_NAME") {
            settings.app_name = app_name;
        }
        if let Ok(node) = env::var("WITNESS_MONITOR_NODE") {
            settings.node = node;
        }
        if let Ok(account) = env::var("WITNESS_MONITOR_ACCOUNT") {
            settings.account = account;
        }
        if let Ok(chain) = env::var("WITNESS_MONITOR_CHAIN") {
            settings.chain = chain;
        }
        if let Some(timeout) = parse_var("WITNESS_MONITOR_CHECKING_TIMEOUT")? {
            settings.checking_witness_timeout = timeout;
        }
        if let Some(timeout) = parse_var("WITNESS_MONITOR_RPC_TIMEOUT")? {
            settings.rpc_timeout_secs = timeout;
        }
        if let Some(retries) = parse_var("WITNESS_MONITOR_MAX_RETRIES")? {
            settings.max_retries = retries;
        }
        if let Some(delay) = parse_var("WITNESS_MONITOR_RETRY_BASE_DELAY")? {
            settings.retry_base_delay_secs = delay;
        }
        if let Some(delay) = parse_var("WITNESS_MONITOR_RETRY_MAX_DELAY")? {
            settings.retry_max_delay_secs = delay;
        }
        if let Some(addr) = parse_var("WITNESS_MONITOR_STATUS_ADDR")? {
            settings.status_addr = Some(addr);
        }

        if let Ok(host) = env::var("LOGSTASH_HOST") {
            settings.logstash_host = host;
        }
        if let Some(port) = parse_var("LOGSTASH_PORT")? {
            settings.logstash_port = port;
        }
        if let Some(version) = parse_var("LOGGING_VERSION")? {
            settings.logging_version = version;
        }

        if let Ok(path) = env::var("KNOWN_CHAINS_FILE") {
            settings.known_chains = load_known_chains(&path)?;
        }

        Ok(settings)
    }

    /// Whether events should also be shipped to logstash
    pub fn logstash_enabled(&self) -> bool {
        !self.logstash_host.trim().is_empty()
    }
}

fn parse_var<T: FromStr>(name: &str) -> Result<Option<T>, ConfigError> {
    match env::var(name) {
        Ok(raw) if raw.trim().is_empty() => Ok(None),
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidVariable {
                name: name.to_string(),
                value: raw,
            }),
        Err(_) => Ok(None),
    }
}
