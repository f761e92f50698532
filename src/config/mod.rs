pub mod chains;
pub mod environment;
pub mod monitor_config;

pub use chains::{default_known_chains, load_known_chains, ChainIdentity};
pub use environment::Settings;
pub use monitor_config::{MonitorConfig, Overrides};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {name}: {value:?}")]
    InvalidVariable { name: String, value: String },
    #[error("Cannot load known chains from {path}: {reason}")]
    KnownChains { path: String, reason: String },
    #[error("Unknown chain symbol: {0}")]
    UnknownChain(String),
    #[error("Invalid monitor configuration: {0}")]
    Invalid(validator::ValidationErrors),
}
