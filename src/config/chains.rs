use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::ConfigError;

/// Identity of a Graphene-based chain
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChainIdentity {
    pub chain_id: String,
    pub core_symbol: String,
    pub prefix: String,
}

pub fn default_known_chains() -> HashMap<String, ChainIdentity> {
    let mut chains = HashMap::new();

    chains.insert(
        "VIN".to_string(),
        ChainIdentity {
            chain_id: "b025b3dacd447ae0f9baa148ad5e69e2ec8ca93c0cc6c341b60da8a4b2a29871".to_string(),
            core_symbol: "VIN".to_string(),
            prefix: "VIN".to_string(),
        },
    );

    chains
}

/// Load known chains from a JSON file shaped as `{"SYMBOL": {chain_id, core_symbol, prefix}}`
pub fn load_known_chains(path: &str) -> Result<HashMap<String, ChainIdentity>, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::KnownChains {
        path: path.to_string(),
        reason: e.to_string(),
    })?;

    let chains: HashMap<String, ChainIdentity> =
        serde_json::from_str(&content).map_err(|e| ConfigError::KnownChains {
            path: path.to_string(),
            reason: e.to_string(),
        })?;

    if chains.is_empty() {
        return Err(ConfigError::KnownChains {
            path: path.to_string(),
            reason: "no chains defined".to_string(),
        });
    }

    Ok(chains)
}
