use std::collections::BTreeMap;
use std::env;
use std::path::PathBuf;

use alloy::primitives::Address;

use crate::fetcher::DEFAULT_MAX_RETRIES;
use crate::networks::price_client::DEFAULT_PRICE_API;
use crate::networks::rpc::{default_endpoints, DEFAULT_MULTICALL};
use crate::networks::Chain;

const DEFAULT_WALLETS_PATH: &str = "./addresses/evm.txt";
const DEFAULT_RESULTS_DIR: &str = "./results";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub wallets_path: PathBuf,
    pub results_dir: PathBuf,
    pub price_api_url: String,
    pub multicall_address: Address,
    pub max_retries: u32,
    /// Lowers the default log filter to `debug` so per-attempt RPC errors show.
    pub debug: bool,
    pub log_json: bool,

    // Endpoint pool per chain (RPC_<CHAIN> overrides the built-in list)
    pub rpc_pools: BTreeMap<Chain, Vec<String>>,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the config from any key/value source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let rpc_pools = Chain::ALL
            .into_iter()
            .map(|chain| {
                let pool = lookup(&format!("RPC_{}", chain.env_key()))
                    .map(|raw| split_list(&raw))
                    .filter(|pool| !pool.is_empty())
                    .unwrap_or_else(|| {
                        default_endpoints(chain).iter().map(|s| s.to_string()).collect()
                    });
                (chain, pool)
            })
            .collect();

        let multicall_address = match lookup("MULTICALL_ADDRESS") {
            Some(raw) => raw
                .trim()
                .parse::<Address>()
                .map_err(|_| anyhow::anyhow!("MULTICALL_ADDRESS is not a valid address: {raw}"))?,
            None => DEFAULT_MULTICALL,
        };

        Ok(Self {
            wallets_path: lookup("WALLETS_PATH")
                .unwrap_or_else(|| DEFAULT_WALLETS_PATH.into())
                .into(),
            results_dir: lookup("RESULTS_DIR")
                .unwrap_or_else(|| DEFAULT_RESULTS_DIR.into())
                .into(),
            price_api_url: lookup("PRICE_API_URL").unwrap_or_else(|| DEFAULT_PRICE_API.into()),
            multicall_address,
            max_retries: lookup("MAX_RETRIES")
                .map(|v| v.trim().parse::<u32>())
                .transpose()
                .map_err(|e| anyhow::anyhow!("MAX_RETRIES must be a non-negative integer: {e}"))?
                .unwrap_or(DEFAULT_MAX_RETRIES),
            debug: lookup("DEBUG")
                .unwrap_or_else(|| "false".into())
                .parse()
                .unwrap_or(false),
            log_json: lookup("LOG_JSON")
                .unwrap_or_else(|| "false".into())
                .parse()
                .unwrap_or(false),
            rpc_pools,
        })
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> anyhow::Result<AppConfig> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.wallets_path, PathBuf::from("./addresses/evm.txt"));
        assert_eq!(config.results_dir, PathBuf::from("./results"));
        assert_eq!(config.max_retries, 3);
        assert!(!config.debug);
        assert!(!config.log_json);
        assert_eq!(config.multicall_address, DEFAULT_MULTICALL);
        assert_eq!(config.rpc_pools.len(), Chain::ALL.len());
    }

    #[test]
    fn test_rpc_override() {
        let config = config_from(&[("RPC_OPBNB", "https://a.example, https://b.example,")]).unwrap();
        assert_eq!(
            config.rpc_pools[&Chain::OpBnb],
            vec!["https://a.example".to_string(), "https://b.example".to_string()]
        );
        // untouched chains keep the built-in list
        assert_eq!(config.rpc_pools[&Chain::Eth].len(), default_endpoints(Chain::Eth).len());
    }

    #[test]
    fn test_blank_override_falls_back() {
        let config = config_from(&[("RPC_ETH", " , ")]).unwrap();
        assert!(!config.rpc_pools[&Chain::Eth].is_empty());
    }

    #[test]
    fn test_invalid_values() {
        assert!(config_from(&[("MAX_RETRIES", "lots")]).is_err());
        assert!(config_from(&[("MULTICALL_ADDRESS", "0x1234")]).is_err());
        let config = config_from(&[("DEBUG", "true"), ("MAX_RETRIES", "0")]).unwrap();
        assert!(config.debug);
        assert_eq!(config.max_retries, 0);
    }
}
