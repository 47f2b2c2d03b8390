use std::collections::BTreeMap;
use std::path::PathBuf;

use alloy::primitives::{Address, U256};
use futures_util::future::try_join_all;

use crate::errors::FetchError;
use crate::models::{read_wallets, RawResultSet};
use crate::networks::{ChainReader, ClientFactory, NetworkEntry};

pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Pulls tx counts and balances for the whole wallet list from one chain.
pub struct BalanceFetcher<F> {
    factory: F,
    wallets_path: PathBuf,
    max_retries: u32,
}

impl<F: ClientFactory> BalanceFetcher<F> {
    pub fn new(factory: F, wallets_path: impl Into<PathBuf>, max_retries: u32) -> Self {
        Self {
            factory,
            wallets_path: wallets_path.into(),
            max_retries,
        }
    }

    /// Fetch every metric for `network`, restarting from a fresh client on
    /// any failure. Gives up once more than `max_retries` retries were made.
    pub async fn fetch(&self, network: &NetworkEntry) -> Result<RawResultSet, FetchError> {
        let chain = network.chain;
        let mut retry: u32 = 0;

        loop {
            match self.attempt(network).await {
                Ok(raw) => {
                    tracing::info!(
                        chain = %chain,
                        wallets = raw.len(),
                        tokens = raw.tokens.len(),
                        retries = retry,
                        "Balances fetched"
                    );
                    return Ok(raw);
                }
                Err(e) => {
                    retry += 1;
                    tracing::debug!(chain = %chain, retry, error = %e, "Balance fetch attempt failed");

                    if retry > self.max_retries {
                        return Err(FetchError::RetriesExhausted {
                            chain,
                            attempts: retry,
                            last: Box::new(e),
                        });
                    }
                }
            }
        }
    }

    async fn attempt(&self, network: &NetworkEntry) -> Result<RawResultSet, FetchError> {
        let chain = network.chain;
        let wallets = read_wallets(&self.wallets_path).await?;
        let addresses: Vec<Address> = wallets.iter().map(|w| w.address).collect();

        if addresses.is_empty() {
            tracing::warn!(chain = %chain, "Wallet list is empty");
            return Ok(RawResultSet {
                chain,
                wallets,
                tx_counts: Vec::new(),
                native: Vec::new(),
                tokens: network.tokens.keys().map(|c| (*c, Vec::new())).collect(),
            });
        }

        let client = self.factory.connect(chain)?;
        tracing::debug!(chain = %chain, endpoint = %client.endpoint(), wallets = addresses.len(), "Fetch attempt started");

        // All tx-count requests are in flight together; one failure fails the attempt.
        let tx_counts = try_join_all(addresses.iter().map(|a| client.transaction_count(*a))).await?;

        let native = client.native_balances(&addresses).await?;
        ensure_len("native balances", &native, addresses.len())?;

        let mut tokens = BTreeMap::new();
        for (coin, info) in &network.tokens {
            let balances = client.token_balances(info.address, &addresses).await?;
            ensure_len(coin.symbol(), &balances, addresses.len())?;
            tokens.insert(*coin, balances);
        }

        Ok(RawResultSet {
            chain,
            wallets,
            tx_counts,
            native,
            tokens,
        })
    }
}

fn ensure_len(what: &str, values: &[U256], expected: usize) -> Result<(), FetchError> {
    if values.len() == expected {
        Ok(())
    } else {
        Err(FetchError::LengthMismatch {
            what: what.to_string(),
            expected,
            got: values.len(),
        })
    }
}
