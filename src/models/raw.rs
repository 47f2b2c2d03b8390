use std::collections::BTreeMap;

use alloy::primitives::U256;

use super::wallet::Wallet;
use crate::errors::ReportError;
use crate::networks::{Chain, Stablecoin};

/// Raw integers for one chain, index-aligned with `wallets`.
#[derive(Debug, Clone)]
pub struct RawResultSet {
    pub chain: Chain,
    pub wallets: Vec<Wallet>,
    pub tx_counts: Vec<u64>,
    pub native: Vec<U256>,
    pub tokens: BTreeMap<Stablecoin, Vec<U256>>,
}

impl RawResultSet {
    pub fn len(&self) -> usize {
        self.wallets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.wallets.is_empty()
    }

    pub fn token(&self, coin: Stablecoin) -> Option<&[U256]> {
        self.tokens.get(&coin).map(Vec::as_slice)
    }

    /// Every metric vector must have exactly one entry per wallet.
    pub fn validate(&self) -> Result<(), ReportError> {
        let n = self.wallets.len();
        let mut lengths: Vec<(String, usize)> = vec![
            ("tx counts".into(), self.tx_counts.len()),
            ("native balances".into(), self.native.len()),
        ];
        lengths.extend(
            self.tokens
                .iter()
                .map(|(coin, values)| (format!("{coin} balances"), values.len())),
        );

        match lengths.into_iter().find(|(_, len)| *len != n) {
            Some((what, len)) => Err(ReportError::Inconsistent(format!(
                "{}: {what} has {len} entries for {n} wallets",
                self.chain
            ))),
            None => Ok(()),
        }
    }
}
