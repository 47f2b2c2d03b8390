use std::collections::BTreeMap;
use std::fmt;

use alloy::primitives::{address, Address};
use futures_util::future::try_join_all;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::chain::Chain;
use super::price_client::{PriceClient, PriceClientError};

/// Every supported chain's fee currency uses 18 decimals.
pub const NATIVE_DECIMALS: u8 = 18;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("chain {0} is not loaded in the registry")]
    NotLoaded(Chain),

    #[error("native price lookup failed: {0}")]
    Price(#[from] PriceClientError),
}

// ---------------------------------------------------------------------------
// Stablecoins
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Stablecoin {
    Usdt,
    Usdc,
    UsdcE,
    Dai,
}

impl Stablecoin {
    pub fn symbol(&self) -> &'static str {
        match self {
            Stablecoin::Usdt => "USDT",
            Stablecoin::Usdc => "USDC",
            Stablecoin::UsdcE => "USDC.e",
            Stablecoin::Dai => "DAI",
        }
    }
}

impl fmt::Display for Stablecoin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenInfo {
    pub address: Address,
    pub decimals: u8,
}

const fn token(address: Address, decimals: u8) -> TokenInfo {
    TokenInfo { address, decimals }
}

/// Static stablecoin table. USDT exists everywhere; the rest only where listed.
pub fn stablecoins(chain: Chain) -> BTreeMap<Stablecoin, TokenInfo> {
    use Stablecoin::*;

    let list: Vec<(Stablecoin, TokenInfo)> = match chain {
        Chain::Eth => vec![
            (Usdt, token(address!("dac17f958d2ee523a2206206994597c13d831ec7"), 6)),
            (Usdc, token(address!("a0b86991c6218b36c1d19d4a2e9eb0ce3606eb48"), 6)),
            (Dai, token(address!("6b175474e89094c44da98b954eedeac495271d0f"), 18)),
        ],
        Chain::Arbitrum => vec![
            (Usdt, token(address!("fd086bc7cd5c481dcc9c85ebe478a1c0b69fcbb9"), 6)),
            (Usdc, token(address!("af88d065e77c8cc2239327c5edb3a432268e5831"), 6)),
            (UsdcE, token(address!("ff970a61a04b1ca14834a43f5de4533ebddb5cc8"), 6)),
            (Dai, token(address!("da10009cbd5d07dd0cecc66161fc93d7c9000da1"), 18)),
        ],
        Chain::Optimism => vec![
            (Usdt, token(address!("94b008aa00579c1307b0ef2c499ad98a8ce58e58"), 6)),
            (Usdc, token(address!("7f5c764cbc14f9669b88837ca1490cca17c31607"), 6)),
            (Dai, token(address!("da10009cbd5d07dd0cecc66161fc93d7c9000da1"), 18)),
        ],
        Chain::Polygon => vec![
            (Usdt, token(address!("c2132d05d31c914a87c6611c10748aeb04b58e8f"), 6)),
            (Usdc, token(address!("2791bca1f2de4661ed88a30c99a7a9449aa84174"), 6)),
            (Dai, token(address!("8f3cf7ad23cd3cadbd9735aff958023239c6a063"), 18)),
        ],
        Chain::Bsc => vec![
            (Usdt, token(address!("55d398326f99059ff775485246999027b3197955"), 18)),
            (Usdc, token(address!("8ac76a51cc950d9822d68b83fe1ad97b32cd580d"), 18)),
            (Dai, token(address!("1af3f329e8be154074d8769d1ffa4ee058b1dbc3"), 18)),
        ],
        Chain::Avalanche => vec![
            (Usdt, token(address!("9702230a8ea53601f5cd2dc00fdbc13d4df4a8c7"), 6)),
            (Usdc, token(address!("b97ef9ef8734c71904d8002f8b6bc66dd9c48a6e"), 6)),
            (UsdcE, token(address!("a7d7079b0fead91f3e65f86e8915cb59c1a4c664"), 6)),
            (Dai, token(address!("d586e7f844cea2f87f50152665bcbc2c279d8d70"), 18)),
        ],
        Chain::Base => vec![
            (Usdt, token(address!("50c5725949a6f0c72e6c4a641f24049a917db0cb"), 18)),
            (Usdc, token(address!("833589fcd6edb6e08f4c7c32d4f71b54bda02913"), 6)),
        ],
        Chain::Core => vec![
            (Usdt, token(address!("900101d06a7426441ae63e9ab3b9b0f63be145f1"), 6)),
            (Usdc, token(address!("a4151b2b3e269645181dccf2d426ce75fcbdeca9"), 6)),
        ],
        Chain::OpBnb => vec![
            (Usdt, token(address!("9e5aac1ba1a2e6aed6b32689dfcf62a509ca96f3"), 6)),
        ],
        Chain::Celo => vec![
            (Usdt, token(address!("b020d981420744f6b0fedd22bb67cd37ce18a1d5"), 6)),
            (Usdc, token(address!("ef4229c8c3250c675f21bcefa42f58efbff6002a"), 6)),
        ],
        Chain::Klaytn => vec![
            (Usdt, token(address!("cee8faf64bb97a73bb51e115aa89c17ffa8dd167"), 6)),
        ],
        Chain::Fantom => vec![
            (Usdt, token(address!("049d68029688eabf473097a2fc38ef61633a3c7a"), 6)),
            (Usdc, token(address!("818ec0a7fe18ff94269904fced6ae3dae6d6dc0b"), 6)),
        ],
        Chain::Moonbeam => vec![
            (Usdt, token(address!("efaeee334f0fd1712f9a8cc375f427d9cdd40d73"), 6)),
            (Usdc, token(address!("818ec0a7fe18ff94269904fced6ae3dae6d6dc0b"), 6)),
        ],
        Chain::Moonriver => vec![
            (Usdt, token(address!("e936caa7f6d9f5c9e907111fcaf7c351c184cda7"), 6)),
            (Usdc, token(address!("e3f5a90f9cb311505cd691a46596599aa1a0ad7d"), 6)),
        ],
    };

    list.into_iter().collect()
}

// ---------------------------------------------------------------------------
// NetworkEntry / NetworkRegistry
// ---------------------------------------------------------------------------

/// Per-chain snapshot: native USD price taken at startup plus the token table.
#[derive(Debug, Clone)]
pub struct NetworkEntry {
    pub chain: Chain,
    pub native_price: Decimal,
    pub tokens: BTreeMap<Stablecoin, TokenInfo>,
}

impl NetworkEntry {
    pub fn new(chain: Chain, native_price: Decimal) -> Self {
        Self {
            chain,
            native_price,
            tokens: stablecoins(chain),
        }
    }

    pub fn token(&self, coin: Stablecoin) -> Option<&TokenInfo> {
        self.tokens.get(&coin)
    }

    pub fn has(&self, coin: Stablecoin) -> bool {
        self.tokens.contains_key(&coin)
    }
}

#[derive(Debug, Clone, Default)]
pub struct NetworkRegistry {
    entries: BTreeMap<Chain, NetworkEntry>,
}

impl NetworkRegistry {
    /// Build the registry for `chains`, looking up each native price once.
    ///
    /// Chains sharing a native symbol share one lookup. Any failed lookup
    /// aborts the whole load.
    pub async fn load(price_client: &PriceClient, chains: &[Chain]) -> Result<Self, RegistryError> {
        let mut symbols: Vec<&'static str> = chains.iter().map(|c| c.native_symbol()).collect();
        symbols.sort_unstable();
        symbols.dedup();

        let prices = try_join_all(symbols.iter().map(|s| price_client.get_usd_price(s))).await?;
        let by_symbol: BTreeMap<&str, Decimal> = symbols.into_iter().zip(prices).collect();

        for (symbol, price) in &by_symbol {
            tracing::info!(symbol = %symbol, usd = %price, "Native price loaded");
        }

        Ok(Self::from_prices(chains.iter().filter_map(|c| {
            by_symbol.get(c.native_symbol()).map(|p| (*c, *p))
        })))
    }

    /// Build a registry from already-known prices.
    pub fn from_prices(prices: impl IntoIterator<Item = (Chain, Decimal)>) -> Self {
        let entries = prices
            .into_iter()
            .map(|(chain, price)| (chain, NetworkEntry::new(chain, price)))
            .collect();
        Self { entries }
    }

    pub fn get(&self, chain: Chain) -> Result<&NetworkEntry, RegistryError> {
        self.entries.get(&chain).ok_or(RegistryError::NotLoaded(chain))
    }

    pub fn chains(&self) -> impl Iterator<Item = Chain> + '_ {
        self.entries.keys().copied()
    }
}
