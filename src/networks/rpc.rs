use std::collections::BTreeMap;
use std::future::Future;

use alloy::primitives::{address, Address, U256};
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use alloy::sol;
use alloy::sol_types::SolCall;
use rand::seq::SliceRandom;
use rand::Rng;

use super::chain::Chain;
use crate::errors::FetchError;

/// Multicall deployment shared by every supported chain.
pub const DEFAULT_MULTICALL: Address = address!("ca11bde05977b3631167028862be2a173976ca11");

sol! {
    #[allow(missing_docs)]
    #[sol(rpc)]
    contract Multicall {
        struct Call {
            address target;
            bytes callData;
        }

        function aggregate(Call[] calls) external returns (uint256 blockNumber, bytes[] returnData);
        function getEthBalance(address addr) external view returns (uint256 balance);
    }

    #[allow(missing_docs)]
    interface IERC20 {
        function balanceOf(address account) external view returns (uint256);
    }
}

/// Public endpoints used when no `RPC_<CHAIN>` override is configured.
pub fn default_endpoints(chain: Chain) -> &'static [&'static str] {
    match chain {
        Chain::Eth => &[
            "https://ethereum.publicnode.com",
            "https://eth.llamarpc.com",
            "https://rpc.ankr.com/eth",
            "https://eth.drpc.org",
        ],
        Chain::Arbitrum => &[
            "https://arb1.arbitrum.io/rpc",
            "https://arbitrum-one.publicnode.com",
            "https://arbitrum.drpc.org",
        ],
        Chain::Optimism => &[
            "https://mainnet.optimism.io",
            "https://optimism.publicnode.com",
            "https://optimism.drpc.org",
        ],
        Chain::Polygon => &[
            "https://polygon-rpc.com",
            "https://polygon-bor.publicnode.com",
            "https://polygon.drpc.org",
        ],
        Chain::Bsc => &[
            "https://bsc-dataseed.bnbchain.org",
            "https://bsc.publicnode.com",
            "https://bsc.drpc.org",
        ],
        Chain::Avalanche => &[
            "https://api.avax.network/ext/bc/C/rpc",
            "https://avalanche-c-chain.publicnode.com",
        ],
        Chain::Base => &[
            "https://mainnet.base.org",
            "https://base.publicnode.com",
            "https://base.llamarpc.com",
        ],
        Chain::Core => &["https://rpc.coredao.org", "https://rpc.ankr.com/core"],
        Chain::OpBnb => &[
            "https://opbnb-mainnet-rpc.bnbchain.org",
            "https://opbnb.publicnode.com",
        ],
        Chain::Celo => &["https://forno.celo.org", "https://rpc.ankr.com/celo"],
        Chain::Klaytn => &["https://public-en-cypress.klaytn.net", "https://klaytn.drpc.org"],
        Chain::Fantom => &["https://rpcapi.fantom.network", "https://fantom.publicnode.com"],
        Chain::Moonbeam => &[
            "https://rpc.api.moonbeam.network",
            "https://moonbeam.publicnode.com",
        ],
        Chain::Moonriver => &[
            "https://rpc.api.moonriver.moonbeam.network",
            "https://moonriver.publicnode.com",
        ],
    }
}

/// Pick one endpoint uniformly at random. No health check is done here.
pub fn pick_endpoint<'a, R: Rng + ?Sized>(
    chain: Chain,
    pool: &'a [String],
    rng: &mut R,
) -> Result<&'a str, FetchError> {
    pool.choose(rng)
        .map(String::as_str)
        .ok_or(FetchError::NoEndpoints(chain))
}

// ---------------------------------------------------------------------------
// Reader / factory seam
// ---------------------------------------------------------------------------

/// Read-only calls the balance fetcher needs from one chain endpoint.
pub trait ChainReader {
    fn endpoint(&self) -> &str;

    fn transaction_count(
        &self,
        wallet: Address,
    ) -> impl Future<Output = Result<u64, FetchError>> + Send;

    /// One multicall round trip of `getEthBalance` per wallet.
    fn native_balances(
        &self,
        wallets: &[Address],
    ) -> impl Future<Output = Result<Vec<U256>, FetchError>> + Send;

    /// One multicall round trip of ERC-20 `balanceOf` per wallet.
    fn token_balances(
        &self,
        token: Address,
        wallets: &[Address],
    ) -> impl Future<Output = Result<Vec<U256>, FetchError>> + Send;
}

/// Builds a fresh reader for a chain; called once per fetch attempt.
pub trait ClientFactory {
    type Reader: ChainReader + Sync;

    fn connect(&self, chain: Chain) -> Result<Self::Reader, FetchError>;
}

// ---------------------------------------------------------------------------
// Alloy-backed implementation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct AlloyClientFactory {
    pools: BTreeMap<Chain, Vec<String>>,
    multicall: Address,
}

impl AlloyClientFactory {
    pub fn new(pools: BTreeMap<Chain, Vec<String>>, multicall: Address) -> Self {
        Self { pools, multicall }
    }
}

impl ClientFactory for AlloyClientFactory {
    type Reader = AlloyReader;

    fn connect(&self, chain: Chain) -> Result<AlloyReader, FetchError> {
        let pool = self.pools.get(&chain).map(Vec::as_slice).unwrap_or_default();
        let endpoint = pick_endpoint(chain, pool, &mut rand::thread_rng())?.to_string();

        let provider = ProviderBuilder::new()
            .connect_http(endpoint.parse().map_err(|e| FetchError::InvalidEndpoint {
                endpoint: endpoint.clone(),
                reason: format!("{e}"),
            })?)
            .erased();

        tracing::debug!(chain = %chain, endpoint = %endpoint, "RPC client created");

        Ok(AlloyReader {
            provider,
            multicall: self.multicall,
            endpoint,
        })
    }
}

#[derive(Clone)]
pub struct AlloyReader {
    provider: DynProvider,
    multicall: Address,
    endpoint: String,
}

impl AlloyReader {
    /// Run `calls` through `aggregate` and decode every reply as `C`'s return.
    async fn aggregate<C>(&self, what: &str, calls: Vec<Multicall::Call>) -> Result<Vec<U256>, FetchError>
    where
        C: SolCall<Return = U256>,
    {
        let expected = calls.len();
        let contract = Multicall::new(self.multicall, self.provider.clone());
        let reply = contract.aggregate(calls).call().await?;

        if reply.returnData.len() != expected {
            return Err(FetchError::LengthMismatch {
                what: what.to_string(),
                expected,
                got: reply.returnData.len(),
            });
        }

        reply
            .returnData
            .iter()
            .map(|data| C::abi_decode_returns(&data[..]).map_err(FetchError::from))
            .collect()
    }
}

impl ChainReader for AlloyReader {
    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn transaction_count(&self, wallet: Address) -> Result<u64, FetchError> {
        self.provider
            .get_transaction_count(wallet)
            .await
            .map_err(|e| FetchError::Rpc(e.to_string()))
    }

    async fn native_balances(&self, wallets: &[Address]) -> Result<Vec<U256>, FetchError> {
        let calls = wallets
            .iter()
            .map(|wallet| Multicall::Call {
                target: self.multicall,
                callData: Multicall::getEthBalanceCall { addr: *wallet }.abi_encode().into(),
            })
            .collect();

        self.aggregate::<Multicall::getEthBalanceCall>("native balances", calls)
            .await
    }

    async fn token_balances(&self, token: Address, wallets: &[Address]) -> Result<Vec<U256>, FetchError> {
        let calls = wallets
            .iter()
            .map(|wallet| Multicall::Call {
                target: token,
                callData: IERC20::balanceOfCall { account: *wallet }.abi_encode().into(),
            })
            .collect();

        self.aggregate::<IERC20::balanceOfCall>("token balances", calls)
            .await
    }
}
