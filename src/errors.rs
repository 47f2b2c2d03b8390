use crate::models::WalletListError;
use crate::networks::registry::RegistryError;
use crate::networks::Chain;

/// Failures while pulling raw balances from a chain.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("no RPC endpoints configured for {0}")]
    NoEndpoints(Chain),

    #[error("invalid RPC endpoint {endpoint}: {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },

    #[error("RPC call failed: {0}")]
    Rpc(String),

    #[error("multicall failed: {0}")]
    Contract(#[from] alloy::contract::Error),

    #[error("failed to decode call result: {0}")]
    Decode(#[from] alloy::sol_types::Error),

    #[error("{what}: expected {expected} results, got {got}")]
    LengthMismatch {
        what: String,
        expected: usize,
        got: usize,
    },

    #[error(transparent)]
    Wallets(#[from] WalletListError),

    #[error("{chain}: giving up after {attempts} attempts: {last}")]
    RetriesExhausted {
        chain: Chain,
        attempts: u32,
        last: Box<FetchError>,
    },
}

/// Failures while turning raw results into a report or writing it out.
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("raw result set is inconsistent: {0}")]
    Inconsistent(String),

    #[error("failed to write {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write CSV {path}: {source}")]
    Csv {
        path: String,
        #[source]
        source: csv::Error,
    },
}

/// Anything that can stop one report run.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Report(#[from] ReportError),

    #[error("no chain could be fetched for the multi-chain report")]
    NothingFetched,
}
