pub mod balance_fetcher;

pub use balance_fetcher::{BalanceFetcher, DEFAULT_MAX_RETRIES};
