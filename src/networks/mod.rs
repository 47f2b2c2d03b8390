pub mod chain;
pub mod price_client;
pub mod registry;
pub mod rpc;

pub use chain::{Chain, ReportTarget, UnknownChain};
pub use price_client::PriceClient;
pub use registry::{NetworkEntry, NetworkRegistry, Stablecoin, TokenInfo, NATIVE_DECIMALS};
pub use rpc::{AlloyClientFactory, ChainReader, ClientFactory};
