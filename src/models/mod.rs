pub mod raw;
pub mod row;
pub mod wallet;

pub use raw::RawResultSet;
pub use row::{col, WalletRow, TOTAL_LABEL};
pub use wallet::{parse_wallets, read_wallets, Wallet, WalletListError};
