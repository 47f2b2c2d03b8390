pub mod balances;

pub use balances::BalanceService;
