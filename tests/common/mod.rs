use std::collections::{HashMap, HashSet};
use std::io::Write;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use alloy::primitives::{Address, U256};

use evm_balances::errors::FetchError;
use evm_balances::networks::{Chain, ChainReader, ClientFactory};

pub const WALLET_A: &str = "0x00000000000000000000000000000000000000aa";
pub const WALLET_B: &str = "0x00000000000000000000000000000000000000bb";

/// `n` whole units of a token with `decimals`.
#[allow(dead_code)]
pub fn units(n: u64, decimals: u8) -> U256 {
    U256::from(n) * U256::from(10u64).pow(U256::from(decimals))
}

#[allow(dead_code)]
pub fn addr(s: &str) -> Address {
    s.parse().expect("valid test address")
}

/// Write a wallet list into a fresh temp dir and return (dir, file path).
#[allow(dead_code)]
pub fn wallet_file(lines: &[&str]) -> (tempfile::TempDir, PathBuf) {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("evm.txt");
    write_wallets(&path, lines);
    (dir, path)
}

#[allow(dead_code)]
pub fn write_wallets(path: &PathBuf, lines: &[&str]) {
    let mut file = std::fs::File::create(path).expect("Failed to create wallet file");
    for line in lines {
        writeln!(file, "{line}").expect("Failed to write wallet file");
    }
}

// ---------------------------------------------------------------------------
// Mock chain
// ---------------------------------------------------------------------------

/// Which call of a reader fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(dead_code)]
pub enum Failure {
    /// `native_balances` errors.
    Native,
    /// The tx-count request for this one wallet errors.
    TxCount(Address),
    /// The `balanceOf` batch for this token errors.
    Token(Address),
    /// `native_balances` answers with one entry too few.
    ShortNative,
}

#[derive(Default)]
struct MockState {
    native: HashMap<Address, U256>,
    tokens: HashMap<(Address, Address), U256>,
    tx_counts: HashMap<Address, u64>,
    /// Attempts (connects) that fail before readers start succeeding, and how.
    fail_first: u32,
    failure: Option<Failure>,
    /// Chains whose readers always fail on `native_balances`.
    broken: HashSet<Chain>,
}

/// In-memory stand-in for the RPC layer. Every `connect` is counted so
/// tests can check that each retry starts from a fresh client.
#[derive(Clone, Default)]
pub struct MockFactory {
    state: Arc<Mutex<MockState>>,
    connects: Arc<AtomicU32>,
}

#[allow(dead_code)]
impl MockFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_native(self, wallet: &str, value: U256) -> Self {
        self.state.lock().unwrap().native.insert(addr(wallet), value);
        self
    }

    pub fn with_token(self, token: Address, wallet: &str, value: U256) -> Self {
        self.state
            .lock()
            .unwrap()
            .tokens
            .insert((token, addr(wallet)), value);
        self
    }

    pub fn with_tx_count(self, wallet: &str, count: u64) -> Self {
        self.state.lock().unwrap().tx_counts.insert(addr(wallet), count);
        self
    }

    /// The first `attempts` readers fail on their native batch.
    pub fn failing_first(self, attempts: u32) -> Self {
        self.failing_first_with(attempts, Failure::Native)
    }

    /// The first `attempts` readers fail the way `failure` describes.
    pub fn failing_first_with(self, attempts: u32, failure: Failure) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            state.fail_first = attempts;
            state.failure = Some(failure);
        }
        self
    }

    pub fn broken_chain(self, chain: Chain) -> Self {
        self.state.lock().unwrap().broken.insert(chain);
        self
    }

    pub fn connects(&self) -> u32 {
        self.connects.load(Ordering::SeqCst)
    }
}

impl ClientFactory for MockFactory {
    type Reader = MockReader;

    fn connect(&self, chain: Chain) -> Result<MockReader, FetchError> {
        let attempt = self.connects.fetch_add(1, Ordering::SeqCst);
        let state = self.state.lock().unwrap();
        let failure = if state.broken.contains(&chain) {
            Some(Failure::Native)
        } else if attempt < state.fail_first {
            state.failure
        } else {
            None
        };
        Ok(MockReader {
            state: Arc::clone(&self.state),
            failure,
            endpoint: format!("mock://{chain}/{attempt}"),
        })
    }
}

pub struct MockReader {
    state: Arc<Mutex<MockState>>,
    failure: Option<Failure>,
    endpoint: String,
}

impl MockReader {
    fn unavailable(&self) -> FetchError {
        FetchError::Rpc(format!("{} unavailable", self.endpoint))
    }
}

impl ChainReader for MockReader {
    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn transaction_count(&self, wallet: Address) -> Result<u64, FetchError> {
        if self.failure == Some(Failure::TxCount(wallet)) {
            return Err(self.unavailable());
        }
        let state = self.state.lock().unwrap();
        Ok(state.tx_counts.get(&wallet).copied().unwrap_or_default())
    }

    async fn native_balances(&self, wallets: &[Address]) -> Result<Vec<U256>, FetchError> {
        if self.failure == Some(Failure::Native) {
            return Err(self.unavailable());
        }
        let state = self.state.lock().unwrap();
        let mut balances: Vec<U256> = wallets
            .iter()
            .map(|w| state.native.get(w).copied().unwrap_or_default())
            .collect();
        if self.failure == Some(Failure::ShortNative) {
            balances.pop();
        }
        Ok(balances)
    }

    async fn token_balances(&self, token: Address, wallets: &[Address]) -> Result<Vec<U256>, FetchError> {
        if self.failure == Some(Failure::Token(token)) {
            return Err(self.unavailable());
        }
        let state = self.state.lock().unwrap();
        Ok(wallets
            .iter()
            .map(|w| state.tokens.get(&(token, *w)).copied().unwrap_or_default())
            .collect())
    }
}
