use std::collections::BTreeMap;

use alloy::primitives::U256;
use rust_decimal::Decimal;
use serde::Serialize;

use super::amount::{fixed, round, to_decimal, total_cell};
use crate::errors::ReportError;
use crate::models::{col, RawResultSet, WalletRow, TOTAL_LABEL};
use crate::networks::{NetworkEntry, Stablecoin, NATIVE_DECIMALS};

const NATIVE_DP: u32 = 3;
const USD_DP: u32 = 2;
const TOKEN_DP: u32 = 1;

// ---------------------------------------------------------------------------
// Columns
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alignment {
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellColor {
    Green,
    Cyan,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub name: String,
    pub alignment: Alignment,
    pub color: CellColor,
}

impl Column {
    fn new(name: &str, alignment: Alignment, color: CellColor) -> Self {
        Self {
            name: name.to_string(),
            alignment,
            color,
        }
    }
}

fn base_columns() -> Vec<Column> {
    vec![
        Column::new(col::N, Alignment::Left, CellColor::Green),
        Column::new(col::WALLET, Alignment::Right, CellColor::Green),
        Column::new(col::TX_COUNT, Alignment::Right, CellColor::Green),
        Column::new(col::NATIVE, Alignment::Right, CellColor::Cyan),
        Column::new(col::NATIVE_USD, Alignment::Right, CellColor::Cyan),
        Column::new(col::USDT, Alignment::Right, CellColor::Cyan),
        Column::new(col::USDC, Alignment::Right, CellColor::Cyan),
        Column::new(col::DAI, Alignment::Right, CellColor::Cyan),
    ]
}

// ---------------------------------------------------------------------------
// Report types
// ---------------------------------------------------------------------------

/// How the Native column is labelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportMode {
    /// Console report: `1.000 ETH`.
    Single,
    /// Data report: bare number plus a separate `Native_name` field.
    Structured,
    /// Part of a multi-chain report: bare numbers only.
    All,
}

/// Cell text for an amount too large to represent as a `Decimal`.
pub const OVERFLOW_CELL: &str = "overflow";

/// Columns of one row whose raw amount could not be represented. Their
/// values count as zero in every sum.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Overflow {
    pub native: bool,
    pub native_usd: bool,
    pub usdt: bool,
    pub usdc: bool,
    pub dai: bool,
    pub chain_usd: bool,
}

impl Overflow {
    /// Any column feeding the per-chain USD value.
    pub fn usd(&self) -> bool {
        self.native_usd || self.usdt || self.usdc || self.dai || self.chain_usd
    }

    fn union(self, other: Overflow) -> Overflow {
        Overflow {
            native: self.native || other.native,
            native_usd: self.native_usd || other.native_usd,
            usdt: self.usdt || other.usdt,
            usdc: self.usdc || other.usdc,
            dai: self.dai || other.dai,
            chain_usd: self.chain_usd || other.chain_usd,
        }
    }
}

/// Numeric values behind one row, kept so reports can be merged without
/// re-parsing the formatted cells.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RowValues {
    pub tx_count: u64,
    pub native: Decimal,
    pub native_usd: Decimal,
    pub usdt: Decimal,
    pub usdc: Decimal,
    pub dai: Decimal,
    pub chain_usd: Decimal,
    pub overflow: Overflow,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChainReport {
    pub name: String,
    pub rows: Vec<WalletRow>,
    pub totals: WalletRow,
    #[serde(skip)]
    pub values: Vec<RowValues>,
}

impl ChainReport {
    /// Wallet rows followed by the totals row.
    pub fn all_rows(&self) -> impl Iterator<Item = &WalletRow> {
        self.rows.iter().chain(std::iter::once(&self.totals))
    }
}

/// Running column sums for the totals row.
#[derive(Debug, Default)]
struct Totals {
    native: Decimal,
    native_usd: Decimal,
    usdt: Decimal,
    usdc: Decimal,
    dai: Decimal,
    chains: BTreeMap<String, Decimal>,
}

impl Totals {
    fn add(&mut self, v: &RowValues) {
        self.native += v.native;
        self.native_usd += v.native_usd;
        self.usdt += v.usdt;
        self.usdc += v.usdc;
        self.dai += v.dai;
    }

    fn add_chain(&mut self, chain: &str, value: Decimal) {
        *self.chains.entry(chain.to_string()).or_default() += value;
    }

    fn into_row(self, n: usize, native: String, native_name: Option<String>) -> WalletRow {
        WalletRow {
            n,
            wallet: TOTAL_LABEL.to_string(),
            tx_count: None,
            native,
            native_name,
            native_usd: total_cell(self.native_usd, USD_DP),
            usdt: total_cell(self.usdt, USD_DP),
            usdc: total_cell(self.usdc, USD_DP),
            dai: total_cell(self.dai, USD_DP),
            chain_values: self
                .chains
                .into_iter()
                .map(|(k, v)| (k, total_cell(v, USD_DP)))
                .collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// ReportBuilder
// ---------------------------------------------------------------------------

/// Owns the report column list. Every `aggregate` call appends one column
/// named after the chain; the list is never reset, so one builder used for
/// several chains ends up with one column per chain.
#[derive(Debug, Clone)]
pub struct ReportBuilder {
    columns: Vec<Column>,
}

impl Default for ReportBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportBuilder {
    pub fn new() -> Self {
        Self {
            columns: base_columns(),
        }
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    /// Turn raw integers into formatted rows plus a totals row.
    pub fn aggregate(
        &mut self,
        raw: &RawResultSet,
        network: &NetworkEntry,
        mode: ReportMode,
    ) -> Result<ChainReport, ReportError> {
        raw.validate()?;

        let chain_name = network.chain.name();
        let symbol = network.chain.native_symbol();
        let mut totals = Totals::default();
        let mut rows = Vec::with_capacity(raw.len());
        let mut values = Vec::with_capacity(raw.len());

        for (i, wallet) in raw.wallets.iter().enumerate() {
            let v = wallet_values(raw, network, i)?;

            let native = amount_cell(v.native, NATIVE_DP, v.overflow.native);
            let (native, native_name) = label_native(native, symbol, mode);

            let row = WalletRow {
                n: i + 1,
                wallet: wallet.label.clone(),
                tx_count: Some(v.tx_count),
                native,
                native_name,
                native_usd: amount_cell(v.native_usd, USD_DP, v.overflow.native_usd),
                usdt: amount_cell(v.usdt, TOKEN_DP, v.overflow.usdt),
                usdc: token_cell(network, Stablecoin::Usdc, v.usdc, v.overflow.usdc),
                dai: token_cell(network, Stablecoin::Dai, v.dai, v.overflow.dai),
                chain_values: BTreeMap::from([(
                    chain_name.to_string(),
                    amount_cell(v.chain_usd, USD_DP, v.overflow.usd()),
                )]),
            };

            totals.add(&v);
            totals.add_chain(chain_name, v.chain_usd);
            rows.push(row);
            values.push(v);
        }

        // The totals row keeps the symbol inline in data reports too;
        // only wallet rows carry a separate `Native_name`.
        let totals_mode = match mode {
            ReportMode::Structured => ReportMode::Single,
            other => other,
        };
        let (native_total, native_name) =
            label_native(total_cell(totals.native, NATIVE_DP), symbol, totals_mode);
        let totals = totals.into_row(raw.len() + 1, native_total, native_name);

        self.columns
            .push(Column::new(chain_name, Alignment::Right, CellColor::Cyan));

        tracing::debug!(
            chain = %chain_name,
            rows = rows.len(),
            columns = self.columns.len(),
            "Report aggregated"
        );

        Ok(ChainReport {
            name: chain_name.to_string(),
            rows,
            totals,
            values,
        })
    }

    /// Combine per-chain reports (built in `ReportMode::All`) into one
    /// summary keyed by wallet. Native amounts are left blank since their
    /// units differ between chains. Does not touch the column list.
    ///
    /// A wallet listed more than once keeps one row per listing: the k-th
    /// occurrence of an address in one chain is merged with the k-th
    /// occurrence in every other chain.
    pub fn merge(&self, reports: &[ChainReport]) -> ChainReport {
        type Key = (String, usize);

        let mut order: Vec<Key> = Vec::new();
        let mut merged: BTreeMap<Key, (RowValues, BTreeMap<String, String>)> = BTreeMap::new();

        for report in reports {
            let mut seen: BTreeMap<&str, usize> = BTreeMap::new();

            for (row, v) in report.rows.iter().zip(&report.values) {
                let occurrence = seen.entry(row.wallet.as_str()).or_default();
                let key = (row.wallet.clone(), *occurrence);
                *occurrence += 1;

                let entry = merged.entry(key.clone()).or_insert_with(|| {
                    order.push(key);
                    (RowValues::default(), BTreeMap::new())
                });
                entry.0.tx_count += v.tx_count;
                entry.0.native_usd += v.native_usd;
                entry.0.usdt += v.usdt;
                entry.0.usdc += v.usdc;
                entry.0.dai += v.dai;
                entry.0.chain_usd += v.chain_usd;
                entry.0.overflow = entry.0.overflow.union(v.overflow);
                entry
                    .1
                    .extend(row.chain_values.iter().map(|(k, v)| (k.clone(), v.clone())));
            }
        }

        let mut totals = Totals::default();
        for report in reports {
            for v in &report.values {
                totals.add_chain(&report.name, v.chain_usd);
            }
        }

        let mut rows = Vec::with_capacity(order.len());
        let mut values = Vec::with_capacity(order.len());

        for (i, key) in order.into_iter().enumerate() {
            let Some((v, chain_values)) = merged.remove(&key) else {
                continue;
            };

            totals.add(&v);
            rows.push(WalletRow {
                n: i + 1,
                wallet: key.0,
                tx_count: Some(v.tx_count),
                native: String::new(),
                native_name: None,
                native_usd: amount_cell(v.native_usd, USD_DP, v.overflow.native_usd),
                usdt: amount_cell(v.usdt, TOKEN_DP, v.overflow.usdt),
                usdc: amount_cell(v.usdc, TOKEN_DP, v.overflow.usdc),
                dai: amount_cell(v.dai, TOKEN_DP, v.overflow.dai),
                chain_values,
            });
            values.push(v);
        }

        let totals = totals.into_row(rows.len() + 1, String::new(), None);

        ChainReport {
            name: "all".to_string(),
            rows,
            totals,
            values,
        }
    }
}

fn label_native(value: String, symbol: &str, mode: ReportMode) -> (String, Option<String>) {
    match mode {
        ReportMode::Single => (format!("{value} {symbol}"), None),
        ReportMode::Structured => (value, Some(symbol.to_string())),
        ReportMode::All => (value, None),
    }
}

fn amount_cell(value: Decimal, dp: u32, overflowed: bool) -> String {
    if overflowed {
        OVERFLOW_CELL.to_string()
    } else {
        fixed(value, dp)
    }
}

/// Tokens the chain does not define render as the literal `0`.
fn token_cell(network: &NetworkEntry, coin: Stablecoin, value: Decimal, overflowed: bool) -> String {
    if network.has(coin) {
        amount_cell(value, TOKEN_DP, overflowed)
    } else {
        "0".to_string()
    }
}

/// Zero stands in for an unrepresentable amount; `flag` records it.
fn or_flag(value: Option<Decimal>, flag: &mut bool) -> Decimal {
    value.unwrap_or_else(|| {
        *flag = true;
        Decimal::ZERO
    })
}

fn convert(raw: &RawResultSet, i: usize, column: &str, value: U256, decimals: u8) -> Option<Decimal> {
    let amount = to_decimal(value, decimals);
    if amount.is_none() {
        tracing::warn!(
            chain = %raw.chain,
            wallet = %raw.wallets[i].label,
            column,
            raw = %value,
            "Amount out of range, reported as overflow"
        );
    }
    amount
}

/// `Ok(None)` when the balance exists but cannot be represented.
fn token_amount(
    raw: &RawResultSet,
    network: &NetworkEntry,
    coin: Stablecoin,
    i: usize,
) -> Result<Option<Decimal>, ReportError> {
    match (network.token(coin), raw.token(coin)) {
        (Some(info), Some(values)) => Ok(convert(raw, i, coin.symbol(), values[i], info.decimals)),
        (Some(_), None) => Err(ReportError::Inconsistent(format!(
            "{}: {coin} is configured but was not fetched",
            network.chain
        ))),
        (None, _) => Ok(Some(Decimal::ZERO)),
    }
}

/// Compute the rounded amounts for wallet `i`.
fn wallet_values(
    raw: &RawResultSet,
    network: &NetworkEntry,
    i: usize,
) -> Result<RowValues, ReportError> {
    let mut overflow = Overflow::default();

    let native_exact = convert(raw, i, col::NATIVE, raw.native[i], NATIVE_DECIMALS);
    let native_usd = native_exact.and_then(|n| n.checked_mul(network.native_price));

    // USDC and bridged USDC.e are reported as one column, summed before rounding.
    let usdc = match (
        token_amount(raw, network, Stablecoin::Usdc, i)?,
        token_amount(raw, network, Stablecoin::UsdcE, i)?,
    ) {
        (Some(a), Some(b)) => a.checked_add(b),
        _ => None,
    };

    let v = RowValues {
        tx_count: raw.tx_counts[i],
        native: round(or_flag(native_exact, &mut overflow.native), NATIVE_DP),
        native_usd: round(or_flag(native_usd, &mut overflow.native_usd), USD_DP),
        usdt: round(
            or_flag(token_amount(raw, network, Stablecoin::Usdt, i)?, &mut overflow.usdt),
            TOKEN_DP,
        ),
        usdc: round(or_flag(usdc, &mut overflow.usdc), TOKEN_DP),
        dai: round(
            or_flag(token_amount(raw, network, Stablecoin::Dai, i)?, &mut overflow.dai),
            TOKEN_DP,
        ),
        chain_usd: Decimal::ZERO,
        overflow: Overflow::default(),
    };

    let chain_usd = v
        .native_usd
        .checked_add(v.usdt)
        .and_then(|sum| sum.checked_add(v.usdc))
        .and_then(|sum| sum.checked_add(v.dai));

    Ok(RowValues {
        chain_usd: or_flag(chain_usd, &mut overflow.chain_usd),
        overflow,
        ..v
    })
}
