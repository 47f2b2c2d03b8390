use std::collections::BTreeMap;

use serde::Serialize;

/// Column names of the fixed part of every report.
pub mod col {
    pub const N: &str = "n";
    pub const WALLET: &str = "wallet";
    pub const TX_COUNT: &str = "Tx count";
    pub const NATIVE: &str = "Native";
    pub const NATIVE_USD: &str = "NativeUSD";
    pub const USDT: &str = "USDT";
    pub const USDC: &str = "USDC";
    pub const DAI: &str = "DAI";
}

pub const TOTAL_LABEL: &str = "Total";

/// One formatted report line. The totals row uses the same shape with
/// `wallet == "Total"` and no tx count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WalletRow {
    pub n: usize,
    pub wallet: String,
    #[serde(rename = "Tx count", skip_serializing_if = "Option::is_none")]
    pub tx_count: Option<u64>,
    #[serde(rename = "Native")]
    pub native: String,
    #[serde(rename = "Native_name", skip_serializing_if = "Option::is_none")]
    pub native_name: Option<String>,
    #[serde(rename = "NativeUSD")]
    pub native_usd: String,
    #[serde(rename = "USDT")]
    pub usdt: String,
    #[serde(rename = "USDC")]
    pub usdc: String,
    #[serde(rename = "DAI")]
    pub dai: String,
    /// Values for the accumulated per-chain columns, keyed by chain name.
    #[serde(flatten)]
    pub chain_values: BTreeMap<String, String>,
}

impl WalletRow {
    /// Cell text for a column; unknown columns render empty.
    pub fn cell(&self, column: &str) -> String {
        match column {
            col::N => self.n.to_string(),
            col::WALLET => self.wallet.clone(),
            col::TX_COUNT => self.tx_count.map(|c| c.to_string()).unwrap_or_default(),
            col::NATIVE => self.native.clone(),
            col::NATIVE_USD => self.native_usd.clone(),
            col::USDT => self.usdt.clone(),
            col::USDC => self.usdc.clone(),
            col::DAI => self.dai.clone(),
            other => self.chain_values.get(other).cloned().unwrap_or_default(),
        }
    }

    pub fn is_total(&self) -> bool {
        self.wallet == TOTAL_LABEL
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row() -> WalletRow {
        WalletRow {
            n: 1,
            wallet: "0xabc".into(),
            tx_count: Some(12),
            native: "1.000 ETH".into(),
            native_name: None,
            native_usd: "3000.00".into(),
            usdt: "5.0".into(),
            usdc: "0.0".into(),
            dai: "0".into(),
            chain_values: BTreeMap::from([("ETH".to_string(), "3005.00".to_string())]),
        }
    }

    #[test]
    fn test_cell_lookup() {
        let r = row();
        assert_eq!(r.cell(col::N), "1");
        assert_eq!(r.cell(col::TX_COUNT), "12");
        assert_eq!(r.cell(col::NATIVE), "1.000 ETH");
        assert_eq!(r.cell("ETH"), "3005.00");
        assert_eq!(r.cell("Polygon"), "");
    }

    #[test]
    fn test_json_shape() {
        let json = serde_json::to_value(row()).unwrap();
        assert_eq!(json["Tx count"], 12);
        assert_eq!(json["NativeUSD"], "3000.00");
        assert_eq!(json["ETH"], "3005.00");
        assert!(json.get("Native_name").is_none());
    }
}
